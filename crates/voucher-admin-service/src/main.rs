//! 奖学金兑换凭证管理后台服务
//!
//! 提供注册审核、申请审批、兑换码发放与核验等 REST API。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Request,
    http::HeaderValue,
    middleware,
    middleware::Next,
    response::Response,
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use voucher_admin_service::{
    auth::{JwtConfig, JwtManager},
    middleware::auth_middleware,
    routes,
    state::AppState,
};
use voucher_management::{
    ApplicationRepository, ApplicationService, IssuanceService, PgIssuanceStore,
    PgVerificationStore, ReconcileService, SignupRepository, SignupService, SubmissionRepository,
    SubmissionService, VerificationService, VoucherRepository, notification::Notifier,
};
use voucher_shared::{config::AppConfig, database::Database, observability};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 统一加载配置：config/{env}.toml + VOUCHER_ 前缀环境变量
    let config = AppConfig::load("voucher-admin-service").unwrap_or_default();

    observability::init(&config.observability)?;

    info!("Starting voucher-admin-service on {}", config.server_addr());

    // 初始化基础设施
    let db = Database::connect(&config.database).await?;
    db.run_migrations().await?;

    // JWT 密钥配置：生产环境必须通过环境变量注入，开发环境使用默认值
    let jwt_secret = std::env::var("VOUCHER_JWT_SECRET").unwrap_or_else(|_| {
        let default_secret = "voucher-admin-secret-key-change-in-production".to_string();
        if std::env::var("VOUCHER_ENV").unwrap_or_default() == "production" {
            panic!("VOUCHER_JWT_SECRET must be set in production environment");
        }
        warn!("Using default JWT secret - set VOUCHER_JWT_SECRET for production");
        default_secret
    });

    let jwt_expires = std::env::var("VOUCHER_JWT_EXPIRES_SECS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(86400);

    let jwt_manager = JwtManager::new(JwtConfig {
        secret: jwt_secret,
        expires_in_secs: jwt_expires,
        issuer: "voucher-admin-service".to_string(),
    });

    // 业务服务装配：仓储 → 发放/核验存储 → 服务
    let pool = db.pool().clone();
    let notifier = Arc::new(Notifier::from_config(&config.email));

    let signup_repo = Arc::new(SignupRepository::new(pool.clone()));
    let application_repo = Arc::new(ApplicationRepository::new(pool.clone()));
    let voucher_repo = Arc::new(VoucherRepository::new(pool.clone()));
    let submission_repo = Arc::new(SubmissionRepository::new(pool.clone()));

    let issuance = Arc::new(IssuanceService::new(Arc::new(PgIssuanceStore::new(
        pool.clone(),
    ))));
    let verification = Arc::new(VerificationService::new(Arc::new(PgVerificationStore::new(
        pool.clone(),
    ))));

    let signups = Arc::new(SignupService::new(signup_repo, notifier.clone()));
    let applications = Arc::new(ApplicationService::new(
        application_repo,
        issuance,
        notifier.clone(),
    ));
    let submissions = Arc::new(SubmissionService::new(
        submission_repo,
        verification.clone(),
        pool.clone(),
    ));
    let reconcile = Arc::new(ReconcileService::new(voucher_repo.clone()));

    let state = AppState::new(
        pool,
        jwt_manager,
        signups,
        applications,
        submissions,
        verification,
        voucher_repo,
        reconcile,
    );
    info!("Application services initialized");

    // CORS 配置：通过 VOUCHER_CORS_ORIGINS 环境变量控制允许的来源
    // 默认允许本地开发地址，生产环境应设置为实际域名
    let allowed_origins = std::env::var("VOUCHER_CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

    let cors = if allowed_origins == "*" {
        // 生产环境使用通配符 CORS 可能导致跨站请求伪造
        if std::env::var("VOUCHER_ENV").unwrap_or_default() == "production" {
            warn!("VOUCHER_CORS_ORIGINS=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS allowed_origins: {}", allowed_origins);
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = Router::new()
        .nest("/api", routes::api_routes())
        .route("/health", get(health_check))
        .route(
            "/ready",
            get({
                let db_for_ready = db;
                move || readiness_check(db_for_ready.clone())
            }),
        )
        // HTTP 安全头：即使反向代理未配置也确保基本安全策略生效
        .layer(middleware::from_fn(security_headers))
        .layer(cors)
        // 认证中间件：验证 JWT Token
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM 或 Ctrl+C 时停止接收新连接并等待
    // 已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 为所有响应注入 HTTP 安全头
async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    // 禁止浏览器猜测 Content-Type
    headers.insert("x-content-type-options", "nosniff".parse().unwrap());
    // 禁止页面被嵌入 iframe
    headers.insert("x-frame-options", "DENY".parse().unwrap());
    // 强制浏览器后续访问只使用 HTTPS
    headers.insert(
        "strict-transport-security",
        "max-age=31536000; includeSubDomains".parse().unwrap(),
    );
    headers.insert("x-xss-protection", "0".parse().unwrap());
    response
}

/// 监听关闭信号
///
/// K8s 通过 SIGTERM 通知 Pod 停止；本地开发通过 Ctrl+C。
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 存活探针：服务进程正常即返回 ok
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "voucher-admin-service"
    }))
}

/// 就绪探针：检查数据库连接是否可用
async fn readiness_check(db: Database) -> Json<serde_json::Value> {
    let db_ok = db.health_check().await.is_ok();

    Json(serde_json::json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "service": "voucher-admin-service",
        "checks": {
            "database": if db_ok { "ok" } else { "fail" }
        }
    }))
}
