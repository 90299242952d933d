//! 管理后台 DTO 模块
//!
//! 包含跨处理器共享的响应数据传输对象；各端点特有的请求 DTO
//! 定义在对应的 handler 文件中

pub mod response;

pub use response::{ApiResponse, PageResponse, StatsOverview, UserDto, VerifyVoucherResponse};
