//! 兑换码生成与格式校验
//!
//! 兑换码格式为 `PREFIX-XXXX-XXXX`，PREFIX 为固定 3 位字母标识，
//! 每个 X 从 32 个符号的字母表中独立均匀抽取。字母表剔除了易混淆
//! 字符（0/O/I/1），总空间约 32^8 ≈ 1.1 万亿，便于人工抄录输入。

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

/// 默认兑换码前缀
pub const DEFAULT_CODE_PREFIX: &str = "GBF";

/// 兑换码字母表（剔除 0/O/I/1）
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 每段随机字符数
const SECTION_LENGTH: usize = 4;

/// 随机段数量
const SECTION_COUNT: usize = 2;

/// 兑换码完整格式
static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}(-[A-Z2-9]{4}){2}$").expect("invalid code pattern"));

/// 生成一个候选兑换码
///
/// 仅负责生成格式合法的候选，不保证全局唯一；唯一性由发放流程的
/// 探测与存储层唯一约束共同保证。可无限次调用。
pub fn generate_code(prefix: &str) -> String {
    generate_code_with(prefix, &mut rand::rng())
}

/// 使用指定随机源生成候选兑换码
///
/// 测试中可传入种子化的 RNG 得到确定性序列。
pub fn generate_code_with<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    let mut code = String::with_capacity(prefix.len() + SECTION_COUNT * (SECTION_LENGTH + 1));
    code.push_str(prefix);

    for _ in 0..SECTION_COUNT {
        code.push('-');
        for _ in 0..SECTION_LENGTH {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            code.push(CODE_ALPHABET[idx] as char);
        }
    }

    code
}

/// 规范化用户输入的兑换码：去除首尾空白并转为大写
///
/// 所有查询与写入前都必须先经过规范化，保证同一个码的不同写法
/// 得到相同的核验结果。
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// 检查兑换码是否符合 `XXX-XXXX-XXXX` 格式
pub fn is_well_formed(code: &str) -> bool {
    CODE_PATTERN.is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generated_code_matches_format() {
        for _ in 0..100 {
            let code = generate_code(DEFAULT_CODE_PREFIX);
            assert!(is_well_formed(&code), "格式不合法: {code}");
        }
    }

    #[test]
    fn test_generated_code_excludes_ambiguous_characters() {
        for _ in 0..200 {
            let code = generate_code(DEFAULT_CODE_PREFIX);
            let random_part = &code[DEFAULT_CODE_PREFIX.len()..];
            for c in random_part.chars().filter(|c| *c != '-') {
                assert!(
                    !matches!(c, '0' | 'O' | 'I' | '1'),
                    "包含易混淆字符: {code}"
                );
            }
        }
    }

    #[test]
    fn test_generator_is_reinvokable_and_varies() {
        // 同一随机源连续生成，码应当各不相同（碰撞概率可忽略）
        let mut rng = StdRng::seed_from_u64(42);
        let codes: Vec<String> = (0..50)
            .map(|_| generate_code_with(DEFAULT_CODE_PREFIX, &mut rng))
            .collect();
        let mut deduped = codes.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(codes.len(), deduped.len());
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let a = generate_code_with(DEFAULT_CODE_PREFIX, &mut StdRng::seed_from_u64(7));
        let b = generate_code_with(DEFAULT_CODE_PREFIX, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" gbf-ab3x-9q7k "), "GBF-AB3X-9Q7K");
        assert_eq!(normalize_code("GBF-AB3X-9Q7K"), "GBF-AB3X-9Q7K");
        assert_eq!(normalize_code("\tgbf-ab3x-9q7k\n"), "GBF-AB3X-9Q7K");
    }

    #[test]
    fn test_is_well_formed_rejects_bad_codes() {
        assert!(is_well_formed("GBF-AB3X-9Q7K"));
        assert!(!is_well_formed("GBF-AB3X"));
        assert!(!is_well_formed("gbf-ab3x-9q7k"));
        assert!(!is_well_formed("GBF-AB0X-9Q7K")); // 含 0
        assert!(!is_well_formed("GBFX-AB3X-9Q7K"));
        assert!(!is_well_formed(""));
    }
}
