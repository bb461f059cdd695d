//! 板块分类
//!
//! 按股票代码前缀判断所属板块

use crate::models::Segment;

/// 根据股票代码判断板块
///
/// 按以下顺序匹配，先匹配先生效：
/// 1. `68` 开头 → 科创板
/// 2. `3` 开头 → 创业板
/// 3. `4`/`8`/`9` 开头 → 北交所
/// 4. `0`/`6` 开头 → 主板
/// 5. 其他 → 主板
pub fn classify(code: &str) -> Segment {
    if code.starts_with("68") {
        return Segment::SciTechBoard;
    }
    match code.chars().next() {
        Some('3') => Segment::GrowthBoard,
        Some('4' | '8' | '9') => Segment::BeijingExchange,
        Some('0' | '6') => Segment::MainBoard,
        // 无法识别的代码一律归入主板
        _ => Segment::MainBoard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_prefixes() {
        let cases = vec![
            ("688001", Segment::SciTechBoard),
            ("689009", Segment::SciTechBoard),
            ("300750", Segment::GrowthBoard),
            ("301236", Segment::GrowthBoard),
            ("000001", Segment::MainBoard),
            ("600519", Segment::MainBoard),
            ("002594", Segment::MainBoard),
            ("430047", Segment::BeijingExchange),
            ("830799", Segment::BeijingExchange),
            ("920002", Segment::BeijingExchange),
        ];
        for (code, expected) in cases {
            assert_eq!(classify(code), expected, "code {}", code);
        }
    }

    #[test]
    fn test_classify_fallback_is_main_board() {
        assert_eq!(classify(""), Segment::MainBoard);
        assert_eq!(classify("AAPL"), Segment::MainBoard);
        assert_eq!(classify("  "), Segment::MainBoard);
        assert_eq!(classify("6"), Segment::MainBoard);
    }

    #[test]
    fn test_classify_is_deterministic() {
        for code in ["688001", "300750", "x", "430047"] {
            assert_eq!(classify(code), classify(code));
        }
    }
}
