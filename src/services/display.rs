//! 展示格式
//!
//! 持久化记录只保存数字，带单位的字符串只在导出和终端输出时生成

/// 百分比，如 `12.34%`
pub fn format_pct(value: f64) -> String {
    format!("{:.2}%", value)
}

/// 成交额（亿元），如 `10340亿`
pub fn format_amount(value: f64) -> String {
    format!("{:.0}亿", value)
}

/// 可选百分比，缺失时为 `N/A`
pub fn format_optional_pct(value: Option<f64>) -> String {
    value.map(format_pct).unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(format_pct(12.346), "12.35%");
        assert_eq!(format_pct(-0.5), "-0.50%");
        assert_eq!(format_amount(10340.0), "10340亿");
        assert_eq!(format_optional_pct(None), "N/A");
        assert_eq!(format_optional_pct(Some(-4.1)), "-4.10%");
    }
}
