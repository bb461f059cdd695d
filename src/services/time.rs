//! 交易日期与北京时间辅助函数

use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Asia::Shanghai;
use chrono_tz::Tz;

/// 日期键格式（YYYYMMDD）
pub const DATE_KEY_FORMAT: &str = "%Y%m%d";

/// 获取北京时间（UTC+8）
pub fn beijing_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&Shanghai)
}

/// 北京时间的今天
pub fn beijing_today() -> NaiveDate {
    beijing_now().date_naive()
}

/// 分析时间字符串，如 "2024-06-03 15:30:00"
pub fn analysis_timestamp() -> String {
    beijing_now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// 解析 YYYYMMDD 格式的日期
pub fn parse_date_key(key: &str) -> Result<NaiveDate> {
    let key = key.trim();
    if key.len() != 8 || !key.chars().all(|c| c.is_ascii_digit()) {
        return Err(anyhow!("日期格式错误，应为 YYYYMMDD: {}", key));
    }
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT)
        .map_err(|e| anyhow!("无效日期 {}: {}", key, e))
}

/// 上一个工作日（周一的上一个工作日是上周五）
///
/// 不处理节假日
pub fn previous_weekday(date: NaiveDate) -> NaiveDate {
    let mut prev = date - Duration::days(1);
    while matches!(prev.weekday(), Weekday::Sat | Weekday::Sun) {
        prev -= Duration::days(1);
    }
    prev
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_key_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(date_key(date), "20240603");
        assert_eq!(parse_date_key("20240603").unwrap(), date);
    }

    #[test]
    fn test_parse_date_key_rejects_bad_input() {
        assert!(parse_date_key("2024-06-03").is_err());
        assert!(parse_date_key("20241340").is_err());
        assert!(parse_date_key("").is_err());
    }

    #[test]
    fn test_previous_weekday_skips_weekend() {
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let friday = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert_eq!(previous_weekday(monday), friday);

        let wednesday = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(previous_weekday(wednesday), NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
    }

    #[test]
    fn test_beijing_now_offset() {
        assert!(beijing_now().to_rfc3339().contains("+08:00"));
    }
}
