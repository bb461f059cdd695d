//! 昨日涨停股、炸板股今日表现

use std::collections::HashMap;

use super::aggregator::{percentage, round2};
use crate::models::{
    LimitPoolEntry, PreviousLimitUpEntry, PreviousLimitUpPerformance, PreviousLimitUpStats, StockQuote,
};

/// 按代码在今日快照中查找涨跌幅，找不到的股票直接忽略
fn joined_changes<'a, I>(snapshot: &HashMap<&str, &StockQuote>, codes: I) -> Vec<f64>
where
    I: Iterator<Item = &'a str>,
{
    codes
        .filter_map(|code| snapshot.get(code).map(|q| q.pct_change))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 统计昨日涨停股今日表现
///
/// - `previous_pool`: 昨日涨停股池
/// - `previous_exploded`: 昨日炸板股池，获取失败时传空
///
/// 昨日涨停股在今日快照中一只都找不到时返回 `NoData`
pub fn track_previous_limit_up(
    snapshot: &[StockQuote],
    previous_pool: &[PreviousLimitUpEntry],
    previous_exploded: &[LimitPoolEntry],
) -> PreviousLimitUpPerformance {
    if previous_pool.is_empty() {
        return PreviousLimitUpPerformance::no_data("无数据");
    }

    let by_code: HashMap<&str, &StockQuote> = snapshot.iter().map(|q| (q.code.as_str(), q)).collect();

    let changes = joined_changes(&by_code, previous_pool.iter().map(|e| e.code.as_str()));
    if changes.is_empty() {
        return PreviousLimitUpPerformance::no_data("无有效数据");
    }

    let up = changes.iter().filter(|c| **c > 0.0).count();
    let exploded_changes = joined_changes(&by_code, previous_exploded.iter().map(|e| e.code.as_str()));

    PreviousLimitUpPerformance::Available(PreviousLimitUpStats {
        count: changes.len(),
        avg_performance: round2(mean(&changes)),
        up_ratio: percentage(up, changes.len()),
        exploded_avg_performance: round2(mean(&exploded_changes)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::provider::mock::{pool_entry, quote};

    fn previous(code: &str) -> PreviousLimitUpEntry {
        PreviousLimitUpEntry {
            code: code.to_string(),
            name: String::new(),
            consecutive_days: 1,
        }
    }

    #[test]
    fn test_performance_joins_by_code() {
        let snapshot = vec![
            quote("600001", 5.0),
            quote("600002", -3.0),
            quote("300001", 10.0),
            quote("000001", 2.0),
        ];
        let pool = vec![previous("600001"), previous("600002"), previous("300001"), previous("999999")];
        let exploded = vec![pool_entry("000001", 0), pool_entry("888888", 0)];

        let perf = track_previous_limit_up(&snapshot, &pool, &exploded);
        let stats = perf.stats().unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.avg_performance, 4.0);
        assert_eq!(stats.up_ratio, 66.67);
        assert_eq!(stats.exploded_avg_performance, 2.0);
    }

    #[test]
    fn test_empty_previous_pool_is_no_data() {
        let perf = track_previous_limit_up(&[quote("600001", 1.0)], &[], &[]);
        assert!(matches!(perf, PreviousLimitUpPerformance::NoData { .. }));
        assert!(perf.stats().is_none());
    }

    #[test]
    fn test_no_joined_entries_is_no_data() {
        let perf = track_previous_limit_up(&[quote("600001", 1.0)], &[previous("600002")], &[]);
        assert_eq!(perf, PreviousLimitUpPerformance::no_data("无有效数据"));
    }

    #[test]
    fn test_missing_exploded_cohort_averages_zero() {
        let perf = track_previous_limit_up(&[quote("600001", -1.5)], &[previous("600001")], &[]);
        let stats = perf.stats().unwrap();
        assert_eq!(stats.exploded_avg_performance, 0.0);
        assert_eq!(stats.up_ratio, 0.0);
        assert_eq!(stats.avg_performance, -1.5);
    }
}
