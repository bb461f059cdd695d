//! 历史摘要
//!
//! 从已保存的每日记录回放最近 N 个有效交易日，缺失或无效的日期直接跳过

use std::sync::OnceLock;

use chrono::{Duration, NaiveDate};
use regex::Regex;
use serde_json::Value;

use super::time::date_key;
use crate::models::{DailyStatsRecord, HistoricalSummaryEntry};

/// 最多向前回溯的自然日数
pub const LOOKBACK_DAYS: i64 = 30;

/// 记录中各字段的键名
///
/// 早期记录使用中文键名（`市场统计`、`涨停数量` 等），没有成交额、量比和涨跌停比
struct RecordKeys {
    market: &'static str,
    previous: &'static str,
    /// 判断市场统计是否有效的字段
    market_validity: [&'static str; 3],
    limit_up_count: &'static str,
    limit_down_count: &'static str,
    money_effect: &'static str,
    exploded_rate: &'static str,
    index_change: &'static str,
    total_amount: Option<&'static str>,
    index_volume_ratio: Option<&'static str>,
    limit_ratio: Option<&'static str>,
    previous_count: &'static str,
    previous_avg: &'static str,
    previous_up_ratio: &'static str,
    exploded_avg: &'static str,
}

static CURRENT_KEYS: RecordKeys = RecordKeys {
    market: "market_stats",
    previous: "previous_limit_up",
    market_validity: ["limit_up_count", "limit_down_count", "money_effect"],
    limit_up_count: "limit_up_count",
    limit_down_count: "limit_down_count",
    money_effect: "money_effect",
    exploded_rate: "exploded_rate",
    index_change: "index_change",
    total_amount: Some("total_amount"),
    index_volume_ratio: Some("index_volume_ratio"),
    limit_ratio: Some("limit_ratio"),
    previous_count: "count",
    previous_avg: "avg_performance",
    previous_up_ratio: "up_ratio",
    exploded_avg: "exploded_avg_performance",
};

static LEGACY_KEYS: RecordKeys = RecordKeys {
    market: "市场统计",
    previous: "昨日涨停股表现",
    market_validity: ["涨停数量", "跌停数量", "赚钱效应"],
    limit_up_count: "涨停数量",
    limit_down_count: "跌停数量",
    money_effect: "赚钱效应",
    exploded_rate: "炸板率",
    index_change: "上证指数涨幅",
    total_amount: None,
    index_volume_ratio: None,
    limit_ratio: None,
    previous_count: "昨日涨停股数量",
    previous_avg: "今日平均表现",
    previous_up_ratio: "今日上涨比例",
    exploded_avg: "昨日炸板股今日平均",
};

impl RecordKeys {
    /// 按 `results` 中出现的顶层键选择键名
    fn detect(results: &Value) -> &'static RecordKeys {
        let has = |key: &str| results.get(key).is_some();
        if !has(CURRENT_KEYS.market)
            && !has(CURRENT_KEYS.previous)
            && (has(LEGACY_KEYS.market) || has(LEGACY_KEYS.previous))
        {
            &LEGACY_KEYS
        } else {
            &CURRENT_KEYS
        }
    }
}

/// 按日期读取已保存记录的数据来源
pub trait RecordSource {
    /// 读取某日记录的原始 JSON，不存在或无法解析时为 `None`
    fn load_value(&self, date: NaiveDate) -> Option<Value>;
}

fn display_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([+-]?(?:\d+(?:\.\d*)?|\.\d+))\s*(?:%|亿|万|元)?$").expect("valid regex")
    })
}

/// 将字段转为数字
///
/// 支持 JSON 数字以及 `"12.34%"`、`"1,234亿"` 这类展示字符串，无法识别时为 0
pub fn coerce_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let cleaned = s.trim().replace(',', "");
            display_number_re()
                .captures(&cleaned)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

/// 将字段转为非负整数，规则同 [`coerce_f64`]
pub fn coerce_u64(value: Option<&Value>) -> u64 {
    let v = coerce_f64(value);
    if v > 0.0 {
        v.round() as u64
    } else {
        0
    }
}

/// 将一天的 `results` 转为摘要，市场统计和昨日表现都无效时为 `None`
pub fn summarize_results(date: &str, results: &Value) -> Option<HistoricalSummaryEntry> {
    let keys = RecordKeys::detect(results);
    let market = results.get(keys.market).unwrap_or(&Value::Null);
    let previous = results.get(keys.previous).unwrap_or(&Value::Null);

    let has_market = market
        .as_object()
        .map(|m| keys.market_validity.iter().any(|k| m.contains_key(*k)))
        .unwrap_or(false);
    let has_previous = previous
        .as_object()
        .map(|m| m.contains_key(keys.previous_count))
        .unwrap_or(false);
    if !has_market && !has_previous {
        return None;
    }

    let optional = |key: Option<&str>| coerce_f64(key.and_then(|k| market.get(k)));
    let limit_ratio = match keys.limit_ratio.and_then(|k| market.get(k)) {
        Some(Value::String(s)) => s.clone(),
        _ => "N/A".to_string(),
    };

    Some(HistoricalSummaryEntry {
        date: date.to_string(),
        limit_up_count: coerce_u64(market.get(keys.limit_up_count)),
        limit_down_count: coerce_u64(market.get(keys.limit_down_count)),
        limit_ratio,
        total_amount: optional(keys.total_amount),
        index_change: coerce_f64(market.get(keys.index_change)),
        index_volume_ratio: optional(keys.index_volume_ratio),
        money_effect: coerce_f64(market.get(keys.money_effect)),
        exploded_rate: coerce_f64(market.get(keys.exploded_rate)),
        previous_limit_up_count: coerce_u64(previous.get(keys.previous_count)),
        previous_avg_performance: coerce_f64(previous.get(keys.previous_avg)),
        previous_up_ratio: coerce_f64(previous.get(keys.previous_up_ratio)),
        exploded_avg_performance: coerce_f64(previous.get(keys.exploded_avg)),
        has_valid_data: has_market && has_previous,
    })
}

/// 构建最近 `max_days` 个有效日期的摘要，最新的在前
///
/// `today_override` 为今日尚未保存的分析结果，提供时不读取今日的存储
pub fn build_summary<S: RecordSource>(
    source: &S,
    today: NaiveDate,
    max_days: usize,
    today_override: Option<&DailyStatsRecord>,
) -> Vec<HistoricalSummaryEntry> {
    let mut summary = Vec::with_capacity(max_days);

    for offset in 0..LOOKBACK_DAYS {
        if summary.len() >= max_days {
            break;
        }
        let date = today - Duration::days(offset);
        let key = date_key(date);

        let results = match (offset, today_override) {
            (0, Some(record)) => match serde_json::to_value(record) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::warn!("序列化今日分析结果失败: {}", e);
                    None
                }
            },
            _ => source
                .load_value(date)
                .and_then(|doc| doc.get("results").cloned()),
        };

        match results.as_ref().and_then(|r| summarize_results(&key, r)) {
            Some(entry) => summary.push(entry),
            None => log::debug!("{} 无有效数据，跳过", key),
        }
    }

    summary
}
