//! 市场统计结果模型
//!
//! 每日分析产出的记录，以及持久化时的外层结构

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::market::{LimitPoolEntry, SectorQuote, Segment, StockQuote};

/// 单个板块的统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    /// 股票数量
    pub stock_count: usize,
    pub up_count: usize,
    pub down_count: usize,
    pub flat_count: usize,
    /// 赚钱效应（上涨股票占比，%）
    pub money_effect: f64,
    pub limit_up_count: usize,
    pub limit_down_count: usize,
    pub exploded_count: usize,
    /// 炸板率（%）
    pub exploded_rate: f64,
    /// 涨幅超过 10% 但未涨停（仅科创板/创业板）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over10_up_count: Option<usize>,
    /// 跌幅超过 10% 但未跌停（仅科创板/创业板）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over10_down_count: Option<usize>,
}

/// 市场整体统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    /// 两市成交额（亿元）
    pub total_amount: f64,
    /// 上证指数涨跌幅
    pub index_change: f64,
    /// 上证指数量比
    pub index_volume_ratio: f64,
    /// 涨跌停比，如 "52(12)+8:6+2"
    pub limit_ratio: String,
    pub limit_up_count: usize,
    pub limit_down_count: usize,
    pub exploded_count: usize,
    /// 连板（>=2）数量
    pub consecutive_limit_up_count: usize,
    pub up_count: usize,
    pub down_count: usize,
    pub flat_count: usize,
    pub money_effect: f64,
    pub exploded_rate: f64,
    /// 分板块统计
    pub segments: BTreeMap<Segment, SegmentStats>,
}

/// 昨日涨停股今日表现中的数值部分
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviousLimitUpStats {
    /// 今日仍在行情中的昨日涨停股数量
    pub count: usize,
    /// 今日平均涨跌幅
    pub avg_performance: f64,
    /// 今日上涨比例（%）
    pub up_ratio: f64,
    /// 昨日炸板股今日平均涨跌幅
    pub exploded_avg_performance: f64,
}

/// 昨日涨停股今日表现
///
/// 昨日涨停股池为空（或无法获取）时为 `NoData`，调用方需分支处理
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreviousLimitUpPerformance {
    Available(PreviousLimitUpStats),
    NoData { status: String },
}

impl PreviousLimitUpPerformance {
    pub fn no_data(status: impl Into<String>) -> Self {
        Self::NoData {
            status: status.into(),
        }
    }

    pub fn stats(&self) -> Option<&PreviousLimitUpStats> {
        match self {
            Self::Available(stats) => Some(stats),
            Self::NoData { .. } => None,
        }
    }
}

impl Default for PreviousLimitUpPerformance {
    fn default() -> Self {
        Self::no_data("无数据")
    }
}

/// 盘中极值股票
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeEntry {
    pub code: String,
    pub name: String,
    /// 收盘价
    pub price: f64,
    /// 参考价（最低价或最高价）
    pub reference_price: f64,
    /// 收盘相对参考价的涨跌幅（%）
    pub pct_from_reference: f64,
}

/// 单个板块的盘中极值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentExtremes {
    /// 收盘较最低价涨幅最大
    pub top_gainers_from_low: Vec<ExtremeEntry>,
    /// 收盘较最高价跌幅最大
    pub top_losers_from_high: Vec<ExtremeEntry>,
}

/// 跌幅排名第 N 的股票
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclineRankEntry {
    pub rank: usize,
    pub code: String,
    pub name: String,
    pub pct_change: f64,
}

/// 单日分析结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyStatsRecord {
    /// 市场统计；快照获取失败时缺省
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_stats: Option<MarketStats>,
    #[serde(default)]
    pub previous_limit_up: PreviousLimitUpPerformance,
    #[serde(default)]
    pub intraday_extremes: BTreeMap<Segment, SegmentExtremes>,
    #[serde(default)]
    pub sector_leaders: Vec<SectorQuote>,
    #[serde(default)]
    pub decline_rank: Option<DeclineRankEntry>,
    /// 单日跌幅 >= 15% 的股票数量
    #[serde(default)]
    pub heavy_decline_count: usize,
    /// 5 连板以上股票
    #[serde(default)]
    pub streak_leaders: Vec<LimitPoolEntry>,
    /// 当日涨幅前 5
    #[serde(default)]
    pub top_gainers: Vec<StockQuote>,
}

/// 持久化的每日记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDailyRecord {
    /// 交易日（YYYYMMDD）
    pub date: String,
    /// 分析时间（YYYY-MM-DD HH:MM:SS）
    pub analysis_time: String,
    pub results: DailyStatsRecord,
}
