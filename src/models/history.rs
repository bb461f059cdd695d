//! 历史摘要模型

use serde::{Deserialize, Serialize};

/// 历史摘要中的一天
///
/// 由持久化记录回放得到，所有数值字段均已转换为数字
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSummaryEntry {
    /// 日期（YYYYMMDD）
    pub date: String,
    pub limit_up_count: u64,
    pub limit_down_count: u64,
    /// 涨跌停比
    pub limit_ratio: String,
    /// 两市成交额（亿元）
    pub total_amount: f64,
    pub index_change: f64,
    pub index_volume_ratio: f64,
    pub money_effect: f64,
    pub exploded_rate: f64,
    /// 昨日涨停股数量
    pub previous_limit_up_count: u64,
    /// 昨日涨停股今日平均表现
    pub previous_avg_performance: f64,
    /// 昨日涨停股今日上涨比例
    pub previous_up_ratio: f64,
    /// 昨日炸板股今日平均表现
    pub exploded_avg_performance: f64,
    /// 市场统计与昨日表现是否都有效
    pub has_valid_data: bool,
}

/// 历史摘要查询参数
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// 天数，默认取配置值
    pub days: Option<usize>,
}
