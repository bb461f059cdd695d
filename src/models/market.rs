//! 行情数据模型
//!
//! 定义全市场快照、指数、涨跌停股池、行业板块等输入数据结构

use serde::{Deserialize, Serialize};

/// 上市板块
///
/// 各板块有不同的涨跌幅限制：主板 10%，科创板/创业板 20%，北交所 30%
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// 沪深主板
    #[default]
    MainBoard,
    /// 科创板
    SciTechBoard,
    /// 创业板
    GrowthBoard,
    /// 北交所
    BeijingExchange,
}

impl Segment {
    /// 全部板块，按固定顺序
    pub const ALL: [Segment; 4] = [
        Segment::MainBoard,
        Segment::SciTechBoard,
        Segment::GrowthBoard,
        Segment::BeijingExchange,
    ];

    /// 法定日涨跌幅限制（百分比）
    pub fn limit_pct(self) -> f64 {
        match self {
            Segment::MainBoard => 10.0,
            Segment::SciTechBoard | Segment::GrowthBoard => 20.0,
            Segment::BeijingExchange => 30.0,
        }
    }

    /// 中文名称
    pub fn display_name(self) -> &'static str {
        match self {
            Segment::MainBoard => "主板",
            Segment::SciTechBoard => "科创板",
            Segment::GrowthBoard => "创业板",
            Segment::BeijingExchange => "北交所",
        }
    }
}

/// 个股实时行情（全市场快照中的一行）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockQuote {
    /// 股票代码
    pub code: String,
    /// 股票名称
    pub name: String,
    /// 最新价
    pub price: f64,
    /// 涨跌幅（百分比）
    pub pct_change: f64,
    /// 涨跌额
    pub change: f64,
    /// 最高价
    pub high: f64,
    /// 最低价
    pub low: f64,
    /// 成交量（手）
    pub volume: f64,
    /// 成交额（元）
    pub amount: f64,
    /// 换手率
    pub turnover_rate: f64,
    /// 振幅
    pub amplitude: f64,
    /// 所属板块，由快照缓存统一标注
    #[serde(default)]
    pub segment: Segment,
    /// 停牌（行情中没有涨跌幅），数值字段均为 0
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub suspended: bool,
}

/// 指数行情
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexQuote {
    /// 指数代码
    pub code: String,
    /// 指数名称
    pub name: String,
    /// 涨跌幅
    pub pct_change: f64,
    /// 成交额（元）
    pub amount: f64,
    /// 量比
    pub volume_ratio: f64,
}

/// 涨停/跌停/炸板股池条目
///
/// 不同股池提供的字段不完全相同，缺失字段为默认值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitPoolEntry {
    pub code: String,
    pub name: String,
    /// 连板数（跌停池为连续跌停天数）
    pub consecutive_days: u32,
    pub price: f64,
    pub pct_change: f64,
    /// 封板资金
    pub locked_capital: f64,
    /// 首次封板时间（HH:MM:SS）
    pub first_lock_time: String,
    /// 炸板次数
    pub exploded_times: u32,
    #[serde(default)]
    pub segment: Segment,
}

/// 昨日涨停股池条目
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviousLimitUpEntry {
    pub code: String,
    pub name: String,
    /// 昨日连板数
    pub consecutive_days: u32,
}

/// 行业板块行情
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectorQuote {
    /// 板块名称
    pub name: String,
    /// 板块代码
    pub code: String,
    pub pct_change: f64,
    /// 总市值
    pub total_market_value: f64,
    pub turnover_rate: f64,
}
