//! 行情数据源
//!
//! 定义分析引擎依赖的外部数据接口，默认实现对接东方财富

pub mod eastmoney;
#[cfg(test)]
pub mod mock;

use anyhow::Result;
use chrono::NaiveDate;

use crate::models::{IndexQuote, LimitPoolEntry, PreviousLimitUpEntry, SectorQuote, StockQuote};

pub use eastmoney::EastMoneyProvider;

/// 外部行情数据源
///
/// 每个方法对应一次外部请求，失败时返回错误，由调用方决定降级方式
#[allow(async_fn_in_trait)]
pub trait MarketDataProvider {
    /// 沪深京 A 股全市场实时行情
    async fn fetch_snapshot(&self) -> Result<Vec<StockQuote>>;

    /// 上证指数、深证成指行情
    async fn fetch_indices(&self) -> Result<Vec<IndexQuote>>;

    /// 涨停股池
    async fn fetch_limit_up_pool(&self, date: NaiveDate) -> Result<Vec<LimitPoolEntry>>;

    /// 跌停股池
    async fn fetch_limit_down_pool(&self, date: NaiveDate) -> Result<Vec<LimitPoolEntry>>;

    /// 炸板股池
    async fn fetch_exploded_pool(&self, date: NaiveDate) -> Result<Vec<LimitPoolEntry>>;

    /// 昨日涨停股池（`date` 为今日）
    async fn fetch_previous_limit_up_pool(&self, date: NaiveDate) -> Result<Vec<PreviousLimitUpEntry>>;

    /// 涨幅最大的行业板块
    async fn fetch_top_sectors(&self, top_n: usize) -> Result<Vec<SectorQuote>>;
}
