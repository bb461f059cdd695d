//! 测试用数据源

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use super::MarketDataProvider;
use crate::models::{IndexQuote, LimitPoolEntry, PreviousLimitUpEntry, SectorQuote, StockQuote};

/// 可配置的内存数据源，`None` 表示对应接口请求失败
#[derive(Default)]
pub struct MockProvider {
    pub snapshot: Mutex<Option<Vec<StockQuote>>>,
    pub indices: Option<Vec<IndexQuote>>,
    pub limit_up: Option<Vec<LimitPoolEntry>>,
    pub limit_down: Option<Vec<LimitPoolEntry>>,
    /// 按日期配置的炸板股池，未配置的日期请求失败
    pub exploded: HashMap<NaiveDate, Vec<LimitPoolEntry>>,
    pub previous_limit_up: Option<Vec<PreviousLimitUpEntry>>,
    pub sectors: Option<Vec<SectorQuote>>,
    pub snapshot_calls: AtomicUsize,
}

impl MockProvider {
    pub fn with_snapshot(quotes: Vec<StockQuote>) -> Self {
        Self {
            snapshot: Mutex::new(Some(quotes)),
            ..Default::default()
        }
    }

    pub fn set_snapshot(&self, quotes: Option<Vec<StockQuote>>) {
        *self.snapshot.lock().unwrap() = quotes;
    }

    pub fn snapshot_calls(&self) -> usize {
        self.snapshot_calls.load(Ordering::SeqCst)
    }
}

fn respond<T: Clone>(value: &Option<T>, what: &str) -> Result<T> {
    value.clone().ok_or_else(|| anyhow!("模拟 {} 请求失败", what))
}

impl MarketDataProvider for MockProvider {
    async fn fetch_snapshot(&self) -> Result<Vec<StockQuote>> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.snapshot.lock().unwrap().clone();
        respond(&snapshot, "全市场行情")
    }

    async fn fetch_indices(&self) -> Result<Vec<IndexQuote>> {
        respond(&self.indices, "指数行情")
    }

    async fn fetch_limit_up_pool(&self, _date: NaiveDate) -> Result<Vec<LimitPoolEntry>> {
        respond(&self.limit_up, "涨停股池")
    }

    async fn fetch_limit_down_pool(&self, _date: NaiveDate) -> Result<Vec<LimitPoolEntry>> {
        respond(&self.limit_down, "跌停股池")
    }

    async fn fetch_exploded_pool(&self, date: NaiveDate) -> Result<Vec<LimitPoolEntry>> {
        respond(&self.exploded.get(&date).cloned(), "炸板股池")
    }

    async fn fetch_previous_limit_up_pool(&self, _date: NaiveDate) -> Result<Vec<PreviousLimitUpEntry>> {
        respond(&self.previous_limit_up, "昨日涨停股池")
    }

    async fn fetch_top_sectors(&self, top_n: usize) -> Result<Vec<SectorQuote>> {
        let mut sectors = respond(&self.sectors, "行业板块")?;
        sectors.truncate(top_n);
        Ok(sectors)
    }
}

/// 构造测试行情
pub fn quote(code: &str, pct_change: f64) -> StockQuote {
    StockQuote {
        code: code.to_string(),
        name: format!("股票{}", code),
        price: 10.0,
        pct_change,
        high: 10.0,
        low: 10.0,
        ..Default::default()
    }
}

/// 构造测试股池条目
pub fn pool_entry(code: &str, consecutive_days: u32) -> LimitPoolEntry {
    LimitPoolEntry {
        code: code.to_string(),
        name: format!("股票{}", code),
        consecutive_days,
        ..Default::default()
    }
}
