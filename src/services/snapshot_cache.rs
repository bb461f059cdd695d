//! 全市场快照缓存
//!
//! 在有效期内复用上一次成功获取的行情；请求失败时退回旧数据

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::board::classify;
use super::provider::MarketDataProvider;
use crate::models::StockQuote;

/// 默认有效期（秒）
pub const DEFAULT_TTL_SECS: u64 = 300;

/// 全市场快照，已标注板块
pub type Snapshot = Arc<Vec<StockQuote>>;

/// 快照缓存
///
/// 缓存状态由持有者独占，跨任务共享时需放在互斥锁内，
/// 保证“检查有效期 - 请求 - 写回”整体原子
pub struct SnapshotCache {
    ttl: Duration,
    entry: Option<CacheEntry>,
}

struct CacheEntry {
    snapshot: Snapshot,
    fetched_at: Instant,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// 获取全市场快照
    ///
    /// 不会返回错误：请求失败时返回上一次成功的快照（不论新旧），
    /// 从未成功过则返回空表
    pub async fn get<P: MarketDataProvider>(&mut self, provider: &P, force_refresh: bool) -> Snapshot {
        if !force_refresh {
            if let Some(entry) = &self.entry {
                if entry.fetched_at.elapsed() < self.ttl {
                    log::debug!("使用缓存的全市场行情（{} 条）", entry.snapshot.len());
                    return entry.snapshot.clone();
                }
            }
        }

        match provider.fetch_snapshot().await {
            Ok(mut quotes) => {
                for quote in quotes.iter_mut() {
                    quote.segment = classify(&quote.code);
                }
                let snapshot = Arc::new(quotes);
                self.entry = Some(CacheEntry {
                    snapshot: snapshot.clone(),
                    fetched_at: Instant::now(),
                });
                snapshot
            }
            Err(e) => match &self.entry {
                Some(entry) => {
                    log::warn!("获取全市场行情失败，使用缓存数据（{} 条）: {}", entry.snapshot.len(), e);
                    entry.snapshot.clone()
                }
                None => {
                    log::error!("获取全市场行情失败，且无缓存数据: {}", e);
                    Arc::new(Vec::new())
                }
            },
        }
    }

    /// 是否有缓存
    pub fn is_warm(&self) -> bool {
        self.entry.is_some()
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TTL_SECS))
    }
}
