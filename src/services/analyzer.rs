//! 每日市场分析
//!
//! 持有数据源与快照缓存，按固定顺序请求各接口并合并为一条每日记录

use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::Mutex;

use super::aggregator::{aggregate, fetch_limit_pools};
use super::export::{DailyExporter, ExportOutcome};
use super::extremes::{decline_rank, heavy_decline_count, scan_extremes, top_gainers, DECLINE_RANK};
use super::performance::track_previous_limit_up;
use super::provider::MarketDataProvider;
use super::snapshot_cache::{Snapshot, SnapshotCache};
use super::store::{DailyRecordStore, SaveOutcome};
use super::time::{analysis_timestamp, date_key, parse_date_key, previous_weekday};
use crate::models::{DailyStatsRecord, LimitPoolEntry, PreviousLimitUpPerformance, StoredDailyRecord};

/// 连板股列表的最低连板数
pub const STREAK_MIN_DAYS: u32 = 5;
/// 涨幅榜、行业板块保留数量
pub const LEADERS_TOP_N: usize = 5;

/// 确定要分析的交易日
///
/// 全市场快照只有实时行情，只能与当日股池合并，未指定时为今日
pub fn resolve_analysis_date(requested: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    let Some(key) = requested else {
        return Ok(today);
    };
    let date = parse_date_key(key)?;
    if date != today {
        return Err(anyhow!(
            "只能分析当日（{}）的数据，{} 不是今日",
            date_key(today),
            date_key(date)
        ));
    }
    Ok(date)
}

/// 一次完整运行（分析、保存、导出）的结果
#[derive(Debug, Serialize)]
pub struct DailyRunOutcome {
    pub record: StoredDailyRecord,
    /// 是否新写入了记录；保存失败时为 false
    pub saved: bool,
    /// 导出结果；未导出（保存失败）或导出失败时为 `None`
    pub exported: Option<ExportOutcome>,
}

/// 市场分析器
pub struct MarketAnalyzer<P> {
    provider: P,
    cache: Mutex<SnapshotCache>,
}

impl<P: MarketDataProvider> MarketAnalyzer<P> {
    pub fn new(provider: P, cache_ttl: Duration) -> Self {
        Self {
            provider,
            cache: Mutex::new(SnapshotCache::new(cache_ttl)),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// 获取全市场快照（经缓存）
    pub async fn snapshot(&self, force_refresh: bool) -> Snapshot {
        let mut cache = self.cache.lock().await;
        cache.get(&self.provider, force_refresh).await
    }

    /// 运行单日分析，任何接口失败都只影响对应字段
    pub async fn analyze(&self, date: NaiveDate) -> DailyStatsRecord {
        log::info!("开始A股市场分析 - {}", date_key(date));
        let snapshot = self.snapshot(false).await;

        let indices = match self.provider.fetch_indices().await {
            Ok(indices) => indices,
            Err(e) => {
                log::warn!("获取指数行情失败: {}", e);
                Vec::new()
            }
        };

        let pools = fetch_limit_pools(&self.provider, date).await;
        let market_stats = aggregate(&snapshot, &pools, &indices);
        if market_stats.is_none() {
            log::error!("全市场行情为空，跳过市场统计");
        }

        let streak_leaders: Vec<LimitPoolEntry> = pools
            .limit_up
            .iter()
            .filter(|e| e.consecutive_days >= STREAK_MIN_DAYS)
            .cloned()
            .collect();

        let previous_limit_up = self.previous_performance(&snapshot, date).await;

        let sector_leaders = match self.provider.fetch_top_sectors(LEADERS_TOP_N).await {
            Ok(sectors) => sectors,
            Err(e) => {
                log::warn!("获取行业板块失败: {}", e);
                Vec::new()
            }
        };

        DailyStatsRecord {
            market_stats,
            previous_limit_up,
            intraday_extremes: scan_extremes(&snapshot),
            sector_leaders,
            decline_rank: decline_rank(&snapshot, DECLINE_RANK),
            heavy_decline_count: heavy_decline_count(&snapshot),
            streak_leaders,
            top_gainers: top_gainers(&snapshot, LEADERS_TOP_N),
        }
    }

    async fn previous_performance(&self, snapshot: &Snapshot, date: NaiveDate) -> PreviousLimitUpPerformance {
        let previous_pool = match self.provider.fetch_previous_limit_up_pool(date).await {
            Ok(pool) => pool,
            Err(e) => {
                log::warn!("获取昨日涨停股池失败: {}", e);
                return PreviousLimitUpPerformance::no_data(format!("分析失败: {}", e));
            }
        };

        let previous_date = previous_weekday(date);
        let previous_exploded = match self.provider.fetch_exploded_pool(previous_date).await {
            Ok(pool) => pool,
            Err(e) => {
                log::warn!("获取 {} 炸板股池失败: {}", date_key(previous_date), e);
                Vec::new()
            }
        };

        track_previous_limit_up(snapshot, &previous_pool, &previous_exploded)
    }

    /// 分析并保存、导出
    ///
    /// 导出的总是已保存的那份记录：当日记录已存在时导出旧记录，保存失败时不导出。
    /// 保存或导出失败只记录日志，分析结果照常返回
    pub async fn run_daily(
        &self,
        date: NaiveDate,
        store: &DailyRecordStore,
        exporter: &DailyExporter,
    ) -> DailyRunOutcome {
        let results = self.analyze(date).await;
        let key = date_key(date);
        let record = StoredDailyRecord {
            date: key.clone(),
            analysis_time: analysis_timestamp(),
            results,
        };

        let (saved, persisted) = match store.save(&record) {
            Ok(SaveOutcome::Created(_)) => (true, Some(record.results.clone())),
            Ok(SaveOutcome::AlreadyExists(_)) => match store.load(date) {
                Ok(stored) => (false, stored.map(|r| r.results)),
                Err(e) => {
                    log::error!("读取已保存的 {} 记录失败: {}", key, e);
                    (false, None)
                }
            },
            Err(e) => {
                log::error!("保存数据失败: {}", e);
                (false, None)
            }
        };

        let exported = persisted.and_then(|results| match exporter.append(&key, &results) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                log::error!("导出数据失败: {}", e);
                None
            }
        });

        DailyRunOutcome {
            record,
            saved,
            exported,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IndexQuote, PreviousLimitUpEntry, SectorQuote, Segment};
    use crate::services::provider::mock::{pool_entry, quote, MockProvider};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn full_provider() -> MockProvider {
        let mut snapshot: Vec<_> = (0..70)
            .map(|i| quote(&format!("{:06}", 600100 + i), -(i as f64 + 1.0) / 10.0))
            .collect();
        snapshot.push(quote("600001", 10.0));
        snapshot.push(quote("300001", 20.0));
        snapshot.push(quote("688001", 3.0));

        let mut provider = MockProvider::with_snapshot(snapshot);
        provider.indices = Some(vec![IndexQuote {
            code: "000001".to_string(),
            name: "上证指数".to_string(),
            pct_change: 0.5,
            amount: 4.2e11,
            volume_ratio: 1.05,
        }]);
        provider.limit_up = Some(vec![pool_entry("600001", 6), pool_entry("300001", 2)]);
        provider.limit_down = Some(vec![pool_entry("600169", 1)]);
        provider.exploded.insert(date(), vec![pool_entry("688001", 0)]);
        // 2024-06-03 是周一，上一交易日为 5 月 31 日
        provider
            .exploded
            .insert(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(), vec![pool_entry("688001", 0)]);
        provider.previous_limit_up = Some(vec![PreviousLimitUpEntry {
            code: "600001".to_string(),
            name: String::new(),
            consecutive_days: 5,
        }]);
        provider.sectors = Some(vec![SectorQuote {
            name: "半导体".to_string(),
            pct_change: 3.2,
            ..Default::default()
        }]);
        provider
    }

    #[test]
    fn test_resolve_analysis_date_only_accepts_today() {
        let today = date();
        assert_eq!(resolve_analysis_date(None, today).unwrap(), today);
        assert_eq!(resolve_analysis_date(Some("20240603"), today).unwrap(), today);
        assert!(resolve_analysis_date(Some("20240531"), today).is_err());
        assert!(resolve_analysis_date(Some("20240604"), today).is_err());
        assert!(resolve_analysis_date(Some("2024-06-03"), today).is_err());
    }

    #[tokio::test]
    async fn test_analyze_full_day() {
        let analyzer = MarketAnalyzer::new(full_provider(), Duration::from_secs(300));
        let record = analyzer.analyze(date()).await;

        let stats = record.market_stats.as_ref().unwrap();
        assert_eq!(stats.limit_up_count, 2);
        assert_eq!(stats.limit_down_count, 1);
        assert_eq!(stats.exploded_count, 1);
        assert_eq!(stats.total_amount, 4200.0);
        assert_eq!(stats.consecutive_limit_up_count, 2);
        assert_eq!(stats.segments[&Segment::SciTechBoard].exploded_count, 1);

        assert_eq!(record.streak_leaders.len(), 1);
        assert_eq!(record.streak_leaders[0].code, "600001");

        let previous = record.previous_limit_up.stats().unwrap();
        assert_eq!(previous.count, 1);
        assert_eq!(previous.avg_performance, 10.0);
        assert_eq!(previous.exploded_avg_performance, 3.0);

        assert_eq!(record.decline_rank.as_ref().unwrap().pct_change, -1.1);
        assert_eq!(record.sector_leaders.len(), 1);
        assert_eq!(record.top_gainers[0].code, "300001");
        assert_eq!(analyzer.provider().snapshot_calls(), 1);
    }

    #[tokio::test]
    async fn test_analyze_without_snapshot() {
        let provider = full_provider();
        provider.set_snapshot(None);
        let analyzer = MarketAnalyzer::new(provider, Duration::from_secs(300));

        let record = analyzer.analyze(date()).await;
        assert!(record.market_stats.is_none());
        assert!(record.decline_rank.is_none());
        assert!(record.intraday_extremes.is_empty());
        assert!(record.previous_limit_up.stats().is_none());
        // 其他接口照常获取
        assert_eq!(record.streak_leaders.len(), 1);
        assert_eq!(record.sector_leaders.len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_degrades_each_source_independently() {
        let mut provider = full_provider();
        provider.indices = None;
        provider.limit_up = None;
        provider.previous_limit_up = None;
        provider.sectors = None;
        let analyzer = MarketAnalyzer::new(provider, Duration::from_secs(300));

        let record = analyzer.analyze(date()).await;
        let stats = record.market_stats.as_ref().unwrap();
        assert_eq!(stats.limit_up_count, 0);
        assert_eq!(stats.limit_down_count, 1);
        assert_eq!(stats.exploded_count, 1);
        assert_eq!(stats.exploded_rate, 100.0);
        assert_eq!(stats.total_amount, 0.0);
        assert!(matches!(record.previous_limit_up, PreviousLimitUpPerformance::NoData { .. }));
        assert!(record.sector_leaders.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_is_shared_within_ttl() {
        let analyzer = MarketAnalyzer::new(full_provider(), Duration::from_secs(300));
        analyzer.analyze(date()).await;
        analyzer.analyze(date()).await;
        assert_eq!(analyzer.provider().snapshot_calls(), 1);

        analyzer.snapshot(true).await;
        assert_eq!(analyzer.provider().snapshot_calls(), 2);
    }

    #[tokio::test]
    async fn test_run_daily_saves_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = DailyRecordStore::new(dir.path().join("data"));
        let exporter = DailyExporter::new(dir.path().join("data/daily.csv"));
        let analyzer = MarketAnalyzer::new(full_provider(), Duration::from_secs(300));

        let first = analyzer.run_daily(date(), &store, &exporter).await;
        assert!(first.saved);
        assert_eq!(first.exported, Some(ExportOutcome::Appended));
        assert_eq!(first.record.date, "20240603");

        let second = analyzer.run_daily(date(), &store, &exporter).await;
        assert!(!second.saved);
        assert_eq!(second.exported, Some(ExportOutcome::Duplicate));
        assert!(store.load(date()).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_run_daily_exports_the_stored_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = DailyRecordStore::new(dir.path().join("data"));
        let exporter = DailyExporter::new(dir.path().join("data/daily.csv"));
        store
            .save(&StoredDailyRecord {
                date: "20240603".to_string(),
                analysis_time: "2024-06-03 15:00:00".to_string(),
                results: DailyStatsRecord {
                    market_stats: Some(crate::models::MarketStats {
                        limit_ratio: "99(0)+0:0+0".to_string(),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            })
            .unwrap();

        let analyzer = MarketAnalyzer::new(full_provider(), Duration::from_secs(300));
        let outcome = analyzer.run_daily(date(), &store, &exporter).await;
        assert!(!outcome.saved);
        assert_eq!(outcome.exported, Some(ExportOutcome::Appended));

        // CSV 与已保存的 JSON 一致，而不是本次的分析结果
        let csv = std::fs::read_to_string(exporter.path()).unwrap();
        assert!(csv.lines().nth(1).unwrap().contains("99(0)+0:0+0"));
    }

    #[tokio::test]
    async fn test_run_daily_skips_export_when_save_fails() {
        let dir = tempfile::tempdir().unwrap();
        // 数据目录被同名文件占用，无法保存
        let blocked = dir.path().join("data");
        std::fs::write(&blocked, "").unwrap();
        let store = DailyRecordStore::new(&blocked);
        let exporter = DailyExporter::new(dir.path().join("daily.csv"));

        let analyzer = MarketAnalyzer::new(full_provider(), Duration::from_secs(300));
        let outcome = analyzer.run_daily(date(), &store, &exporter).await;
        assert!(!outcome.saved);
        assert_eq!(outcome.exported, None);
        assert!(!exporter.path().exists());
    }
}
