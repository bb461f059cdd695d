pub mod health;
pub mod market;

use std::time::Duration;

use actix_web::web;

use crate::config::AppConfig;
use crate::services::analyzer::MarketAnalyzer;
use crate::services::export::DailyExporter;
use crate::services::provider::MarketDataProvider;
use crate::services::store::DailyRecordStore;

/// 各接口共享的状态
pub struct AppState<P> {
    pub analyzer: MarketAnalyzer<P>,
    pub store: DailyRecordStore,
    pub exporter: DailyExporter,
    /// 历史摘要默认天数
    pub summary_days: usize,
}

impl<P: MarketDataProvider> AppState<P> {
    pub fn new(config: &AppConfig, provider: P) -> Self {
        Self {
            analyzer: MarketAnalyzer::new(provider, Duration::from_secs(config.analysis.cache_ttl_secs)),
            store: DailyRecordStore::new(&config.storage.data_dir),
            exporter: DailyExporter::new(&config.storage.export_path),
            summary_days: config.analysis.summary_days,
        }
    }
}

pub fn config<P: MarketDataProvider + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(market::config::<P>),
    );
}
