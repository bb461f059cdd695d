//! A股市场广度分析服务
//!
//! - serve：启动 HTTP 服务
//! - run：运行一次当日分析，保存并导出后输出结果
//! - view：查看已保存的数据（单日详情或近 N 日概况）

use std::path::PathBuf;
use std::time::Duration;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;

use ashare_breadth::config::AppConfig;
use ashare_breadth::handlers::{self, AppState};
use ashare_breadth::middleware::ApiKeyMiddleware;
use ashare_breadth::services::analyzer::{resolve_analysis_date, MarketAnalyzer};
use ashare_breadth::services::export::DailyExporter;
use ashare_breadth::services::history::build_summary;
use ashare_breadth::services::provider::EastMoneyProvider;
use ashare_breadth::services::report::{render_detail, render_summary};
use ashare_breadth::services::store::DailyRecordStore;
use ashare_breadth::services::time::{beijing_today, parse_date_key};

#[derive(Parser)]
#[command(name = "ashare-breadth", version, about = "A股市场广度分析")]
struct Cli {
    /// 配置文件路径（默认依次尝试 config.json、config/config.json）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 启动 HTTP 服务
    Serve,
    /// 运行当日分析并保存
    Run {
        /// 交易日（YYYYMMDD），只能是北京时间今日，默认今日
        #[arg(long)]
        date: Option<String>,
    },
    /// 查看历史数据
    View {
        /// 查看指定日期的数据（YYYYMMDD）
        #[arg(long, conflicts_with = "summary")]
        date: Option<String>,
        /// 查看最近 N 天的数据摘要
        #[arg(long)]
        summary: Option<usize>,
    },
}

/// 应用程序入口
#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = AppConfig::load(cli.config.as_deref());
    env_logger::init_from_env(Env::default().default_filter_or(loaded.config.log.level.as_str()));
    loaded.log();
    let config = loaded.config;

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Run { date } => run_once(config, date.as_deref()).await,
        Commands::View { date, summary } => view(&config, date.as_deref(), summary),
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    let provider = EastMoneyProvider::new(&config.api)?;
    let state = web::Data::new(AppState::new(&config, provider));
    state.store.ensure_dir()?;

    let bind_addr = config.bind_addr();
    let api_key = config.api.api_key.clone();
    let workers = config.server.workers;
    log::info!("启动A股市场广度分析服务，监听 {}", bind_addr);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default()) // 请求日志
            .wrap(ApiKeyMiddleware::new(api_key.clone())) // API Key 认证
            .configure(handlers::config::<EastMoneyProvider>)
    });
    if workers > 0 {
        server = server.workers(workers);
    }
    server.bind(&bind_addr)?.run().await?;
    Ok(())
}

async fn run_once(config: AppConfig, date: Option<&str>) -> Result<()> {
    let date = resolve_analysis_date(date, beijing_today())?;

    let provider = EastMoneyProvider::new(&config.api)?;
    let analyzer = MarketAnalyzer::new(provider, Duration::from_secs(config.analysis.cache_ttl_secs));
    let store = DailyRecordStore::new(&config.storage.data_dir);
    let exporter = DailyExporter::new(&config.storage.export_path);

    let outcome = analyzer.run_daily(date, &store, &exporter).await;

    print!("{}", render_detail(&outcome.record));
    let history = build_summary(&store, date, config.analysis.summary_days, Some(&outcome.record.results));
    print!("{}", render_summary(&history));
    Ok(())
}

fn view(config: &AppConfig, date: Option<&str>, summary: Option<usize>) -> Result<()> {
    let store = DailyRecordStore::new(&config.storage.data_dir);

    if let Some(key) = date {
        let date = parse_date_key(key)?;
        let record = store
            .load(date)?
            .ok_or_else(|| anyhow!("未找到 {} 的数据", key))?;
        print!("{}", render_detail(&record));
        return Ok(());
    }

    let days = summary.unwrap_or(config.analysis.summary_days);
    let history = build_summary(&store, beijing_today(), days, None);
    print!("{}", render_summary(&history));
    Ok(())
}
