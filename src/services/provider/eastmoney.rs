//! 东方财富行情接口实现
//!
//! 对应 akshare 的 stock_zh_a_spot_em、stock_zt_pool_em 等函数
//! 对接 https://push2.eastmoney.com 和 https://push2ex.eastmoney.com

use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;

use super::MarketDataProvider;
use crate::config::ApiConfig;
use crate::models::{IndexQuote, LimitPoolEntry, PreviousLimitUpEntry, SectorQuote, StockQuote};
use crate::services::time::date_key;

// ==================== 东方财富 API 常量 ====================

/// 行情列表 API（个股、行业板块）
pub const EM_CLIST_API: &str = "https://82.push2.eastmoney.com/api/qt/clist/get";
/// 多证券行情 API（指数）
pub const EM_ULIST_API: &str = "https://push2.eastmoney.com/api/qt/ulist.np/get";
/// 涨停股池
pub const EM_ZT_POOL_API: &str = "https://push2ex.eastmoney.com/getTopicZTPool";
/// 跌停股池
pub const EM_DT_POOL_API: &str = "https://push2ex.eastmoney.com/getTopicDTPool";
/// 炸板股池
pub const EM_ZB_POOL_API: &str = "https://push2ex.eastmoney.com/getTopicZBPool";
/// 昨日涨停股池
pub const EM_PREVIOUS_ZT_POOL_API: &str = "https://push2ex.eastmoney.com/getYesterdayZTPool";

const CLIST_UT: &str = "bd1d9ddb04089700cf9c27f6f7426281";
const POOL_UT: &str = "7eea3edcaed734bea9cbfc24409ed989";
/// 沪深京 A 股
const A_SHARE_FS: &str = "m:0 t:6,m:0 t:80,m:1 t:2,m:1 t:23,m:0 t:81 s:2048";
/// 行业板块
const INDUSTRY_FS: &str = "m:90 t:2 f:!50";
/// 上证指数、深证成指
const INDEX_SECIDS: &str = "1.000001,0.399001";
const SNAPSHOT_FIELDS: &str = "f2,f3,f4,f5,f6,f7,f8,f12,f14,f15,f16";
const SNAPSHOT_PAGE_SIZE: usize = 100;
const SNAPSHOT_MAX_PAGES: usize = 200;

/// 东方财富数据源
pub struct EastMoneyProvider {
    client: Client,
}

impl EastMoneyProvider {
    /// 按配置的超时时间创建 HTTP 客户端
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .gzip(true)
            .build()?;
        Ok(Self { client })
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        log::debug!("📡 请求东方财富接口 URL: {}", url);
        let response = self
            .client
            .get(url)
            .query(query)
            .header("Referer", "https://quote.eastmoney.com/")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("请求 {} 失败: {}", url, response.status()));
        }

        Ok(response.json().await?)
    }

    async fn fetch_pool(
        &self,
        url: &str,
        sort: &str,
        date: NaiveDate,
        kind: PoolKind,
    ) -> Result<Vec<LimitPoolEntry>> {
        let query = [
            ("ut", POOL_UT.to_string()),
            ("dpt", "wz.ztzt".to_string()),
            ("Pageindex", "0".to_string()),
            ("pagesize", "10000".to_string()),
            ("sort", sort.to_string()),
            ("date", date_key(date)),
        ];
        let json = self.get_json(url, &query).await?;
        Ok(parse_limit_pool(&json, kind))
    }
}

impl MarketDataProvider for EastMoneyProvider {
    async fn fetch_snapshot(&self) -> Result<Vec<StockQuote>> {
        let mut quotes = Vec::new();

        for page in 1..=SNAPSHOT_MAX_PAGES {
            let query = [
                ("pn", page.to_string()),
                ("pz", SNAPSHOT_PAGE_SIZE.to_string()),
                ("po", "1".to_string()),
                ("np", "1".to_string()),
                ("ut", CLIST_UT.to_string()),
                ("fltt", "2".to_string()),
                ("invt", "2".to_string()),
                ("fid", "f3".to_string()),
                ("fs", A_SHARE_FS.to_string()),
                ("fields", SNAPSHOT_FIELDS.to_string()),
            ];
            let json = self.get_json(EM_CLIST_API, &query).await?;
            let (total, rows) = parse_snapshot_page(&json)?;
            let fetched = rows.len();
            quotes.extend(rows);

            if fetched == 0 || quotes.len() >= total {
                break;
            }
        }

        if quotes.is_empty() {
            return Err(anyhow!("全市场行情为空"));
        }
        log::info!("📊 获取全市场行情 {} 条", quotes.len());
        Ok(quotes)
    }

    async fn fetch_indices(&self) -> Result<Vec<IndexQuote>> {
        let query = [
            ("fltt", "2".to_string()),
            ("secids", INDEX_SECIDS.to_string()),
            ("fields", "f2,f3,f6,f10,f12,f14".to_string()),
        ];
        let json = self.get_json(EM_ULIST_API, &query).await?;
        let indices = parse_index_list(&json);
        if indices.is_empty() {
            return Err(anyhow!("指数行情为空"));
        }
        Ok(indices)
    }

    async fn fetch_limit_up_pool(&self, date: NaiveDate) -> Result<Vec<LimitPoolEntry>> {
        self.fetch_pool(EM_ZT_POOL_API, "fbt:asc", date, PoolKind::LimitUp).await
    }

    async fn fetch_limit_down_pool(&self, date: NaiveDate) -> Result<Vec<LimitPoolEntry>> {
        self.fetch_pool(EM_DT_POOL_API, "fund:asc", date, PoolKind::LimitDown).await
    }

    async fn fetch_exploded_pool(&self, date: NaiveDate) -> Result<Vec<LimitPoolEntry>> {
        self.fetch_pool(EM_ZB_POOL_API, "fbt:asc", date, PoolKind::Exploded).await
    }

    async fn fetch_previous_limit_up_pool(&self, date: NaiveDate) -> Result<Vec<PreviousLimitUpEntry>> {
        let query = [
            ("ut", POOL_UT.to_string()),
            ("dpt", "wz.ztzt".to_string()),
            ("Pageindex", "0".to_string()),
            ("pagesize", "5000".to_string()),
            ("sort", "zs:desc".to_string()),
            ("date", date_key(date)),
        ];
        let json = self.get_json(EM_PREVIOUS_ZT_POOL_API, &query).await?;
        Ok(parse_previous_pool(&json))
    }

    async fn fetch_top_sectors(&self, top_n: usize) -> Result<Vec<SectorQuote>> {
        let query = [
            ("pn", "1".to_string()),
            ("pz", top_n.to_string()),
            ("po", "1".to_string()),
            ("np", "1".to_string()),
            ("ut", CLIST_UT.to_string()),
            ("fltt", "2".to_string()),
            ("invt", "2".to_string()),
            ("fid", "f3".to_string()),
            ("fs", INDUSTRY_FS.to_string()),
            ("fields", "f3,f8,f12,f14,f20".to_string()),
        ];
        let json = self.get_json(EM_CLIST_API, &query).await?;
        let mut sectors = parse_sector_list(&json);
        sectors.truncate(top_n);
        Ok(sectors)
    }
}

// ==================== 响应解析 ====================

/// 股池类型，决定连板字段的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    LimitUp,
    LimitDown,
    Exploded,
}

/// 读取数值字段，停牌股票的 "-" 以及缺失字段为 `None`
fn field_opt_f64(item: &Value, key: &str) -> Option<f64> {
    match item.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 读取数值字段，无法识别时按 0 处理
fn field_f64(item: &Value, key: &str) -> f64 {
    field_opt_f64(item, key).unwrap_or(0.0)
}

fn field_u32(item: &Value, key: &str) -> u32 {
    field_f64(item, key).max(0.0) as u32
}

fn field_str(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// `data.diff` 可能是数组，也可能是以序号为键的对象
fn diff_rows(json: &Value) -> Vec<&Value> {
    match json.get("data").and_then(|d| d.get("diff")) {
        Some(Value::Array(arr)) => arr.iter().collect(),
        Some(Value::Object(map)) => map.values().collect(),
        _ => Vec::new(),
    }
}

/// 将 93105 之类的整数时间转为 "09:31:05"
fn format_lock_time(raw: &Value) -> String {
    let digits = match raw {
        Value::Number(n) => n.as_u64().map(|v| v.to_string()).unwrap_or_default(),
        Value::String(s) => s.trim().to_string(),
        _ => return String::new(),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) || digits.len() > 6 {
        return digits;
    }
    let padded = format!("{:0>6}", digits);
    format!("{}:{}:{}", &padded[0..2], &padded[2..4], &padded[4..6])
}

/// 解析一页全市场行情，返回 (总数, 行情列表)
pub fn parse_snapshot_page(json: &Value) -> Result<(usize, Vec<StockQuote>)> {
    let data = match json.get("data") {
        Some(Value::Null) | None => return Ok((0, Vec::new())),
        Some(data) => data,
    };
    let total = data
        .get("total")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| anyhow!("行情数据缺少 total 字段"))? as usize;

    let quotes = diff_rows(json)
        .into_iter()
        .filter_map(|item| {
            let code = field_str(item, "f12");
            if code.is_empty() {
                return None;
            }
            Some(StockQuote {
                code,
                name: field_str(item, "f14"),
                price: field_f64(item, "f2"),
                pct_change: field_f64(item, "f3"),
                change: field_f64(item, "f4"),
                volume: field_f64(item, "f5"),
                amount: field_f64(item, "f6"),
                amplitude: field_f64(item, "f7"),
                turnover_rate: field_f64(item, "f8"),
                high: field_f64(item, "f15"),
                low: field_f64(item, "f16"),
                suspended: field_opt_f64(item, "f3").is_none(),
                ..Default::default()
            })
        })
        .collect();

    Ok((total, quotes))
}

/// 解析指数行情
pub fn parse_index_list(json: &Value) -> Vec<IndexQuote> {
    diff_rows(json)
        .into_iter()
        .map(|item| IndexQuote {
            code: field_str(item, "f12"),
            name: field_str(item, "f14"),
            pct_change: field_f64(item, "f3"),
            amount: field_f64(item, "f6"),
            volume_ratio: field_f64(item, "f10"),
        })
        .filter(|q| !q.code.is_empty())
        .collect()
}

/// 解析涨停/跌停/炸板股池
///
/// 非交易日接口返回 `data: null`，视为空股池
pub fn parse_limit_pool(json: &Value, kind: PoolKind) -> Vec<LimitPoolEntry> {
    let pool = match json.get("data").and_then(|d| d.get("pool")).and_then(|p| p.as_array()) {
        Some(pool) => pool,
        None => return Vec::new(),
    };

    pool.iter()
        .map(|item| {
            let consecutive_days = match kind {
                PoolKind::LimitUp => field_u32(item, "lbc"),
                PoolKind::LimitDown => field_u32(item, "days"),
                PoolKind::Exploded => 0,
            };
            LimitPoolEntry {
                code: field_str(item, "c"),
                name: field_str(item, "n"),
                consecutive_days,
                // 股池价格单位为厘
                price: field_f64(item, "p") / 1000.0,
                pct_change: field_f64(item, "zdp"),
                locked_capital: field_f64(item, "fund"),
                first_lock_time: item.get("fbt").map(format_lock_time).unwrap_or_default(),
                exploded_times: field_u32(item, "zbc"),
                ..Default::default()
            }
        })
        .filter(|e| !e.code.is_empty())
        .collect()
}

/// 解析昨日涨停股池
pub fn parse_previous_pool(json: &Value) -> Vec<PreviousLimitUpEntry> {
    let pool = match json.get("data").and_then(|d| d.get("pool")).and_then(|p| p.as_array()) {
        Some(pool) => pool,
        None => return Vec::new(),
    };

    pool.iter()
        .map(|item| PreviousLimitUpEntry {
            code: field_str(item, "c"),
            name: field_str(item, "n"),
            consecutive_days: field_u32(item, "ylbc").max(1),
        })
        .filter(|e| !e.code.is_empty())
        .collect()
}

/// 解析行业板块列表
pub fn parse_sector_list(json: &Value) -> Vec<SectorQuote> {
    diff_rows(json)
        .into_iter()
        .map(|item| SectorQuote {
            name: field_str(item, "f14"),
            code: field_str(item, "f12"),
            pct_change: field_f64(item, "f3"),
            total_market_value: field_f64(item, "f20"),
            turnover_rate: field_f64(item, "f8"),
        })
        .filter(|s| !s.name.is_empty())
        .collect()
}
