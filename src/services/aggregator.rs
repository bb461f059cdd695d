//! 市场统计聚合
//!
//! 将全市场快照与涨停、跌停、炸板股池合并为分板块的统计结果

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::board::classify;
use super::provider::MarketDataProvider;
use crate::models::{IndexQuote, LimitPoolEntry, MarketStats, Segment, SegmentStats, StockQuote};

/// 主指数代码（上证指数）
pub const PRIMARY_INDEX_CODE: &str = "000001";

const HUNDRED_MILLION: f64 = 100_000_000.0;

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 百分比，分母为 0 时为 0
pub fn percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 / denominator as f64 * 100.0)
}

/// 当日涨停、跌停、炸板股池（已标注板块）
#[derive(Debug, Clone, Default)]
pub struct LimitPools {
    pub limit_up: Vec<LimitPoolEntry>,
    pub limit_down: Vec<LimitPoolEntry>,
    pub exploded: Vec<LimitPoolEntry>,
}

impl LimitPools {
    pub fn new(
        limit_up: Vec<LimitPoolEntry>,
        limit_down: Vec<LimitPoolEntry>,
        exploded: Vec<LimitPoolEntry>,
    ) -> Self {
        let mut pools = Self {
            limit_up,
            limit_down,
            exploded,
        };
        for entry in pools
            .limit_up
            .iter_mut()
            .chain(pools.limit_down.iter_mut())
            .chain(pools.exploded.iter_mut())
        {
            entry.segment = classify(&entry.code);
        }
        pools
    }
}

fn count_in(pool: &[LimitPoolEntry], segment: Segment) -> usize {
    pool.iter().filter(|e| e.segment == segment).count()
}

/// 分别获取三个股池
///
/// 每个股池独立处理错误，某个股池失败只会让它自己为空
pub async fn fetch_limit_pools<P: MarketDataProvider>(provider: &P, date: NaiveDate) -> LimitPools {
    let limit_up = match provider.fetch_limit_up_pool(date).await {
        Ok(pool) => pool,
        Err(e) => {
            log::warn!("获取涨停股池失败: {}", e);
            Vec::new()
        }
    };

    let limit_down = match provider.fetch_limit_down_pool(date).await {
        Ok(pool) => pool,
        Err(e) => {
            log::warn!("获取跌停股池失败: {}", e);
            Vec::new()
        }
    };

    let exploded = match provider.fetch_exploded_pool(date).await {
        Ok(pool) => pool,
        Err(e) => {
            log::warn!("获取炸板股池失败: {}", e);
            Vec::new()
        }
    };

    log::info!(
        "股池数量 涨停 {} / 跌停 {} / 炸板 {}",
        limit_up.len(),
        limit_down.len(),
        exploded.len()
    );
    LimitPools::new(limit_up, limit_down, exploded)
}

/// 涨跌家数
///
/// 停牌股计入总数（赚钱效应的分母），但不算平盘
#[derive(Debug, Default, Clone, Copy)]
struct Breadth {
    up: usize,
    down: usize,
    flat: usize,
    total: usize,
}

impl Breadth {
    fn of<'a>(rows: impl Iterator<Item = &'a StockQuote>) -> Self {
        let mut breadth = Self::default();
        for row in rows {
            breadth.total += 1;
            if row.suspended {
                continue;
            }
            if row.pct_change > 0.0 {
                breadth.up += 1;
            } else if row.pct_change < 0.0 {
                breadth.down += 1;
            } else {
                breadth.flat += 1;
            }
        }
        breadth
    }

    fn money_effect(&self) -> f64 {
        percentage(self.up, self.total)
    }
}

/// 计算市场统计
///
/// 快照为空时返回 `None`
pub fn aggregate(snapshot: &[StockQuote], pools: &LimitPools, indices: &[IndexQuote]) -> Option<MarketStats> {
    if snapshot.is_empty() {
        return None;
    }

    let total_amount = (indices.iter().map(|i| i.amount).sum::<f64>() / HUNDRED_MILLION).floor();
    let primary = indices
        .iter()
        .find(|i| i.code == PRIMARY_INDEX_CODE)
        .or_else(|| indices.first());

    let mut segments = BTreeMap::new();
    for segment in Segment::ALL {
        let rows = || snapshot.iter().filter(move |q| q.segment == segment);
        let breadth = Breadth::of(rows());
        let limit_up_count = count_in(&pools.limit_up, segment);
        let limit_down_count = count_in(&pools.limit_down, segment);
        let exploded_count = count_in(&pools.exploded, segment);

        // 科创板、创业板涨跌幅限制为 20%，超过 10% 不一定是涨跌停
        let (over10_up_count, over10_down_count) = match segment {
            Segment::SciTechBoard | Segment::GrowthBoard => {
                let over_up = rows().filter(|q| q.pct_change > 10.0).count();
                let over_down = rows().filter(|q| q.pct_change < -10.0).count();
                (
                    Some(over_up.saturating_sub(limit_up_count)),
                    Some(over_down.saturating_sub(limit_down_count)),
                )
            }
            _ => (None, None),
        };

        segments.insert(
            segment,
            SegmentStats {
                stock_count: breadth.total,
                up_count: breadth.up,
                down_count: breadth.down,
                flat_count: breadth.flat,
                money_effect: breadth.money_effect(),
                limit_up_count,
                limit_down_count,
                exploded_count,
                exploded_rate: percentage(exploded_count, limit_up_count + exploded_count),
                over10_up_count,
                over10_down_count,
            },
        );
    }

    let breadth = Breadth::of(snapshot.iter());
    let limit_up_count = pools.limit_up.len();
    let limit_down_count = pools.limit_down.len();
    let exploded_count = pools.exploded.len();

    Some(MarketStats {
        total_amount,
        index_change: primary.map(|i| i.pct_change).unwrap_or(0.0),
        index_volume_ratio: primary.map(|i| i.volume_ratio).unwrap_or(0.0),
        limit_ratio: format_limit_ratio(&segments),
        limit_up_count,
        limit_down_count,
        exploded_count,
        consecutive_limit_up_count: pools.limit_up.iter().filter(|e| e.consecutive_days >= 2).count(),
        up_count: breadth.up,
        down_count: breadth.down,
        flat_count: breadth.flat,
        money_effect: breadth.money_effect(),
        exploded_rate: percentage(exploded_count, limit_up_count + exploded_count),
        segments,
    })
}

/// 涨跌停比：`涨停(非主板涨停)+超10%未涨停:跌停(非主板跌停)+超10%未跌停`
///
/// 非主板跌停数为 0 时省略其括号，涨停侧始终保留
pub fn format_limit_ratio(segments: &BTreeMap<Segment, SegmentStats>) -> String {
    let mut limit_up = 0;
    let mut limit_down = 0;
    let mut non_main_up = 0;
    let mut non_main_down = 0;
    let mut over10_up = 0;
    let mut over10_down = 0;

    for (segment, stats) in segments {
        limit_up += stats.limit_up_count;
        limit_down += stats.limit_down_count;
        if *segment != Segment::MainBoard {
            non_main_up += stats.limit_up_count;
            non_main_down += stats.limit_down_count;
        }
        over10_up += stats.over10_up_count.unwrap_or(0);
        over10_down += stats.over10_down_count.unwrap_or(0);
    }

    let down_detail = if non_main_down > 0 {
        format!("({})", non_main_down)
    } else {
        String::new()
    };

    format!(
        "{}({})+{}:{}{}+{}",
        limit_up, non_main_up, over10_up, limit_down, down_detail, over10_down
    )
}
