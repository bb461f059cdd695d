//! 盘中极值与跌幅排名

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::aggregator::round2;
use crate::models::{DeclineRankEntry, ExtremeEntry, Segment, SegmentExtremes, StockQuote};

/// 每个方向最多保留的股票数
pub const EXTREMES_TOP_N: usize = 5;
/// 跌幅排名取第 60 名
pub const DECLINE_RANK: usize = 60;
/// 重跌阈值（%）
pub const HEAVY_DECLINE_PCT: f64 = -15.0;

/// 各板块的盘中振幅阈值（%）
pub fn extreme_threshold(segment: Segment) -> f64 {
    match segment {
        Segment::MainBoard => 15.0,
        Segment::SciTechBoard | Segment::GrowthBoard => 25.0,
        Segment::BeijingExchange => 35.0,
    }
}

/// 按板块统计收盘相对最低价涨幅最大、相对最高价跌幅最大的股票
///
/// 排序稳定，同值时保持数据源的原始顺序；没有符合条件股票的板块不出现在结果中
pub fn scan_extremes(snapshot: &[StockQuote]) -> BTreeMap<Segment, SegmentExtremes> {
    let mut result = BTreeMap::new();

    for segment in Segment::ALL {
        let threshold = extreme_threshold(segment);
        let rows: Vec<&StockQuote> = snapshot.iter().filter(|q| q.segment == segment).collect();

        let mut gainers: Vec<ExtremeEntry> = rows
            .iter()
            .filter(|q| q.low > 0.0)
            .map(|q| extreme_entry(q, q.low))
            .filter(|e| e.pct_from_reference > threshold)
            .collect();
        gainers.sort_by(|a, b| {
            b.pct_from_reference
                .partial_cmp(&a.pct_from_reference)
                .unwrap_or(Ordering::Equal)
        });
        gainers.truncate(EXTREMES_TOP_N);

        let mut losers: Vec<ExtremeEntry> = rows
            .iter()
            .filter(|q| q.high > 0.0)
            .map(|q| extreme_entry(q, q.high))
            .filter(|e| e.pct_from_reference < -threshold)
            .collect();
        losers.sort_by(|a, b| {
            a.pct_from_reference
                .partial_cmp(&b.pct_from_reference)
                .unwrap_or(Ordering::Equal)
        });
        losers.truncate(EXTREMES_TOP_N);

        if gainers.is_empty() && losers.is_empty() {
            continue;
        }
        result.insert(
            segment,
            SegmentExtremes {
                top_gainers_from_low: gainers,
                top_losers_from_high: losers,
            },
        );
    }

    result
}

fn extreme_entry(quote: &StockQuote, reference_price: f64) -> ExtremeEntry {
    ExtremeEntry {
        code: quote.code.clone(),
        name: quote.name.clone(),
        price: quote.price,
        reference_price,
        pct_from_reference: round2((quote.price - reference_price) / reference_price * 100.0),
    }
}

/// 跌幅第 `rank` 名（从 1 开始）的股票，下跌股票不足时为 `None`
pub fn decline_rank(snapshot: &[StockQuote], rank: usize) -> Option<DeclineRankEntry> {
    if rank == 0 {
        return None;
    }
    let mut declining: Vec<&StockQuote> = snapshot.iter().filter(|q| q.pct_change < 0.0).collect();
    if declining.len() < rank {
        return None;
    }
    declining.sort_by(|a, b| a.pct_change.partial_cmp(&b.pct_change).unwrap_or(Ordering::Equal));

    let quote = declining[rank - 1];
    Some(DeclineRankEntry {
        rank,
        code: quote.code.clone(),
        name: quote.name.clone(),
        pct_change: quote.pct_change,
    })
}

/// 单日跌幅达到 15% 的股票数量
pub fn heavy_decline_count(snapshot: &[StockQuote]) -> usize {
    snapshot.iter().filter(|q| q.pct_change <= HEAVY_DECLINE_PCT).count()
}

/// 当日涨幅前 N 名
pub fn top_gainers(snapshot: &[StockQuote], top_n: usize) -> Vec<StockQuote> {
    let mut rows: Vec<&StockQuote> = snapshot.iter().collect();
    rows.sort_by(|a, b| b.pct_change.partial_cmp(&a.pct_change).unwrap_or(Ordering::Equal));
    rows.into_iter().take(top_n).cloned().collect()
}
