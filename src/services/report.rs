//! 终端报告
//!
//! 单日详情与近 N 日概况表，只生成文本，由调用方决定输出位置

use std::fmt::Write;

use super::display::{format_amount, format_pct};
use crate::models::{
    DailyStatsRecord, HistoricalSummaryEntry, MarketStats, PreviousLimitUpPerformance, StoredDailyRecord,
};

const SEPARATOR_WIDTH: usize = 50;
const SUMMARY_RULE_WIDTH: usize = 130;
const RATIO_COLUMN_WIDTH: usize = 18;

/// 概况表中数据不完整的提示
pub const INCOMPLETE_NOTE: &str = "* 标记的日期数据不完整";

fn write_market_stats(out: &mut String, stats: &MarketStats) {
    let _ = writeln!(out, "\n【市场统计】");
    let _ = writeln!(out, "  两市成交额: {}", format_amount(stats.total_amount));
    let _ = writeln!(out, "  上证涨幅: {}", format_pct(stats.index_change));
    let _ = writeln!(out, "  上证量比: {:.2}", stats.index_volume_ratio);
    let _ = writeln!(out, "  涨跌停比: {}", stats.limit_ratio);
    let _ = writeln!(
        out,
        "  涨停: {}  跌停: {}  炸板: {}  连板: {}",
        stats.limit_up_count, stats.limit_down_count, stats.exploded_count, stats.consecutive_limit_up_count
    );
    let _ = writeln!(
        out,
        "  上涨: {}  下跌: {}  平盘: {}",
        stats.up_count, stats.down_count, stats.flat_count
    );
    let _ = writeln!(out, "  赚钱效应: {}", format_pct(stats.money_effect));
    let _ = writeln!(out, "  炸板率: {}", format_pct(stats.exploded_rate));

    for (segment, seg) in &stats.segments {
        let _ = write!(
            out,
            "  [{} ±{:.0}%] 股票 {} 赚钱效应 {} 涨停 {} 跌停 {} 炸板率 {}",
            segment.display_name(),
            segment.limit_pct(),
            seg.stock_count,
            format_pct(seg.money_effect),
            seg.limit_up_count,
            seg.limit_down_count,
            format_pct(seg.exploded_rate)
        );
        if let (Some(up), Some(down)) = (seg.over10_up_count, seg.over10_down_count) {
            let _ = write!(out, " 涨超10% {} 跌超10% {}", up, down);
        }
        out.push('\n');
    }
}

fn write_previous(out: &mut String, previous: &PreviousLimitUpPerformance) {
    let _ = writeln!(out, "\n【昨日涨停股表现】");
    match previous {
        PreviousLimitUpPerformance::Available(p) => {
            let _ = writeln!(out, "  昨日涨停数: {}", p.count);
            let _ = writeln!(out, "  平均表现: {}", format_pct(p.avg_performance));
            let _ = writeln!(out, "  上涨比例: {}", format_pct(p.up_ratio));
            let _ = writeln!(out, "  昨日炸板股表现: {}", format_pct(p.exploded_avg_performance));
        }
        PreviousLimitUpPerformance::NoData { status } => {
            let _ = writeln!(out, "  {}", status);
        }
    }
}

fn write_results(out: &mut String, results: &DailyStatsRecord) {
    match &results.market_stats {
        Some(stats) => write_market_stats(out, stats),
        None => {
            let _ = writeln!(out, "\n【市场统计】\n  无数据");
        }
    }

    if !results.streak_leaders.is_empty() {
        let _ = writeln!(out, "\n【5连涨停以上股票】");
        for (i, entry) in results.streak_leaders.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} {} {}连板 首次封板 {}",
                i + 1,
                entry.code,
                entry.name,
                entry.consecutive_days,
                entry.first_lock_time
            );
        }
    }

    write_previous(out, &results.previous_limit_up);

    if !results.top_gainers.is_empty() {
        let _ = writeln!(out, "\n【涨幅前{}】", results.top_gainers.len());
        for (i, quote) in results.top_gainers.iter().enumerate() {
            let _ = writeln!(out, "  {}. {} {} {}", i + 1, quote.code, quote.name, format_pct(quote.pct_change));
        }
    }

    for (segment, extremes) in &results.intraday_extremes {
        if extremes.top_gainers_from_low.is_empty() && extremes.top_losers_from_high.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n【{}盘中极值】", segment.display_name());
        for entry in &extremes.top_gainers_from_low {
            let _ = writeln!(
                out,
                "  较最低价 {} {} {}",
                entry.code,
                entry.name,
                format_pct(entry.pct_from_reference)
            );
        }
        for entry in &extremes.top_losers_from_high {
            let _ = writeln!(
                out,
                "  较最高价 {} {} {}",
                entry.code,
                entry.name,
                format_pct(entry.pct_from_reference)
            );
        }
    }

    if !results.sector_leaders.is_empty() {
        let _ = writeln!(out, "\n【领涨行业】");
        for (i, sector) in results.sector_leaders.iter().enumerate() {
            let _ = writeln!(out, "  {}. {} {}", i + 1, sector.name, format_pct(sector.pct_change));
        }
    }

    if let Some(rank) = &results.decline_rank {
        let _ = writeln!(out, "\n【跌幅第{}名】", rank.rank);
        let _ = writeln!(out, "  {} {} {}", rank.code, rank.name, format_pct(rank.pct_change));
    }
    let _ = writeln!(out, "\n【跌幅超过15%】\n  {}只", results.heavy_decline_count);
}

/// 单日详情
pub fn render_detail(record: &StoredDailyRecord) -> String {
    let rule = "=".repeat(SEPARATOR_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "A股分析数据 - {}", record.date);
    let _ = writeln!(out, "分析时间: {}", record.analysis_time);
    let _ = writeln!(out, "{}", rule);
    write_results(&mut out, &record.results);
    out
}

fn truncate_ratio(ratio: &str) -> String {
    if ratio.chars().count() > RATIO_COLUMN_WIDTH {
        let head: String = ratio.chars().take(RATIO_COLUMN_WIDTH - 2).collect();
        format!("{}..", head)
    } else {
        ratio.to_string()
    }
}

/// 概况表中的一行，数据不完整时以 ` *` 结尾
pub fn summary_row(day: &HistoricalSummaryEntry) -> String {
    let marker = if day.has_valid_data { "" } else { " *" };
    format!(
        "{} {:4} {:4} {:18} {:6.0}亿 {:7.2}% {:5.2} {:7.2}% {:6.2}%  | {:7} {:8.2}% {:6.2}% {:7.2}%{}",
        day.date,
        day.limit_up_count,
        day.limit_down_count,
        truncate_ratio(&day.limit_ratio),
        day.total_amount,
        day.index_change,
        day.index_volume_ratio,
        day.money_effect,
        day.exploded_rate,
        day.previous_limit_up_count,
        day.previous_avg_performance,
        day.previous_up_ratio,
        day.exploded_avg_performance,
        marker
    )
}

/// 近 N 日概况表
pub fn render_summary(history: &[HistoricalSummaryEntry]) -> String {
    if history.is_empty() {
        return "未找到历史数据\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "\n【近{}日市场概况】", history.len());
    let _ = writeln!(
        out,
        "日期       涨停 跌停 涨跌停比          成交额 上证涨幅   量比  赚钱效应 炸板率 | 昨涨停数 涨停表现  上涨率 炸板表现"
    );
    let _ = writeln!(out, "{}", "-".repeat(SUMMARY_RULE_WIDTH));
    for day in history {
        let _ = writeln!(out, "{}", summary_row(day));
    }

    if history.iter().any(|d| !d.has_valid_data) {
        let _ = writeln!(out, "\n{}", INCOMPLETE_NOTE);
    }
    let _ = writeln!(out, "\n字段说明:");
    let _ = writeln!(out, "涨跌停比=涨停(主板外)+涨幅>10%非涨停:跌停(主板外)+跌幅>10%非跌停");
    let _ = writeln!(out, "炸板表现=昨日炸板股今日平均表现");
    out
}
