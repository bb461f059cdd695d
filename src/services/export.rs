//! 每日汇总导出
//!
//! 以 CSV 追加写入，每个交易日一行，同一日期不重复写入

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use serde::Serialize;

use super::display::{format_amount, format_optional_pct, format_pct};
use crate::models::DailyStatsRecord;

/// 导出列
pub const EXPORT_HEADER: [&str; 11] = [
    "日期",
    "上证量比",
    "上证涨幅",
    "两市成交额",
    "涨跌停比",
    "赚钱效应",
    "炸板率",
    "跌幅第60名",
    "连板数",
    "昨日涨停表现",
    "昨日炸板表现",
];

/// 导出结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportOutcome {
    Appended,
    /// 该日期已导出过
    Duplicate,
    /// 没有市场统计，不导出
    Skipped,
}

/// 生成一行导出数据，缺少市场统计时为 `None`
pub fn export_row(date: &str, record: &DailyStatsRecord) -> Option<[String; 11]> {
    let stats = record.market_stats.as_ref()?;
    let previous = record.previous_limit_up.stats();

    Some([
        date.to_string(),
        format!("{:.2}", stats.index_volume_ratio),
        format_pct(stats.index_change),
        format_amount(stats.total_amount),
        stats.limit_ratio.clone(),
        format_pct(stats.money_effect),
        format_pct(stats.exploded_rate),
        format_optional_pct(record.decline_rank.as_ref().map(|d| d.pct_change)),
        stats.consecutive_limit_up_count.to_string(),
        format_optional_pct(previous.map(|p| p.avg_performance)),
        format_optional_pct(previous.map(|p| p.exploded_avg_performance)),
    ])
}

fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_line(fields: &[String]) -> String {
    fields.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",")
}

/// CSV 导出器
///
/// 克隆共享同一把锁，同一进程内“检查日期 - 追加”整体串行
#[derive(Debug, Clone)]
pub struct DailyExporter {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl DailyExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 导出文件中是否已有该日期
    pub fn contains(&self, date: &str) -> Result<bool> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(anyhow!("读取 {} 失败: {}", self.path.display(), e)),
        };
        Ok(content
            .lines()
            .skip(1)
            .any(|line| line.split(',').next() == Some(date)))
    }

    /// 追加一天的数据
    pub fn append(&self, date: &str, record: &DailyStatsRecord) -> Result<ExportOutcome> {
        let row = match export_row(date, record) {
            Some(row) => row,
            None => {
                log::warn!("{} 没有市场统计数据，跳过导出", date);
                return Ok(ExportOutcome::Skipped);
            }
        };

        let _guard = self.write_lock.lock().map_err(|_| anyhow!("导出锁已失效"))?;
        if self.contains(date)? {
            log::info!("{} 已存在于 {}，跳过导出", date, self.path.display());
            return Ok(ExportOutcome::Duplicate);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        if needs_header {
            let header: Vec<String> = EXPORT_HEADER.iter().map(|h| h.to_string()).collect();
            writeln!(file, "{}", csv_line(&header))?;
        }
        writeln!(file, "{}", csv_line(&row))?;

        log::info!("{} 已导出到 {}", date, self.path.display());
        Ok(ExportOutcome::Appended)
    }
}
