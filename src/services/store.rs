//! 每日分析记录存储
//!
//! 每个交易日一个 JSON 文件：`<data_dir>/ashare_analysis_YYYYMMDD.json`，只写一次

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde_json::Value;

use super::history::RecordSource;
use super::time::{date_key, parse_date_key};
use crate::models::StoredDailyRecord;

/// 保存结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// 新写入
    Created(PathBuf),
    /// 当日记录已存在，未覆盖
    AlreadyExists(PathBuf),
}

/// 文件存储
#[derive(Debug, Clone)]
pub struct DailyRecordStore {
    data_dir: PathBuf,
}

impl DailyRecordStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// 确保数据目录存在
    pub fn ensure_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)?;
            log::info!("创建数据目录: {}", self.data_dir.display());
        }
        Ok(())
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("ashare_analysis_{}.json", date_key(date)))
    }

    pub fn exists(&self, date: NaiveDate) -> bool {
        self.path_for(date).exists()
    }

    /// 读取某日记录，文件不存在时为 `Ok(None)`
    pub fn load(&self, date: NaiveDate) -> Result<Option<StoredDailyRecord>> {
        let path = self.path_for(date);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(anyhow!("读取 {} 失败: {}", path.display(), e)),
        };
        let record = serde_json::from_str(&content)
            .map_err(|e| anyhow!("解析 {} 失败: {}", path.display(), e))?;
        Ok(Some(record))
    }

    /// 保存记录；当日文件已存在时不覆盖
    pub fn save(&self, record: &StoredDailyRecord) -> Result<SaveOutcome> {
        let date = parse_date_key(&record.date)?;
        let path = self.path_for(date);
        self.ensure_dir()?;

        let content = serde_json::to_string_pretty(record)?;
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                log::info!("{} 的记录已存在，跳过保存", record.date);
                return Ok(SaveOutcome::AlreadyExists(path));
            }
            Err(e) => return Err(anyhow!("创建 {} 失败: {}", path.display(), e)),
        };

        if let Err(e) = file.write_all(content.as_bytes()).and_then(|_| file.sync_all()) {
            // 不留下写了一半的文件，否则当日无法重试
            let _ = fs::remove_file(&path);
            return Err(anyhow!("写入 {} 失败: {}", path.display(), e));
        }

        log::info!("数据已保存到: {}", path.display());
        Ok(SaveOutcome::Created(path))
    }
}

impl RecordSource for DailyRecordStore {
    fn load_value(&self, date: NaiveDate) -> Option<Value> {
        let path = self.path_for(date);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("记录文件损坏 {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyStatsRecord, MarketStats};
    use crate::services::history::build_summary;

    fn record(date: &str, limit_up: usize) -> StoredDailyRecord {
        StoredDailyRecord {
            date: date.to_string(),
            analysis_time: "2024-06-03 15:30:00".to_string(),
            results: DailyStatsRecord {
                market_stats: Some(MarketStats {
                    limit_up_count: limit_up,
                    ..Default::default()
                }),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = DailyRecordStore::new(dir.path().join("data"));
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

        assert!(!store.exists(date));
        let outcome = store.save(&record("20240603", 42)).unwrap();
        assert!(matches!(outcome, SaveOutcome::Created(_)));
        assert!(store.exists(date));

        let loaded = store.load(date).unwrap().unwrap();
        assert_eq!(loaded.date, "20240603");
        assert_eq!(loaded.results.market_stats.unwrap().limit_up_count, 42);
    }

    #[test]
    fn test_save_twice_keeps_first_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = DailyRecordStore::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

        store.save(&record("20240603", 1)).unwrap();
        let second = store.save(&record("20240603", 2)).unwrap();
        assert!(matches!(second, SaveOutcome::AlreadyExists(_)));

        let files = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 1);
        let loaded = store.load(date).unwrap().unwrap();
        assert_eq!(loaded.results.market_stats.unwrap().limit_up_count, 1);
    }

    #[test]
    fn test_save_rejects_bad_date() {
        let dir = tempfile::tempdir().unwrap();
        let store = DailyRecordStore::new(dir.path());
        assert!(store.save(&record("2024-06-03", 1)).is_err());
    }

    #[test]
    fn test_missing_and_corrupt_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = DailyRecordStore::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

        assert!(store.load(date).unwrap().is_none());
        assert!(store.load_value(date).is_none());

        fs::write(store.path_for(date), "{ not json").unwrap();
        assert!(store.load(date).is_err());
        assert!(store.load_value(date).is_none());
    }

    #[test]
    fn test_summary_reads_chinese_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = DailyRecordStore::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        fs::write(
            store.path_for(date),
            r#"{"date": "20240603", "analysis_time": "2024-06-03 15:30:00", "results": {
                "市场统计": {"涨停数量": 52, "跌停数量": 6, "赚钱效应": "62.50%", "炸板率": "25.00%"},
                "昨日涨停股表现": {"昨日涨停股数量": 40, "今日平均表现": "2.31%"}}}"#,
        )
        .unwrap();

        let summary = build_summary(&store, date, 7, None);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].money_effect, 62.5);
        assert!(summary[0].has_valid_data);
    }

    #[test]
    fn test_summary_reads_saved_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = DailyRecordStore::new(dir.path());
        store.save(&record("20240603", 10)).unwrap();
        store.save(&record("20240531", 20)).unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let summary = build_summary(&store, today, 7, None);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].limit_up_count, 10);
        assert_eq!(summary[1].date, "20240531");
        // 昨日表现为 NoData，数据不完整
        assert!(!summary[0].has_valid_data);
    }
}
