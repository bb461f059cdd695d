//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API Key（为空则不启用认证）
    #[serde(default)]
    pub api_key: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 每日分析记录目录
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// 每日汇总导出文件（CSV）
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,
}

/// 分析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 全市场快照缓存有效期（秒）
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// 历史摘要默认天数
    #[serde(default = "default_summary_days")]
    pub summary_days: usize,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_log_level() -> String { "info".to_string() }
fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_export_path() -> PathBuf { PathBuf::from("data/ashare_daily.csv") }
fn default_cache_ttl() -> u64 { 300 }
fn default_summary_days() -> usize { 7 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            export_path: default_export_path(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            summary_days: default_summary_days(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从指定文件，其次默认路径，失败则使用默认值
    ///
    /// 环境变量 `API_KEY` 会覆盖配置中的 API Key。
    /// 加载时日志尚未初始化，结果记录在 [`LoadedConfig`] 中，由调用方初始化日志后输出
    pub fn load(explicit: Option<&Path>) -> LoadedConfig {
        let mut loaded = Self::load_file(explicit);
        if let Ok(key) = std::env::var("API_KEY") {
            if !key.is_empty() {
                loaded.config.api.api_key = key;
            }
        }
        loaded
    }

    fn load_file(explicit: Option<&Path>) -> LoadedConfig {
        let mut config_paths: Vec<&Path> = Vec::new();
        if let Some(path) = explicit {
            config_paths.push(path);
        }
        config_paths.push(Path::new("config.json"));
        config_paths.push(Path::new("config/config.json"));

        let mut failures = Vec::new();
        for path in config_paths {
            if path.exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        return LoadedConfig {
                            config,
                            source: Some(path.to_path_buf()),
                            failures,
                        };
                    }
                    Err(e) => failures.push(format!("加载配置文件 {} 失败: {}", path.display(), e)),
                }
            } else if Some(path) == explicit {
                failures.push(format!("配置文件 {} 不存在", path.display()));
            }
        }

        LoadedConfig {
            config: Self::default(),
            source: None,
            failures,
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// 配置加载结果
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    /// 实际使用的配置文件，`None` 表示使用默认值
    pub source: Option<PathBuf>,
    /// 加载失败的配置文件及原因
    pub failures: Vec<String>,
}

impl LoadedConfig {
    /// 输出加载过程，需在日志初始化之后调用
    pub fn log(&self) {
        for failure in &self.failures {
            log::warn!("{}", failure);
        }
        match &self.source {
            Some(path) => log::info!("从 {} 加载配置成功", path.display()),
            None => log::info!("使用默认配置"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"server": {"port": 9000}, "analysis": {"summary_days": 10}}"#)
                .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.analysis.summary_days, 10);
        assert_eq!(config.analysis.cache_ttl_secs, 300);
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"storage": {{"data_dir": "/tmp/breadth"}}, "log": {{"level": "debug"}}}}"#).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/breadth"));
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_load_records_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"server": {{"port": 9100}}}}"#).unwrap();

        let loaded = AppConfig::load(Some(file.path()));
        assert_eq!(loaded.source.as_deref(), Some(file.path()));
        assert!(loaded.failures.is_empty());
        assert_eq!(loaded.config.server.port, 9100);
    }

    #[test]
    fn test_load_records_invalid_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let loaded = AppConfig::load(Some(file.path()));
        assert_ne!(loaded.source.as_deref(), Some(file.path()));
        assert_eq!(loaded.failures.len(), 1);
        assert!(loaded.failures[0].contains(&file.path().display().to_string()));

        let missing = file.path().with_extension("missing.json");
        let loaded = AppConfig::load(Some(&missing));
        assert!(loaded.failures[0].contains("不存在"));
    }

    #[test]
    fn test_from_file_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(AppConfig::from_file(file.path()).is_err());
    }
}
