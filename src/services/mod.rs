//! 业务逻辑服务模块
//!
//! 数据获取、统计计算、持久化与报告

pub mod aggregator;     // 市场广度统计
pub mod analyzer;       // 每日分析编排
pub mod board;          // 板块识别
pub mod display;        // 展示格式
pub mod export;         // CSV 导出
pub mod extremes;       // 盘中极值与跌幅排名
pub mod history;        // 历史摘要
pub mod performance;    // 昨日涨停股表现
pub mod provider;       // 外部行情数据源
pub mod report;         // 终端报告
pub mod snapshot_cache; // 全市场快照缓存
pub mod store;          // 每日记录存储
pub mod time;           // 交易日期与北京时间
