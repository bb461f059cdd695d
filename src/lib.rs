//! A股市场广度分析
//!
//! 每日收盘后汇总涨跌停、赚钱效应、炸板率、昨日涨停股表现等指标，
//! 按日期保存并提供历史回看

pub mod config;     // 配置
pub mod handlers;   // HTTP 请求处理器
pub mod middleware; // 中间件
pub mod models;     // 数据模型定义
pub mod services;   // 业务逻辑服务
