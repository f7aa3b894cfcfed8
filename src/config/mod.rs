// ==========================================
// 珠宝成本预估系统 - 配置层
// ==========================================

pub mod forecast_config;

pub use forecast_config::{ConfigError, ForecastConfig};
