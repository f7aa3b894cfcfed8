// ==========================================
// 珠宝成本预估系统 - 预测运行配置
// ==========================================
// 职责: JSON 配置文件加载与默认值管理
// 红线: 配置文件缺失不是错误,全部字段回退默认值
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置读取失败: {0}")]
    ReadError(String),

    #[error("配置解析失败: {0}")]
    ParseError(String),
}

/// 预测运行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// 定价工作簿路径
    pub pricing_workbook: PathBuf,

    /// 本地商品目录路径
    pub product_catalog: PathBuf,

    /// 默认增长率(百分比),命令行未指定时使用
    pub default_growth_percentage: Option<f64>,

    /// 金属费率覆盖(纯度键 → 每克费率),优先级高于工作簿
    pub metal_rate_overrides: HashMap<String, f64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            pricing_workbook: PathBuf::from("pricing.xlsx"),
            product_catalog: PathBuf::from("catalog.json"),
            default_growth_percentage: None,
            metal_rate_overrides: HashMap::new(),
        }
    }
}

impl ForecastConfig {
    /// 从 JSON 文件加载;文件不存在回退默认配置
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "配置文件不存在,使用默认配置");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;
        let config: Self =
            serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        info!(path = %path.display(), "配置加载完成");
        Ok(config)
    }

    /// 把费率覆盖写入快照(覆盖优先)
    pub fn apply_rate_overrides(&self, snapshot: &mut crate::domain::pricing::PricingSnapshot) {
        if self.metal_rate_overrides.is_empty() {
            return;
        }
        let rates = snapshot.metal_rates.get_or_insert_with(HashMap::new);
        for (key, rate) in &self.metal_rate_overrides {
            rates.insert(key.to_lowercase(), *rate);
        }
    }
}
