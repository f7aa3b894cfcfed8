// ==========================================
// 珠宝SKU成本预估与批量预测系统 - 核心库
// ==========================================
// 系统定位: 决策支持系统 (成本估算辅助报价,人工最终控制权)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 计价与预测规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CalculationMethod, EarringType, MatchType, MetalPurity, SupplierKind};

// 领域实体
pub use domain::{
    CalculationResult, CostEstimation, ForecastAnalysis, ForecastSummary, PricingSnapshot,
    ProcessedSkuResult, ProductRecord, ProductSpecifications, SkuInput, SupplierData,
};

// 引擎
pub use engine::{
    aggregate_forecast, detect_earring_type, lookup_part, ForecastEngine, MetalCostResolver,
    ProductDataSource, ProductEnrichment, SkuCostPipeline,
};

// 导入器
pub use importer::{BatchFileImporter, JsonProductCatalog, PricingWorkbookImporter};

// 配置
pub use config::ForecastConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "珠宝SKU成本预估与批量预测系统";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
