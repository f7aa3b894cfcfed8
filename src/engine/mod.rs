// ==========================================
// 珠宝成本预估系统 - 计价引擎层
// ==========================================
// 职责: 部件查找 / 耳饰识别 / 金属成本解析 / 石头计价 / 批量预测
// 红线: 引擎层全部为纯计算(管线的外部取数除外),不做任何持久化
// ==========================================

pub mod earring;
pub mod forecast;
pub mod metal_cost;
pub mod part_lookup;
pub mod sku_pipeline;
pub mod stone_cost;

// 重导出核心引擎
pub use earring::{detect_earring_type, EarringDetection};
pub use forecast::{aggregate_forecast, ForecastEngine};
pub use metal_cost::MetalCostResolver;
pub use part_lookup::{lookup_part, PartKeyed};
pub use sku_pipeline::{ProductDataSource, ProductEnrichment, SkuCostPipeline};
pub use stone_cost::{calculate_labor_cost, price_diamond_bill, price_gemstone_bill};
