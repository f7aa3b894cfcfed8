// ==========================================
// 珠宝成本预估系统 - 领域层
// ==========================================
// 职责: 领域实体与类型定义,不含业务规则
// ==========================================

pub mod cost;
pub mod pricing;
pub mod product;
pub mod types;

// 重导出核心实体
pub use cost::{
    CalculationBreakdown, CalculationResult, CostEstimation, EarringLogic, ForecastAnalysis,
    ForecastBreakdowns, ForecastSummary, LaborCostDetails, LookupResult, ManufacturingBreakdown,
    MetalCostDiagnostics, MetalTypeBreakdown, PartLookupDiagnostics, ProcessedSkuResult,
    PurityDiagnostics, SkuCostBreakdown, StoneBill, StoneBillLine, TypeBreakdown,
};
pub use pricing::{
    DiamondPriceRow, GemstonePriceRow, GoldPricingDisplay, IksanPartRecord, LaborConstants,
    LeesPartRecord, PricingSnapshot,
};
pub use product::{
    DiamondSpec, GemstoneSpec, ProductRecord, ProductSpecifications, SkuInput, SupplierData,
};
pub use types::{CalculationMethod, EarringType, MatchType, MetalPurity, SupplierKind};
