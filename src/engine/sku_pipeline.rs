// ==========================================
// 珠宝成本预估系统 - 单SKU成本管线
// ==========================================
// 职责: 取数 → 规格化 → 金属/石头/人工计价 → 单SKU结果
// 红线: 单SKU失败只产出失败行,绝不向上抛错中断批次(失败隔离)
// ==========================================

use crate::domain::cost::{
    CostEstimation, ProcessedSkuResult, SkuCostBreakdown,
};
use crate::domain::pricing::PricingSnapshot;
use crate::domain::product::{ProductRecord, ProductSpecifications, SkuInput};
use crate::engine::metal_cost::MetalCostResolver;
use crate::engine::stone_cost::{calculate_labor_cost, price_diamond_bill, price_gemstone_bill};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{instrument, warn};

// ==========================================
// 外部协作者接口
// ==========================================

/// 商品数据源(外部系统的扁平化商品记录)
#[async_trait]
pub trait ProductDataSource: Send + Sync {
    /// 按 SKU 取商品记录,查无此 SKU 返回 Ok(None)
    async fn fetch_product(&self, sku: &str) -> anyhow::Result<Option<ProductRecord>>;
}

/// 规格化服务(原始记录 → 结构化规格)
#[async_trait]
pub trait ProductEnrichment: Send + Sync {
    async fn enrich(&self, product: &ProductRecord) -> anyhow::Result<ProductSpecifications>;
}

// ==========================================
// SkuCostPipeline - 单SKU管线
// ==========================================
pub struct SkuCostPipeline<D, E> {
    source: Arc<D>,
    enrichment: Arc<E>,
    resolver: MetalCostResolver,
}

impl<D, E> SkuCostPipeline<D, E>
where
    D: ProductDataSource,
    E: ProductEnrichment,
{
    pub fn new(source: Arc<D>, enrichment: Arc<E>) -> Self {
        Self {
            source,
            enrichment,
            resolver: MetalCostResolver::new(),
        }
    }

    /// 处理单条批量输入
    ///
    /// 任何失败(取数/规格化/金属成本硬失败)都折叠为失败行返回,
    /// 从不 panic、从不返回 Err。
    #[instrument(skip(self, snapshot), fields(sku = %input.sku, quantity = input.quantity))]
    pub async fn process_single_sku(
        &self,
        input: &SkuInput,
        snapshot: &PricingSnapshot,
    ) -> ProcessedSkuResult {
        let product = match self.source.fetch_product(&input.sku).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                warn!(sku = %input.sku, "商品不存在");
                return ProcessedSkuResult::failed(
                    &input.sku,
                    input.quantity,
                    format!("Product with SKU '{}' not found.", input.sku),
                );
            }
            Err(err) => {
                warn!(sku = %input.sku, error = %err, "商品取数失败");
                return ProcessedSkuResult::failed(
                    &input.sku,
                    input.quantity,
                    format!("Failed to fetch product data: {}", err),
                );
            }
        };

        let specs = match self.enrichment.enrich(&product).await {
            Ok(specs) => specs,
            Err(err) => {
                warn!(sku = %input.sku, error = %err, "规格化失败");
                return ProcessedSkuResult::failed(
                    &input.sku,
                    input.quantity,
                    format!("Specification enrichment failed: {}", err),
                );
            }
        };

        let estimation = self.estimate_product_cost(&product, &specs, snapshot);

        // 金属成本硬失败(规格无效/纯度不可识别且无可用回退)对该SKU致命
        if !estimation.metal_details.is_success {
            return ProcessedSkuResult::failed(
                &input.sku,
                input.quantity,
                format!(
                    "Metal cost calculation failed: {}",
                    estimation.metal_details.errors.join(", ")
                ),
            );
        }

        let breakdown = SkuCostBreakdown {
            diamond: estimation.diamond_cost,
            gemstone: estimation.gemstone_cost,
            metal: estimation.metal_cost,
            labor: estimation.labor_cost,
            part2: estimation.metal_details.part2_price(),
            part3: estimation.metal_details.mfg_part_price(),
        };

        ProcessedSkuResult {
            sku: input.sku.clone(),
            quantity: input.quantity,
            success: true,
            error: None,
            specifications: Some(specs),
            cost_estimation: Some(estimation),
            breakdown: Some(breakdown),
        }
    }

    /// 单件成本估算(数量缩放由聚合器负责)
    pub fn estimate_product_cost(
        &self,
        product: &ProductRecord,
        specs: &ProductSpecifications,
        snapshot: &PricingSnapshot,
    ) -> CostEstimation {
        let metal_details =
            self.resolver
                .resolve(&product.supplier, specs, Some(product), snapshot);
        let diamond_bill = price_diamond_bill(specs.diamond_details.as_deref(), snapshot);
        let gemstone_bill = price_gemstone_bill(specs.gemstone_details.as_deref(), snapshot);
        let labor_details = calculate_labor_cost(specs.stone_count(), snapshot.labor_constants());

        let metal_cost = metal_details.metal_cost.unwrap_or(0.0);
        let diamond_cost = diamond_bill.total_cost;
        let gemstone_cost = gemstone_bill.total_cost;
        let labor_cost = labor_details.total_cost;

        CostEstimation {
            total_cost: metal_cost + diamond_cost + gemstone_cost + labor_cost,
            metal_cost,
            diamond_cost,
            gemstone_cost,
            labor_cost,
            metal_details,
            diamond_bill,
            gemstone_bill,
            labor_details,
        }
    }
}
