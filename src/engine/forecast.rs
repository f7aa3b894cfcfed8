// ==========================================
// 珠宝成本预估系统 - 批量预测引擎
// ==========================================
// 职责: 严格顺序处理批量SKU,聚合汇总与类型化分解,计算增长率预估
// 红线: 严格顺序处理是背压决策,不得并发化;单SKU失败不影响其余SKU
// 红线: 聚合器是纯函数,只消费已固化的单SKU结果,不触达外部系统
// ==========================================

use crate::domain::cost::{
    ForecastAnalysis, ForecastBreakdowns, ForecastSummary, ProcessedSkuResult,
};
use crate::domain::pricing::PricingSnapshot;
use crate::domain::product::SkuInput;
use crate::domain::types::MetalPurity;
use crate::engine::sku_pipeline::{ProductDataSource, ProductEnrichment, SkuCostPipeline};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

const UNKNOWN_TYPE: &str = "Unknown";

// ==========================================
// ForecastEngine - 批量预测引擎
// ==========================================
pub struct ForecastEngine<D, E> {
    pipeline: SkuCostPipeline<D, E>,
}

impl<D, E> ForecastEngine<D, E>
where
    D: ProductDataSource,
    E: ProductEnrichment,
{
    pub fn new(source: Arc<D>, enrichment: Arc<E>) -> Self {
        Self {
            pipeline: SkuCostPipeline::new(source, enrichment),
        }
    }

    /// 运行一次批量预测
    ///
    /// 输出顺序与输入顺序一一对应;快照在整批内共享只读。
    #[instrument(skip_all, fields(batch_size = items.len(), growth = ?growth_percentage))]
    pub async fn run_batch(
        &self,
        items: &[SkuInput],
        growth_percentage: Option<f64>,
        snapshot: &PricingSnapshot,
    ) -> ForecastAnalysis {
        let mut processed = Vec::with_capacity(items.len());
        for item in items {
            // 严格顺序: 避免对上游商品数据源造成突发压力
            let row = self.pipeline.process_single_sku(item, snapshot).await;
            processed.push(row);
        }

        let analysis = aggregate_forecast(processed, growth_percentage);
        info!(
            batch_id = %analysis.batch_id,
            total = analysis.summary.total_skus,
            failed = analysis.summary.failed_skus,
            total_cost = analysis.summary.total_estimated_cost,
            "批量预测完成"
        );
        analysis
    }
}

// ==========================================
// 聚合器(纯函数)
// ==========================================

/// 折叠单SKU结果为批量分析
///
/// # 折叠规则
/// - 仅成功行贡献成本;每个成本分量独立按数量缩放
/// - 类型分解键缺失归 "Unknown";金属分解按归一化纯度键累计重量与成本
/// - 均价 = 总成本 / 成功行总数量,数量为零时归 0
/// - 增长预估仅在提供非负增长率时计算: total * (1 + g/100)
pub fn aggregate_forecast(
    processed: Vec<ProcessedSkuResult>,
    growth_percentage: Option<f64>,
) -> ForecastAnalysis {
    let mut summary = ForecastSummary {
        total_skus: processed.len(),
        ..Default::default()
    };
    let mut breakdowns = ForecastBreakdowns::default();

    for row in &processed {
        if !row.success {
            summary.failed_skus += 1;
            continue;
        }
        summary.successful_skus += 1;

        let quantity = f64::from(row.quantity);
        summary.total_quantity += u64::from(row.quantity);

        let estimation = match &row.cost_estimation {
            Some(e) => e,
            None => continue,
        };

        summary.total_estimated_cost += estimation.total_cost * quantity;
        summary.total_diamond_cost += estimation.diamond_cost * quantity;
        summary.total_gemstone_cost += estimation.gemstone_cost * quantity;
        summary.total_metal_cost += estimation.metal_cost * quantity;
        summary.total_labor_cost += estimation.labor_cost * quantity;

        let part2 = estimation.metal_details.part2_price().unwrap_or(0.0) * quantity;
        let part3 = estimation.metal_details.mfg_part_price().unwrap_or(0.0) * quantity;
        summary.total_part2_cost += part2;
        summary.total_part3_cost += part3;
        breakdowns.by_manufacturing.part2 += part2;
        breakdowns.by_manufacturing.part3 += part3;
        breakdowns.by_manufacturing.labor += estimation.labor_cost * quantity;

        for line in &estimation.diamond_bill.lines {
            let entry = breakdowns
                .by_diamond_type
                .entry(line.stone_type.clone())
                .or_default();
            entry.quantity += u64::from(line.quantity) * u64::from(row.quantity);
            entry.cost += line.total_price * quantity;
        }
        for line in &estimation.gemstone_bill.lines {
            let entry = breakdowns
                .by_gemstone_type
                .entry(line.stone_type.clone())
                .or_default();
            entry.quantity += u64::from(line.quantity) * u64::from(row.quantity);
            entry.cost += line.total_price * quantity;
        }

        if let Some(specs) = &row.specifications {
            let purity_raw = specs.metal_purity.as_deref().unwrap_or("").trim();
            let key = MetalPurity::normalize(purity_raw)
                .map(|p| p.rate_key().to_string())
                .unwrap_or_else(|| {
                    if purity_raw.is_empty() {
                        UNKNOWN_TYPE.to_string()
                    } else {
                        purity_raw.to_string()
                    }
                });
            let entry = breakdowns.by_metal_type.entry(key).or_default();
            entry.weight += specs.metal_weight.unwrap_or(0.0) * quantity;
            entry.cost += estimation.metal_cost * quantity;
        }
    }

    summary.average_cost_per_unit = if summary.total_quantity > 0 {
        summary.total_estimated_cost / summary.total_quantity as f64
    } else {
        0.0
    };

    // 负增长率视为未提供,不外推
    summary.projected_cost_with_growth = growth_percentage
        .filter(|g| *g >= 0.0)
        .map(|g| summary.total_estimated_cost * (1.0 + g / 100.0));

    ForecastAnalysis {
        batch_id: Uuid::new_v4().to_string(),
        generated_at: Utc::now(),
        processed_skus: processed,
        summary,
        growth_percentage,
        breakdowns,
    }
}
