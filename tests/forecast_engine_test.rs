// ==========================================
// 批量预测引擎 - 集成测试
// ==========================================

use async_trait::async_trait;
use jewelry_cost_forecast::domain::pricing::{DiamondPriceRow, PricingSnapshot};
use jewelry_cost_forecast::domain::product::{
    DiamondSpec, ProductRecord, ProductSpecifications, SkuInput, SupplierData,
};
use jewelry_cost_forecast::engine::forecast::ForecastEngine;
use jewelry_cost_forecast::engine::sku_pipeline::{ProductDataSource, ProductEnrichment};
use std::collections::HashMap;
use std::sync::Arc;

// ==========================================
// 内存 Mock 协作者
// ==========================================

struct MockCatalog {
    products: HashMap<String, (ProductRecord, ProductSpecifications)>,
}

impl MockCatalog {
    fn new(entries: Vec<(ProductRecord, ProductSpecifications)>) -> Self {
        Self {
            products: entries
                .into_iter()
                .map(|(p, s)| (p.sku.clone(), (p, s)))
                .collect(),
        }
    }
}

#[async_trait]
impl ProductDataSource for MockCatalog {
    async fn fetch_product(&self, sku: &str) -> anyhow::Result<Option<ProductRecord>> {
        Ok(self.products.get(sku).map(|(p, _)| p.clone()))
    }
}

#[async_trait]
impl ProductEnrichment for MockCatalog {
    async fn enrich(&self, product: &ProductRecord) -> anyhow::Result<ProductSpecifications> {
        self.products
            .get(&product.sku)
            .map(|(_, s)| s.clone())
            .ok_or_else(|| anyhow::anyhow!("no specs for {}", product.sku))
    }
}

fn plain_product(sku: &str) -> ProductRecord {
    ProductRecord {
        sku: sku.to_string(),
        title: Some("14K Ring".to_string()),
        supplier: SupplierData::default(),
        ..Default::default()
    }
}

fn plain_specs() -> ProductSpecifications {
    ProductSpecifications {
        metal_purity: Some("14K".to_string()),
        metal_weight: Some(2.0),
        ..Default::default()
    }
}

fn engine_with(entries: Vec<(ProductRecord, ProductSpecifications)>) -> ForecastEngine<MockCatalog, MockCatalog> {
    let catalog = Arc::new(MockCatalog::new(entries));
    ForecastEngine::new(catalog.clone(), catalog)
}

// 单件成本: 金属 14k 60×2.0=120, 无石头, 人工 20 → 140
const PLAIN_UNIT_COST: f64 = 140.0;

// ==========================================
// 失败隔离与顺序
// ==========================================

#[tokio::test]
async fn test_failed_sku_does_not_affect_siblings() {
    let engine = engine_with(vec![
        (plain_product("SKU-1"), plain_specs()),
        (plain_product("SKU-3"), plain_specs()),
    ]);
    let items = vec![
        SkuInput::new("SKU-1", 1),
        SkuInput::new("SKU-2", 5),
        SkuInput::new("SKU-3", 1),
    ];

    let analysis = engine
        .run_batch(&items, None, &PricingSnapshot::empty())
        .await;

    assert_eq!(analysis.summary.total_skus, 3);
    assert_eq!(analysis.summary.successful_skus, 2);
    assert_eq!(analysis.summary.failed_skus, 1);

    // 输出顺序与输入一一对应
    let skus: Vec<&str> = analysis
        .processed_skus
        .iter()
        .map(|r| r.sku.as_str())
        .collect();
    assert_eq!(skus, vec!["SKU-1", "SKU-2", "SKU-3"]);

    let failed = &analysis.processed_skus[1];
    assert!(!failed.success);
    assert_eq!(
        failed.error.as_deref(),
        Some("Product with SKU 'SKU-2' not found.")
    );
    assert!(failed.cost_estimation.is_none());

    // 失败行不贡献数量与成本
    assert_eq!(analysis.summary.total_quantity, 2);
    assert!((analysis.summary.total_estimated_cost - 2.0 * PLAIN_UNIT_COST).abs() < 1e-9);
}

// ==========================================
// 数量缩放与均价
// ==========================================

#[tokio::test]
async fn test_quantity_scales_each_component() {
    let mut snapshot = PricingSnapshot::empty();
    snapshot.natural_diamonds.push(DiamondPriceRow {
        product_id: "D-100".to_string(),
        category: None,
        ppc: None,
        carat_per_unit: None,
        item_price: Some(40.0),
        size: None,
    });

    let specs = ProductSpecifications {
        metal_purity: Some("14K".to_string()),
        metal_weight: Some(2.0),
        diamond_details: Some(vec![DiamondSpec {
            diamond_type: Some("Natural".to_string()),
            product_id: Some("D-100".to_string()),
            carat_value: None,
            quantity: 2,
        }]),
        ..Default::default()
    };
    let engine = engine_with(vec![(plain_product("SKU-1"), specs)]);
    let items = vec![SkuInput::new("SKU-1", 10)];

    let analysis = engine.run_batch(&items, None, &snapshot).await;

    // 单件: 金属 120 + 钻石 80 + 人工 (2×1+20)=22 → 222
    assert!((analysis.summary.total_metal_cost - 1200.0).abs() < 1e-9);
    assert!((analysis.summary.total_diamond_cost - 800.0).abs() < 1e-9);
    assert!((analysis.summary.total_labor_cost - 220.0).abs() < 1e-9);
    assert!((analysis.summary.total_estimated_cost - 2220.0).abs() < 1e-9);
    assert!((analysis.summary.average_cost_per_unit - 222.0).abs() < 1e-9);

    let diamond = analysis.breakdowns.by_diamond_type.get("Natural").unwrap();
    assert_eq!(diamond.quantity, 20);
    assert!((diamond.cost - 800.0).abs() < 1e-9);

    let metal = analysis.breakdowns.by_metal_type.get("14k").unwrap();
    assert!((metal.weight - 20.0).abs() < 1e-9);
    assert!((metal.cost - 1200.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_aggregation_linear_in_quantity() {
    let engine = engine_with(vec![(plain_product("SKU-1"), plain_specs())]);
    let snapshot = PricingSnapshot::empty();

    let once = engine
        .run_batch(&[SkuInput::new("SKU-1", 3)], None, &snapshot)
        .await;
    let split = engine
        .run_batch(
            &[SkuInput::new("SKU-1", 1), SkuInput::new("SKU-1", 2)],
            None,
            &snapshot,
        )
        .await;

    assert!(
        (once.summary.total_estimated_cost - split.summary.total_estimated_cost).abs() < 1e-9
    );
    assert_eq!(once.summary.total_quantity, split.summary.total_quantity);
}

// ==========================================
// 增长率外推
// ==========================================

#[tokio::test]
async fn test_growth_projection_exact() {
    let engine = engine_with(vec![(plain_product("SKU-1"), plain_specs())]);
    let analysis = engine
        .run_batch(
            &[SkuInput::new("SKU-1", 2)],
            Some(15.0),
            &PricingSnapshot::empty(),
        )
        .await;

    let total = analysis.summary.total_estimated_cost;
    let projected = analysis.summary.projected_cost_with_growth.unwrap();
    assert!((projected - total * 1.15).abs() < 1e-9);
    assert_eq!(analysis.growth_percentage, Some(15.0));
}

#[tokio::test]
async fn test_no_growth_no_projection() {
    let engine = engine_with(vec![(plain_product("SKU-1"), plain_specs())]);
    let analysis = engine
        .run_batch(&[SkuInput::new("SKU-1", 2)], None, &PricingSnapshot::empty())
        .await;
    assert!(analysis.summary.projected_cost_with_growth.is_none());
}

#[tokio::test]
async fn test_zero_growth_projects_unchanged_total() {
    let engine = engine_with(vec![(plain_product("SKU-1"), plain_specs())]);
    let analysis = engine
        .run_batch(
            &[SkuInput::new("SKU-1", 2)],
            Some(0.0),
            &PricingSnapshot::empty(),
        )
        .await;
    assert_eq!(
        analysis.summary.projected_cost_with_growth,
        Some(analysis.summary.total_estimated_cost)
    );
}

// ==========================================
// 分解与边界
// ==========================================

#[tokio::test]
async fn test_unknown_diamond_type_bucket() {
    let specs = ProductSpecifications {
        metal_purity: Some("14K".to_string()),
        metal_weight: Some(1.0),
        diamond_details: Some(vec![DiamondSpec {
            diamond_type: None,
            product_id: None,
            carat_value: None,
            quantity: 3,
        }]),
        ..Default::default()
    };
    let engine = engine_with(vec![(plain_product("SKU-1"), specs)]);
    let analysis = engine
        .run_batch(&[SkuInput::new("SKU-1", 1)], None, &PricingSnapshot::empty())
        .await;

    let unknown = analysis.breakdowns.by_diamond_type.get("Unknown").unwrap();
    assert_eq!(unknown.quantity, 3);
    assert_eq!(unknown.cost, 0.0);
}

#[tokio::test]
async fn test_empty_batch_zero_average() {
    let engine = engine_with(vec![]);
    let analysis = engine
        .run_batch(&[], Some(10.0), &PricingSnapshot::empty())
        .await;
    assert_eq!(analysis.summary.total_skus, 0);
    assert_eq!(analysis.summary.average_cost_per_unit, 0.0);
    assert_eq!(analysis.summary.projected_cost_with_growth, Some(0.0));
    assert!(!analysis.batch_id.is_empty());
}

#[tokio::test]
async fn test_invalid_specs_make_sku_fail() {
    // 规格缺金属重量: 标准计算硬失败,对该SKU致命
    let specs = ProductSpecifications {
        metal_purity: Some("14K".to_string()),
        metal_weight: None,
        ..Default::default()
    };
    let engine = engine_with(vec![(plain_product("SKU-1"), specs)]);
    let analysis = engine
        .run_batch(&[SkuInput::new("SKU-1", 1)], None, &PricingSnapshot::empty())
        .await;

    let row = &analysis.processed_skus[0];
    assert!(!row.success);
    assert!(row
        .error
        .as_deref()
        .unwrap()
        .contains("Metal cost calculation failed"));
    assert_eq!(analysis.summary.failed_skus, 1);
}
