// ==========================================
// 珠宝SKU成本预估与批量预测系统 - CLI 主入口
// ==========================================
// 用法: jewelry-cost-forecast <批量CSV> [增长率%]
//       (定价工作簿/商品目录路径来自 forecast_config.json)
// ==========================================

use jewelry_cost_forecast::importer::{
    BatchFileImporter, JsonProductCatalog, PricingWorkbookImporter,
};
use jewelry_cost_forecast::{logging, ForecastConfig, ForecastEngine};
use std::process::ExitCode;
use std::sync::Arc;

const CONFIG_PATH: &str = "forecast_config.json";

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 决策支持系统", jewelry_cost_forecast::APP_NAME);
    tracing::info!("系统版本: {}", jewelry_cost_forecast::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().collect();
    let batch_path = match args.get(1) {
        Some(p) => p.clone(),
        None => {
            eprintln!("用法: jewelry-cost-forecast <批量CSV> [增长率%]");
            return ExitCode::from(2);
        }
    };
    let growth_arg: Option<f64> = match args.get(2) {
        Some(raw) => match raw.parse() {
            Ok(g) => Some(g),
            Err(_) => {
                eprintln!("增长率必须是数字,实际: {}", raw);
                return ExitCode::from(2);
            }
        },
        None => None,
    };

    match run(&batch_path, growth_arg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "批量预测失败");
            eprintln!("错误: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(batch_path: &str, growth_arg: Option<f64>) -> anyhow::Result<()> {
    let config = ForecastConfig::load(CONFIG_PATH)?;
    let growth = growth_arg.or(config.default_growth_percentage);

    // 批次开始前捕获一次定价快照,整批共享
    let mut snapshot = PricingWorkbookImporter::load_snapshot(&config.pricing_workbook)?;
    config.apply_rate_overrides(&mut snapshot);

    let catalog = Arc::new(JsonProductCatalog::load(&config.product_catalog)?);
    let items = BatchFileImporter::parse_csv(batch_path)?;

    let engine = ForecastEngine::new(catalog.clone(), catalog);
    let analysis = engine.run_batch(&items, growth, &snapshot).await;

    println!("{}", serde_json::to_string_pretty(&analysis)?);

    tracing::info!(
        batch_id = %analysis.batch_id,
        successful = analysis.summary.successful_skus,
        failed = analysis.summary.failed_skus,
        total_cost = analysis.summary.total_estimated_cost,
        "批量预测完成"
    );
    Ok(())
}
