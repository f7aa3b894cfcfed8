// ==========================================
// 珠宝成本预估系统 - 导入层
// ==========================================
// 职责: 定价工作簿 / 批量输入 / 本地商品目录 的文件解析与快照构建
// ==========================================

pub mod batch_importer;
pub mod catalog;
pub mod error;
pub mod pricing_importer;

pub use batch_importer::BatchFileImporter;
pub use catalog::{CatalogEntry, JsonProductCatalog};
pub use error::{ImportError, ImportResult};
pub use pricing_importer::PricingWorkbookImporter;
