// ==========================================
// 珠宝成本预估系统 - 本地商品目录
// ==========================================
// 职责: JSON 商品目录文件 → 商品数据源/规格化服务的本地实现
// 用途: CLI 离线运行与测试;线上部署可替换为外部商品系统适配器
// ==========================================

use crate::domain::product::{ProductRecord, ProductSpecifications};
use crate::engine::sku_pipeline::{ProductDataSource, ProductEnrichment};
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// 目录文件中的单条商品: 原始记录 + 已规格化的规格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub product: ProductRecord,
    pub specifications: ProductSpecifications,
}

// ==========================================
// JsonProductCatalog
// ==========================================
/// 以 SKU 为键的内存商品目录,同时充当数据源与规格化服务
#[derive(Debug)]
pub struct JsonProductCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl JsonProductCatalog {
    /// 从 JSON 目录文件加载(顶层为 CatalogEntry 数组)
    pub fn load<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let entries: Vec<CatalogEntry> = serde_json::from_reader(BufReader::new(file))?;
        info!(count = entries.len(), "商品目录加载完成");
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.product.sku.clone(), e))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ProductDataSource for JsonProductCatalog {
    async fn fetch_product(&self, sku: &str) -> anyhow::Result<Option<ProductRecord>> {
        Ok(self.entries.get(sku).map(|e| e.product.clone()))
    }
}

#[async_trait]
impl ProductEnrichment for JsonProductCatalog {
    async fn enrich(&self, product: &ProductRecord) -> anyhow::Result<ProductSpecifications> {
        self.entries
            .get(&product.sku)
            .map(|e| e.specifications.clone())
            .ok_or_else(|| anyhow::anyhow!("目录中无 SKU {} 的规格数据", product.sku))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::SupplierData;

    fn entry(sku: &str) -> CatalogEntry {
        CatalogEntry {
            product: ProductRecord {
                sku: sku.to_string(),
                title: Some("14K Ring".to_string()),
                supplier: SupplierData::default(),
                ..Default::default()
            },
            specifications: ProductSpecifications {
                metal_purity: Some("14K".to_string()),
                metal_weight: Some(2.0),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_catalog_fetch_and_enrich() {
        let catalog = JsonProductCatalog::from_entries(vec![entry("SKU-1")]);
        let product = catalog.fetch_product("SKU-1").await.unwrap().unwrap();
        assert_eq!(product.sku, "SKU-1");
        let specs = catalog.enrich(&product).await.unwrap();
        assert_eq!(specs.metal_weight, Some(2.0));

        assert!(catalog.fetch_product("SKU-404").await.unwrap().is_none());
    }
}
