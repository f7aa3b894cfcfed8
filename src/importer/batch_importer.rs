// ==========================================
// 珠宝成本预估系统 - 批量输入文件导入器
// ==========================================
// 职责: 解析用户上传的批量 CSV(sku, quantity)为输入项列表
// 红线: 数量非法按行报错并携带行号,不静默丢弃
// ==========================================

use crate::domain::product::SkuInput;
use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::info;

pub struct BatchFileImporter;

impl BatchFileImporter {
    /// 解析批量 CSV,表头须含 sku 与 quantity 列(不区分大小写)
    pub fn parse_csv<P: AsRef<Path>>(path: P) -> ImportResult<Vec<SkuInput>> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            return Err(ImportError::UnsupportedFormat(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_string(),
            ));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        let sku_idx = headers
            .iter()
            .position(|h| h == "sku")
            .ok_or_else(|| ImportError::FieldMappingError {
                row: 1,
                message: "缺少 sku 列".to_string(),
            })?;
        let quantity_idx = headers.iter().position(|h| h == "quantity").ok_or_else(|| {
            ImportError::FieldMappingError {
                row: 1,
                message: "缺少 quantity 列".to_string(),
            }
        })?;

        let mut items = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            // 表头占第 1 行,数据从第 2 行起
            let row = row_idx + 2;

            let sku = record.get(sku_idx).unwrap_or("").trim().to_string();
            let quantity_raw = record.get(quantity_idx).unwrap_or("").trim();

            // 跳过完全空白的行
            if sku.is_empty() && quantity_raw.is_empty() {
                continue;
            }
            if sku.is_empty() {
                return Err(ImportError::PrimaryKeyMissing(row));
            }

            let quantity: u32 =
                quantity_raw
                    .parse()
                    .map_err(|_| ImportError::TypeConversionError {
                        row,
                        field: "quantity".to_string(),
                        message: format!("期望正整数,实际 {:?}", quantity_raw),
                    })?;
            if quantity == 0 {
                return Err(ImportError::ValidationError {
                    row,
                    message: "quantity 必须大于 0".to_string(),
                });
            }

            items.push(SkuInput::new(sku, quantity));
        }

        info!(count = items.len(), "批量输入解析完成");
        Ok(items)
    }
}
