// ==========================================
// 导入层 - 集成测试
// ==========================================

use jewelry_cost_forecast::importer::{
    BatchFileImporter, ImportError, JsonProductCatalog, PricingWorkbookImporter,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn temp_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

// ==========================================
// 批量 CSV
// ==========================================

#[test]
fn test_batch_csv_valid_file() {
    let file = temp_csv(&["sku,quantity", "SKU-1,10", "SKU-2,3"]);
    let items = BatchFileImporter::parse_csv(file.path()).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].sku, "SKU-1");
    assert_eq!(items[0].quantity, 10);
    assert_eq!(items[1].quantity, 3);
}

#[test]
fn test_batch_csv_header_case_insensitive() {
    let file = temp_csv(&["SKU,Quantity", "SKU-1,5"]);
    let items = BatchFileImporter::parse_csv(file.path()).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5);
}

#[test]
fn test_batch_csv_skips_blank_rows() {
    let file = temp_csv(&["sku,quantity", "SKU-1,2", ",", "SKU-2,4"]);
    let items = BatchFileImporter::parse_csv(file.path()).unwrap();
    assert_eq!(items.len(), 2);
}

#[test]
fn test_batch_csv_zero_quantity_reports_row() {
    let file = temp_csv(&["sku,quantity", "SKU-1,2", "SKU-2,0"]);
    let err = BatchFileImporter::parse_csv(file.path()).unwrap_err();
    match err {
        ImportError::ValidationError { row, .. } => assert_eq!(row, 3),
        other => panic!("期望 ValidationError,实际 {:?}", other),
    }
}

#[test]
fn test_batch_csv_bad_quantity_reports_field() {
    let file = temp_csv(&["sku,quantity", "SKU-1,abc"]);
    let err = BatchFileImporter::parse_csv(file.path()).unwrap_err();
    match err {
        ImportError::TypeConversionError { row, field, .. } => {
            assert_eq!(row, 2);
            assert_eq!(field, "quantity");
        }
        other => panic!("期望 TypeConversionError,实际 {:?}", other),
    }
}

#[test]
fn test_batch_csv_missing_sku_column() {
    let file = temp_csv(&["code,quantity", "SKU-1,2"]);
    let err = BatchFileImporter::parse_csv(file.path()).unwrap_err();
    assert!(matches!(err, ImportError::FieldMappingError { .. }));
}

#[test]
fn test_batch_csv_file_not_found() {
    let err = BatchFileImporter::parse_csv("missing_batch.csv").unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));
}

// ==========================================
// 定价工作簿
// ==========================================

#[test]
fn test_pricing_workbook_file_not_found() {
    let err = PricingWorkbookImporter::load_snapshot("missing_pricing.xlsx").unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));
}

#[test]
fn test_pricing_workbook_rejects_wrong_extension() {
    let file = temp_csv(&["sku,quantity"]);
    let err = PricingWorkbookImporter::load_snapshot(file.path()).unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(_)));
}

// ==========================================
// 商品目录
// ==========================================

#[test]
fn test_catalog_loads_json() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"[
            {{
                "sku": "SKU-1",
                "title": "14K Stud Earrings",
                "supplier": {{"supplier_name": "Lee's Manufacturing", "mfg_part": "AB-100", "part2": null}},
                "specifications": {{"metal_purity": "14K", "metal_weight": 2.0}}
            }}
        ]"#
    )
    .unwrap();

    let catalog = JsonProductCatalog::load(file.path()).unwrap();
    assert_eq!(catalog.len(), 1);
}

#[test]
fn test_catalog_rejects_malformed_json() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, "{{ not json").unwrap();
    let err = JsonProductCatalog::load(file.path()).unwrap_err();
    assert!(matches!(err, ImportError::JsonParseError(_)));
}
