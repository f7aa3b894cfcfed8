// ==========================================
// 珠宝成本预估系统 - 定价工作簿导入器
// ==========================================
// 职责: 从多 Sheet Excel 工作簿构建一次批量运行的定价快照
// 红线: 任何 Sheet 缺失都按空表降级并告警,从不使导入失败
//       (快照的缺失语义由计价引擎的回退常量兜底)
// ==========================================

use crate::domain::pricing::{
    DiamondPriceRow, GemstonePriceRow, GoldPricingDisplay, IksanPartRecord, LaborConstants,
    LeesPartRecord, PricingSnapshot,
};
use crate::domain::types::MetalPurity;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use chrono::Utc;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{info, warn};

// 工作簿 Sheet 命名约定
pub const SHEET_LEES: &str = "LEES_SUPPLIER_DATA";
pub const SHEET_IKSAN: &str = "IKSAN_SUPPLIER_DATA";
pub const SHEET_METAL_COST: &str = "METAL_COST";
pub const SHEET_LABOR_COST: &str = "LABOR_COST";
pub const SHEET_NATURAL_DIAMOND: &str = "NATURAL_DIAMOND_DATA";
pub const SHEET_LAB_DIAMOND: &str = "LAB_DIAMOND_DATA";

// 宝石类型 → Sheet 名
const GEMSTONE_SHEETS: &[(&str, &str)] = &[
    ("sapphire", "SAPPHIRE_DATA"),
    ("ruby", "RUBY_DATA"),
    ("emerald", "EMERALD_DATA"),
    ("topaz", "TOPAZ_DATA"),
    ("amethyst", "AMETHYST_DATA"),
    ("citrine", "CITRINE_DATA"),
    ("peridot", "PERIDOT_DATA"),
    ("tourmaline", "TOURMALINE_DATA"),
    ("opal", "OPAL_DATA"),
    ("garnet", "GARNET_DATA"),
];

// ==========================================
// PricingWorkbookImporter
// ==========================================
pub struct PricingWorkbookImporter;

impl PricingWorkbookImporter {
    /// 读取定价工作簿,构建快照
    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> ImportResult<PricingSnapshot> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "xlsx" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

        let mut snapshot = PricingSnapshot {
            captured_at: Some(Utc::now()),
            ..Default::default()
        };

        match Self::sheet_rows(&mut workbook, SHEET_LEES) {
            Some(rows) => snapshot.lees_parts = Self::map_lees_rows(&rows),
            None => warn!(sheet = SHEET_LEES, "工作表缺失,按空表降级"),
        }

        match Self::sheet_rows(&mut workbook, SHEET_IKSAN) {
            Some(rows) => {
                let (gold, parts) = Self::map_iksan_rows(&rows);
                snapshot.iksan_gold = gold;
                snapshot.iksan_parts = parts;
            }
            None => warn!(sheet = SHEET_IKSAN, "工作表缺失,按空表降级"),
        }

        match Self::sheet_rows(&mut workbook, SHEET_METAL_COST) {
            Some(rows) => snapshot.metal_rates = Self::map_metal_rate_rows(&rows),
            None => warn!(sheet = SHEET_METAL_COST, "工作表缺失,回退内置费率"),
        }

        match Self::sheet_rows(&mut workbook, SHEET_LABOR_COST) {
            Some(rows) => snapshot.labor = Self::map_labor_rows(&rows),
            None => warn!(sheet = SHEET_LABOR_COST, "工作表缺失,回退默认人工费"),
        }

        match Self::sheet_rows(&mut workbook, SHEET_NATURAL_DIAMOND) {
            Some(rows) => snapshot.natural_diamonds = Self::map_diamond_rows(&rows),
            None => warn!(sheet = SHEET_NATURAL_DIAMOND, "工作表缺失,按空表降级"),
        }

        match Self::sheet_rows(&mut workbook, SHEET_LAB_DIAMOND) {
            Some(rows) => snapshot.lab_diamonds = Self::map_diamond_rows(&rows),
            None => warn!(sheet = SHEET_LAB_DIAMOND, "工作表缺失,按空表降级"),
        }

        for (gem_type, sheet) in GEMSTONE_SHEETS {
            if let Some(rows) = Self::sheet_rows(&mut workbook, sheet) {
                let table = Self::map_gemstone_rows(&rows, gem_type);
                if !table.is_empty() {
                    snapshot.gemstones.insert((*gem_type).to_string(), table);
                }
            }
        }

        info!(
            lees = snapshot.lees_parts.len(),
            iksan = snapshot.iksan_parts.len(),
            natural_diamonds = snapshot.natural_diamonds.len(),
            lab_diamonds = snapshot.lab_diamonds.len(),
            gemstone_tables = snapshot.gemstones.len(),
            "定价快照构建完成"
        );
        Ok(snapshot)
    }

    /// 读取单个 Sheet 为字符串矩阵,Sheet 不存在返回 None
    fn sheet_rows<RS: Read + Seek>(workbook: &mut Xlsx<RS>, name: &str) -> Option<Vec<Vec<String>>> {
        let range = workbook.worksheet_range(name).ok()?;
        let rows = range
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.to_string().trim().to_string())
                    .collect()
            })
            .collect();
        Some(rows)
    }

    // ==========================================
    // 行映射(纯函数,便于单测)
    // ==========================================

    /// Lee's 表: 首行表头,Item Number 为键
    pub fn map_lees_rows(rows: &[Vec<String>]) -> Vec<LeesPartRecord> {
        let headers = match rows.first() {
            Some(h) => h,
            None => return Vec::new(),
        };
        let item_idx = find_column(headers, &["Item Number", "Item No", "Item"]);
        let per_piece_idx = find_column(headers, &["Per Piece", "Per Piece Price"]);
        let dwt_idx = find_column(headers, &["DWT/100", "100/DWT", "DWT Per 100"]);

        let item_idx = match item_idx {
            Some(i) => i,
            None => return Vec::new(),
        };

        rows[1..]
            .iter()
            .filter_map(|row| {
                let item_number = cell(row, Some(item_idx));
                if item_number.is_empty() {
                    return None;
                }
                Some(LeesPartRecord {
                    item_number,
                    per_piece: coerce_number(&cell(row, per_piece_idx)),
                    dwt_per_100: coerce_number(&cell(row, dwt_idx)),
                })
            })
            .collect()
    }

    /// IKSAN 表: 三行表头怪癖
    ///
    /// 第 1 行 B/D/F 列是当日金价展示数据,第 3 行是带冒号的列头,
    /// 数据从第 4 行开始;SKU 为空的行过滤掉。
    pub fn map_iksan_rows(rows: &[Vec<String>]) -> (Option<GoldPricingDisplay>, Vec<IksanPartRecord>) {
        let gold = rows.first().and_then(|row| {
            let todays_gold = cell(row, Some(1));
            let gold_oz = cell(row, Some(3));
            let gold_gram = cell(row, Some(5));
            if todays_gold.is_empty() && gold_oz.is_empty() && gold_gram.is_empty() {
                None
            } else {
                Some(GoldPricingDisplay {
                    todays_gold,
                    gold_oz,
                    gold_gram,
                })
            }
        });

        let headers: Vec<String> = match rows.get(2) {
            Some(h) => h
                .iter()
                .map(|s| s.trim_end_matches(':').trim().to_string())
                .collect(),
            None => return (gold, Vec::new()),
        };
        let sku_idx = find_column(&headers, &["SKU"]);
        let weight_idx = find_column(&headers, &["WEIGHT"]);
        let metal_idx = find_column(&headers, &["METAL PRICE"]);
        let labor_fee_idx = find_column(&headers, &["LABOR FEE"]);
        let labor_price_idx = find_column(&headers, &["LABOR PRICE"]);
        let total_idx = find_column(&headers, &["TOTAL COST", "TOTAL"]);

        let sku_idx = match sku_idx {
            Some(i) => i,
            None => return (gold, Vec::new()),
        };

        let parts = rows[3..]
            .iter()
            .filter_map(|row| {
                let sku = cell(row, Some(sku_idx));
                if sku.is_empty() {
                    return None;
                }
                Some(IksanPartRecord {
                    sku,
                    weight: coerce_number(&cell(row, weight_idx)),
                    metal_price: coerce_number(&cell(row, metal_idx)),
                    labor_fee: coerce_number(&cell(row, labor_fee_idx)),
                    labor_price: coerce_number(&cell(row, labor_price_idx)),
                    total_cost: coerce_number(&cell(row, total_idx)),
                })
            })
            .collect();

        (gold, parts)
    }

    /// 金属费率表: 纯度 → 每克费率,键按纯度归一化
    pub fn map_metal_rate_rows(rows: &[Vec<String>]) -> Option<HashMap<String, f64>> {
        let headers = rows.first()?;
        let purity_idx = find_column(headers, &["Purity", "Metal", "Metal Purity"])?;
        let rate_idx = find_column(headers, &["Rate", "Price Per Gram", "Cost Per Gram"])?;

        let mut rates = HashMap::new();
        for row in &rows[1..] {
            let purity = cell(row, Some(purity_idx));
            let rate = coerce_number(&cell(row, Some(rate_idx)));
            if purity.is_empty() {
                continue;
            }
            if let Some(rate) = rate {
                let key = MetalPurity::normalize(&purity)
                    .map(|p| p.rate_key().to_string())
                    .unwrap_or_else(|| purity.to_lowercase());
                rates.insert(key, rate);
            }
        }

        if rates.is_empty() {
            None
        } else {
            Some(rates)
        }
    }

    /// 人工费表: 首个数据行的两列常量
    pub fn map_labor_rows(rows: &[Vec<String>]) -> Option<LaborConstants> {
        let headers = rows.first()?;
        let setting_idx = find_column(
            headers,
            &["Setting Cost Per Stone", "Setting Cost", "Per Stone"],
        )?;
        let fixed_idx = find_column(headers, &["Fixed Labor Cost", "Fixed Cost", "Fixed Labor"])?;

        let row = rows.get(1)?;
        let defaults = LaborConstants::default();
        Some(LaborConstants {
            setting_cost_per_stone: coerce_number(&cell(row, Some(setting_idx)))
                .unwrap_or(defaults.setting_cost_per_stone),
            fixed_labor_cost: coerce_number(&cell(row, Some(fixed_idx)))
                .unwrap_or(defaults.fixed_labor_cost),
        })
    }

    /// 钻石表(天然/培育共用列结构)
    pub fn map_diamond_rows(rows: &[Vec<String>]) -> Vec<DiamondPriceRow> {
        let headers = match rows.first() {
            Some(h) => h,
            None => return Vec::new(),
        };
        let id_idx = match find_column(headers, &["Product ID", "ProductId", "ID"]) {
            Some(i) => i,
            None => return Vec::new(),
        };
        let category_idx = find_column(headers, &["Category"]);
        let ppc_idx = find_column(headers, &["PPC", "Price Per Carat"]);
        let carat_idx = find_column(headers, &["Carat Per Unit", "Carat/Unit"]);
        let price_idx = find_column(headers, &["Item Price", "Price"]);
        let size_idx = find_column(headers, &["Size"]);

        rows[1..]
            .iter()
            .filter_map(|row| {
                let product_id = cell(row, Some(id_idx));
                if product_id.is_empty() {
                    return None;
                }
                Some(DiamondPriceRow {
                    product_id,
                    category: non_empty(cell(row, category_idx)),
                    ppc: coerce_number(&cell(row, ppc_idx)),
                    carat_per_unit: coerce_number(&cell(row, carat_idx)),
                    item_price: coerce_number(&cell(row, price_idx)),
                    size: non_empty(cell(row, size_idx)),
                })
            })
            .collect()
    }

    /// 宝石表(按类型分 Sheet,类型由 Sheet 名确定)
    pub fn map_gemstone_rows(rows: &[Vec<String>], gemstone_type: &str) -> Vec<GemstonePriceRow> {
        let headers = match rows.first() {
            Some(h) => h,
            None => return Vec::new(),
        };
        let id_idx = match find_column(headers, &["Product ID", "ProductId", "ID"]) {
            Some(i) => i,
            None => return Vec::new(),
        };
        let shape_idx = find_column(headers, &["Shape"]);
        let size_idx = find_column(headers, &["Size"]);
        let ppc_idx = find_column(headers, &["PPC", "Price Per Carat"]);
        let carat_idx = find_column(headers, &["Carat Per Unit", "Carat/Unit"]);
        let price_idx = find_column(headers, &["Item Price", "Price"]);

        rows[1..]
            .iter()
            .filter_map(|row| {
                let product_id = cell(row, Some(id_idx));
                if product_id.is_empty() {
                    return None;
                }
                Some(GemstonePriceRow {
                    product_id,
                    gemstone_type: gemstone_type.to_string(),
                    shape: non_empty(cell(row, shape_idx)),
                    size: non_empty(cell(row, size_idx)),
                    ppc: coerce_number(&cell(row, ppc_idx)),
                    carat_per_unit: coerce_number(&cell(row, carat_idx)),
                    item_price: coerce_number(&cell(row, price_idx)),
                })
            })
            .collect()
    }
}

// ==========================================
// 单元格工具
// ==========================================

/// 货币/数值强转: 剥离 $ 与千分位逗号后解析
pub fn coerce_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 按候选名查找列索引(不区分大小写)
fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim().to_lowercase();
        names.iter().any(|n| h == n.to_lowercase())
    })
}

fn cell(row: &[String], idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i)).cloned().unwrap_or_default()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
