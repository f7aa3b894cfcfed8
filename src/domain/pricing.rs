// ==========================================
// 珠宝成本预估系统 - 定价快照
// ==========================================
// 职责: 一次批量运行的只读定价视图(供应商表/宝石表/标准费率/人工费常量)
// 红线: 快照在批次开始前捕获一次,批次内不得重新拉取,保证同批一致性
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// Lee's 供应商表行
// ==========================================
// 以 Item Number 为键,Per Piece 为每件单价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeesPartRecord {
    pub item_number: String,
    /// 每件单价,缺失时该行不可作为命中结果
    pub per_piece: Option<f64>,
    /// 每百件金重(锱),仅供展示
    pub dwt_per_100: Option<f64>,
}

// ==========================================
// IKSAN 供应商表行
// ==========================================
// 行内自带完整成本分解,计价直接取 total_cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IksanPartRecord {
    pub sku: String,
    pub weight: Option<f64>,
    pub metal_price: Option<f64>,
    pub labor_fee: Option<f64>,
    pub labor_price: Option<f64>,
    pub total_cost: Option<f64>,
}

// ==========================================
// IKSAN 表头金价展示数据
// ==========================================
// 仅用于诊断展示,不参与成本计算
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldPricingDisplay {
    pub todays_gold: String,
    pub gold_oz: String,
    pub gold_gram: String,
}

// ==========================================
// 钻石价格表行(天然/培育共用结构)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiamondPriceRow {
    pub product_id: String,
    pub category: Option<String>,
    /// 每克拉单价
    pub ppc: Option<f64>,
    pub carat_per_unit: Option<f64>,
    /// 每粒单价
    pub item_price: Option<f64>,
    pub size: Option<String>,
}

// ==========================================
// 宝石价格表行(按宝石类型分表)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GemstonePriceRow {
    pub product_id: String,
    pub gemstone_type: String,
    pub shape: Option<String>,
    pub size: Option<String>,
    pub ppc: Option<f64>,
    pub carat_per_unit: Option<f64>,
    pub item_price: Option<f64>,
}

// ==========================================
// 人工费常量
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaborConstants {
    /// 每颗石头的镶嵌费
    pub setting_cost_per_stone: f64,
    /// 固定人工费
    pub fixed_labor_cost: f64,
}

impl Default for LaborConstants {
    fn default() -> Self {
        Self {
            setting_cost_per_stone: 1.0,
            fixed_labor_cost: 20.0,
        }
    }
}

// ==========================================
// PricingSnapshot - 定价快照
// ==========================================
/// 一次批量运行的不可变定价视图
///
/// # 所有权
/// 在批次开始前由导入层构建,整批共享只读引用,任何 SKU 不得修改。
///
/// # 缺失语义
/// 任何表允许为空、费率表和人工费允许为 None —— 均表示"使用内置回退常量",
/// 从不视为致命错误。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingSnapshot {
    pub captured_at: Option<DateTime<Utc>>,
    pub lees_parts: Vec<LeesPartRecord>,
    pub iksan_parts: Vec<IksanPartRecord>,
    pub iksan_gold: Option<GoldPricingDisplay>,
    pub natural_diamonds: Vec<DiamondPriceRow>,
    pub lab_diamonds: Vec<DiamondPriceRow>,
    /// 宝石类型(小写) → 价格表
    pub gemstones: HashMap<String, Vec<GemstonePriceRow>>,
    /// 纯度键(10k/14k/18k/950) → 每克费率,None 表示快照未提供
    pub metal_rates: Option<HashMap<String, f64>>,
    pub labor: Option<LaborConstants>,
}

impl PricingSnapshot {
    /// 空快照(测试/降级场景)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lees_table(&self) -> &[LeesPartRecord] {
        &self.lees_parts
    }

    pub fn iksan_table(&self) -> &[IksanPartRecord] {
        &self.iksan_parts
    }

    pub fn iksan_gold_pricing(&self) -> Option<&GoldPricingDisplay> {
        self.iksan_gold.as_ref()
    }

    /// 按类型取宝石表,键小写归一;无该类型返回空表
    pub fn gemstone_table(&self, gemstone_type: &str) -> &[GemstonePriceRow] {
        let key = gemstone_type.trim().to_lowercase();
        self.gemstones.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 快照中的实时金属费率,无该键返回 None(调用方回退内置常量表)
    pub fn metal_rate(&self, rate_key: &str) -> Option<f64> {
        self.metal_rates.as_ref()?.get(rate_key).copied()
    }

    /// 人工费常量,快照缺失时回退默认值
    pub fn labor_constants(&self) -> LaborConstants {
        self.labor.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_falls_back() {
        let snap = PricingSnapshot::empty();
        assert!(snap.lees_table().is_empty());
        assert!(snap.gemstone_table("Sapphire").is_empty());
        assert_eq!(snap.metal_rate("14k"), None);
        let labor = snap.labor_constants();
        assert_eq!(labor.setting_cost_per_stone, 1.0);
        assert_eq!(labor.fixed_labor_cost, 20.0);
    }

    #[test]
    fn test_gemstone_table_key_normalized() {
        let mut snap = PricingSnapshot::empty();
        snap.gemstones.insert(
            "ruby".to_string(),
            vec![GemstonePriceRow {
                product_id: "R-1".to_string(),
                gemstone_type: "ruby".to_string(),
                shape: None,
                size: None,
                ppc: None,
                carat_per_unit: None,
                item_price: Some(12.0),
            }],
        );
        assert_eq!(snap.gemstone_table(" Ruby ").len(), 1);
        assert_eq!(snap.gemstone_table("RUBY")[0].item_price, Some(12.0));
    }

    #[test]
    fn test_metal_rate_lookup() {
        let mut snap = PricingSnapshot::empty();
        let mut rates = HashMap::new();
        rates.insert("14k".to_string(), 65.5);
        snap.metal_rates = Some(rates);
        assert_eq!(snap.metal_rate("14k"), Some(65.5));
        assert_eq!(snap.metal_rate("18k"), None);
    }
}
