// ==========================================
// 珠宝成本预估系统 - 石头计价与人工费引擎
// ==========================================
// 职责: 钻石/宝石账单逐条计价,人工费按颗数线性计算
// 红线: 石头未命中是数据质量问题,计 $0 并留痕,从不使整个SKU失败
// ==========================================

use crate::domain::cost::{LaborCostDetails, StoneBill, StoneBillLine};
use crate::domain::pricing::{LaborConstants, PricingSnapshot};
use crate::domain::product::{DiamondSpec, GemstoneSpec};
use crate::domain::types::MatchType;
use crate::engine::part_lookup::lookup_part;

const UNKNOWN_TYPE: &str = "Unknown";

// ==========================================
// 钻石账单
// ==========================================

/// 逐条计价钻石规格
///
/// 类型含 "lab"(不区分大小写)走培育钻表,其余走天然钻表。
pub fn price_diamond_bill(details: Option<&[DiamondSpec]>, snapshot: &PricingSnapshot) -> StoneBill {
    let mut bill = StoneBill::default();

    for spec in details.unwrap_or(&[]) {
        let stone_type = spec
            .diamond_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_TYPE)
            .to_string();
        let table = if stone_type.to_lowercase().contains("lab") {
            &snapshot.lab_diamonds
        } else {
            &snapshot.natural_diamonds
        };

        let line = price_stone_line(
            stone_type,
            spec.product_id.as_deref(),
            spec.quantity,
            |key| {
                let lookup = lookup_part(key, table);
                (
                    lookup.record.and_then(|r| r.item_price),
                    lookup.match_type,
                    lookup.error,
                )
            },
        );

        if let Some(note) = &line.note {
            bill.errors.push(format!("Diamond {}: {}", line.stone_type, note));
        }
        bill.total_cost += line.total_price;
        bill.lines.push(line);
    }

    bill
}

// ==========================================
// 宝石账单
// ==========================================

/// 逐条计价宝石规格,按宝石类型取对应分表
pub fn price_gemstone_bill(
    details: Option<&[GemstoneSpec]>,
    snapshot: &PricingSnapshot,
) -> StoneBill {
    let mut bill = StoneBill::default();

    for spec in details.unwrap_or(&[]) {
        let stone_type = spec
            .gemstone_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_TYPE)
            .to_string();
        let table = snapshot.gemstone_table(&stone_type);

        let line = price_stone_line(
            stone_type,
            spec.product_id.as_deref(),
            spec.quantity,
            |key| {
                let lookup = lookup_part(key, table);
                (
                    lookup.record.and_then(|r| r.item_price),
                    lookup.match_type,
                    lookup.error,
                )
            },
        );

        if let Some(note) = &line.note {
            bill.errors
                .push(format!("Gemstone {}: {}", line.stone_type, note));
        }
        bill.total_cost += line.total_price;
        bill.lines.push(line);
    }

    bill
}

/// 单条石头计价: 命中取每粒单价×数量,未命中计 $0 并留痕
fn price_stone_line(
    stone_type: String,
    product_id: Option<&str>,
    quantity: u32,
    lookup: impl FnOnce(&str) -> (Option<f64>, MatchType, Option<String>),
) -> StoneBillLine {
    let key = product_id.unwrap_or("").trim();
    if key.is_empty() {
        return StoneBillLine {
            stone_type,
            product_id: None,
            quantity,
            unit_price: 0.0,
            total_price: 0.0,
            match_type: Some(MatchType::NotProvided),
            note: Some("No product id provided; line not priced".to_string()),
        };
    }

    let (price, match_type, error) = lookup(key);
    match price {
        Some(unit_price) => StoneBillLine {
            stone_type,
            product_id: Some(key.to_string()),
            quantity,
            unit_price,
            total_price: unit_price * quantity as f64,
            match_type: Some(match_type),
            note: None,
        },
        None => StoneBillLine {
            stone_type,
            product_id: Some(key.to_string()),
            quantity,
            unit_price: 0.0,
            total_price: 0.0,
            match_type: Some(match_type),
            note: Some(error.unwrap_or_else(|| "Price not found; line not priced".to_string())),
        },
    }
}

// ==========================================
// 人工费
// ==========================================

/// 人工费 = 每颗镶嵌费 × 石头总数 + 固定人工费
pub fn calculate_labor_cost(stone_count: u32, constants: LaborConstants) -> LaborCostDetails {
    LaborCostDetails {
        stone_count,
        setting_cost_per_stone: constants.setting_cost_per_stone,
        fixed_labor_cost: constants.fixed_labor_cost,
        total_cost: constants.setting_cost_per_stone * stone_count as f64
            + constants.fixed_labor_cost,
    }
}
