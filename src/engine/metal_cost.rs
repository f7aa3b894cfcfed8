// ==========================================
// 珠宝成本预估系统 - 金属成本解析引擎
// ==========================================
// 职责: 按供应商分类分派计价策略(Lee's / IKSAN / 标准),并维护回退链
// 红线: 供应商双字段均查找失败时返回"可诊断的零成本"(成功态),
//       绝不触发标准回退 —— 逐字段诊断比泛化费率更有决策价值
// 红线: 回退链仅在供应商策略硬失败且规格有效时启动;回退也失败则呈现原始失败
// ==========================================

use crate::domain::cost::{
    CalculationBreakdown, CalculationResult, EarringLogic, LookupResult, MetalCostDiagnostics,
    PartLookupDiagnostics, PurityDiagnostics,
};
use crate::domain::pricing::{IksanPartRecord, LeesPartRecord, PricingSnapshot};
use crate::domain::product::{ProductRecord, ProductSpecifications, SupplierData};
use crate::domain::types::{CalculationMethod, MetalPurity, SupplierKind};
use crate::engine::earring::{detect_earring_type, EarringDetection};
use crate::engine::part_lookup::lookup_part;
use tracing::{debug, instrument};

// 计算错误文案(与诊断展示约定一致)
pub const ERR_MISSING_ATTRIBUTE: &str = "Required attribute not provided";
pub const ERR_CALCULATION: &str = "Error in cost calculation";
pub const ERR_INVALID_SPECIFICATIONS: &str = "Invalid product specifications provided";

// ==========================================
// MetalCostResolver - 金属成本解析器
// ==========================================
pub struct MetalCostResolver;

impl MetalCostResolver {
    pub fn new() -> Self {
        Self
    }

    /// 解析单件商品的金属成本
    ///
    /// # 分派
    /// 供应商名称 → `SupplierKind`;Standard 直接走标准计算(无回退链),
    /// Lee's / IKSAN 走供应商专有表,硬失败且规格有效时回退标准计算。
    #[instrument(skip_all, fields(supplier = ?supplier.supplier_name))]
    pub fn resolve(
        &self,
        supplier: &SupplierData,
        specs: &ProductSpecifications,
        product: Option<&ProductRecord>,
        snapshot: &PricingSnapshot,
    ) -> CalculationResult {
        let kind = SupplierKind::classify(supplier.supplier_name.as_deref());

        if kind == SupplierKind::Standard {
            return self.calculate_standard(
                supplier,
                specs,
                CalculationMethod::Standard,
                product,
                snapshot,
            );
        }

        let attempt = if kind == SupplierKind::Lees {
            self.calculate_lees(supplier, product, snapshot)
        } else {
            self.calculate_iksan(supplier, product, snapshot)
        };

        if attempt.is_success {
            return attempt;
        }

        // 回退前置条件: 规格必须足以支撑标准计算
        if !specs.validate().is_empty() {
            return attempt;
        }

        debug!(supplier = %kind, "供应商计价失败,尝试标准回退");
        let fallback = self.calculate_standard(
            supplier,
            specs,
            CalculationMethod::StandardFallback,
            product,
            snapshot,
        );

        if !fallback.is_success {
            // 回退也失败: 呈现原始供应商失败(更具体)
            return attempt;
        }

        let mut errors = vec![
            format!(
                "Supplier-specific calculation failed: {}",
                attempt.errors.join(", ")
            ),
            "Used standard calculation as fallback".to_string(),
        ];
        errors.extend(fallback.errors.clone());

        let mut merged = fallback;
        let fallback_details = std::mem::take(&mut merged.details);
        merged.details = MetalCostDiagnostics {
            supplier_attempt: Some(Box::new(attempt.details)),
            fallback_calculation: Some(Box::new(fallback_details)),
            ..Default::default()
        };
        merged.errors = errors;
        merged
    }

    // ==========================================
    // Lee's 策略: Per Piece 双字段求和
    // ==========================================
    fn calculate_lees(
        &self,
        supplier: &SupplierData,
        product: Option<&ProductRecord>,
        snapshot: &PricingSnapshot,
    ) -> CalculationResult {
        let label = SupplierKind::Lees.label();
        let mfg_key = supplier.mfg_part_trimmed();
        let part2_key = supplier.part2_trimmed();

        // 双字段全缺: 硬失败(结构性缺数据,交给回退链)
        if mfg_key.is_empty() && part2_key.is_empty() {
            return CalculationResult::failure(
                label,
                vec![format!(
                    "{}: Both MFG & Part # and Part #2 are missing.",
                    ERR_MISSING_ATTRIBUTE
                )],
                CalculationMethod::SupplierSpecific,
                MetalCostDiagnostics::default(),
            );
        }

        let mfg_lookup = lookup_part(mfg_key, snapshot.lees_table());
        let part2_lookup = lookup_part(part2_key, snapshot.lees_table());

        let mut details = MetalCostDiagnostics {
            mfg_and_part: Some(lees_diagnostics(mfg_key, &mfg_lookup)),
            part_2: Some(lees_diagnostics(part2_key, &part2_lookup)),
            ..Default::default()
        };

        let mut errors = Vec::new();
        if let Some(err) = &mfg_lookup.error {
            errors.push(format!("MFG & Part #: {}", err));
        }
        if let Some(err) = &part2_lookup.error {
            errors.push(format!("Part #2: {}", err));
        }

        if mfg_lookup.is_hit() || part2_lookup.is_hit() {
            let mfg_price = mfg_lookup.record.and_then(|r| r.per_piece).unwrap_or(0.0);
            let part2_price = part2_lookup.record.and_then(|r| r.per_piece).unwrap_or(0.0);
            let base_cost = mfg_price + part2_price;

            let earring = detect_earring_type(product);
            let mut earring_logic = earring_logic_from(&earring);
            let (final_mfg, final_part2) = if earring.is_earring {
                // 逐字段双倍(与标准策略的整体双倍刻意不同,便于逐部件审计)
                let doubled_mfg = mfg_price * 2.0;
                let doubled_part2 = part2_price * 2.0;
                earring_logic.multiplier = Some(2);
                earring_logic.doubled_mfg_price = Some(doubled_mfg);
                earring_logic.doubled_part2_price = Some(doubled_part2);
                (doubled_mfg, doubled_part2)
            } else {
                (mfg_price, part2_price)
            };
            let metal_cost = final_mfg + final_part2;

            details.calculation = Some(CalculationBreakdown {
                mfg_part_price: Some(final_mfg),
                part2_price: Some(final_part2),
                base_cost: Some(base_cost),
                earring_logic,
                total_cost: Some(metal_cost),
                ..Default::default()
            });

            return CalculationResult::success(
                label,
                metal_cost,
                CalculationMethod::SupplierSpecific,
                details,
                errors,
            );
        }

        // 双字段均未解析: 可诊断的零成本,携带逐字段失败分解
        let breakdown_text = [
            lookup_status_line("MFG & Part #", mfg_key, &mfg_lookup),
            lookup_status_line("Part #2", part2_key, &part2_lookup),
            "Total Cost: $0.00".to_string(),
        ]
        .join("\n");

        details.calculation = Some(CalculationBreakdown {
            mfg_part_price: Some(0.0),
            part2_price: Some(0.0),
            total_cost: Some(0.0),
            breakdown_text: Some(breakdown_text),
            ..Default::default()
        });

        if errors.is_empty() {
            errors.push(ERR_CALCULATION.to_string());
        }

        CalculationResult::success(
            label,
            0.0,
            CalculationMethod::SupplierSpecific,
            details,
            errors,
        )
    }

    // ==========================================
    // IKSAN 策略: 行内 total_cost 双字段求和
    // ==========================================
    fn calculate_iksan(
        &self,
        supplier: &SupplierData,
        product: Option<&ProductRecord>,
        snapshot: &PricingSnapshot,
    ) -> CalculationResult {
        let label = SupplierKind::Iksan.label();
        let mfg_key = supplier.mfg_part_trimmed();
        let part2_key = supplier.part2_trimmed();

        let mfg_lookup = lookup_part(mfg_key, snapshot.iksan_table());
        let part2_lookup = lookup_part(part2_key, snapshot.iksan_table());

        let mut details = MetalCostDiagnostics {
            mfg_and_part: Some(iksan_diagnostics(mfg_key, &mfg_lookup)),
            part_2: Some(iksan_diagnostics(part2_key, &part2_lookup)),
            // 表头金价仅供展示,不参与计算
            gold_pricing: snapshot.iksan_gold_pricing().cloned(),
            ..Default::default()
        };

        let mut errors = Vec::new();
        if let Some(err) = &mfg_lookup.error {
            errors.push(format!("MFG & Part #: {}", err));
        }
        if let Some(err) = &part2_lookup.error {
            errors.push(format!("Part #2: {}", err));
        }

        if mfg_lookup.is_hit() || part2_lookup.is_hit() {
            let mfg_cost = mfg_lookup
                .record
                .and_then(|r| r.total_cost)
                .unwrap_or(0.0);
            let part2_cost = part2_lookup
                .record
                .and_then(|r| r.total_cost)
                .unwrap_or(0.0);
            let base_cost = mfg_cost + part2_cost;

            let earring = detect_earring_type(product);
            let mut earring_logic = earring_logic_from(&earring);
            let (final_mfg, final_part2) = if earring.is_earring {
                let doubled_mfg = mfg_cost * 2.0;
                let doubled_part2 = part2_cost * 2.0;
                earring_logic.multiplier = Some(2);
                earring_logic.doubled_mfg_price = Some(doubled_mfg);
                earring_logic.doubled_part2_price = Some(doubled_part2);
                (doubled_mfg, doubled_part2)
            } else {
                (mfg_cost, part2_cost)
            };
            let metal_cost = final_mfg + final_part2;

            let mut lines = vec![
                iksan_part_line("MFG & Part #", mfg_key, &mfg_lookup, final_mfg),
                iksan_part_line("Part #2", part2_key, &part2_lookup, final_part2),
            ];
            if earring.is_earring {
                lines.push(format!(
                    "Earring doubling applied (x2): MFG ${:.2} + Part #2 ${:.2}",
                    final_mfg, final_part2
                ));
            }
            lines.push(format!("Total Cost: ${:.2}", metal_cost));

            details.calculation = Some(CalculationBreakdown {
                mfg_part_price: Some(final_mfg),
                part2_price: Some(final_part2),
                base_cost: Some(base_cost),
                earring_logic,
                total_cost: Some(metal_cost),
                breakdown_text: Some(lines.join("\n")),
                ..Default::default()
            });

            return CalculationResult::success(
                label,
                metal_cost,
                CalculationMethod::SupplierSpecific,
                details,
                errors,
            );
        }

        // 可诊断的零成本(含双字段全缺的场景)
        let breakdown_text = if mfg_key.is_empty() && part2_key.is_empty() {
            [
                "No parts specified (both MFG & Part # and Part #2 are empty)".to_string(),
                "Total Cost: $0.00".to_string(),
            ]
            .join("\n")
        } else {
            [
                lookup_status_line("MFG & Part #", mfg_key, &mfg_lookup),
                lookup_status_line("Part #2", part2_key, &part2_lookup),
                "Total Cost: $0.00".to_string(),
            ]
            .join("\n")
        };

        details.calculation = Some(CalculationBreakdown {
            mfg_part_price: Some(0.0),
            part2_price: Some(0.0),
            total_cost: Some(0.0),
            breakdown_text: Some(breakdown_text),
            ..Default::default()
        });

        if errors.is_empty() {
            errors.push(ERR_CALCULATION.to_string());
        }

        CalculationResult::success(
            label,
            0.0,
            CalculationMethod::SupplierSpecific,
            details,
            errors,
        )
    }

    // ==========================================
    // 标准策略: 纯度费率 × 重量
    // ==========================================
    fn calculate_standard(
        &self,
        supplier: &SupplierData,
        specs: &ProductSpecifications,
        method: CalculationMethod,
        product: Option<&ProductRecord>,
        snapshot: &PricingSnapshot,
    ) -> CalculationResult {
        let label = supplier
            .supplier_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(SupplierKind::Standard.label())
            .to_string();

        let validation = specs.validate();
        if !validation.is_empty() {
            let mut errors = vec![ERR_INVALID_SPECIFICATIONS.to_string()];
            errors.extend(validation);
            return CalculationResult::failure(
                label,
                errors,
                method,
                MetalCostDiagnostics::default(),
            );
        }

        let purity_raw = specs.metal_purity.as_deref().unwrap_or("").trim();
        let weight = specs.metal_weight.unwrap_or(0.0);

        let mut details = MetalCostDiagnostics::default();
        let normalized = MetalPurity::normalize(purity_raw);

        let purity = match normalized {
            Some(p) => p,
            None => {
                details.purity = Some(PurityDiagnostics {
                    original: purity_raw.to_string(),
                    processed: None,
                    applicable_rate: None,
                });
                return CalculationResult::failure(
                    label,
                    vec![format!(
                        "No metal rate found for metal purity: {}",
                        purity_raw
                    )],
                    method,
                    details,
                );
            }
        };

        // 快照实时费率优先,无该键回退内置常量
        let rate = snapshot
            .metal_rate(purity.rate_key())
            .unwrap_or_else(|| purity.standard_rate());

        details.purity = Some(PurityDiagnostics {
            original: purity_raw.to_string(),
            processed: Some(purity.rate_key().to_string()),
            applicable_rate: Some(rate),
        });

        let base_cost = rate * weight;
        let earring = detect_earring_type(product);
        let mut earring_logic = earring_logic_from(&earring);
        // 整体双倍(与供应商策略的逐字段双倍刻意不同)
        let metal_cost = if earring.is_earring {
            let doubled = base_cost * 2.0;
            earring_logic.multiplier = Some(2);
            earring_logic.doubled_cost = Some(doubled);
            doubled
        } else {
            base_cost
        };

        details.calculation = Some(CalculationBreakdown {
            rate: Some(rate),
            weight: Some(weight),
            base_cost: Some(base_cost),
            earring_logic,
            total_cost: Some(metal_cost),
            ..Default::default()
        });

        CalculationResult::success(label, metal_cost, method, details, vec![])
    }
}

impl Default for MetalCostResolver {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 诊断构建辅助
// ==========================================

fn earring_logic_from(detection: &EarringDetection) -> EarringLogic {
    EarringLogic {
        detected: detection.is_earring,
        earring_type: detection.earring_type,
        note: detection.note.clone(),
        ..Default::default()
    }
}

fn lees_diagnostics(original: &str, lookup: &LookupResult<&LeesPartRecord>) -> PartLookupDiagnostics {
    PartLookupDiagnostics {
        original: original.to_string(),
        processed: lookup.processed.clone(),
        match_type: Some(lookup.match_type),
        attempts: lookup.attempts,
        per_piece_price: lookup.record.and_then(|r| r.per_piece),
        ..Default::default()
    }
}

fn iksan_diagnostics(
    original: &str,
    lookup: &LookupResult<&IksanPartRecord>,
) -> PartLookupDiagnostics {
    PartLookupDiagnostics {
        original: original.to_string(),
        processed: lookup.processed.clone(),
        match_type: Some(lookup.match_type),
        attempts: lookup.attempts,
        matched_sku: lookup.record.map(|r| r.sku.clone()),
        weight: lookup.record.and_then(|r| r.weight),
        metal_price: lookup.record.and_then(|r| r.metal_price),
        labor_fee: lookup.record.and_then(|r| r.labor_fee),
        labor_price: lookup.record.and_then(|r| r.labor_price),
        total_cost: lookup.record.and_then(|r| r.total_cost),
        ..Default::default()
    }
}

/// 失败分解行: 区分"查无此件"与"未填该字段"
fn lookup_status_line<T>(field: &str, key: &str, lookup: &LookupResult<T>) -> String {
    if key.is_empty() {
        format!("{}: not specified", field)
    } else {
        format!(
            "{} ({}): NOT FOUND [Attempts: {}, Last: {}]",
            field, key, lookup.attempts, lookup.match_type
        )
    }
}

/// IKSAN 成功分解行
fn iksan_part_line(
    field: &str,
    key: &str,
    lookup: &LookupResult<&IksanPartRecord>,
    final_cost: f64,
) -> String {
    match lookup.record {
        Some(record) => format!(
            "{} ({}): ${:.2} [{}, attempts: {}]",
            field, record.sku, final_cost, lookup.match_type, lookup.attempts
        ),
        None => lookup_status_line(field, key, lookup),
    }
}
