// ==========================================
// 珠宝成本预估系统 - 部件号多级查找引擎
// ==========================================
// 职责: 供应商部件表的三级模糊查找(精确 → 渐进截断 → 子串)
// 红线: 层级顺序与短路规则不可变更;歧义(多候选)必须返回失败,禁止猜测
// 红线: 每个分支都要上报单调递增的 attempts 与完整键轨迹,诊断展示依赖它们
// ==========================================

use crate::domain::cost::LookupResult;
use crate::domain::pricing::{DiamondPriceRow, GemstonePriceRow, IksanPartRecord, LeesPartRecord};
use crate::domain::types::MatchType;

// 查找错误文案(与诊断展示约定一致)
pub const ERR_MULTIPLE_MATCHES: &str = "Multiple items found - ambiguous match";
pub const ERR_NO_MATCH_FOUND: &str = "No matching item found in dataset";
pub const ERR_MISSING_PRICING_DATA: &str = "Missing pricing data for lookup";

// ==========================================
// PartKeyed - 可按部件号检索的表行
// ==========================================
pub trait PartKeyed {
    /// 表行的部件号字段
    fn part_key(&self) -> &str;

    /// 该行是否可作为计价命中
    ///
    /// Lee's 表要求 Per Piece 存在;其余表恒为 true。
    fn is_priceable(&self) -> bool {
        true
    }
}

impl PartKeyed for LeesPartRecord {
    fn part_key(&self) -> &str {
        &self.item_number
    }

    fn is_priceable(&self) -> bool {
        self.per_piece.is_some()
    }
}

impl PartKeyed for IksanPartRecord {
    fn part_key(&self) -> &str {
        &self.sku
    }
}

impl PartKeyed for DiamondPriceRow {
    fn part_key(&self) -> &str {
        &self.product_id
    }
}

impl PartKeyed for GemstonePriceRow {
    fn part_key(&self) -> &str {
        &self.product_id
    }
}

// ==========================================
// 核心查找算法
// ==========================================

/// 三级部件号查找
///
/// # 算法(顺序固定)
/// 1. 键为空白 → `NotProvided`,0 次尝试
/// 2. 表为空 → `NoMatch` + "Missing pricing data",0 次尝试(未对真实数据执行)
/// 3. 第 1 次尝试: 去空格精确匹配,命中立即返回
/// 4. 第 2..N 次尝试: 渐进截断 —— 每次剥掉最后一个 `-` 到结尾的子串
///    (`"A-B-C" → "A-B" → "A"`),逐次重试精确匹配,无 `-` 可剥即停
/// 5. 最后一次尝试: 子串包含匹配(用原始键);恰一个候选 → `Substring`;
///    多于一个 → `MultipleMatches`(歧义,调用方不得擅自挑选);零个 → `NoMatch`
pub fn lookup_part<'a, T: PartKeyed>(key: &str, table: &'a [T]) -> LookupResult<&'a T> {
    if key.trim().is_empty() {
        return LookupResult {
            record: None,
            match_type: MatchType::NotProvided,
            processed: String::new(),
            attempts: 0,
            error: None,
        };
    }

    let search = key.trim();

    if table.is_empty() {
        return LookupResult {
            record: None,
            match_type: MatchType::NoMatch,
            processed: search.to_string(),
            attempts: 0,
            error: Some(ERR_MISSING_PRICING_DATA.to_string()),
        };
    }

    let mut attempts: u32 = 0;

    // === 第一级: 精确匹配 ===
    attempts += 1;
    if let Some(row) = table
        .iter()
        .find(|r| r.part_key().trim() == search && r.is_priceable())
    {
        return LookupResult {
            record: Some(row),
            match_type: MatchType::Exact,
            processed: search.to_string(),
            attempts,
            error: None,
        };
    }

    // === 第二级: 渐进截断(从长到短) ===
    let mut truncated = search;
    while let Some(pos) = truncated.rfind('-') {
        truncated = &truncated[..pos];
        if truncated.trim().is_empty() {
            continue;
        }
        attempts += 1;
        if let Some(row) = table
            .iter()
            .find(|r| r.part_key().trim() == truncated && r.is_priceable())
        {
            return LookupResult {
                record: Some(row),
                match_type: MatchType::Progressive,
                processed: truncated.to_string(),
                attempts,
                error: None,
            };
        }
    }

    // === 第三级: 子串匹配(用原始键) ===
    attempts += 1;
    let candidates: Vec<&T> = table
        .iter()
        .filter(|r| r.part_key().contains(search) && r.is_priceable())
        .collect();

    match candidates.len() {
        1 => LookupResult {
            record: Some(candidates[0]),
            match_type: MatchType::Substring,
            processed: search.to_string(),
            attempts,
            error: None,
        },
        0 => LookupResult {
            record: None,
            match_type: MatchType::NoMatch,
            processed: search.to_string(),
            attempts,
            error: Some(format!("{} for part: {}", ERR_NO_MATCH_FOUND, search)),
        },
        _ => LookupResult {
            record: None,
            match_type: MatchType::MultipleMatches,
            processed: search.to_string(),
            attempts,
            error: Some(format!("{} for part: {}", ERR_MULTIPLE_MATCHES, search)),
        },
    }
}
