use regex::Regex;

use crate::db::Storage;
use crate::error::{FinflowError, Result};
use crate::models::{generate_id, CategoryRule, MatchType, TransactionType};
use crate::store::{Collection, RULES_KEY};

pub const CATEGORY_PIX: &str = "Transferência Pix";
pub const CATEGORY_SALARY: &str = "Salário/Receita";
pub const CATEGORY_INCOMING: &str = "Entrada";
pub const CATEGORY_TRANSPORT: &str = "Transporte";
pub const CATEGORY_DELIVERY: &str = "Delivery";
pub const CATEGORY_FOOD: &str = "Alimentação";
pub const CATEGORY_GROCERIES: &str = "Mercado";
pub const CATEGORY_SUBSCRIPTION: &str = "Assinatura";
pub const CATEGORY_GENERAL_EXPENSE: &str = "Despesa Geral";

struct BuiltinRule {
    any_of: &'static [&'static str],
    none_of: &'static [&'static str],
    category: &'static str,
}

// Evaluated in order; the first hit wins.
const INCOME_RULES: &[BuiltinRule] = &[
    BuiltinRule { any_of: &["PIX"], none_of: &[], category: CATEGORY_PIX },
    BuiltinRule { any_of: &["SALARIO", "PAGAMENTO"], none_of: &[], category: CATEGORY_SALARY },
];

const EXPENSE_RULES: &[BuiltinRule] = &[
    BuiltinRule { any_of: &["UBER"], none_of: &["EATS"], category: CATEGORY_TRANSPORT },
    BuiltinRule { any_of: &["99", "TAXI"], none_of: &[], category: CATEGORY_TRANSPORT },
    BuiltinRule { any_of: &["IFOOD", "RAPPI"], none_of: &[], category: CATEGORY_DELIVERY },
    BuiltinRule { any_of: &["MCDONALDS", "BURGER"], none_of: &[], category: CATEGORY_FOOD },
    BuiltinRule {
        any_of: &["SUPERMERCADO", "ASSAI", "CARREFOUR"],
        none_of: &[],
        category: CATEGORY_GROCERIES,
    },
    BuiltinRule { any_of: &["NETFLIX", "SPOTIFY"], none_of: &[], category: CATEGORY_SUBSCRIPTION },
];

impl BuiltinRule {
    fn hits(&self, upper: &str) -> bool {
        self.any_of.iter().any(|t| upper.contains(t))
            && !self.none_of.iter().any(|t| upper.contains(t))
    }
}

fn matches(description: &str, pattern: &str, match_type: MatchType) -> bool {
    let desc_upper = description.to_uppercase();
    let pat_upper = pattern.to_uppercase();
    match match_type {
        MatchType::Contains => desc_upper.contains(&pat_upper),
        MatchType::StartsWith => desc_upper.starts_with(&pat_upper),
        MatchType::Regex => Regex::new(pattern)
            .map(|re| re.is_match(description))
            .unwrap_or(false),
    }
}

/// Category from the built-in keyword table only.
pub fn detect_category(description: &str, txn_type: TransactionType) -> &'static str {
    let upper = description.to_uppercase();
    let (rules, fallback) = match txn_type {
        TransactionType::Income => (INCOME_RULES, CATEGORY_INCOMING),
        TransactionType::Expense => (EXPENSE_RULES, CATEGORY_GENERAL_EXPENSE),
    };
    rules
        .iter()
        .find(|r| r.hits(&upper))
        .map_or(fallback, |r| r.category)
}

/// First user rule that applies. `rules` must already be ordered by
/// priority, highest first.
pub fn match_rule<'r>(
    rules: &'r [CategoryRule],
    description: &str,
    txn_type: TransactionType,
) -> Option<&'r CategoryRule> {
    rules.iter().find(|rule| {
        rule.applies_to.map_or(true, |t| t == txn_type)
            && matches(description, &rule.pattern, rule.match_type)
    })
}

/// User rules first, then the built-in keyword table. Returns the category and
/// the id of the user rule that produced it, if any.
pub fn resolve_category<'r>(
    rules: &'r [CategoryRule],
    description: &str,
    txn_type: TransactionType,
) -> (String, Option<&'r str>) {
    match match_rule(rules, description, txn_type) {
        Some(rule) => (rule.category.clone(), Some(rule.id.as_str())),
        None => (detect_category(description, txn_type).to_string(), None),
    }
}

/// User-defined categorization rules, consulted before the built-in table.
pub struct RuleStore<'a> {
    rules: Collection<'a, CategoryRule>,
}

impl<'a> RuleStore<'a> {
    pub fn load(storage: &'a dyn Storage) -> Result<Self> {
        Ok(Self {
            rules: Collection::load(storage, RULES_KEY)?,
        })
    }

    pub fn list(&self) -> &[CategoryRule] {
        self.rules.items()
    }

    pub fn add(
        &mut self,
        pattern: &str,
        match_type: MatchType,
        category: &str,
        applies_to: Option<TransactionType>,
        priority: i64,
    ) -> Result<CategoryRule> {
        if pattern.trim().is_empty() || category.trim().is_empty() {
            return Err(FinflowError::InvalidInput(
                "rule pattern and category must not be empty".to_string(),
            ));
        }
        if match_type == MatchType::Regex {
            Regex::new(pattern).map_err(|e| FinflowError::InvalidInput(format!("bad regex: {e}")))?;
        }
        let rule = CategoryRule {
            id: generate_id("rule"),
            pattern: pattern.to_string(),
            match_type,
            category: category.to_string(),
            applies_to,
            priority,
            hit_count: 0,
        };
        let stored = rule.clone();
        // Stable sort keeps insertion order among equal priorities.
        self.rules.mutate(|rules| {
            rules.push(stored);
            rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        })?;
        Ok(rule)
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        Ok(self.rules.retain(|r| r.id != id)? > 0)
    }

    /// Bump `hit_count` once per occurrence of a rule id in `hits`.
    pub fn record_hits(&mut self, hits: &[String]) -> Result<()> {
        if hits.is_empty() {
            return Ok(());
        }
        self.rules.mutate(|rules| {
            for rule in rules.iter_mut() {
                let n = hits.iter().filter(|id| **id == rule.id).count();
                rule.hit_count += n as u64;
            }
        })
    }
}
