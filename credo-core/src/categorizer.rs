//! Categorization seam between the normalizer and the scoring engine.
//!
//! The engine only needs every transaction to carry a label. Where that label
//! comes from (LLM service, spreadsheet column, keyword rules) is behind the
//! [`Categorizer`] trait. [`RuleCategorizer`] is the deterministic built-in:
//! ordered regex rules over the narration, first match wins.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::transaction::{Category, Transaction};

/// Anything that can label a transaction. Implementations must be total:
/// when they cannot decide they return [`Category::Unclassified`].
pub trait Categorizer {
    fn categorize(&self, txn: &Transaction) -> Category;
}

impl<F> Categorizer for F
where
    F: Fn(&Transaction) -> Category,
{
    fn categorize(&self, txn: &Transaction) -> Category {
        self(txn)
    }
}

/// Fill in the category of every transaction that does not already have one.
/// Returns how many transactions were labelled.
pub fn categorize_all<C: Categorizer + ?Sized>(categorizer: &C, txns: &mut [Transaction]) -> usize {
    let mut labelled = 0;
    for txn in txns.iter_mut().filter(|t| t.category.is_none()) {
        txn.category = Some(categorizer.categorize(txn));
        labelled += 1;
    }
    debug!(labelled, total = txns.len(), "categorized transactions");
    labelled
}

/// Result of a rule lookup
#[derive(Debug, Clone, PartialEq)]
pub struct Categorized {
    pub category: Category,
    pub reason: String,
}

#[derive(Debug, Clone)]
struct CategoryRule {
    pattern: Regex,
    category: Category,
    reason: String,
}

/// Keyword rules tuned for Nigerian SME current-account narrations.
const BUILTIN_RULES: &[(&str, Category, &str)] = &[
    // High risk
    (
        r"\b(sporty|bet9ja|betway|1xbet|nairabet|betking|betting|gambl)",
        Category::HighRisk,
        "Gambling/betting activity",
    ),
    (r"\b(loan shark|ponzi|fraud)", Category::HighRisk, "Suspicious activity"),
    // Incoming transfers and credits
    (r"^transfer from\b", Category::BusinessIncome, "Incoming transfer"),
    (r"\binterest earned\b", Category::BusinessIncome, "Interest income"),
    (r"\binward\b.*\btransfer\b", Category::BusinessIncome, "Inward transfer"),
    (r"\bcredit alert\b", Category::BusinessIncome, "Credit alert"),
    // Savings movements and levies
    (r"\bowealth\b", Category::Personal, "OWealth savings movement"),
    (r"\bauto[- ]?save\b", Category::Personal, "Auto-save to savings"),
    (r"\bsavings?\b.*\b(withdrawal|deposit|transfer)\b", Category::Personal, "Savings movement"),
    (r"\bstamp duty\b", Category::OperationalExpense, "Government levy"),
    (r"\belectronic money transfer levy\b", Category::OperationalExpense, "Government levy"),
    (r"\bvat\b|\bwithholding tax\b", Category::OperationalExpense, "Tax/levy"),
    // Outgoing transfers with business keywords
    (
        r"transfer to\b.*\b(fuel|oil|gas|diesel|petrol|energy)",
        Category::OperationalExpense,
        "Fuel/energy expense",
    ),
    (r"transfer to\b.*\b(rent|landlord)", Category::OperationalExpense, "Rent payment"),
    (
        r"transfer to\b.*\b(food|bread|drink|rice|plantain|fish|egg|buns|cafe)",
        Category::OperationalExpense,
        "Food/provisions",
    ),
    (
        r"transfer to\b.*\b(engine|brake|mechanic|spare|part|tyre|tire)",
        Category::OperationalExpense,
        "Vehicle maintenance",
    ),
    (
        r"transfer to\b.*\b(shoe|material|fabric|cloth|tailor)",
        Category::OperationalExpense,
        "Materials/supplies",
    ),
    (
        r"transfer to\b.*\b(phone|airtime|data)",
        Category::OperationalExpense,
        "Communication expense",
    ),
    (r"transfer to\b.*\b(waste|clean|sanit)", Category::OperationalExpense, "Utility expense"),
    (r"\bmobile data\b|\bairtime\b", Category::OperationalExpense, "Communication expense"),
    (r"\bthird[- ]?party merchant\b", Category::OperationalExpense, "Merchant payment"),
    (r"\bvirtual card\b", Category::OperationalExpense, "Card fee"),
    (r"\bpos\b", Category::OperationalExpense, "POS payment"),
    // Any other outgoing transfer
    (r"^transfer to\b", Category::Personal, "Outgoing transfer"),
];

/// Deterministic keyword categorizer
#[derive(Debug, Clone)]
pub struct RuleCategorizer {
    rules: Vec<CategoryRule>,
}

impl RuleCategorizer {
    /// Compile the built-in rule table
    pub fn new() -> Result<Self, regex::Error> {
        Self::from_rules(
            BUILTIN_RULES
                .iter()
                .map(|(pattern, category, reason)| (*pattern, *category, *reason)),
        )
    }

    /// Compile a custom rule table. Patterns are matched case-insensitively, in order.
    pub fn from_rules<'a, I>(rules: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = (&'a str, Category, &'a str)>,
    {
        let rules = rules
            .into_iter()
            .map(|(pattern, category, reason)| {
                Ok(CategoryRule {
                    pattern: RegexBuilder::new(pattern).case_insensitive(true).build()?,
                    category,
                    reason: reason.to_string(),
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Categorize and report which rule fired.
    pub fn explain(&self, txn: &Transaction) -> Categorized {
        let desc = txn.description.trim();

        if desc.is_empty() {
            return if txn.is_inflow() {
                cat(Category::BusinessIncome, "Incoming amount (no description)")
            } else {
                cat(Category::Personal, "Outgoing amount (no description)")
            };
        }

        for rule in &self.rules {
            if rule.pattern.is_match(desc) {
                // An "income" narration on a debit is money going back out
                if rule.category == Category::BusinessIncome && txn.is_outflow() {
                    return cat(Category::OperationalExpense, &format!("{} (debit)", rule.reason));
                }
                return cat(rule.category, &rule.reason);
            }
        }

        cat(Category::Personal, "Uncategorized transaction")
    }
}

impl Categorizer for RuleCategorizer {
    fn categorize(&self, txn: &Transaction) -> Category {
        self.explain(txn).category
    }
}

fn cat(category: Category, reason: &str) -> Categorized {
    Categorized {
        category,
        reason: reason.to_string(),
    }
}
