//! Canonical transaction record shared by the normalizer and the scoring engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single statement line after normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Booking date (no time component)
    pub date: NaiveDate,
    /// Narration as supplied by the bank
    pub description: String,
    /// Positive = inflow (credit), negative = outflow (debit)
    pub amount: f64,
    /// `None` until a categorizer has looked at this transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Labels produced by the categorizer and consumed by the scoring engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    #[serde(rename = "Business Income")]
    BusinessIncome,
    #[serde(rename = "Operational Expense")]
    OperationalExpense,
    #[serde(rename = "Personal")]
    Personal,
    #[serde(rename = "High Risk")]
    HighRisk,
    #[serde(rename = "Unclassified")]
    Unclassified,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::BusinessIncome,
        Category::OperationalExpense,
        Category::Personal,
        Category::HighRisk,
        Category::Unclassified,
    ];

    /// Human label, identical to the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            Category::BusinessIncome => "Business Income",
            Category::OperationalExpense => "Operational Expense",
            Category::Personal => "Personal",
            Category::HighRisk => "High Risk",
            Category::Unclassified => "Unclassified",
        }
    }

    /// Parse a label leniently (case, spacing, `_`/`-` separators ignored).
    /// Anything unrecognised maps to `Unclassified`, matching the categorizer's
    /// fallback contract.
    pub fn from_label(label: &str) -> Category {
        let key: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "businessincome" | "income" => Category::BusinessIncome,
            "operationalexpense" | "expense" | "opex" => Category::OperationalExpense,
            "personal" => Category::Personal,
            "highrisk" => Category::HighRisk,
            _ => Category::Unclassified,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Transaction {
    /// Create an uncategorized transaction
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: f64) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            category: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Category as the scoring engine sees it: missing labels count as `Unclassified`
    pub fn resolved_category(&self) -> Category {
        self.category.unwrap_or(Category::Unclassified)
    }

    pub fn is_inflow(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_outflow(&self) -> bool {
        self.amount < 0.0
    }

    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }

    /// Reconstruct the `(credit, debit)` column pair this amount was merged from.
    pub fn split_columns(&self) -> (Option<f64>, Option<f64>) {
        if self.is_inflow() {
            (Some(self.amount), None)
        } else if self.is_outflow() {
            (None, Some(-self.amount))
        } else {
            (None, None)
        }
    }
}
