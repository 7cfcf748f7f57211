//! Declarative column-layout templates.
//!
//! A template names the header aliases for each column role and how the
//! signed amount is built. Templates are tried in order; the first one whose
//! required columns are all present in the header wins. Header matching is
//! case-insensitive and ignores whitespace, so `Trans Date`, `TRANSDATE` and
//! `trans date` are the same column.

use serde::{Deserialize, Serialize};

/// How a row's signed amount is assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountRule {
    /// One amount column, already signed
    Signed,
    /// Amount column plus a Credit/Debit marker column
    TypeColumn,
    /// Separate credit and debit columns
    SplitColumns,
}

/// One supported bank export layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaTemplate {
    pub name: String,
    pub amount_rule: AmountRule,
    pub date: Vec<String>,
    pub description: Vec<String>,
    #[serde(default)]
    pub amount: Vec<String>,
    #[serde(default, rename = "type")]
    pub kind: Vec<String>,
    #[serde(default)]
    pub credit: Vec<String>,
    #[serde(default)]
    pub debit: Vec<String>,
}

/// Header positions resolved for a matched template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub description: usize,
    pub amount: Option<usize>,
    pub kind: Option<usize>,
    pub credit: Option<usize>,
    pub debit: Option<usize>,
    /// Optional pre-assigned category column
    pub category: Option<usize>,
}

const DATE_ALIASES: &[&str] = &[
    "date",
    "trans date",
    "transaction date",
    "value date",
    "posting date",
    "txn date",
];
const DESCRIPTION_ALIASES: &[&str] = &[
    "description",
    "narration",
    "remarks",
    "details",
    "transaction details",
    "particulars",
    "reference",
];
const AMOUNT_ALIASES: &[&str] = &["amount", "transaction amount", "txn amount"];
const TYPE_ALIASES: &[&str] = &["type", "transaction type", "txn type", "dr/cr"];
const CREDIT_ALIASES: &[&str] = &["credit", "credit amount", "deposits"];
const DEBIT_ALIASES: &[&str] = &["debit", "debit amount", "withdrawals"];
const CATEGORY_ALIASES: &[&str] = &["category"];

/// Lowercase and drop all whitespace
pub fn header_key(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn owned(aliases: &[&str]) -> Vec<String> {
    aliases.iter().map(|a| a.to_string()).collect()
}

/// Built-in layouts, most specific first
pub fn builtin_templates() -> Vec<SchemaTemplate> {
    vec![
        SchemaTemplate {
            name: "typed-amount".to_string(),
            amount_rule: AmountRule::TypeColumn,
            date: owned(DATE_ALIASES),
            description: owned(DESCRIPTION_ALIASES),
            amount: owned(AMOUNT_ALIASES),
            kind: owned(TYPE_ALIASES),
            credit: Vec::new(),
            debit: Vec::new(),
        },
        SchemaTemplate {
            name: "split-credit-debit".to_string(),
            amount_rule: AmountRule::SplitColumns,
            date: owned(DATE_ALIASES),
            description: owned(DESCRIPTION_ALIASES),
            amount: Vec::new(),
            kind: Vec::new(),
            credit: owned(CREDIT_ALIASES),
            debit: owned(DEBIT_ALIASES),
        },
        SchemaTemplate {
            name: "signed-amount".to_string(),
            amount_rule: AmountRule::Signed,
            date: owned(DATE_ALIASES),
            description: owned(DESCRIPTION_ALIASES),
            amount: owned(AMOUNT_ALIASES),
            kind: Vec::new(),
            credit: Vec::new(),
            debit: Vec::new(),
        },
    ]
}

fn find_column<S: AsRef<str>>(keys: &[String], aliases: &[S]) -> Option<usize> {
    aliases.iter().find_map(|alias| {
        let alias = header_key(alias.as_ref());
        keys.iter().position(|k| *k == alias)
    })
}

impl SchemaTemplate {
    /// Resolve this template against a header row. `None` when any column the
    /// amount rule needs is missing.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> Option<ColumnMap> {
        let keys: Vec<String> = headers.iter().map(|h| header_key(h.as_ref())).collect();

        let date = find_column(&keys, &self.date)?;
        let description = find_column(&keys, &self.description)?;
        let mut map = ColumnMap {
            date,
            description,
            amount: None,
            kind: None,
            credit: None,
            debit: None,
            category: find_column(&keys, CATEGORY_ALIASES),
        };

        match self.amount_rule {
            AmountRule::Signed => {
                map.amount = Some(find_column(&keys, &self.amount)?);
            }
            AmountRule::TypeColumn => {
                map.amount = Some(find_column(&keys, &self.amount)?);
                map.kind = Some(find_column(&keys, &self.kind)?);
            }
            AmountRule::SplitColumns => {
                map.credit = Some(find_column(&keys, &self.credit)?);
                map.debit = Some(find_column(&keys, &self.debit)?);
            }
        }

        Some(map)
    }

    /// Problems that would stop this template from ever matching
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let mut need = |field: &str, aliases: &[String]| {
            if aliases.iter().all(|a| header_key(a).is_empty()) {
                errors.push(format!(
                    "templates.{}.{}: at least one header alias is required",
                    self.name, field
                ));
            }
        };

        need("date", &self.date);
        need("description", &self.description);
        match self.amount_rule {
            AmountRule::Signed => need("amount", &self.amount),
            AmountRule::TypeColumn => {
                need("amount", &self.amount);
                need("type", &self.kind);
            }
            AmountRule::SplitColumns => {
                need("credit", &self.credit);
                need("debit", &self.debit);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// First template (in order) matching the header, with its column map
pub fn detect_schema<'t, S: AsRef<str>>(
    templates: &'t [SchemaTemplate],
    headers: &[S],
) -> Option<(&'t SchemaTemplate, ColumnMap)> {
    templates
        .iter()
        .find_map(|t| t.resolve(headers).map(|map| (t, map)))
}
