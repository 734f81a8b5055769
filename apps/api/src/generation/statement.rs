//! Statement transform — maps parsed bank-statement output onto template keys.
//!
//! Header values use the statement templates' literal key names
//! (`Cname`, `StatmentDate`, `TotalDepits`, ...). Each kept transaction `n`
//! becomes `Tr{n}Date`, `Tr{n}Pdate`, `Tr{n}Details`, `Tr{n}Debits`,
//! `Tr{n}Credits` and, when present, `Tr{n}Currency` / `Tr{n}Amount`.
#![allow(dead_code)]

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::pagination::{DataRecord, PaginationRequest};

/// Repeating-block prefix of the statement templates.
pub const TRANSACTION_PREFIX: &str = "Tr";

/// Parser rows whose description contains this are section headers, not transactions.
const SECTION_HEADER_MARKER: &str = "Account transactions";

// ────────────────────────────────────────────────────────────────────────────
// Input models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub post_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, alias = "amountInBHD")]
    pub amount_in_bhd: Option<f64>,
    /// `true` for credits; anything else is booked as a debit.
    #[serde(default)]
    pub cr: Option<bool>,
}

impl Transaction {
    fn is_reportable(&self) -> bool {
        let has_date = self.date.as_deref().is_some_and(|d| !d.is_empty());
        match self.description.as_deref() {
            Some(desc) => has_date && !desc.is_empty() && !desc.contains(SECTION_HEADER_MARKER),
            None => false,
        }
    }
}

/// Parsed statement as produced by the upstream parser.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRequest {
    pub org_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub statement_date: Option<String>,
    #[serde(default)]
    pub available_balance: Option<f64>,
    #[serde(default)]
    pub opening_balance: Option<f64>,
    #[serde(default)]
    pub current_balance: Option<f64>,
    #[serde(default, alias = "toatalDepits")]
    pub total_debits: Option<f64>,
    #[serde(default)]
    pub total_credits: Option<f64>,
    pub transactions: Vec<Transaction>,
}

/// Template-ready form of a statement.
#[derive(Debug, Clone)]
pub struct StatementDocument {
    pub template_name: String,
    pub data: DataRecord,
    pub pagination: PaginationRequest,
    pub transaction_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Organisation → template mapping
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgTemplateMap(BTreeMap<String, String>);

impl OrgTemplateMap {
    /// Parses `org=template` pairs separated by commas, e.g. `266=new-template,123=invoice`.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut map = BTreeMap::new();
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((org, template)) = pair.split_once('=') else {
                bail!("Invalid org template mapping '{pair}', expected ORG=TEMPLATE");
            };
            let (org, template) = (org.trim(), template.trim());
            if org.is_empty() || template.is_empty() {
                bail!("Invalid org template mapping '{pair}', expected ORG=TEMPLATE");
            }
            map.insert(org.to_string(), template.to_string());
        }
        Ok(Self(map))
    }

    pub fn template_for(&self, org_id: &str) -> Result<&str, AppError> {
        self.0.get(org_id).map(String::as_str).ok_or_else(|| {
            AppError::Validation(format!("No template mapping found for orgId: {org_id}"))
        })
    }

    pub fn contains(&self, org_id: &str) -> bool {
        self.0.contains_key(org_id)
    }
}

impl Default for OrgTemplateMap {
    fn default() -> Self {
        Self(BTreeMap::from([(
            "266".to_string(),
            "new-template".to_string(),
        )]))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transform
// ────────────────────────────────────────────────────────────────────────────

pub fn transform_statement(
    statement: &StatementRequest,
    org_templates: &OrgTemplateMap,
    items_per_page: i64,
) -> Result<StatementDocument, AppError> {
    let template_name = org_templates.template_for(&statement.org_id)?.to_string();

    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let mut data = DataRecord::from([
        ("Cname".to_string(), text(&statement.name)),
        ("Caddress".to_string(), text(&statement.address)),
        ("CardNumber".to_string(), text(&statement.card_number)),
        ("StatmentDate".to_string(), text(&statement.statement_date)),
    ]);

    // Card number is also laid out one character per box: CN1..CNn.
    if let Some(card) = &statement.card_number {
        for (i, ch) in card.chars().enumerate() {
            data.insert(format!("CN{}", i + 1), ch.to_string());
        }
    }

    let balances = [
        ("AvailableBalance", statement.available_balance),
        ("OpeningBalance", statement.opening_balance),
        ("CurrentBalance", statement.current_balance),
        ("TotalDepits", statement.total_debits),
        ("TotalCredits", statement.total_credits),
    ];
    for (key, value) in balances {
        if let Some(value) = value {
            data.insert(key.to_string(), value.to_string());
        }
    }

    let reportable: Vec<&Transaction> = statement
        .transactions
        .iter()
        .filter(|tx| tx.is_reportable())
        .collect();

    for (i, tx) in reportable.iter().enumerate() {
        let n = i + 1;
        let key = |column: &str| format!("{TRANSACTION_PREFIX}{n}{column}");

        data.insert(key("Date"), text(&tx.date));
        data.insert(key("Pdate"), text(&tx.post_date));
        data.insert(key("Details"), text(&tx.description));

        let booked = nonzero_amount(tx.amount_in_bhd);
        let (debit, credit) = if tx.cr == Some(true) {
            (String::new(), booked)
        } else {
            (booked, String::new())
        };
        data.insert(key("Debits"), debit);
        data.insert(key("Credits"), credit);

        if let Some(currency) = tx.currency.as_deref().filter(|c| !c.is_empty()) {
            data.insert(key("Currency"), currency.to_string());
        }
        if let Some(amount) = tx.amount.filter(|a| *a != 0.0) {
            data.insert(key("Amount"), amount.to_string());
        }
    }

    debug!(
        "Statement for org {} → template '{}': {} of {} transactions kept",
        statement.org_id,
        template_name,
        reportable.len(),
        statement.transactions.len()
    );

    Ok(StatementDocument {
        template_name,
        data,
        pagination: PaginationRequest {
            item_prefix: TRANSACTION_PREFIX.to_string(),
            items_per_page,
            clustering: Default::default(),
        },
        transaction_count: reportable.len(),
    })
}

/// Zero and missing amounts render as an empty cell.
fn nonzero_amount(amount: Option<f64>) -> String {
    amount
        .filter(|a| *a != 0.0)
        .map(|a| a.to_string())
        .unwrap_or_default()
}
