use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::form::{required_id, Form};
use super::item::ItemType;
use super::money::Money;
use crate::api::resource::ResourceModel;
use crate::error::{ClientError, ClientResult};

pub const MIN_PERCENT: Decimal = Decimal::ONE;
pub const MAX_PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// A share of a budget item carried by the user. `amount` is computed by
/// the server and displayed as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedContribution {
    pub id: i64,
    #[serde(default)]
    pub budget_item_id: Option<i64>,
    pub item: String,
    #[serde(rename = "type")]
    pub kind: ItemType,
    #[serde(with = "rust_decimal::serde::float")]
    pub contribution_percent: Decimal,
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct SharePayload {
    pub budget_item_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub contribution_percent: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct ShareForm {
    pub budget_item_id: String,
    pub contribution_percent: String,
}

impl ShareForm {
    pub fn new(budget_item_id: impl Into<String>, contribution_percent: impl Into<String>) -> Self {
        Self {
            budget_item_id: budget_item_id.into(),
            contribution_percent: contribution_percent.into(),
        }
    }
}

impl Form for ShareForm {
    type Payload = SharePayload;

    fn validate(&self) -> ClientResult<SharePayload> {
        let mut field_errors = std::collections::BTreeMap::new();

        let budget_item_id = match required_id("budget_item_id", &self.budget_item_id) {
            Ok(id) => Some(id),
            Err(_) => {
                field_errors.insert("budget_item_id".to_string(), "Select a budget item".to_string());
                None
            }
        };

        let raw = self.contribution_percent.trim();
        let percent = if raw.is_empty() {
            field_errors.insert("contribution_percent".to_string(), "This field is required".to_string());
            None
        } else {
            match Decimal::from_str(raw) {
                Ok(p) if p >= MIN_PERCENT && p <= MAX_PERCENT => Some(p),
                Ok(_) => {
                    field_errors.insert(
                        "contribution_percent".to_string(),
                        format!("Must be between {} and {}", MIN_PERCENT, MAX_PERCENT),
                    );
                    None
                }
                Err(_) => {
                    field_errors.insert(
                        "contribution_percent".to_string(),
                        format!("'{}' is not a number", raw),
                    );
                    None
                }
            }
        };

        match (budget_item_id, percent) {
            (Some(budget_item_id), Some(contribution_percent)) => Ok(SharePayload {
                budget_item_id,
                contribution_percent,
            }),
            _ => Err(ClientError::invalid_input("Invalid shared contribution", field_errors)),
        }
    }
}

impl ResourceModel for SharedContribution {
    const PATH: &'static str = "shared";
    const LABEL: &'static str = "shared contribution";

    type Payload = SharePayload;

    fn id(&self) -> i64 {
        self.id
    }
}
