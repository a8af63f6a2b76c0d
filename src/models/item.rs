use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::form::{required_id, required_text, Form};
use super::money::Money;
use crate::api::resource::{ResourceModel, Updatable};
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Income,
    Expense,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Income => "income",
            ItemType::Expense => "expense",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(ItemType::Income),
            "expense" => Ok(ItemType::Expense),
            other => Err(format!("'{}' is not income or expense", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub id: i64,
    pub title: String,
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: ItemType,
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Category name, denormalized by the list endpoint
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemPayload {
    pub title: String,
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub category_id: i64,
}

/// Item form as typed by the user; every field is raw text
#[derive(Debug, Clone, Default)]
pub struct ItemForm {
    pub title: String,
    pub amount: String,
    pub kind: String,
    pub category_id: String,
}

impl Form for ItemForm {
    type Payload = ItemPayload;

    fn validate(&self) -> ClientResult<ItemPayload> {
        let title = required_text("title", &self.title)?;

        let amount_text = required_text("amount", &self.amount)?;
        let amount = Money::from_str(&amount_text)
            .map_err(|_| ClientError::field("amount", format!("'{}' is not a number", amount_text)))?;
        if amount.is_negative() {
            return Err(ClientError::field(
                "amount",
                "Amount must not be negative; use the type to mark expenses",
            ));
        }

        let kind_text = required_text("type", &self.kind)?;
        let kind = ItemType::from_str(&kind_text).map_err(|e| ClientError::field("type", e))?;

        let category_id = required_id("category_id", &self.category_id)?;

        Ok(ItemPayload {
            title,
            amount,
            kind,
            category_id,
        })
    }
}

impl ResourceModel for BudgetItem {
    const PATH: &'static str = "items";
    const LABEL: &'static str = "item";

    type Payload = ItemPayload;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Updatable for BudgetItem {}

#[cfg(test)]
mod tests {
    use super::*;

    fn rent() -> ItemForm {
        ItemForm {
            title: "Rent".into(),
            amount: "1200".into(),
            kind: "expense".into(),
            category_id: "3".into(),
        }
    }

    #[test]
    fn test_valid_form() {
        let payload = rent().validate().unwrap();
        assert_eq!(payload.kind, ItemType::Expense);
        assert_eq!(payload.amount.to_string(), "1200.00");
        assert_eq!(payload.category_id, 3);
    }

    #[test]
    fn test_payload_wire_shape() {
        let body = serde_json::to_value(rent().validate().unwrap()).unwrap();
        assert_eq!(body["type"], "expense");
        assert_eq!(body["amount"], 1200.0);
        assert_eq!(body["category_id"], 3);
    }

    #[test]
    fn test_field_errors() {
        let mut form = rent();
        form.amount = "twelve".into();
        assert!(form.validate().unwrap_err().to_json()["field_errors"]["amount"].is_string());

        let mut form = rent();
        form.kind = "gift".into();
        assert!(form.validate().unwrap_err().to_json()["field_errors"]["type"].is_string());

        let mut form = rent();
        form.category_id = "".into();
        assert!(form.validate().unwrap_err().to_json()["field_errors"]["category_id"].is_string());
    }

    #[test]
    fn test_list_row_without_category_id() {
        let row = r#"{"id": 1, "title": "Salary", "amount": 3000.0, "type": "income",
                      "created_at": "Mon, 01 Jan 2024 00:00:00 GMT", "category": "Work"}"#;
        let item: BudgetItem = serde_json::from_str(row).unwrap();
        assert_eq!(item.kind, ItemType::Income);
        assert_eq!(item.category_id, None);
        assert_eq!(item.category.as_deref(), Some("Work"));
    }
}
