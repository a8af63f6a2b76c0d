use serde::Serialize;

use crate::api::{ApiClient, ResourceApi};
use crate::error::ClientResult;
use crate::models::{BudgetItem, Category, ItemType, Money, SharedContribution};

/// Totals across the three collections, loaded concurrently
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub categories: usize,
    pub items: usize,
    pub shared: usize,
    pub income: Money,
    pub expense: Money,
    /// Sum of server-computed shares
    pub shared_amount: Money,
}

impl Dashboard {
    pub async fn load(client: &ApiClient) -> ClientResult<Self> {
        let categories = client.resource::<Category>();
        let items = client.resource::<BudgetItem>();
        let shared = client.resource::<SharedContribution>();

        let result = futures::try_join!(categories.list(), items.list(), shared.list());

        match result {
            Ok((categories, items, shared)) => Ok(Self::summarize(&categories, &items, &shared)),
            Err(e) => {
                if e.is_auth() {
                    tracing::warn!("token rejected while loading dashboard, forcing logout");
                    if let Err(clear) = client.session().clear_token() {
                        tracing::warn!("failed to clear session: {}", clear);
                    }
                }
                Err(e)
            }
        }
    }

    pub fn summarize(
        categories: &[Category],
        items: &[BudgetItem],
        shared: &[SharedContribution],
    ) -> Self {
        let total = |kind: ItemType| -> Money {
            items
                .iter()
                .filter(|item| item.kind == kind)
                .map(|item| item.amount)
                .sum()
        };

        Self {
            categories: categories.len(),
            items: items.len(),
            shared: shared.len(),
            income: total(ItemType::Income),
            expense: total(ItemType::Expense),
            shared_amount: shared.iter().map(|s| s.amount).sum(),
        }
    }

    pub fn net(&self) -> Money {
        self.income - self.expense
    }
}
