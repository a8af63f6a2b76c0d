use serde::{Deserialize, Serialize};

use super::form::{required_text, Form};
use crate::api::resource::{ResourceModel, Updatable};
use crate::error::ClientResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryPayload {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: String,
}

impl CategoryForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Form for CategoryForm {
    type Payload = CategoryPayload;

    fn validate(&self) -> ClientResult<CategoryPayload> {
        Ok(CategoryPayload {
            name: required_text("name", &self.name)?,
        })
    }
}

impl ResourceModel for Category {
    const PATH: &'static str = "categories";
    const LABEL: &'static str = "category";

    type Payload = CategoryPayload;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Updatable for Category {}
