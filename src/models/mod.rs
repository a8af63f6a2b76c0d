pub mod auth;
pub mod category;
pub mod form;
pub mod item;
pub mod money;
pub mod shared;

pub use auth::{Credentials, LoginResponse, Registration};
pub use category::{Category, CategoryForm, CategoryPayload};
pub use form::Form;
pub use item::{BudgetItem, ItemForm, ItemPayload, ItemType};
pub use money::Money;
pub use shared::{ShareForm, SharePayload, SharedContribution};
