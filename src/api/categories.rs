use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::display::{display_option, TerminalDisplay};
use crate::gateway::{Call, RequestError};

use super::{PageQuery, Paginated};

pub const CATEGORIES_PATH: &str = "/categories";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<u64>,

    #[serde(default)]
    pub sort_order: u32,
    #[serde(default)]
    pub is_active: bool,

    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryCreate {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryQuery {
    #[serde(flatten)]
    pub page: PageQuery,

    pub name: Option<String>,
    pub parent_id: Option<u64>,
    pub is_active: Option<bool>,
}

impl Client {
    pub async fn list_categories(
        &self,
        query: &CategoryQuery,
    ) -> Result<Paginated<Category>, RequestError> {
        let call = Call::get(CATEGORIES_PATH).query(query)?;
        self.gateway().send(call).await
    }

    /// Every category without paging, for pickers.
    pub async fn all_categories(&self) -> Result<Vec<Category>, RequestError> {
        self.gateway()
            .send(Call::get(format!("{CATEGORIES_PATH}/all")))
            .await
    }

    pub async fn get_category(&self, id: u64) -> Result<Category, RequestError> {
        self.gateway()
            .send(Call::get(format!("{CATEGORIES_PATH}/{id}")))
            .await
    }

    pub async fn create_category(&self, category: &CategoryCreate) -> Result<Category, RequestError> {
        if category.name.trim().is_empty() {
            return Err(RequestError::Client(String::from(
                "category name cannot be empty",
            )));
        }
        let call = Call::post(CATEGORIES_PATH).json(category)?;
        self.gateway().send(call).await
    }

    pub async fn update_category(
        &self,
        id: u64,
        update: &CategoryUpdate,
    ) -> Result<Category, RequestError> {
        let call = Call::put(format!("{CATEGORIES_PATH}/{id}")).json(update)?;
        self.gateway().send(call).await
    }

    pub async fn delete_category(&self, id: u64) -> Result<(), RequestError> {
        self.gateway()
            .send_unit(Call::delete(format!("{CATEGORIES_PATH}/{id}")))
            .await
    }
}

impl TerminalDisplay for Category {
    fn table_titles() -> Vec<&'static str> {
        vec!["ID", "Name", "Parent", "Order", "Active"]
    }

    fn table_row(self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name,
            display_option(self.parent_id),
            self.sort_order.to_string(),
            self.is_active.to_string(),
        ]
    }

    fn csv_titles() -> Vec<&'static str> {
        vec!["id", "name", "description", "parent_id", "sort_order", "is_active"]
    }

    fn csv_row(self) -> HashMap<&'static str, String> {
        vec![
            ("id", self.id.to_string()),
            ("name", self.name),
            ("description", self.description.unwrap_or_default()),
            (
                "parent_id",
                self.parent_id.map(|id| id.to_string()).unwrap_or_default(),
            ),
            ("sort_order", self.sort_order.to_string()),
            ("is_active", self.is_active.to_string()),
        ]
        .into_iter()
        .collect()
    }
}
