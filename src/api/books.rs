use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::display::{display_option, TerminalDisplay};
use crate::gateway::{Call, RequestError};

use super::{deserialize_decimal, PageQuery, Paginated};

pub const BOOKS_PATH: &str = "/books";
pub const SEARCH_BOOKS_PATH: &str = "/books/search/elasticsearch";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub isbn: String,
    pub title: String,
    pub author: String,

    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,

    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub price: f64,

    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub category_name: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,

    #[serde(default)]
    pub total_stock: u32,
    #[serde(default)]
    pub available_stock: u32,
    #[serde(default)]
    pub borrow_count: u32,

    /// `available`, `borrowed` or `maintenance`.
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available_stock > 0 && self.status == "available"
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BookCreate {
    pub isbn: String,
    pub title: String,
    pub author: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,

    pub price: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,

    pub total_stock: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl BookCreate {
    const ISBN_LENGTH: std::ops::RangeInclusive<usize> = 10..=20;

    /// Trims the required fields and checks them the way the server would.
    pub fn validate(&mut self) -> Result<(), RequestError> {
        self.isbn = self.isbn.trim().to_string();
        self.title = self.title.trim().to_string();
        self.author = self.author.trim().to_string();

        if !Self::ISBN_LENGTH.contains(&self.isbn.len()) {
            return Err(RequestError::Client(format!(
                "isbn should have 10 to 20 characters, found {}",
                self.isbn.len()
            )));
        }
        if self.title.is_empty() {
            return Err(RequestError::Client(String::from("title cannot be empty")));
        }
        if self.author.is_empty() {
            return Err(RequestError::Client(String::from("author cannot be empty")));
        }
        if self.price < 0.0 {
            return Err(RequestError::Client(String::from("price cannot be negative")));
        }
        Ok(())
    }
}

/// Partial update, only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        serde_json::to_value(self)
            .map(|value| value.as_object().map_or(true, |fields| fields.is_empty()))
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BookQuery {
    #[serde(flatten)]
    pub page: PageQuery,

    /// Matches title, author or isbn.
    pub keyword: Option<String>,
    pub category_id: Option<u64>,
    pub author: Option<String>,
    pub status: Option<String>,
    pub is_active: Option<bool>,
}

/// Full text search through the search engine.
#[derive(Debug, Clone, Serialize)]
pub struct BookSearch {
    pub keyword: String,
    pub category_id: Option<u64>,

    #[serde(flatten)]
    pub page: PageQuery,
}

impl Client {
    pub async fn list_books(&self, query: &BookQuery) -> Result<Paginated<Book>, RequestError> {
        let call = Call::get(BOOKS_PATH).query(query)?;
        self.gateway().send(call).await
    }

    pub async fn get_book(&self, id: u64) -> Result<Book, RequestError> {
        self.gateway()
            .send(Call::get(format!("{BOOKS_PATH}/{id}")))
            .await
    }

    pub async fn create_book(&self, book: &BookCreate) -> Result<Book, RequestError> {
        let call = Call::post(BOOKS_PATH).json(book)?;
        self.gateway().send(call).await
    }

    pub async fn update_book(&self, id: u64, update: &BookUpdate) -> Result<Book, RequestError> {
        let call = Call::put(format!("{BOOKS_PATH}/{id}")).json(update)?;
        self.gateway().send(call).await
    }

    pub async fn delete_book(&self, id: u64) -> Result<(), RequestError> {
        self.gateway()
            .send_unit(Call::delete(format!("{BOOKS_PATH}/{id}")))
            .await
    }

    pub async fn search_books(&self, search: &BookSearch) -> Result<Paginated<Book>, RequestError> {
        if search.keyword.trim().is_empty() {
            return Err(RequestError::Client(String::from(
                "search keyword cannot be empty",
            )));
        }
        let call = Call::get(SEARCH_BOOKS_PATH).query(search)?;
        self.gateway().send(call).await
    }
}

impl TerminalDisplay for Book {
    fn table_titles() -> Vec<&'static str> {
        vec!["ID", "ISBN", "Title", "Author", "Category", "Stock", "Status"]
    }

    fn table_row(self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.isbn,
            self.title,
            self.author,
            display_option(self.category_name),
            format!("{}/{}", self.available_stock, self.total_stock),
            self.status,
        ]
    }

    fn csv_titles() -> Vec<&'static str> {
        vec![
            "id",
            "isbn",
            "title",
            "author",
            "publisher",
            "price",
            "category",
            "available_stock",
            "total_stock",
            "status",
            "location",
        ]
    }

    fn csv_row(self) -> HashMap<&'static str, String> {
        let mut row = HashMap::new();
        row.insert("id", self.id.to_string());
        row.insert("isbn", self.isbn);
        row.insert("title", self.title);
        row.insert("author", self.author);
        row.insert("publisher", self.publisher.unwrap_or_default());
        row.insert("price", format!("{:.2}", self.price));
        row.insert("category", self.category_name.unwrap_or_default());
        row.insert("available_stock", self.available_stock.to_string());
        row.insert("total_stock", self.total_stock.to_string());
        row.insert("status", self.status);
        row.insert("location", self.location.unwrap_or_default());
        row
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_book_from_server() {
        let book: Book = serde_json::from_value(json!({
            "id": 7,
            "isbn": "9787020002207",
            "title": "Dream of the Red Chamber",
            "author": "Cao Xueqin",
            "publisher": null,
            "price": "59.70",
            "category_id": 2,
            "category_name": "Classics",
            "total_stock": 3,
            "available_stock": 1,
            "borrow_count": 12,
            "status": "available",
            "created_at": "2024-03-01T10:00:00",
            "updated_at": "2024-03-02T10:00:00",
        }))
        .unwrap();
        assert_eq!(book.price, 59.7);
        assert!(book.is_active);
        assert!(book.is_available());
        assert_eq!(book.publisher, None);
    }

    #[test]
    fn test_validate_book_create() {
        let mut book = BookCreate {
            isbn: String::from(" 9787020002207 "),
            title: String::from("Dream of the Red Chamber"),
            author: String::from("Cao Xueqin"),
            total_stock: 1,
            ..Default::default()
        };
        book.validate().unwrap();
        assert_eq!(book.isbn, "9787020002207");

        book.isbn = String::from("123");
        assert!(matches!(book.validate(), Err(RequestError::Client(_))));

        book.isbn = String::from("9787020002207");
        book.title = String::from("   ");
        assert!(book.validate().is_err());
    }

    #[test]
    fn test_book_update_only_sends_set_fields() {
        let update = BookUpdate::default();
        assert!(update.is_empty());

        let update = BookUpdate {
            total_stock: Some(5),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"total_stock": 5}));
    }

    #[test]
    fn test_book_query_params() {
        let query = BookQuery {
            keyword: Some(String::from("dune")),
            is_active: Some(true),
            ..Default::default()
        };
        let mut params = Call::get(BOOKS_PATH).query(&query).unwrap().query;
        params.sort();
        assert_eq!(
            params,
            vec![
                (String::from("is_active"), String::from("true")),
                (String::from("keyword"), String::from("dune")),
                (String::from("page"), String::from("1")),
                (String::from("page_size"), String::from("10")),
            ]
        );
    }
}
