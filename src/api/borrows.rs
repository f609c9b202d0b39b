use std::collections::HashMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::display::{display_option, TerminalDisplay};
use crate::gateway::{Call, RequestError};

use super::{PageQuery, Paginated};

pub const BORROWS_PATH: &str = "/borrows";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
    Overdue,
    Lost,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Borrowed => "borrowed",
            BorrowStatus::Returned => "returned",
            BorrowStatus::Overdue => "overdue",
            BorrowStatus::Lost => "lost",
        }
    }
}

impl fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowRecord {
    pub id: u64,
    pub user_id: u64,
    pub book_id: u64,

    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub book_title: Option<String>,
    #[serde(default)]
    pub book_isbn: Option<String>,

    pub borrow_date: String,
    pub due_date: String,
    #[serde(default)]
    pub return_date: Option<String>,

    pub status: BorrowStatus,

    #[serde(default)]
    pub renew_count: u32,
    #[serde(default = "BorrowRecord::default_max_renew_count")]
    pub max_renew_count: u32,

    #[serde(default)]
    pub overdue_days: u32,
    #[serde(default)]
    pub fine_amount: f64,

    #[serde(default)]
    pub remark: Option<String>,

    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl BorrowRecord {
    fn default_max_renew_count() -> u32 {
        2
    }

    /// Whether the server would accept a renewal of this record.
    pub fn can_renew(&self) -> bool {
        self.status == BorrowStatus::Borrowed && self.renew_count < self.max_renew_count
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BorrowCreate {
    pub user_id: u64,
    pub book_id: u64,

    /// Loan period, the server defaults to 30 days.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_days: Option<u32>,
}

impl BorrowCreate {
    pub const MAX_DUE_DAYS: u32 = 60;
}

#[derive(Debug, Clone, Serialize)]
pub struct ReturnRequest {
    pub record_id: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct RenewRequest {
    record_id: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BorrowQuery {
    #[serde(flatten)]
    pub page: PageQuery,

    pub user_id: Option<u64>,
    pub book_id: Option<u64>,
    pub status: Option<BorrowStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MyBorrowQuery {
    #[serde(flatten)]
    pub page: PageQuery,

    pub status: Option<BorrowStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorrowStatistics {
    #[serde(default)]
    pub total_borrow_count: u64,
    #[serde(default)]
    pub total_return_count: u64,
    #[serde(default)]
    pub total_overdue_count: u64,
    #[serde(default)]
    pub total_fine_amount: f64,
    #[serde(default)]
    pub popular_books: Vec<PopularBook>,
    #[serde(default)]
    pub active_users: Vec<ActiveUser>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularBook {
    pub id: u64,
    pub title: String,
    pub borrow_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveUser {
    pub id: u64,
    pub username: String,
    pub borrow_count: u64,
}

impl Client {
    /// Every record in the library, staff only.
    pub async fn list_borrows(
        &self,
        query: &BorrowQuery,
    ) -> Result<Paginated<BorrowRecord>, RequestError> {
        let call = Call::get(BORROWS_PATH).query(query)?;
        self.gateway().send(call).await
    }

    /// Records of the logged in user.
    pub async fn my_borrows(
        &self,
        query: &MyBorrowQuery,
    ) -> Result<Paginated<BorrowRecord>, RequestError> {
        let call = Call::get(format!("{BORROWS_PATH}/my")).query(query)?;
        self.gateway().send(call).await
    }

    pub async fn overdue_borrows(
        &self,
        page: &PageQuery,
    ) -> Result<Paginated<BorrowRecord>, RequestError> {
        let call = Call::get(format!("{BORROWS_PATH}/overdue")).query(page)?;
        self.gateway().send(call).await
    }

    pub async fn borrow_statistics(&self) -> Result<BorrowStatistics, RequestError> {
        self.gateway()
            .send(Call::get(format!("{BORROWS_PATH}/statistics")))
            .await
    }

    pub async fn borrow_book(&self, req: &BorrowCreate) -> Result<BorrowRecord, RequestError> {
        if let Some(days) = req.due_days {
            if days == 0 || days > BorrowCreate::MAX_DUE_DAYS {
                return Err(RequestError::Client(format!(
                    "due_days should be in range [1,{}], found {days}",
                    BorrowCreate::MAX_DUE_DAYS
                )));
            }
        }
        let call = Call::post(BORROWS_PATH).json(req)?;
        self.gateway().send(call).await
    }

    pub async fn return_book(&self, req: &ReturnRequest) -> Result<BorrowRecord, RequestError> {
        let call = Call::post(format!("{BORROWS_PATH}/return")).json(req)?;
        self.gateway().send(call).await
    }

    pub async fn renew_borrow(&self, record_id: u64) -> Result<BorrowRecord, RequestError> {
        let call = Call::post(format!("{BORROWS_PATH}/renew")).json(&RenewRequest { record_id })?;
        self.gateway().send(call).await
    }
}

impl TerminalDisplay for BorrowRecord {
    fn table_titles() -> Vec<&'static str> {
        vec![
            "ID", "User", "Book", "Borrowed", "Due", "Status", "Renew", "Renewable", "Fine",
        ]
    }

    fn table_row(self) -> Vec<String> {
        let renewable = if self.can_renew() { "yes" } else { "no" };
        let user = self.user_name.unwrap_or_else(|| format!("#{}", self.user_id));
        let book = self.book_title.unwrap_or_else(|| format!("#{}", self.book_id));
        vec![
            self.id.to_string(),
            user,
            book,
            short_date(&self.borrow_date),
            short_date(&self.due_date),
            self.status.to_string(),
            format!("{}/{}", self.renew_count, self.max_renew_count),
            renewable.to_string(),
            format!("{:.2}", self.fine_amount),
        ]
    }

    fn csv_titles() -> Vec<&'static str> {
        vec![
            "id",
            "user_id",
            "user_name",
            "book_id",
            "book_title",
            "borrow_date",
            "due_date",
            "return_date",
            "status",
            "renew_count",
            "overdue_days",
            "fine_amount",
        ]
    }

    fn csv_row(self) -> HashMap<&'static str, String> {
        let mut row = HashMap::new();
        row.insert("id", self.id.to_string());
        row.insert("user_id", self.user_id.to_string());
        row.insert("user_name", self.user_name.unwrap_or_default());
        row.insert("book_id", self.book_id.to_string());
        row.insert("book_title", self.book_title.unwrap_or_default());
        row.insert("borrow_date", self.borrow_date);
        row.insert("due_date", self.due_date);
        row.insert("return_date", display_option(self.return_date));
        row.insert("status", self.status.to_string());
        row.insert("renew_count", self.renew_count.to_string());
        row.insert("overdue_days", self.overdue_days.to_string());
        row.insert("fine_amount", format!("{:.2}", self.fine_amount));
        row
    }
}

/// `2024-03-01T10:00:00` becomes `2024-03-01`.
fn short_date(date: &str) -> String {
    match date.split_once('T') {
        Some((day, _)) => day.to_string(),
        None => date.to_string(),
    }
}
