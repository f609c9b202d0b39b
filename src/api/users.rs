use std::collections::HashMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::display::{display_option, TerminalDisplay};
use crate::gateway::{Call, RequestError};
use crate::session::state::Role;

use super::{PageQuery, Paginated};

pub const USERS_PATH: &str = "/users";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account as administrators see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,

    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,

    pub role: Role,
    pub status: UserStatus,

    #[serde(default)]
    pub max_borrow_count: u32,
    #[serde(default)]
    pub current_borrow_count: u32,

    #[serde(default)]
    pub last_login_at: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    pub role: Role,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_borrow_count: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_borrow_count: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserQuery {
    #[serde(flatten)]
    pub page: PageQuery,

    pub keyword: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordUpdate {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: UserStatus,
}

#[derive(Debug, Serialize)]
struct RoleUpdate {
    role: Role,
}

impl UserCreate {
    const MIN_USERNAME_LENGTH: usize = 3;
    const MIN_PASSWORD_LENGTH: usize = 6;
    const MAX_BORROW_COUNT: u32 = 20;

    pub fn validate(&self) -> Result<(), RequestError> {
        if self.username.len() < Self::MIN_USERNAME_LENGTH {
            return Err(RequestError::Client(format!(
                "username should have at least {} characters",
                Self::MIN_USERNAME_LENGTH
            )));
        }
        if !self.email.contains('@') {
            return Err(RequestError::Client(format!(
                "invalid email '{}'",
                self.email
            )));
        }
        validate_password(&self.password)?;
        if let Some(count) = self.max_borrow_count {
            if count == 0 || count > Self::MAX_BORROW_COUNT {
                return Err(RequestError::Client(format!(
                    "max_borrow_count should be in range [1,{}], found {count}",
                    Self::MAX_BORROW_COUNT
                )));
            }
        }
        Ok(())
    }
}

fn validate_password(password: &str) -> Result<(), RequestError> {
    if password.len() < UserCreate::MIN_PASSWORD_LENGTH {
        return Err(RequestError::Client(format!(
            "password should have at least {} characters",
            UserCreate::MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

impl Client {
    pub async fn list_users(&self, query: &UserQuery) -> Result<Paginated<User>, RequestError> {
        let call = Call::get(USERS_PATH).query(query)?;
        self.gateway().send(call).await
    }

    pub async fn get_user(&self, id: u64) -> Result<User, RequestError> {
        self.gateway()
            .send(Call::get(format!("{USERS_PATH}/{id}")))
            .await
    }

    pub async fn create_user(&self, user: &UserCreate) -> Result<User, RequestError> {
        user.validate()?;
        let call = Call::post(USERS_PATH).json(user)?;
        self.gateway().send(call).await
    }

    pub async fn update_user(&self, id: u64, update: &UserUpdate) -> Result<User, RequestError> {
        let call = Call::put(format!("{USERS_PATH}/{id}")).json(update)?;
        self.gateway().send(call).await
    }

    pub async fn delete_user(&self, id: u64) -> Result<(), RequestError> {
        self.gateway()
            .send_unit(Call::delete(format!("{USERS_PATH}/{id}")))
            .await
    }

    pub async fn update_user_password(
        &self,
        id: u64,
        update: &PasswordUpdate,
    ) -> Result<(), RequestError> {
        validate_password(&update.new_password)?;
        let call = Call::put(format!("{USERS_PATH}/{id}/password")).json(update)?;
        self.gateway().send_unit(call).await
    }

    pub async fn update_user_status(&self, id: u64, status: UserStatus) -> Result<(), RequestError> {
        let call = Call::put(format!("{USERS_PATH}/{id}/status")).json(&StatusUpdate { status })?;
        self.gateway().send_unit(call).await
    }

    pub async fn update_user_role(&self, id: u64, role: Role) -> Result<(), RequestError> {
        let call = Call::put(format!("{USERS_PATH}/{id}/role")).json(&RoleUpdate { role })?;
        self.gateway().send_unit(call).await
    }
}

impl TerminalDisplay for User {
    fn table_titles() -> Vec<&'static str> {
        vec!["ID", "Username", "Name", "Role", "Status", "Borrowing", "Last Login"]
    }

    fn table_row(self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.username,
            display_option(self.full_name),
            self.role.to_string(),
            self.status.to_string(),
            format!("{}/{}", self.current_borrow_count, self.max_borrow_count),
            display_option(self.last_login_at),
        ]
    }

    fn csv_titles() -> Vec<&'static str> {
        vec![
            "id",
            "username",
            "email",
            "phone",
            "full_name",
            "role",
            "status",
            "current_borrow_count",
            "max_borrow_count",
            "created_at",
        ]
    }

    fn csv_row(self) -> HashMap<&'static str, String> {
        let mut row = HashMap::new();
        row.insert("id", self.id.to_string());
        row.insert("username", self.username);
        row.insert("email", self.email);
        row.insert("phone", self.phone.unwrap_or_default());
        row.insert("full_name", self.full_name.unwrap_or_default());
        row.insert("role", self.role.to_string());
        row.insert("status", self.status.to_string());
        row.insert("current_borrow_count", self.current_borrow_count.to_string());
        row.insert("max_borrow_count", self.max_borrow_count.to_string());
        row.insert("created_at", self.created_at);
        row
    }
}
