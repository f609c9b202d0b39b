use std::collections::HashMap;

use serde::Serialize;

use crate::display::TerminalDisplay;
use crate::session::state::Role;

/// An entry of the console's main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Dashboard,
    Books,
    Categories,
    Users,
    Borrows,
    MyBorrows,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Dashboard,
        Action::Books,
        Action::Categories,
        Action::Users,
        Action::Borrows,
        Action::MyBorrows,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::Dashboard => "Dashboard",
            Action::Books => "Books",
            Action::Categories => "Categories",
            Action::Users => "Users",
            Action::Borrows => "Borrows",
            Action::MyBorrows => "My Borrows",
        }
    }

    /// The console command that opens this entry.
    pub fn command(self) -> &'static str {
        match self {
            Action::Dashboard => "bookdesk borrow stats",
            Action::Books => "bookdesk book list",
            Action::Categories => "bookdesk category list",
            Action::Users => "bookdesk user list",
            Action::Borrows => "bookdesk borrow list",
            Action::MyBorrows => "bookdesk borrow mine",
        }
    }

    /// Users and borrow records are only managed by staff.
    pub fn is_staff_only(self) -> bool {
        matches!(self, Action::Users | Action::Borrows)
    }

    pub fn is_visible_to(self, role: Option<Role>) -> bool {
        !self.is_staff_only() || role.is_some_and(Role::is_staff)
    }
}

pub fn visible_actions(role: Option<Role>) -> Vec<Action> {
    Action::ALL
        .into_iter()
        .filter(|action| action.is_visible_to(role))
        .collect()
}

impl TerminalDisplay for Action {
    fn table_titles() -> Vec<&'static str> {
        vec!["Menu", "Command"]
    }

    fn table_row(self) -> Vec<String> {
        vec![self.label().to_string(), self.command().to_string()]
    }

    fn csv_titles() -> Vec<&'static str> {
        vec!["menu", "command"]
    }

    fn csv_row(self) -> HashMap<&'static str, String> {
        let mut row = HashMap::new();
        row.insert("menu", self.label().to_string());
        row.insert("command", self.command().to_string());
        row
    }
}
