use std::collections::HashMap;

use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::Serialize;

use crate::api::Paginated;
use crate::table::Table;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DisplayStyle {
    Table,
    Json,
    Csv,
}

/// How a resource renders in the console.
pub trait TerminalDisplay {
    fn table_titles() -> Vec<&'static str>;
    fn table_row(self) -> Vec<String>;

    fn csv_titles() -> Vec<&'static str>;
    fn csv_row(self) -> HashMap<&'static str, String>;
}

pub fn display_json<T: Serialize>(o: T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&o)?);
    Ok(())
}

/// Renders one page of a listing, followed by the paging position on stderr
/// so that piped output stays a clean list.
pub fn display_page<T: Serialize + TerminalDisplay>(
    page: Paginated<T>,
    style: DisplayStyle,
    headless: bool,
    csv_titles: Option<String>,
) -> Result<()> {
    let footer = page_footer(&page);
    display_list(page.items, style, headless, csv_titles)?;
    if matches!(style, DisplayStyle::Table) && !headless {
        eprintln!("{footer}");
    }
    Ok(())
}

fn page_footer<T>(page: &Paginated<T>) -> String {
    let footer = format!(
        "Page {}/{}, {} in total",
        page.page,
        page.total_pages.max(1),
        page.total
    );
    if page.is_last_page() {
        return footer;
    }
    format!("{footer}, next with `--page {}`", page.page + 1)
}

pub fn display_list<T: Serialize + TerminalDisplay>(
    list: Vec<T>,
    style: DisplayStyle,
    headless: bool,
    csv_titles: Option<String>,
) -> Result<()> {
    match style {
        DisplayStyle::Table => {
            if list.is_empty() {
                println!("<empty list>");
                return Ok(());
            }
            let mut table = Table::with_capacity(list.len(), headless);
            table.add(T::table_titles().iter().map(|s| s.to_string()).collect());
            for item in list {
                table.add(item.table_row());
            }
            table.show();
        }
        DisplayStyle::Csv => {
            let titles = select_csv_titles(T::csv_titles(), csv_titles)?;
            if !headless {
                println!("{}", titles.join(","));
            }
            for item in list {
                let mut row = item.csv_row();
                let values = titles
                    .iter()
                    .map(|title| csv_escape(row.remove(*title).unwrap_or_default()))
                    .collect::<Vec<_>>();
                println!("{}", values.join(","));
            }
        }
        DisplayStyle::Json => {
            let json = serde_json::to_string_pretty(&list)?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn select_csv_titles(
    available: Vec<&'static str>,
    filter: Option<String>,
) -> Result<Vec<&'static str>> {
    let titles = match filter {
        Some(filter) => {
            let filter = filter.split(',').map(str::trim).collect::<Vec<_>>();
            available
                .iter()
                .filter(|t| filter.contains(t))
                .copied()
                .collect()
        }
        None => available.clone(),
    };
    if titles.is_empty() {
        bail!("No csv column to display, available: {:?}", available);
    }
    Ok(titles)
}

fn csv_escape(value: String) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value
    }
}

/// Cell text for an optional field.
pub fn display_option<T: ToString>(value: Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => String::from("-"),
    }
}
