mod auth;
mod book;
mod borrow;
mod category;
mod config;
mod menu;
mod user;

use anyhow::{bail, Result};
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use bookdesk::api::{PageQuery, Paginated};
use bookdesk::client::factory::ClientFactory;
use bookdesk::client::Client;
use bookdesk::config::ConfigArgs;
use bookdesk::display::{display_json, display_list, display_page, DisplayStyle, TerminalDisplay};
use bookdesk::logs;

#[async_trait]
pub trait RunCommand {
    async fn run(&self) -> Result<()>;
}

/// Flags shared by every command that talks to the server.
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Log level: error, warn, info or debug. Overrides `log_level` in the config.
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl ClientArgs {
    /// Loads the client config and sets up logging.
    pub fn load(&self) -> Result<ClientFactory> {
        let ps = self.config.build_path_set()?;
        let factory = ClientFactory::load(&ps)?;

        let level = match self.log_level {
            Some(ref level) => level.as_str(),
            None => factory.config().log_level.as_str(),
        };
        logs::init(level)?;

        Ok(factory)
    }

    /// Builds a client for a confirmed session. The stored session is checked
    /// with the server first, commands fail when nobody is logged in.
    pub async fn connect(&self) -> Result<Client> {
        let factory = self.load()?;
        let client = factory.build_client()?;
        client.revalidate().await?;
        client.require_login()?;
        Ok(client)
    }
}

#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// Page number, starting from 1.
    #[arg(long, default_value = "1")]
    pub page: u64,

    /// Number of items per page, at most 100.
    #[arg(long, default_value = "10")]
    pub page_size: u64,
}

impl PageArgs {
    pub fn build(&self) -> Result<PageQuery> {
        if self.page == 0 {
            bail!("page starts from 1");
        }
        if self.page_size == 0 || self.page_size > PageQuery::MAX_PAGE_SIZE {
            bail!(
                "page size should be in range [1,{}], found {}",
                PageQuery::MAX_PAGE_SIZE,
                self.page_size
            );
        }
        Ok(PageQuery::new(self.page, self.page_size))
    }
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// The display style.
    #[arg(short, long, default_value = "table")]
    pub output: DisplayStyle,

    /// Do not show the header row.
    #[arg(long)]
    pub headless: bool,

    /// When displaying in CSV format, manually specify the columns to display.
    #[arg(long)]
    pub csv_titles: Option<String>,
}

impl OutputArgs {
    pub fn show_page<T: Serialize + TerminalDisplay>(&self, page: Paginated<T>) -> Result<()> {
        display_page(page, self.output, self.headless, self.csv_titles.clone())
    }

    pub fn show_list<T: Serialize + TerminalDisplay>(&self, list: Vec<T>) -> Result<()> {
        display_list(list, self.output, self.headless, self.csv_titles.clone())
    }

    /// A single resource prints as an object in JSON, not as a list.
    pub fn show_one<T: Serialize + TerminalDisplay>(&self, item: T) -> Result<()> {
        if matches!(self.output, DisplayStyle::Json) {
            return display_json(item);
        }
        self.show_list(vec![item])
    }
}

/// Console for the library management service.
#[derive(Parser)]
#[command(author, version, about)]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Login(auth::LoginArgs),
    Logout(auth::LogoutArgs),
    Whoami(auth::WhoamiArgs),
    Register(auth::RegisterArgs),
    Menu(menu::MenuArgs),
    #[command(subcommand)]
    Book(book::BookCommand),
    #[command(subcommand)]
    Category(category::CategoryCommand),
    #[command(subcommand)]
    User(user::UserCommand),
    #[command(subcommand)]
    Borrow(borrow::BorrowCommand),
    Config(config::ShowConfigArgs),
}

#[async_trait]
impl RunCommand for App {
    async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Login(args) => args.run().await,
            Commands::Logout(args) => args.run().await,
            Commands::Whoami(args) => args.run().await,
            Commands::Register(args) => args.run().await,
            Commands::Menu(args) => args.run().await,
            Commands::Book(cmd) => cmd.run().await,
            Commands::Category(cmd) => cmd.run().await,
            Commands::User(cmd) => cmd.run().await,
            Commands::Borrow(cmd) => cmd.run().await,
            Commands::Config(args) => args.run().await,
        }
    }
}
