use anyhow::Result;
use async_trait::async_trait;
use clap::{Args, Subcommand};

use bookdesk::api::borrows::{BorrowCreate, BorrowQuery, BorrowStatus, MyBorrowQuery, ReturnRequest};
use bookdesk::display::{display_json, DisplayStyle};

use super::{ClientArgs, OutputArgs, PageArgs, RunCommand};

/// Lend, return and renew books.
#[derive(Subcommand)]
pub enum BorrowCommand {
    List(ListArgs),
    Mine(MineArgs),
    Overdue(OverdueArgs),
    Stats(StatsArgs),
    Lend(LendArgs),
    Return(ReturnArgs),
    Renew(RenewArgs),
}

#[async_trait]
impl RunCommand for BorrowCommand {
    async fn run(&self) -> Result<()> {
        match self {
            BorrowCommand::List(args) => args.run().await,
            BorrowCommand::Mine(args) => args.run().await,
            BorrowCommand::Overdue(args) => args.run().await,
            BorrowCommand::Stats(args) => args.run().await,
            BorrowCommand::Lend(args) => args.run().await,
            BorrowCommand::Return(args) => args.run().await,
            BorrowCommand::Renew(args) => args.run().await,
        }
    }
}

/// List every borrow record, staff only.
#[derive(Args)]
pub struct ListArgs {
    #[arg(long)]
    pub user: Option<u64>,

    #[arg(long)]
    pub book: Option<u64>,

    #[arg(long)]
    pub status: Option<BorrowStatus>,

    /// Borrowed on or after this date, `YYYY-MM-DD`.
    #[arg(long)]
    pub since: Option<String>,

    /// Borrowed on or before this date, `YYYY-MM-DD`.
    #[arg(long)]
    pub until: Option<String>,

    #[command(flatten)]
    pub page: PageArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for ListArgs {
    async fn run(&self) -> Result<()> {
        let query = BorrowQuery {
            page: self.page.build()?,
            user_id: self.user,
            book_id: self.book,
            status: self.status,
            start_date: self.since.clone(),
            end_date: self.until.clone(),
        };
        let client = self.client.connect().await?;
        let records = client.list_borrows(&query).await?;
        self.output.show_page(records)
    }
}

/// List the books you borrowed.
#[derive(Args)]
pub struct MineArgs {
    #[arg(long)]
    pub status: Option<BorrowStatus>,

    #[command(flatten)]
    pub page: PageArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for MineArgs {
    async fn run(&self) -> Result<()> {
        let query = MyBorrowQuery {
            page: self.page.build()?,
            status: self.status,
        };
        let client = self.client.connect().await?;
        let records = client.my_borrows(&query).await?;
        self.output.show_page(records)
    }
}

/// List records past their due date.
#[derive(Args)]
pub struct OverdueArgs {
    #[command(flatten)]
    pub page: PageArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for OverdueArgs {
    async fn run(&self) -> Result<()> {
        let page = self.page.build()?;
        let client = self.client.connect().await?;
        let records = client.overdue_borrows(&page).await?;
        self.output.show_page(records)
    }
}

/// Show borrowing statistics, the console's dashboard.
#[derive(Args)]
pub struct StatsArgs {
    /// Print raw JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for StatsArgs {
    async fn run(&self) -> Result<()> {
        let client = self.client.connect().await?;
        let stats = client.borrow_statistics().await?;
        if self.json {
            return display_json(stats);
        }

        println!("Borrowing:  {}", stats.total_borrow_count);
        println!("Returned:   {}", stats.total_return_count);
        println!("Overdue:    {}", stats.total_overdue_count);
        println!("Fines:      {:.2}", stats.total_fine_amount);
        if !stats.popular_books.is_empty() {
            println!();
            println!("Popular books:");
            for book in stats.popular_books {
                println!("  {:>4}  {}", book.borrow_count, book.title);
            }
        }
        if !stats.active_users.is_empty() {
            println!();
            println!("Active users:");
            for user in stats.active_users {
                println!("  {:>4}  {}", user.borrow_count, user.username);
            }
        }
        Ok(())
    }
}

/// Lend a book to a user.
#[derive(Args)]
pub struct LendArgs {
    #[arg(long)]
    pub user: u64,

    #[arg(long)]
    pub book: u64,

    /// Loan period in days, the server default is 30.
    #[arg(long)]
    pub days: Option<u32>,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for LendArgs {
    async fn run(&self) -> Result<()> {
        let req = BorrowCreate {
            user_id: self.user,
            book_id: self.book,
            due_days: self.days,
        };
        let client = self.client.connect().await?;
        let record = client.borrow_book(&req).await?;
        self.output.show_one(record)
    }
}

/// Return a borrowed book.
#[derive(Args)]
pub struct ReturnArgs {
    pub record: u64,

    #[arg(long)]
    pub remark: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for ReturnArgs {
    async fn run(&self) -> Result<()> {
        let req = ReturnRequest {
            record_id: self.record,
            remark: self.remark.clone(),
        };
        let client = self.client.connect().await?;
        let record = client.return_book(&req).await?;
        if record.fine_amount > 0.0 && !matches!(self.output.output, DisplayStyle::Json) {
            eprintln!(
                "Returned {} days late, fine {:.2}",
                record.overdue_days, record.fine_amount
            );
        }
        self.output.show_one(record)
    }
}

/// Extend the due date of a borrowed book.
#[derive(Args)]
pub struct RenewArgs {
    pub record: u64,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for RenewArgs {
    async fn run(&self) -> Result<()> {
        let client = self.client.connect().await?;
        let record = client.renew_borrow(self.record).await?;
        self.output.show_one(record)
    }
}
