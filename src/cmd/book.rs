use anyhow::{bail, Result};
use async_trait::async_trait;
use clap::{Args, Subcommand};

use bookdesk::api::books::{BookCreate, BookQuery, BookSearch, BookUpdate};

use super::{ClientArgs, OutputArgs, PageArgs, RunCommand};

/// Manage the book catalog.
#[derive(Subcommand)]
pub enum BookCommand {
    List(ListArgs),
    Get(GetArgs),
    Search(SearchArgs),
    Create(CreateArgs),
    Update(UpdateArgs),
    Delete(DeleteArgs),
}

#[async_trait]
impl RunCommand for BookCommand {
    async fn run(&self) -> Result<()> {
        match self {
            BookCommand::List(args) => args.run().await,
            BookCommand::Get(args) => args.run().await,
            BookCommand::Search(args) => args.run().await,
            BookCommand::Create(args) => args.run().await,
            BookCommand::Update(args) => args.run().await,
            BookCommand::Delete(args) => args.run().await,
        }
    }
}

/// List books page by page.
#[derive(Args)]
pub struct ListArgs {
    /// Match title, author or isbn.
    #[arg(short, long)]
    pub keyword: Option<String>,

    #[arg(long)]
    pub category: Option<u64>,

    #[arg(long)]
    pub author: Option<String>,

    /// available, borrowed or maintenance.
    #[arg(long)]
    pub status: Option<String>,

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
        let query = BookQuery {
            page: self.page.build()?,
            keyword: self.keyword.clone(),
            category_id: self.category,
            author: self.author.clone(),
            status: self.status.clone(),
            is_active: None,
        };
        let client = self.client.connect().await?;
        let books = client.list_books(&query).await?;
        self.output.show_page(books)
    }
}

/// Show one book.
#[derive(Args)]
pub struct GetArgs {
    pub id: u64,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for GetArgs {
    async fn run(&self) -> Result<()> {
        let client = self.client.connect().await?;
        let book = client.get_book(self.id).await?;
        self.output.show_one(book)
    }
}

/// Full text search over the catalog.
#[derive(Args)]
pub struct SearchArgs {
    pub keyword: String,

    #[arg(long)]
    pub category: Option<u64>,

    #[command(flatten)]
    pub page: PageArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for SearchArgs {
    async fn run(&self) -> Result<()> {
        let search = BookSearch {
            keyword: self.keyword.clone(),
            category_id: self.category,
            page: self.page.build()?,
        };
        let client = self.client.connect().await?;
        let books = client.search_books(&search).await?;
        self.output.show_page(books)
    }
}

/// Add a book to the catalog.
#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub isbn: String,

    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub author: String,

    #[arg(long)]
    pub publisher: Option<String>,

    #[arg(long)]
    pub publish_date: Option<String>,

    #[arg(long, default_value = "0")]
    pub price: f64,

    #[arg(long)]
    pub category: Option<u64>,

    #[arg(long)]
    pub summary: Option<String>,

    #[arg(long, default_value = "1")]
    pub stock: u32,

    #[arg(long)]
    pub location: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for CreateArgs {
    async fn run(&self) -> Result<()> {
        let mut book = BookCreate {
            isbn: self.isbn.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            publisher: self.publisher.clone(),
            publish_date: self.publish_date.clone(),
            price: self.price,
            category_id: self.category,
            summary: self.summary.clone(),
            cover_url: None,
            total_stock: self.stock,
            location: self.location.clone(),
        };
        book.validate()?;

        let client = self.client.connect().await?;
        let book = client.create_book(&book).await?;
        self.output.show_one(book)
    }
}

/// Change fields of a book, unset flags are left untouched.
#[derive(Args)]
pub struct UpdateArgs {
    pub id: u64,

    #[arg(long)]
    pub isbn: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    #[arg(long)]
    pub publisher: Option<String>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub category: Option<u64>,

    #[arg(long)]
    pub summary: Option<String>,

    #[arg(long)]
    pub stock: Option<u32>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub status: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for UpdateArgs {
    async fn run(&self) -> Result<()> {
        let update = BookUpdate {
            isbn: self.isbn.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            publisher: self.publisher.clone(),
            publish_date: None,
            price: self.price,
            category_id: self.category,
            summary: self.summary.clone(),
            cover_url: None,
            total_stock: self.stock,
            location: self.location.clone(),
            status: self.status.clone(),
        };
        if update.is_empty() {
            bail!("nothing to update, specify at least one field");
        }

        let client = self.client.connect().await?;
        let book = client.update_book(self.id, &update).await?;
        self.output.show_one(book)
    }
}

/// Remove a book from the catalog.
#[derive(Args)]
pub struct DeleteArgs {
    pub id: u64,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for DeleteArgs {
    async fn run(&self) -> Result<()> {
        let client = self.client.connect().await?;
        client.delete_book(self.id).await?;
        println!("Book {} deleted", self.id);
        Ok(())
    }
}
