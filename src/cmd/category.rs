use anyhow::Result;
use async_trait::async_trait;
use clap::{Args, Subcommand};

use bookdesk::api::categories::{CategoryCreate, CategoryQuery, CategoryUpdate};

use super::{ClientArgs, OutputArgs, PageArgs, RunCommand};

/// Manage book categories.
#[derive(Subcommand)]
pub enum CategoryCommand {
    List(ListArgs),
    All(AllArgs),
    Get(GetArgs),
    Create(CreateArgs),
    Update(UpdateArgs),
    Delete(DeleteArgs),
}

#[async_trait]
impl RunCommand for CategoryCommand {
    async fn run(&self) -> Result<()> {
        match self {
            CategoryCommand::List(args) => args.run().await,
            CategoryCommand::All(args) => args.run().await,
            CategoryCommand::Get(args) => args.run().await,
            CategoryCommand::Create(args) => args.run().await,
            CategoryCommand::Update(args) => args.run().await,
            CategoryCommand::Delete(args) => args.run().await,
        }
    }
}

/// List categories page by page.
#[derive(Args)]
pub struct ListArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub parent: Option<u64>,

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
        let query = CategoryQuery {
            page: self.page.build()?,
            name: self.name.clone(),
            parent_id: self.parent,
            is_active: None,
        };
        let client = self.client.connect().await?;
        let categories = client.list_categories(&query).await?;
        self.output.show_page(categories)
    }
}

/// List every category at once.
#[derive(Args)]
pub struct AllArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for AllArgs {
    async fn run(&self) -> Result<()> {
        let client = self.client.connect().await?;
        let categories = client.all_categories().await?;
        self.output.show_list(categories)
    }
}

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
        let category = client.get_category(self.id).await?;
        self.output.show_one(category)
    }
}

#[derive(Args)]
pub struct CreateArgs {
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub parent: Option<u64>,

    #[arg(long)]
    pub sort_order: Option<u32>,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for CreateArgs {
    async fn run(&self) -> Result<()> {
        let category = CategoryCreate {
            name: self.name.clone(),
            description: self.description.clone(),
            parent_id: self.parent,
            sort_order: self.sort_order,
        };
        let client = self.client.connect().await?;
        let category = client.create_category(&category).await?;
        self.output.show_one(category)
    }
}

#[derive(Args)]
pub struct UpdateArgs {
    pub id: u64,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub parent: Option<u64>,

    #[arg(long)]
    pub sort_order: Option<u32>,

    /// Enable or disable the category.
    #[arg(long)]
    pub active: Option<bool>,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for UpdateArgs {
    async fn run(&self) -> Result<()> {
        let update = CategoryUpdate {
            name: self.name.clone(),
            description: self.description.clone(),
            parent_id: self.parent,
            sort_order: self.sort_order,
            is_active: self.active,
        };
        let client = self.client.connect().await?;
        let category = client.update_category(self.id, &update).await?;
        self.output.show_one(category)
    }
}

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
        client.delete_category(self.id).await?;
        println!("Category {} deleted", self.id);
        Ok(())
    }
}
