use anyhow::Result;
use async_trait::async_trait;
use clap::{Args, Subcommand};

use bookdesk::api::users::{PasswordUpdate, UserCreate, UserQuery, UserStatus, UserUpdate};
use bookdesk::session::state::Role;

use super::{ClientArgs, OutputArgs, PageArgs, RunCommand};

/// Manage accounts, for admins and librarians.
#[derive(Subcommand)]
pub enum UserCommand {
    List(ListArgs),
    Get(GetArgs),
    Create(CreateArgs),
    Update(UpdateArgs),
    Delete(DeleteArgs),
    Password(PasswordArgs),
    Status(StatusArgs),
    Role(RoleArgs),
}

#[async_trait]
impl RunCommand for UserCommand {
    async fn run(&self) -> Result<()> {
        match self {
            UserCommand::List(args) => args.run().await,
            UserCommand::Get(args) => args.run().await,
            UserCommand::Create(args) => args.run().await,
            UserCommand::Update(args) => args.run().await,
            UserCommand::Delete(args) => args.run().await,
            UserCommand::Password(args) => args.run().await,
            UserCommand::Status(args) => args.run().await,
            UserCommand::Role(args) => args.run().await,
        }
    }
}

#[derive(Args)]
pub struct ListArgs {
    /// Match username, email or full name.
    #[arg(short, long)]
    pub keyword: Option<String>,

    #[arg(long)]
    pub role: Option<Role>,

    #[arg(long)]
    pub status: Option<UserStatus>,

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
        let query = UserQuery {
            page: self.page.build()?,
            keyword: self.keyword.clone(),
            role: self.role,
            status: self.status,
        };
        let client = self.client.connect().await?;
        let users = client.list_users(&query).await?;
        self.output.show_page(users)
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
        let user = client.get_user(self.id).await?;
        self.output.show_one(user)
    }
}

#[derive(Args)]
pub struct CreateArgs {
    pub username: String,

    #[arg(short, long)]
    pub email: String,

    #[arg(short, long)]
    pub password: String,

    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long, default_value = "user")]
    pub role: Role,

    #[arg(long)]
    pub max_borrow: Option<u32>,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for CreateArgs {
    async fn run(&self) -> Result<()> {
        let user = UserCreate {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            phone: self.phone.clone(),
            full_name: self.full_name.clone(),
            role: self.role,
            max_borrow_count: self.max_borrow,
        };
        user.validate()?;

        let client = self.client.connect().await?;
        let user = client.create_user(&user).await?;
        self.output.show_one(user)
    }
}

#[derive(Args)]
pub struct UpdateArgs {
    pub id: u64,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub max_borrow: Option<u32>,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for UpdateArgs {
    async fn run(&self) -> Result<()> {
        let update = UserUpdate {
            email: self.email.clone(),
            phone: self.phone.clone(),
            full_name: self.full_name.clone(),
            status: None,
            max_borrow_count: self.max_borrow,
        };
        let client = self.client.connect().await?;
        let user = client.update_user(self.id, &update).await?;
        self.output.show_one(user)
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
        client.delete_user(self.id).await?;
        println!("User {} deleted", self.id);
        Ok(())
    }
}

/// Change the password of an account.
#[derive(Args)]
pub struct PasswordArgs {
    pub id: u64,

    #[arg(long)]
    pub old: String,

    #[arg(long)]
    pub new: String,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for PasswordArgs {
    async fn run(&self) -> Result<()> {
        let update = PasswordUpdate {
            old_password: self.old.clone(),
            new_password: self.new.clone(),
        };
        let client = self.client.connect().await?;
        client.update_user_password(self.id, &update).await?;
        println!("Password of user {} updated", self.id);
        Ok(())
    }
}

/// Activate, deactivate or suspend an account.
#[derive(Args)]
pub struct StatusArgs {
    pub id: u64,

    pub status: UserStatus,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for StatusArgs {
    async fn run(&self) -> Result<()> {
        let client = self.client.connect().await?;
        client.update_user_status(self.id, self.status).await?;
        println!("User {} is now {}", self.id, self.status);
        Ok(())
    }
}

/// Change the role of an account, admins only.
#[derive(Args)]
pub struct RoleArgs {
    pub id: u64,

    pub role: Role,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for RoleArgs {
    async fn run(&self) -> Result<()> {
        let client = self.client.connect().await?;
        client.update_user_role(self.id, self.role).await?;
        println!("User {} is now {}", self.id, self.role);
        Ok(())
    }
}
