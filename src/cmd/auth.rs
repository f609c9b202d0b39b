use anyhow::{bail, Result};
use async_trait::async_trait;
use clap::Args;

use bookdesk::api::auth::RegisterRequest;
use bookdesk::display::display_json;
use bookdesk::gateway::{Location, Navigator};

use super::{ClientArgs, RunCommand};

/// Log in and keep the session for the following commands.
#[derive(Args)]
pub struct LoginArgs {
    /// The username, default is `username` in the config.
    pub username: Option<String>,

    /// The password, default is `password` in the config.
    #[arg(short, long)]
    pub password: Option<String>,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for LoginArgs {
    async fn run(&self) -> Result<()> {
        let factory = self.client.load()?;
        let cfg = factory.config();

        let username = self.username.clone().unwrap_or_else(|| cfg.username.clone());
        if username.is_empty() {
            bail!("username is required, pass it as argument or set `username` in the config");
        }
        let password = self.password.clone().unwrap_or_else(|| cfg.password.clone());
        if password.is_empty() {
            bail!("password is required, pass it with `--password` or set `password` in the config");
        }

        let client = factory.build_client()?;
        let identity = client.login(&username, &password).await?;
        println!("Logged in as '{}' ({})", identity.username, identity.role);
        Ok(())
    }
}

/// Drop the stored session.
#[derive(Args)]
pub struct LogoutArgs {
    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for LogoutArgs {
    async fn run(&self) -> Result<()> {
        let client = self.client.load()?.build_client()?;
        client.logout();
        client.gateway().navigator().navigate(Location::Login);
        Ok(())
    }
}

/// Display the logged in user.
#[derive(Args)]
pub struct WhoamiArgs {
    /// Show the stored identity without checking it with the server.
    #[arg(long)]
    pub local: bool,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for WhoamiArgs {
    async fn run(&self) -> Result<()> {
        let factory = self.client.load()?;
        let client = factory.build_client()?;
        if !self.local {
            client.revalidate().await?;
        }
        client.require_login()?;

        match client.whoami() {
            Some(identity) => display_json(identity),
            None => bail!("no identity in the current session"),
        }
    }
}

/// Create a new account. This does not log in.
#[derive(Args)]
pub struct RegisterArgs {
    pub username: String,

    #[arg(short, long)]
    pub email: String,

    #[arg(short, long)]
    pub password: String,

    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for RegisterArgs {
    async fn run(&self) -> Result<()> {
        let client = self.client.load()?.build_client()?;
        let req = RegisterRequest {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            role: None,
        };
        client.register(&req).await?;
        println!("Registered '{}', run `bookdesk login` to log in", self.username);
        Ok(())
    }
}
