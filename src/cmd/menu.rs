use anyhow::Result;
use async_trait::async_trait;
use clap::Args;

use bookdesk::menu::visible_actions;

use super::{ClientArgs, OutputArgs, RunCommand};

/// Show what the logged in user can do.
#[derive(Args)]
pub struct MenuArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[async_trait]
impl RunCommand for MenuArgs {
    async fn run(&self) -> Result<()> {
        let client = self.client.connect().await?;
        let role = client.whoami().map(|identity| identity.role);
        self.output.show_list(visible_actions(role))
    }
}
