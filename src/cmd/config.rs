use anyhow::Result;
use async_trait::async_trait;
use clap::Args;

use bookdesk::client::config::ClientConfig;
use bookdesk::config::{CommonConfig, ConfigArgs};
use bookdesk::display::display_json;

use super::RunCommand;

/// Display the configuration in use as JSON.
#[derive(Args)]
pub struct ShowConfigArgs {
    /// Show the password instead of masking it.
    #[arg(long)]
    pub show_password: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[async_trait]
impl RunCommand for ShowConfigArgs {
    async fn run(&self) -> Result<()> {
        let ps = self.config.build_path_set()?;

        let mut cfg = ps.load_config("client", ClientConfig::default)?;
        if !self.show_password && !cfg.password.is_empty() {
            cfg.password = String::from("******");
        }
        display_json(cfg)
    }
}
