mod cmd;

use std::process;

use anyhow::Result;
use bookdesk::gateway::RequestError;
use clap::error::ErrorKind as ArgsErrorKind;
use clap::Parser;

use cmd::{App, RunCommand};

async fn run_cmd() -> Result<()> {
    let app = match App::try_parse() {
        Ok(app) => app,
        Err(err) => {
            err.use_stderr();
            if err.print().is_err() {
                process::exit(3);
            }
            if matches!(
                err.kind(),
                ArgsErrorKind::DisplayHelp
                    | ArgsErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                    | ArgsErrorKind::DisplayVersion
            ) {
                return Ok(());
            }
            process::exit(3);
        }
    };

    app.run().await
}

#[tokio::main]
async fn main() {
    match run_cmd().await {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Command error: {e:#}");
            if let Some(err) = e.downcast_ref::<RequestError>() {
                if err.is_session_expired() {
                    eprintln!("Run `bookdesk login` to start a new session");
                }
            }
            process::exit(1);
        }
    }
}
