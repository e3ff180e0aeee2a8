//! Binary entry point for the gridscale CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

use gridscale::logging::{LoggingError, init_logging};
use gridscale::{Client, ClientError, ConfigError, GridscaleConfig, K8sResource, ResourceError};

mod cli;

use cli::{Cli, Command, K8sCommand, RequestCommand, ServerCommand, TemplateCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Client(#[from] ClientError),
    #[error("{0}")]
    Resource(#[from] ResourceError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("failed to write output: {0}")]
    Output(String),
    #[error("invalid {kind} id '{id}': expected a UUID")]
    InvalidId { kind: &'static str, id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    init_logging(cli.verbose)?;
    validate_ids(&cli.command)?;

    let config = GridscaleConfig::load_without_cli_args()?;
    let cancel = CancellationToken::new();
    let client = Client::new(config)?.with_cancellation_token(cancel.clone());
    spawn_interrupt_handler(cancel);

    match cli.command {
        Command::Templates(TemplateCommand::List) => {
            let templates = client.get_template_list().await?;
            let mut list: Vec<_> = templates.list.into_values().collect();
            list.sort_by(|a, b| a.name.cmp(&b.name));
            print_json(&list)
        }
        Command::Templates(TemplateCommand::Get { id }) => {
            let template = client.get_template(&id).await?;
            print_json(&template.properties)
        }
        Command::Templates(TemplateCommand::Delete { id, ignore_missing }) => {
            match client.delete_template(&id).await {
                Err(err) if ignore_missing && err.is_not_found() => {
                    warn!(%id, "template already deleted");
                    Ok(())
                }
                other => other.map_err(CliError::from),
            }
        }
        Command::Requests(RequestCommand::Wait { id }) => {
            client.wait_for_request_completion(&id).await?;
            Ok(())
        }
        Command::Servers(ServerCommand::Power { id, on, .. }) => {
            client.set_server_power(&id, on).await?;
            let server = client.get_server(&id).await?;
            print_json(&server.properties)
        }
        Command::K8s(K8sCommand::Releases) => {
            let releases = K8sResource::new(client)
                .release_templates("list k8s releases")
                .await?;
            print_json(&releases)
        }
    }
}

fn validate_ids(command: &Command) -> Result<(), CliError> {
    let (kind, id) = match command {
        Command::Templates(TemplateCommand::Get { id } | TemplateCommand::Delete { id, .. }) => {
            ("template", id)
        }
        Command::Requests(RequestCommand::Wait { id }) => ("request", id),
        Command::Servers(ServerCommand::Power { id, .. }) => ("server", id),
        Command::Templates(TemplateCommand::List) | Command::K8s(K8sCommand::Releases) => {
            return Ok(());
        }
    };
    Uuid::parse_str(id).map_err(|_| CliError::InvalidId {
        kind,
        id: id.clone(),
    })?;
    Ok(())
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            cancel.cancel();
        }
    });
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    write_json(io::stdout(), value)
}

fn write_json(mut target: impl Write, value: &impl Serialize) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|err| CliError::Output(err.to_string()))?;
    writeln!(target, "{rendered}").map_err(|err| CliError::Output(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
