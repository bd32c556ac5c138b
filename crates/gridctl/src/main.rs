use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use gridctl_core::Config;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use connection::Session;
use error::GridCtlError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("loading config from explicit path: {:?}", path);
        Config::load_from_path(&path).map_err(GridCtlError::from)?
    } else {
        debug!("loading config from default location");
        Config::load().map_err(GridCtlError::from)?
    };

    let session = Session::new(config, cli.profile.clone(), cli.resource_group.clone());

    let start = std::time::Instant::now();
    if let Err(e) = execute_command(&cli, &session).await {
        e.print_diagnostic();
        std::process::exit(1);
    }
    info!(
        elapsed_secs = format!("{:.2}", start.elapsed().as_secs_f64()),
        "command complete"
    );

    Ok(())
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over the verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "gridctl=warn,gridctl_core=warn,grid_api=warn",
            1 => "gridctl=info,gridctl_core=info,grid_api=info",
            2 => "gridctl=debug,gridctl_core=debug,grid_api=debug",
            _ => "gridctl=trace,gridctl_core=trace,grid_api=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

async fn execute_command(cli: &Cli, session: &Session) -> Result<(), GridCtlError> {
    debug!("executing command: {:?}", cli.command);

    match &cli.command {
        Commands::List => commands::cluster::list(session, cli.output).await,

        Commands::ListOne { name } => commands::cluster::list_one(session, name, cli.output).await,

        Commands::Create {
            name,
            location,
            version,
            kind,
            os_type,
            size,
            username,
            password,
            ssh_username,
            ssh_public_key,
            storage_accounts,
            cleanup_on_error,
            watch,
        } => {
            let params = commands::cluster::CreateParams {
                name: name.clone(),
                location: location.clone(),
                version: version.clone(),
                kind: kind.clone(),
                os_type: os_type.clone(),
                size: *size,
                username: username.clone(),
                password: password.clone(),
                ssh_username: ssh_username.clone(),
                ssh_public_key: ssh_public_key.clone(),
                storage_accounts: storage_accounts.clone(),
                cleanup_on_error: *cleanup_on_error,
            };
            commands::cluster::create(session, params, watch, cli.output).await
        }

        Commands::Delete { name, watch } => {
            commands::cluster::delete(session, name, watch, cli.output).await
        }

        Commands::Resize { name, size } => {
            commands::cluster::resize(session, name, *size, cli.output).await
        }

        Commands::MonitorCreate { name, watch } => {
            commands::cluster::monitor_create(session, name, watch, cli.output).await
        }

        Commands::MonitorDelete { name, watch } => {
            commands::cluster::monitor_delete(session, name, watch).await
        }

        Commands::EnableAccess {
            name,
            access_username,
            access_password,
            expires_in_days,
        } => {
            commands::access::enable(session, name, access_username, access_password, *expires_in_days)
                .await
        }

        Commands::DisableAccess { name } => commands::access::disable(session, name).await,

        Commands::DeleteErrored { watch } => commands::sweep::delete_errored(session, watch).await,

        Commands::DeleteStale {
            cutoff_hours,
            yes,
            watch,
        } => commands::sweep::delete_stale(session, *cutoff_hours, *yes, watch).await,

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}
