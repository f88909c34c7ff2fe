//! The reelay server: an in-memory video catalog behind a GraphQL Relay API.

use clap::Parser;
use std::{env, sync::Arc};

use crate::{
    args::{Args, Command},
    config::Config,
    prelude::*,
    store::MemoryStore,
};

mod api;
mod args;
mod cmd;
mod config;
mod http;
mod logger;
mod prelude;
mod store;


#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Log error in case stdout is not connected and it is logged into a file.
        error!("{:?}", e);

        // Show a somewhat nice representation of the error
        eprintln!();
        eprintln!();
        bunt::eprintln!("{$red}▶▶▶ {$bold}Error:{/$}{/$} {[yellow+intense]}", e);
        eprintln!();
        if e.chain().len() > 1 {
            bunt::eprintln!("{$red+italic}Caused by:{/$}");
        }

        for (i, cause) in e.chain().skip(1).enumerate() {
            eprint!(" {: >1$}", "", i * 2);
            eprintln!("‣ {cause}");
        }

        std::process::exit(1);
    }
}

/// Main entry point.
async fn run() -> Result<()> {
    // If `RUST_BACKTRACE` wasn't already set, we default to `1`. We don't
    // expect panics to occur regularly and the backtraces are very useful.
    if env::var("RUST_BACKTRACE") == Err(env::VarError::NotPresent) {
        env::set_var("RUST_BACKTRACE", "1");
    }

    let args = Args::parse();

    // Configure output via `bunt`
    bunt::set_stdout_color_choice(args.stdout_color());
    bunt::set_stderr_color_choice(args.stderr_color());

    // Dispatch subcommand.
    match &args.cmd {
        Command::Serve { shared } => {
            let config = load_config_and_init_logger(shared, &args)?;
            start_server(config).await?;
        }
        Command::WriteConfig { target } => config::write_template(target.as_ref())?,
        Command::ExportApiSchema { target } => cmd::export_api_schema::run(target.as_ref())?,
    }

    Ok(())
}

async fn start_server(config: Config) -> Result<()> {
    info!("Starting reelay ...");
    trace!("Configuration: {:#?}", config);

    let videos = match config.api.seed {
        true => MemoryStore::with_records("video", store::seed_videos()),
        false => MemoryStore::new("video"),
    };
    let api_context = api::Context::new(Arc::new(videos), config.api.clone())?;

    http::serve(&config.http, config.log.log_http_headers, api::root_node(), api_context).await
        .context("failed to run HTTP server")?;

    info!("Shut down reelay");
    Ok(())
}

fn load_config_and_init_logger(shared: &args::Shared, args: &Args) -> Result<Config> {
    // Load configuration.
    let (config, path) = match &shared.config {
        Some(path) => {
            let config = Config::load_from(path)
                .with_context(|| format!("failed to load config from '{}'", path.display()))?;
            (config, Some(path.clone()))
        }
        None => Config::from_env_or_default_locations()?,
    };

    // Initialize logger. Unfortunately, we can only do this here
    // after reading the config.
    logger::init(&config.log, args.stdout_color())?;
    match path {
        Some(path) => info!("Loaded config from '{}'", path.display()),
        None => info!("No configuration file found, using default configuration"),
    }

    Ok(config)
}
