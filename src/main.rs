use clap::Parser;
use counselrag::cli::commands::Cli;
use counselrag::cli::commands::Commands;
use counselrag::cli::handlers;
use counselrag::config::AppConfig;
use counselrag::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first; configuration errors are fatal at startup
    let mut config = AppConfig::load()?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    // Initialize logging with configuration
    counselrag::logging::init_logging_with_config(Some(&config))?;

    match cli.command {
        Commands::Init { force } => {
            handlers::handle_init_command(&config, force).await?;
        }
        Commands::Ingest {
            file,
            start_from,
            max_records,
            batch_size,
        } => {
            handlers::handle_ingest_command(&config, file, start_from, max_records, batch_size)
                .await?;
        }
        Commands::Reset {
            force,
            reload,
            max_records,
        } => {
            handlers::handle_reset_command(&config, force, reload, max_records).await?;
        }
        Commands::Query {
            text,
            top_k,
            emotions,
        } => {
            handlers::handle_query_command(&config, text, top_k, emotions).await?;
        }
        Commands::Ask {
            text,
            top_k,
            emotions,
            persona,
        } => {
            handlers::handle_ask_command(&config, text, top_k, emotions, persona).await?;
        }
        Commands::Stats => {
            handlers::handle_stats_command(&config).await?;
        }
        Commands::Config => {
            handlers::handle_config_command(&config);
        }
    }

    Ok(())
}
