use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use threadline::app::AppContext;
use threadline::cli::{commands, Cli, Commands};
use threadline::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    cli.apply(&mut config);
    let ctx = AppContext::new(config, cli.page_source())?;

    match cli.command {
        Commands::Info { url } => {
            commands::show_info(&ctx, &url).await?;
        }
        Commands::Threads { url } => {
            commands::list_threads(&ctx, &url).await?;
        }
        Commands::Thread {
            url,
            id,
            prompt_only,
            panel_out,
        } => {
            commands::summarize_thread(&ctx, &url, &id, prompt_only, panel_out.as_deref()).await?;
        }
        Commands::Summarize {
            url,
            prompt_only,
            panel_out,
        } => {
            commands::summarize_page(&ctx, &url, prompt_only, panel_out.as_deref()).await?;
        }
        Commands::Session { url } => {
            commands::run_session(&ctx, &url).await?;
        }
    }

    Ok(())
}
