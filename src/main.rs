//! clusterhub CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clusterhub::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // `serve` installs the configured logger; one-shot commands log warnings to stderr
    if !matches!(cli.command, Commands::Serve { .. }) {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let result = match cli.command {
        Commands::Serve { host, port } => {
            commands::serve::execute(cli.config.as_deref(), host, port).await
        }
        Commands::Algorithms => commands::algorithms::execute(cli.json),
        Commands::Run {
            algorithm,
            file,
            options,
        } => commands::run::execute(algorithm, &file, options.as_deref(), cli.json).await,
    };

    if let Err(err) = result {
        clusterhub::cli::handle_error(err, cli.json);
    }
}
