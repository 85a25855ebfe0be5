use clap::Parser;

mod cli;
mod commands;
mod display;

fn main() {
    if let Err(error) = run() {
        eprintln!("sowcraft error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;
    tracing::debug!("sowcraft v{}", env!("CARGO_PKG_VERSION"));

    let config = commands::load_config(cli.policy.as_deref())?;
    match &cli.command {
        cli::Commands::Convert(args) => commands::convert(args, &config),
        cli::Commands::Reprice(args) => commands::reprice(args, &config),
        cli::Commands::Workbook(args) => commands::workbook(args, &config),
        cli::Commands::Roles(args) => commands::roles(args, &config),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SOWCRAFT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
