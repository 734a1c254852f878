//! intake: collaborative form filling for humans and agents
//!
//! Thin command-line surface over the `intake-core` engine: parse a form
//! document, inspect outstanding issues, apply patch batches, compute an
//! execution plan, export projections, or normalize formatting.

use clap::{Parser, Subcommand};

use intake::commands;

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Collaborative form filling for humans and agents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a form and list outstanding issues
    Inspect(commands::inspect::Args),
    /// Apply a JSON patch batch to a form
    Apply(commands::apply::Args),
    /// Compute the execution plan over remaining work
    Plan(commands::plan::Args),
    /// Export a read-only projection of the form
    Export(commands::export::Args),
    /// Rewrite a form in canonical formatting
    Fmt(commands::fmt::Args),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("intake=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Inspect(args) => commands::inspect::run(&args),
        Commands::Apply(args) => commands::apply::run(&args),
        Commands::Plan(args) => commands::plan::run(&args),
        Commands::Export(args) => commands::export::run(&args),
        Commands::Fmt(args) => commands::fmt::run(&args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(1);
        }
    }
}
