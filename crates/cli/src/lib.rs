pub mod commands;

use clap::{Parser, Subcommand};
use sitequote_core::pricing::Currency;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "sitequote",
    about = "Sitequote operator CLI",
    long_about = "Operate the Sitequote lead-capture backend: migrations, config inspection, catalog and price previews, and recent quote requests.",
    after_help = "Examples:\n  sitequote migrate\n  sitequote price corporate-website tech-support --currency local --vat\n  sitequote requests --limit 5"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "List the validated service catalog grouped by category")]
    Catalog,
    #[command(about = "Price a selection of catalog items the way the calculator would")]
    Price {
        #[arg(required = true, help = "Catalog item ids to select")]
        ids: Vec<String>,
        #[arg(long, default_value = "reference", help = "Display currency: reference or local")]
        currency: Currency,
        #[arg(long, help = "Include VAT in the totals")]
        vat: bool,
    },
    #[command(about = "Show the most recent quote requests, newest first")]
    Requests {
        #[arg(long, default_value_t = 10, help = "Maximum number of requests to show")]
        limit: u32,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Catalog => commands::catalog::run(),
        Command::Price { ids, currency, vat } => commands::price::run(&ids, currency, vat),
        Command::Requests { limit } => commands::requests::run(limit),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
