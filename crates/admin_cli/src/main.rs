use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::Engine;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "icewallet_admin")]
#[command(about = "Admin utilities for Icewallet (session tokens, entries, schema)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./icewallet.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Token(Token),
    Entry(Entry),
    /// Print the twelve monthly totals of a year.
    Report(ReportArgs),
    /// Apply pending migrations and exit.
    Migrate,
}

#[derive(Args, Debug)]
struct Token {
    #[command(subcommand)]
    command: TokenCommand,
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Mint a session token and print it.
    Issue,
    /// Invalidate one token.
    Revoke(TokenRevokeArgs),
    /// Invalidate every token.
    Clear,
}

#[derive(Args, Debug)]
struct TokenRevokeArgs {
    token: String,
}

#[derive(Args, Debug)]
struct Entry {
    #[command(subcommand)]
    command: EntryCommand,
}

#[derive(Subcommand, Debug)]
enum EntryCommand {
    Add(EntryAddArgs),
    Delete(EntryDeleteArgs),
}

#[derive(Args, Debug)]
struct EntryAddArgs {
    #[arg(long)]
    description: String,
    /// Positive for income, negative for expenses.
    #[arg(long, allow_hyphen_values = true)]
    amount: f64,
    /// RFC 3339 transaction date, e.g. 2024-03-01T12:00:00Z.
    #[arg(long)]
    date: String,
}

#[derive(Args, Debug)]
struct EntryDeleteArgs {
    id: String,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[arg(long)]
    year: i32,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Token(Token { command }) => match command {
            TokenCommand::Issue => {
                let token = engine.issue_token().await?;
                println!("{token}");
            }
            TokenCommand::Revoke(args) => {
                engine.revoke_token(&args.token).await?;
                println!("token revoked");
            }
            TokenCommand::Clear => {
                let removed = engine.revoke_all_tokens().await?;
                println!("revoked {removed} tokens");
            }
        },
        Command::Entry(Entry { command }) => match command {
            EntryCommand::Add(args) => {
                let id = engine
                    .create_entry(&args.description, args.amount, &args.date)
                    .await?;
                println!("created entry: {id}");
            }
            EntryCommand::Delete(args) => {
                engine.delete_entry(&args.id).await?;
                println!("deleted entry: {}", args.id);
            }
        },
        Command::Report(args) => {
            for month in engine.monthly_report(args.year).await? {
                println!(
                    "{}-{:02}  income {:>12.2}  expense {:>12.2}",
                    args.year, month.month, month.income, month.expense
                );
            }
        }
        Command::Migrate => println!("schema is up to date"),
    }

    Ok(())
}
