use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{AccountId, Engine, EngineError, MoneyCents, TransferRequest};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "ledger_admin")]
#[command(about = "Admin utilities for the ledger (accounts, balances, transfers)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./ledger.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Account(Account),
    /// Move an amount between two accounts atomically.
    Transfer(TransferArgs),
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
    Balance(AccountBalanceArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    id: AccountId,
    /// Initial balance, e.g. `1000` or `99.50`.
    #[arg(long, value_parser = parse_amount)]
    balance: MoneyCents,
}

#[derive(Args, Debug)]
struct AccountBalanceArgs {
    #[arg(long)]
    id: AccountId,
}

#[derive(Args, Debug)]
struct TransferArgs {
    #[arg(long)]
    from: AccountId,
    #[arg(long)]
    to: AccountId,
    #[arg(long, value_parser = parse_amount)]
    amount: MoneyCents,
}

fn parse_amount(raw: &str) -> Result<MoneyCents, String> {
    raw.parse().map_err(|err: EngineError| err.to_string())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Business rejections exit with 1, everything else propagates.
fn exit_on_rejection(err: EngineError) -> Box<dyn Error + Send + Sync> {
    match err {
        EngineError::Internal(_) | EngineError::Database(_) => Box::new(err),
        err => {
            eprintln!("{}: {err}", err.code());
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Account(Account {
            command: AccountCommand::Create(args),
        }) => {
            let account = engine
                .create_account(args.id, args.balance)
                .await
                .map_err(exit_on_rejection)?;
            println!("created account: {} ({})", account.id, account.balance);
        }
        Command::Account(Account {
            command: AccountCommand::Balance(args),
        }) => {
            let account = engine
                .get_balance(args.id)
                .await
                .map_err(exit_on_rejection)?;
            println!("{}", account.balance);
        }
        Command::Transfer(args) => {
            engine
                .make_transaction(TransferRequest {
                    source_account_id: args.from,
                    destination_account_id: args.to,
                    amount: args.amount,
                })
                .await
                .map_err(exit_on_rejection)?;
            println!("transferred {} from {} to {}", args.amount, args.from, args.to);
        }
    }

    Ok(())
}
