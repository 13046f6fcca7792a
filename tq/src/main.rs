//! tq: Transaction Query - CLI for seeding and filtering a tally ledger.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tq")]
#[command(about = "Transaction Query - record and filter bookkeeping transactions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the ledger database
    Init,

    /// Record a transaction
    #[command(visible_alias = "a")]
    Add {
        /// Account name (created on first use)
        #[arg(short = 'a', long = "account")]
        account: String,

        /// Amount in dollars, e.g. -42.50 for an outflow
        #[arg(short = 'm', long = "amount", allow_hyphen_values = true)]
        amount: String,

        /// Transaction date (YYYY-MM-DD or M/D/Y, default: today)
        #[arg(short = 'd', long = "date")]
        date: Option<String>,

        /// Counterparty (payee/payer)
        #[arg(short = 'p', long = "counterparty")]
        counterparty: Option<String>,

        /// Free-form memo
        #[arg(long = "memo")]
        memo: Option<String>,

        /// Category for the transaction line (created on first use)
        #[arg(short = 'c', long = "category")]
        category: Option<String>,

        /// Tag to link (repeatable, created on first use)
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,
    },

    /// List recent transactions
    #[command(visible_alias = "ls")]
    List {
        /// Number of transactions to show
        #[arg(short = 'n', long = "limit", default_value = "20")]
        limit: usize,

        /// Output format: table, json
        #[arg(short = 'f', long = "format", default_value = "table")]
        format: String,
    },

    /// Filter transactions with a query string
    #[command(visible_alias = "q")]
    Query {
        /// Filter query, e.g. "category:groceries and (tag:travel or tag:work)"
        query: String,

        /// Show matching lines under each transaction
        #[arg(short = 'l', long = "lines")]
        lines: bool,

        /// Output format: table, json
        #[arg(short = 'f', long = "format", default_value = "table")]
        format: String,
    },

    /// Execute SQL against the ledger database
    Sql {
        /// SQL query to execute
        query: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init(),
        Commands::Add {
            account,
            amount,
            date,
            counterparty,
            memo,
            category,
            tags,
        } => commands::add(
            &account,
            &amount,
            date.as_deref(),
            counterparty.as_deref(),
            memo.as_deref(),
            category.as_deref(),
            &tags,
        ),
        Commands::List { limit, format } => commands::list(limit, &format),
        Commands::Query {
            query,
            lines,
            format,
        } => commands::query(&query, lines, &format),
        Commands::Sql { query } => commands::sql(&query),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
