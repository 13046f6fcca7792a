//! CLI command implementations.

use chrono::NaiveDate;
use uuid::Uuid;

use ledger::schema::{TransactionLineRecord, TransactionRecord};
use ledger::{Config, Error, ParsedQuery, Store, TransactionBatch, TransactionSummary};

pub fn init() -> ledger::Result<()> {
    let config = Config::load()?;
    ledger::init::initialize(&config)?;

    println!("Ledger initialized at {}", config.tally_root.display());
    println!("Currency: {}", config.currency);

    Ok(())
}

pub fn add(
    account: &str,
    amount: &str,
    date: Option<&str>,
    counterparty: Option<&str>,
    memo: Option<&str>,
    category: Option<&str>,
    tags: &[String],
) -> ledger::Result<()> {
    let config = Config::load()?;
    let store = Store::open(config)?;

    let amount_cents = parse_amount(amount)?;
    let date = match date {
        Some(text) => parse_date(text)?,
        None => chrono::Local::now().date_naive(),
    };

    let account_id = parse_id(&store.find_or_create_account(account)?)?;

    let mut record = TransactionRecord::new(account_id, date, amount_cents);
    if let Some(counterparty) = counterparty {
        record = record.with_counterparty(counterparty);
    }
    if let Some(memo) = memo {
        record = record.with_memo(memo);
    }
    let transaction_id = record.id;

    let mut batch = TransactionBatch::new(record);
    if let Some(category) = category {
        let category_id = parse_id(&store.find_or_create_category(category)?)?;
        batch = batch
            .with_line(TransactionLineRecord::new(transaction_id, amount_cents).with_category(category_id));
    }
    for tag in tags {
        let tag_id = parse_id(&store.find_or_create_tag(tag)?)?;
        batch = batch.with_tag(tag_id);
    }

    store.write_transaction(&batch)?;

    println!(
        "Recorded {} on {} ({})",
        format_amount(amount_cents),
        date,
        transaction_id
    );

    Ok(())
}

pub fn list(limit: usize, format: &str) -> ledger::Result<()> {
    let config = Config::load()?;
    let store = Store::open(config)?;

    let transactions = store.recent_transactions(limit)?;
    if transactions.is_empty() {
        println!("No transactions recorded yet.");
        return Ok(());
    }

    print_transactions(&store, &transactions, format, None)
}

pub fn query(query_str: &str, show_lines: bool, format: &str) -> ledger::Result<()> {
    let config = Config::load()?;
    let store = Store::open(config)?;

    // Round-trip through the wire encoding so the CLI exercises the same
    // boundary a remote evaluator would.
    let parsed = ParsedQuery::from_input(query_str);
    let query = ParsedQuery::from_params(&parsed.to_params()?)?;

    let matched = store.filter_transactions(&query)?;
    if matched.is_empty() {
        println!("No matching transactions.");
        return Ok(());
    }

    let transactions = store.transactions_by_ids(&matched)?;
    let line_filter = if show_lines { query.root.as_ref() } else { None };
    print_transactions(&store, &transactions, format, line_filter)
}

pub fn sql(query: &str) -> ledger::Result<()> {
    let config = Config::load()?;
    let store = Store::open(config)?;

    let result = store.query(query)?;
    if result.rows.is_empty() {
        println!("No results.");
        return Ok(());
    }

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.len()).collect();
    for row in &result.rows {
        for (i, val) in row.iter().enumerate() {
            widths[i] = widths[i].max(val.len().min(50));
        }
    }

    for (i, col) in result.columns.iter().enumerate() {
        print!("{:width$} ", col, width = widths[i]);
    }
    println!();
    for width in &widths {
        print!("{} ", "-".repeat(*width));
    }
    println!();

    for row in &result.rows {
        for (i, val) in row.iter().enumerate() {
            print!("{:width$} ", truncate(val, 50), width = widths[i]);
        }
        println!();
    }

    println!("\n({} rows)", result.rows.len());

    Ok(())
}

/// Row shape for JSON output.
#[derive(serde::Serialize)]
struct TransactionRow<'a> {
    id: &'a str,
    date: &'a str,
    account: &'a str,
    counterparty: Option<&'a str>,
    amount: String,
    amount_cents: i64,
    memo: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lines: Option<Vec<LineRow>>,
}

#[derive(serde::Serialize)]
struct LineRow {
    category: Option<String>,
    amount_cents: i64,
    memo: Option<String>,
}

fn print_transactions(
    store: &Store,
    transactions: &[TransactionSummary],
    format: &str,
    line_filter: Option<&ledger::FilterNode>,
) -> ledger::Result<()> {
    match format {
        "json" => {
            let mut rows = Vec::with_capacity(transactions.len());
            for tx in transactions {
                let lines = match line_filter {
                    Some(root) => Some(
                        store
                            .lines_matching(&tx.id, root)?
                            .into_iter()
                            .map(|line| LineRow {
                                category: line.category_name,
                                amount_cents: line.amount_cents,
                                memo: line.memo,
                            })
                            .collect(),
                    ),
                    None => None,
                };
                rows.push(TransactionRow {
                    id: &tx.id,
                    date: &tx.date,
                    account: &tx.account,
                    counterparty: tx.counterparty.as_deref(),
                    amount: format_amount(tx.amount_cents),
                    amount_cents: tx.amount_cents,
                    memo: tx.memo.as_deref(),
                    lines,
                });
            }
            let encoded = serde_json::to_string_pretty(&rows)
                .map_err(|e| Error::Encoding(format!("Failed to encode output: {}", e)))?;
            println!("{}", encoded);
        }
        _ => {
            println!(
                "{:<10} {:<16} {:>12}  {:<20} MEMO",
                "DATE", "ACCOUNT", "AMOUNT", "COUNTERPARTY"
            );
            println!("{}", "-".repeat(78));
            for tx in transactions {
                println!(
                    "{:<10} {:<16} {:>12}  {:<20} {}",
                    tx.date,
                    truncate(&tx.account, 16),
                    format_amount(tx.amount_cents),
                    truncate(tx.counterparty.as_deref().unwrap_or("-"), 20),
                    tx.memo.as_deref().unwrap_or(""),
                );
                if let Some(root) = line_filter {
                    for line in store.lines_matching(&tx.id, root)? {
                        println!(
                            "  {:<24} {:>12}  {}",
                            line.category_name.as_deref().unwrap_or("(uncategorized)"),
                            format_amount(line.amount_cents),
                            line.memo.as_deref().unwrap_or(""),
                        );
                    }
                }
            }
            println!("\n({} transactions)", transactions.len());
        }
    }

    Ok(())
}

/// Truncate to at most `max` bytes, cutting on a char boundary so multi-byte
/// names never split mid-character.
fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let cut = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= keep)
        .last()
        .unwrap_or(0);
    format!("{}...", &s[..cut])
}

/// Parse a date as YYYY-MM-DD or the query language's M/D/Y form.
fn parse_date(text: &str) -> ledger::Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| ledger::query::parse_short_date(text))
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "Invalid date '{}' (expected YYYY-MM-DD or M/D/Y)",
                text
            ))
        })
}

fn parse_id(id: &str) -> ledger::Result<Uuid> {
    Uuid::parse_str(id).map_err(|e| Error::Storage(format!("Invalid stored ID '{}': {}", id, e)))
}

/// Parse a dollar amount like "-42.50" into integer cents.
fn parse_amount(text: &str) -> ledger::Result<i64> {
    let trimmed = text.trim();
    let invalid =
        || Error::InvalidArgument(format!("Invalid amount '{}' (expected e.g. -42.50)", text));

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (dollars_text, cents_text) = match digits.split_once('.') {
        Some((dollars, cents)) => (dollars, cents),
        None => (digits, ""),
    };
    if dollars_text.is_empty() && cents_text.is_empty() {
        return Err(invalid());
    }
    if cents_text.len() > 2 || !cents_text.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let dollars: i64 = if dollars_text.is_empty() {
        0
    } else {
        dollars_text.parse().map_err(|_| invalid())?
    };
    let cents: i64 = if cents_text.is_empty() {
        0
    } else {
        // Pad so ".5" means 50 cents
        format!("{:0<2}", cents_text).parse().map_err(|_| invalid())?
    };

    let total = dollars * 100 + cents;
    Ok(if negative { -total } else { total })
}

/// Render integer cents as a dollar amount.
fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
