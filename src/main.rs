//! split-engine CLI
//!
//! Compute balances and settlement suggestions from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Per-participant balances for an event
//! split-engine balances --input event.json
//!
//! # Who pays whom, as JSON
//! split-engine settle --input event.json --format json
//!
//! # Split a receipt's line items
//! split-engine receipt --input receipt.json
//!
//! # Generate a random event for testing
//! split-engine generate --participants 8 --expenses 40
//! ```
//!
//! Set `RUST_LOG=debug` (or `warn`) to see engine diagnostics on stderr.

use rust_decimal::Decimal;
use serde::Serialize;
use split_engine::allocation::receipt::{allocate_receipt_items, ReceiptLineItem};
use split_engine::core::expense::Event;
use split_engine::settlement::balances::{aggregate_balances, BalanceReport};
use split_engine::settlement::reducer::{SettlementConfig, SettlementPlan};
use split_engine::simulation::stress_test::{generate_random_event, EventConfig};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"split-engine: group expense balances and settlement suggestions

USAGE:
    split-engine <COMMAND> [OPTIONS]

COMMANDS:
    balances    Compute per-participant paid / owes / net for an event
    settle      Suggest payments that settle an event
    receipt     Allocate receipt line items to participants
    generate    Generate a random event (for testing)
    help        Show this message

OPTIONS (balances, settle, receipt):
    --input <FILE>        Path to JSON input file
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (settle):
    --tolerance <AMOUNT>  Balances this close to zero count as settled (default: 0.01)

OPTIONS (generate):
    --participants <N>    Number of participants (default: 6)
    --expenses <N>        Number of expenses (default: 20)
    --currency <CODE>     Currency code (default: USD)
    --output <FILE>       Write to file instead of stdout

EXAMPLES:
    split-engine balances --input trip.json
    split-engine settle --input trip.json --tolerance 0.05 --format json
    split-engine receipt --input dinner.json
    split-engine generate --participants 10 --expenses 50 --output trip.json"#
    );
}

/// Receipt input file.
#[derive(serde::Deserialize)]
struct ReceiptFile {
    items: Vec<ReceiptLineItem>,
}

/// JSON output for `settle`.
#[derive(Serialize)]
struct SettleOutput<'a> {
    balances: &'a BalanceReport,
    plan: &'a SettlementPlan,
}

/// Options shared by the commands that read an input file.
struct InputArgs {
    input: String,
    json: bool,
    tolerance: Option<Decimal>,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn next_value<'a>(args: &'a [String], i: usize, flag: &str, what: &str) -> &'a str {
    args.get(i)
        .map(String::as_str)
        .unwrap_or_else(|| fail(format!("{} requires {}", flag, what)))
}

fn parse_input_args(args: &[String], allow_tolerance: bool) -> InputArgs {
    let mut input = None;
    let mut json = false;
    let mut tolerance = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input = Some(next_value(args, i, "--input", "a file path").to_string());
            }
            "--format" => {
                i += 1;
                json = match next_value(args, i, "--format", "'text' or 'json'") {
                    "json" => true,
                    "text" => false,
                    other => fail(format!("unknown format '{}'", other)),
                };
            }
            "--tolerance" if allow_tolerance => {
                i += 1;
                let raw = next_value(args, i, "--tolerance", "an amount");
                tolerance = Some(
                    raw.parse::<Decimal>()
                        .unwrap_or_else(|e| fail(format!("invalid tolerance '{}': {}", raw, e))),
                );
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    InputArgs {
        input: input.unwrap_or_else(|| fail("--input <FILE> is required")),
        json,
        tolerance,
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("reading file '{}': {}", path, e)));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| fail(format!("parsing JSON in '{}': {}", path, e)))
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| fail(format!("serializing output: {}", e)))
}

fn load_event(path: &str) -> Event {
    let event: Event = read_json(path);
    for dangling in event.dangling_references() {
        log::warn!(
            "expense {} references unknown participant {} ({:?})",
            dangling.expense_id,
            dangling.participant_id,
            dangling.role
        );
    }
    event
}

fn cmd_balances(args: &[String]) {
    let opts = parse_input_args(args, false);
    let event = load_event(&opts.input);
    let report = aggregate_balances(&event).unwrap_or_else(|e| fail(e));

    if opts.json {
        println!("{}", to_json(&report));
    } else {
        println!("{}", report);
    }
}

fn cmd_settle(args: &[String]) {
    let opts = parse_input_args(args, true);
    let event = load_event(&opts.input);
    let report = aggregate_balances(&event).unwrap_or_else(|e| fail(e));

    let mut config = SettlementConfig::default();
    if let Some(tolerance) = opts.tolerance {
        config.tolerance = tolerance;
    }
    let plan = SettlementPlan::from_balances(&report.balances, &config);

    if opts.json {
        println!(
            "{}",
            to_json(&SettleOutput {
                balances: &report,
                plan: &plan,
            })
        );
    } else {
        println!("{}", report);
        println!("{}", plan);
    }
}

fn cmd_receipt(args: &[String]) {
    let opts = parse_input_args(args, false);
    let receipt: ReceiptFile = read_json(&opts.input);
    let summary = allocate_receipt_items(&receipt.items)
        .unwrap_or_else(|e| fail(format!("allocating '{}': {}", opts.input, e)));

    if opts.json {
        println!("{}", to_json(&summary));
        return;
    }

    println!("=== Receipt Allocation ===");
    println!("Items:    {}", receipt.items.len());
    println!("Total:    {}", summary.total);
    println!("Assigned: {}", summary.assigned_total());
    println!();
    for (participant, amount) in &summary.per_participant {
        println!("  {:<16} {:>12}", participant.as_str(), amount);
    }
    if summary.has_unassigned() {
        println!("\nUnassigned items: {}", summary.unassigned_item_ids.join(", "));
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = EventConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--participants" => {
                i += 1;
                config.participant_count = next_value(args, i, "--participants", "a number")
                    .parse()
                    .unwrap_or_else(|_| fail("--participants requires a number"));
            }
            "--expenses" => {
                i += 1;
                config.expense_count = next_value(args, i, "--expenses", "a number")
                    .parse()
                    .unwrap_or_else(|_| fail("--expenses requires a number"));
            }
            "--currency" => {
                i += 1;
                config.currency = next_value(args, i, "--currency", "a currency code").into();
            }
            "--output" => {
                i += 1;
                output_path = Some(next_value(args, i, "--output", "a file path").to_string());
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let event = generate_random_event(&config);
    let json = to_json(&event);

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| fail(format!("writing '{}': {}", path, e)));
        eprintln!(
            "Generated {} expenses across {} participants → {}",
            event.expenses.len(),
            event.participants.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "balances" => cmd_balances(rest),
        "settle" => cmd_settle(rest),
        "receipt" => cmd_receipt(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_input_flag_with_settle_options() {
        let opts = parse_input_args(
            &args(&["--input", "trip.json", "--tolerance", "0.01", "--format", "json"]),
            true,
        );
        assert_eq!(opts.input, "trip.json");
        assert!(opts.json);
        assert_eq!(opts.tolerance, Some(dec!(0.01)));
    }

    #[test]
    fn test_input_flag_defaults_to_text() {
        let opts = parse_input_args(&args(&["--input", "items.json"]), false);
        assert_eq!(opts.input, "items.json");
        assert!(!opts.json);
        assert_eq!(opts.tolerance, None);
    }
}
