//! Weekend trip walkthrough.
//!
//! Shows the three split rules, balance aggregation, settlement
//! suggestions, and a receipt split into line items.

use rust_decimal_macros::dec;
use split_engine::allocation::receipt::{allocate_receipt_items, ReceiptLineItem};
use split_engine::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("╔═══════════════════════════════════════╗");
    println!("║  split-engine: Weekend Trip Example   ║");
    println!("╚═══════════════════════════════════════╝\n");

    let eur = CurrencyCode::new("EUR");
    let mut trip = Event::new("Weekend trip", eur.clone());
    for (id, name) in [("ana", "Ana"), ("bo", "Bo"), ("cy", "Cy"), ("di", "Di")] {
        trip.add_participant(Participant::new(id, name));
    }

    // --- Scenario 1: Expenses with each split rule ---
    println!("━━━ Scenario 1: Expenses ━━━\n");

    trip.add_expense(Expense::new(
        "Cabin",
        dec!(400),
        eur.clone(),
        vec![PayerAllocation::new("ana", dec!(400))],
        SplitInstruction::even(["ana", "bo", "cy", "di"]),
    ));
    trip.add_expense(Expense::new(
        "Groceries",
        dec!(120),
        eur.clone(),
        vec![
            PayerAllocation::new("bo", dec!(70)),
            PayerAllocation::new("cy", dec!(50)),
        ],
        SplitInstruction::Shares {
            shares: vec![
                ShareWeight::new("ana", dec!(1)),
                ShareWeight::new("bo", dec!(1)),
                ShareWeight::new("cy", dec!(1)),
            ],
        },
    ));
    trip.add_expense(Expense::new(
        "Kayaks",
        dec!(90),
        eur.clone(),
        vec![PayerAllocation::new("cy", dec!(90))],
        SplitInstruction::Exact {
            allocations: vec![
                ExactAllocation::new("ana", dec!(20)),
                ExactAllocation::new("bo", dec!(20)),
                ExactAllocation::new("cy", dec!(25)),
                ExactAllocation::new("di", dec!(25)),
            ],
        },
    ));

    for expense in &trip.expenses {
        println!(
            "  {:<10} {:>8} {}  [{}]",
            expense.description(),
            expense.amount(),
            expense.currency(),
            expense.split().kind()
        );
    }
    println!();

    // --- Scenario 2: Balances and settlement ---
    println!("━━━ Scenario 2: Balances & Settlement ━━━\n");

    let report = aggregate_balances(&trip)?;
    println!("{}", report);

    let plan = SettlementPlan::from_balances(&report.balances, &SettlementConfig::default());
    println!("{}", plan);

    // --- Scenario 3: Receipt line items ---
    println!("━━━ Scenario 3: Dinner Receipt ━━━\n");

    let items = vec![
        ReceiptLineItem::new("1", dec!(12), ["ana", "bo"]).with_description("Pizza"),
        ReceiptLineItem::new("2", dec!(9), ["bo"]).with_description("Wine"),
        ReceiptLineItem::new("3", dec!(4.50), Vec::<String>::new()).with_description("Tiramisu"),
    ];
    let summary = allocate_receipt_items(&items)?;

    for (participant, amount) in &summary.per_participant {
        println!("  {:<10} {:>8}", participant.as_str(), amount);
    }
    println!("  Receipt total:  {}", summary.total);
    println!("  Unassigned:     {:?}", summary.unassigned_item_ids);

    Ok(())
}
