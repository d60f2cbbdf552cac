//! # split-engine
//!
//! Group expense splitting and debt settlement engine.
//!
//! Given an event (participants plus expenses with flexible split rules),
//! this engine computes each participant's net balance and reduces those
//! balances to a short, deterministic list of settling payments. All
//! distribution arithmetic is done in integer cents.
//!
//! ## Architecture
//!
//! - **core**: Foundational types: money, participants, currencies, expenses, ledger
//! - **allocation**: Split distribution and receipt line-item allocation
//! - **settlement**: Balance aggregation and greedy settlement reduction
//! - **simulation**: Random event generation for stress testing

pub mod allocation;
pub mod core;
pub mod settlement;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::allocation::receipt::{
        allocate_receipt_items, ReceiptAllocationSummary, ReceiptError, ReceiptLineItem,
    };
    pub use crate::allocation::split::{distribute_split, Share, SplitError};
    pub use crate::core::currency::CurrencyCode;
    pub use crate::core::expense::{
        Event, ExactAllocation, Expense, ExpenseId, PayerAllocation, ShareWeight,
        SplitInstruction,
    };
    pub use crate::core::money::{from_cents, to_cents, Cents};
    pub use crate::core::participant::{Participant, ParticipantId};
    pub use crate::settlement::balances::{
        aggregate_balances, BalanceReport, EngineError, ParticipantBalance,
    };
    pub use crate::settlement::reducer::{
        apply_settlements, suggest_settlements, Settlement, SettlementConfig, SettlementPlan,
        DEFAULT_TOLERANCE,
    };
}
