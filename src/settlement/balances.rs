use crate::allocation::split::{distribute_split_cents, SplitError};
use crate::core::expense::{
    Event, ExactAllocation, Expense, ExpenseId, PayerAllocation, SplitInstruction,
};
use crate::core::ledger::{Ledger, LedgerError};
use crate::core::money::{
    from_cents, round_money, to_cents, within_limit, Cents, MAX_AMOUNT_CENTS,
};
use crate::core::participant::ParticipantId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors arising from balance aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("cannot split expense {expense_id}: {source}")]
    Split {
        expense_id: ExpenseId,
        #[source]
        source: SplitError,
    },
    #[error("expense {expense_id} has amount {amount}, beyond the supported {limit}")]
    AmountOutOfRange {
        expense_id: ExpenseId,
        amount: Decimal,
        limit: Cents,
    },
    #[error("posting expense {expense_id} overflowed: {source}")]
    Overflow {
        expense_id: ExpenseId,
        #[source]
        source: LedgerError,
    },
}

/// What one participant paid, owes, and their difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantBalance {
    pub participant_id: ParticipantId,
    pub paid: Decimal,
    pub owes: Decimal,
    /// `paid - owes`. Positive means the group owes this participant.
    pub net: Decimal,
}

impl ParticipantBalance {
    /// A balance with only a net position, as fed to the settlement reducer.
    pub fn from_net(participant_id: impl Into<String>, net: Decimal) -> Self {
        let net = round_money(net);
        let (paid, owes) = if net >= Decimal::ZERO {
            (net, Decimal::ZERO)
        } else {
            (Decimal::ZERO, -net)
        };
        Self {
            participant_id: ParticipantId::new(participant_id),
            paid,
            owes,
            net,
        }
    }
}

/// Event-wide totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Number of declared participants.
    pub participants: usize,
    /// Plain sum of expense amounts.
    pub expenses: Decimal,
}

/// Result of folding an event's expenses into per-participant balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub totals: Totals,
    /// One entry per declared participant, in declaration order.
    pub balances: Vec<ParticipantBalance>,
}

impl BalanceReport {
    pub fn balance(&self, participant: &ParticipantId) -> Option<&ParticipantBalance> {
        self.balances
            .iter()
            .find(|b| &b.participant_id == participant)
    }

    /// Sum of all nets. Zero unless expenses referenced unknown participants.
    pub fn net_sum(&self) -> Decimal {
        self.balances.iter().map(|b| b.net).sum()
    }
}

impl std::fmt::Display for BalanceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Balances ===")?;
        writeln!(f, "Participants:   {}", self.totals.participants)?;
        writeln!(f, "Total Expenses: {}", self.totals.expenses)?;
        writeln!(f)?;
        writeln!(
            f,
            "  {:<16} {:>12} {:>12} {:>12}",
            "participant", "paid", "owes", "net"
        )?;
        for b in &self.balances {
            writeln!(
                f,
                "  {:<16} {:>12} {:>12} {:>12}",
                b.participant_id.as_str(),
                b.paid,
                b.owes,
                b.net
            )?;
        }
        Ok(())
    }
}

/// Fold every expense in `event` into per-participant paid/owes/net totals.
///
/// # Algorithm
///
/// 1. Open a cent ledger entry for each declared participant.
/// 2. For each expense, credit each payer's `paid` and debit each split
///    share to `owes`, both in integer cents.
/// 3. `net = paid - owes`, converted to currency units at the end.
///
/// Payer and split references to undeclared participants are dropped (and
/// logged), so a participant removed from an event simply stops appearing.
/// Expense order does not affect the result.
///
/// Any single amount beyond [`MAX_AMOUNT_CENTS`] is rejected with
/// [`EngineError::AmountOutOfRange`].
pub fn aggregate_balances(event: &Event) -> Result<BalanceReport, EngineError> {
    let mut ledger = Ledger::new();
    for participant in &event.participants {
        ledger.open(&participant.id);
    }

    let mut unposted = 0;
    for expense in &event.expenses {
        if expense.currency() != &event.currency {
            log::warn!(
                "expense {} is in {} but event is in {}; amounts are not converted",
                expense.id(),
                expense.currency(),
                event.currency
            );
        }
        unposted += post_expense(&mut ledger, expense)?;
    }
    debug_assert!(
        unposted > 0 || ledger.is_balanced(),
        "ledger out of balance with every posting landed"
    );

    let balances = ledger
        .entries()
        .iter()
        .map(|(id, entry)| ParticipantBalance {
            participant_id: id.clone(),
            paid: from_cents(entry.paid),
            owes: from_cents(entry.owes),
            net: from_cents(entry.net()),
        })
        .collect();

    let report = BalanceReport {
        totals: Totals {
            participants: event.participants.len(),
            expenses: event.total_expenses(),
        },
        balances,
    };
    log::debug!(
        "aggregated {} expenses over {} participants (net sum {})",
        event.expenses.len(),
        report.totals.participants,
        report.net_sum()
    );
    Ok(report)
}

/// Post one expense. Returns how many postings did not land: dropped
/// references, plus a missing payer side.
fn post_expense(ledger: &mut Ledger, expense: &Expense) -> Result<usize, EngineError> {
    check_amounts(expense)?;
    let total = to_cents(expense.amount());
    let overflow = |source| EngineError::Overflow {
        expense_id: expense.id().clone(),
        source,
    };
    let mut dropped = 0;

    if expense.paid_by().is_empty() && !total.is_zero() {
        log::debug!("expense {} has no payers; only shares are posted", expense.id());
        dropped += 1;
    }

    let payers = payer_cents(total, expense.paid_by()).ok_or_else(|| {
        EngineError::AmountOutOfRange {
            expense_id: expense.id().clone(),
            amount: expense.paid_by().iter().map(|p| p.amount).sum(),
            limit: MAX_AMOUNT_CENTS,
        }
    })?;
    for (participant, cents) in payers {
        match ledger.credit_paid(participant, cents) {
            Ok(()) => {}
            Err(LedgerError::UnknownParticipant(_)) => {
                log::warn!(
                    "expense {}: payer {} is not a participant; dropped",
                    expense.id(),
                    participant
                );
                dropped += 1;
            }
            Err(source) => return Err(overflow(source)),
        }
    }

    let shares =
        distribute_split_cents(total, expense.split()).map_err(|source| EngineError::Split {
            expense_id: expense.id().clone(),
            source,
        })?;
    for share in &shares {
        match ledger.debit_owes(&share.participant_id, share.cents) {
            Ok(()) => {}
            Err(LedgerError::UnknownParticipant(_)) => {
                log::warn!(
                    "expense {}: split participant {} is not a participant; dropped",
                    expense.id(),
                    share.participant_id
                );
                dropped += 1;
            }
            Err(source) => return Err(overflow(source)),
        }
    }
    Ok(dropped)
}

/// Reject an expense whose amount, payer amounts or exact allocations lie
/// outside [`MAX_AMOUNT_CENTS`].
fn check_amounts(expense: &Expense) -> Result<(), EngineError> {
    let exact: &[ExactAllocation] = match expense.split() {
        SplitInstruction::Exact { allocations } => allocations,
        _ => &[],
    };
    let out_of_range = std::iter::once(expense.amount())
        .chain(expense.paid_by().iter().map(|p| p.amount))
        .chain(exact.iter().map(|a| a.amount))
        .find(|amount| !within_limit(*amount));

    match out_of_range {
        Some(amount) => Err(EngineError::AmountOutOfRange {
            expense_id: expense.id().clone(),
            amount,
            limit: MAX_AMOUNT_CENTS,
        }),
        None => Ok(()),
    }
}

/// Payer amounts in cents, with the first payer absorbing any drift from
/// the expense total. `None` if the payer amounts overflow.
fn payer_cents(
    total: Cents,
    payers: &[PayerAllocation],
) -> Option<Vec<(&ParticipantId, Cents)>> {
    let mut cents: Vec<(&ParticipantId, Cents)> = payers
        .iter()
        .map(|p| (&p.participant_id, to_cents(p.amount)))
        .collect();

    let fronted = cents
        .iter()
        .try_fold(Cents::ZERO, |acc, (_, c)| acc.checked_add(*c))?;
    if let Some(first) = cents.first_mut() {
        first.1 = first.1.checked_add(total.checked_sub(fronted)?)?;
    }
    Some(cents)
}
