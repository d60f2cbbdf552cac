//! Stress testing utilities for the settlement engine.
//!
//! Generates random events with a mix of even, shares and exact splits to
//! exercise aggregation and settlement at scale.

use crate::core::currency::CurrencyCode;
use crate::core::expense::{
    Event, ExactAllocation, Expense, ExpenseId, PayerAllocation, ShareWeight, SplitInstruction,
};
use crate::core::money::{from_cents, to_cents};
use crate::core::participant::{Participant, ParticipantId};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;

/// Configuration for generating a random event.
#[derive(Debug, Clone)]
pub struct EventConfig {
    /// Number of participants in the event.
    pub participant_count: usize,
    /// Number of expenses to generate.
    pub expense_count: usize,
    /// Minimum expense amount.
    pub min_amount: Decimal,
    /// Maximum expense amount.
    pub max_amount: Decimal,
    pub currency: CurrencyCode,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            participant_count: 6,
            expense_count: 20,
            min_amount: Decimal::ONE,
            max_amount: Decimal::from(500),
            currency: CurrencyCode::default(),
        }
    }
}

/// Generate a random event for testing.
///
/// Payer allocations and exact splits always add up to the expense amount.
pub fn generate_random_event(config: &EventConfig) -> Event {
    let mut rng = rand::thread_rng();
    let mut event = Event::new("generated", config.currency.clone());

    for i in 0..config.participant_count {
        event.add_participant(Participant::new(
            format!("P-{:03}", i),
            format!("Participant {}", i),
        ));
    }
    if config.participant_count == 0 {
        return event;
    }

    let ids: Vec<ParticipantId> = event.participants.iter().map(|p| p.id.clone()).collect();
    let min_cents = to_cents(config.min_amount).value().max(1);
    let max_cents = to_cents(config.max_amount).value().max(min_cents);

    for i in 0..config.expense_count {
        let total = rng.gen_range(min_cents..=max_cents);

        let mut members = ids.clone();
        members.shuffle(&mut rng);
        members.truncate(rng.gen_range(1..=ids.len()));

        let split = match rng.gen_range(0u8..3) {
            0 => SplitInstruction::Even {
                participant_ids: members,
            },
            1 => SplitInstruction::Shares {
                shares: members
                    .into_iter()
                    .map(|participant_id| ShareWeight {
                        participant_id,
                        weight: Decimal::from(rng.gen_range(0..=4u32)),
                    })
                    .collect(),
            },
            _ => SplitInstruction::Exact {
                allocations: random_partition(&mut rng, total, members.len())
                    .into_iter()
                    .zip(members)
                    .map(|(cents, participant_id)| ExactAllocation {
                        participant_id,
                        amount: from_cents(cents.into()),
                    })
                    .collect(),
            },
        };

        let mut payers = ids.clone();
        payers.shuffle(&mut rng);
        payers.truncate(rng.gen_range(1..=ids.len().min(2)));
        let paid_by = random_partition(&mut rng, total, payers.len())
            .into_iter()
            .zip(payers)
            .map(|(cents, participant_id)| PayerAllocation {
                participant_id,
                amount: from_cents(cents.into()),
            })
            .collect();

        event.add_expense(Expense::with_id(
            ExpenseId::new(format!("E-{:04}", i)),
            format!("Expense {}", i),
            from_cents(total.into()),
            config.currency.clone(),
            paid_by,
            split,
        ));
    }

    event
}

/// Cut `total` cents into `parts` non-negative pieces.
fn random_partition<R: Rng>(rng: &mut R, total: i64, parts: usize) -> Vec<i64> {
    let mut pieces = Vec::with_capacity(parts);
    let mut remaining = total;
    for _ in 1..parts {
        let piece = rng.gen_range(0..=remaining);
        pieces.push(piece);
        remaining -= piece;
    }
    pieces.push(remaining);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::balances::aggregate_balances;

    #[test]
    fn test_generated_event_shape() {
        let config = EventConfig {
            participant_count: 5,
            expense_count: 12,
            ..Default::default()
        };
        let event = generate_random_event(&config);
        assert_eq!(event.participants.len(), 5);
        assert_eq!(event.expenses.len(), 12);
        assert!(event.dangling_references().is_empty());

        for expense in &event.expenses {
            let paid: Decimal = expense.paid_by().iter().map(|p| p.amount).sum();
            assert_eq!(paid, expense.amount());
            assert!(expense.amount() >= config.min_amount);
            assert!(expense.amount() <= config.max_amount);
        }
    }

    #[test]
    fn test_generated_event_balances_to_zero() {
        let event = generate_random_event(&EventConfig::default());
        let report = aggregate_balances(&event).unwrap();
        assert_eq!(report.net_sum(), Decimal::ZERO);
    }

    #[test]
    fn test_no_participants_means_no_expenses() {
        let config = EventConfig {
            participant_count: 0,
            ..Default::default()
        };
        assert!(generate_random_event(&config).expenses.is_empty());
    }
}
