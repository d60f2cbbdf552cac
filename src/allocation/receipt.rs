use crate::allocation::split::{split_even_cents, SplitError};
use crate::core::expense::{ExactAllocation, SplitInstruction};
use crate::core::money::{from_cents, to_cents, within_limit, Cents};
use crate::core::participant::ParticipantId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors arising from receipt allocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiptError {
    #[error("item {item_id} has amount {amount}, beyond the supported range")]
    AmountOutOfRange { item_id: String, amount: Decimal },
    #[error("receipt totals overflowed at item {item_id}")]
    Overflow { item_id: String },
    #[error(transparent)]
    Split(#[from] SplitError),
}

/// One line on a receipt, with the participants who share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLineItem {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    /// Empty means nobody has claimed the item yet.
    #[serde(default)]
    pub assigned_participant_ids: Vec<ParticipantId>,
}

impl ReceiptLineItem {
    pub fn new<I, S>(id: impl Into<String>, amount: Decimal, assigned: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            description: String::new(),
            amount,
            assigned_participant_ids: assigned.into_iter().map(ParticipantId::new).collect(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_assigned(&self) -> bool {
        !self.assigned_participant_ids.is_empty()
    }
}

/// Per-participant totals for a receipt.
///
/// `total` covers every item, including unassigned ones, so it exceeds the
/// sum of `per_participant` whenever `unassigned_item_ids` is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptAllocationSummary {
    pub per_participant: BTreeMap<ParticipantId, Decimal>,
    pub unassigned_item_ids: Vec<String>,
    pub total: Decimal,
}

impl ReceiptAllocationSummary {
    /// Sum of what was actually allocated to participants.
    pub fn assigned_total(&self) -> Decimal {
        self.per_participant.values().copied().sum()
    }

    pub fn has_unassigned(&self) -> bool {
        !self.unassigned_item_ids.is_empty()
    }

    /// Exact split over the allocated totals, for recording the receipt as an
    /// expense of [`assigned_total`](Self::assigned_total).
    ///
    /// Returns `None` when nothing was assigned.
    pub fn to_split_instruction(&self) -> Option<SplitInstruction> {
        if self.per_participant.is_empty() {
            return None;
        }
        Some(SplitInstruction::Exact {
            allocations: self
                .per_participant
                .iter()
                .map(|(id, amount)| ExactAllocation {
                    participant_id: id.clone(),
                    amount: *amount,
                })
                .collect(),
        })
    }
}

/// Split each receipt line evenly among its assigned participants.
///
/// Within an item the first participants in assignment order receive the
/// leftover cents. Unassigned items are reported and skipped.
///
/// Fails if an item amount is beyond
/// [`MAX_AMOUNT_CENTS`](crate::core::money::MAX_AMOUNT_CENTS) or the totals
/// overflow.
///
/// # Examples
///
/// ```
/// use split_engine::allocation::receipt::{allocate_receipt_items, ReceiptLineItem};
/// use split_engine::core::participant::ParticipantId;
/// use rust_decimal_macros::dec;
///
/// let items = vec![
///     ReceiptLineItem::new("pizza", dec!(12), ["a", "b"]),
///     ReceiptLineItem::new("wine", dec!(9), ["b"]),
/// ];
/// let summary = allocate_receipt_items(&items).unwrap();
/// assert_eq!(summary.per_participant[&ParticipantId::new("a")], dec!(6));
/// assert_eq!(summary.per_participant[&ParticipantId::new("b")], dec!(15));
/// assert_eq!(summary.total, dec!(21));
/// ```
pub fn allocate_receipt_items(
    items: &[ReceiptLineItem],
) -> Result<ReceiptAllocationSummary, ReceiptError> {
    let mut per_participant: BTreeMap<ParticipantId, Cents> = BTreeMap::new();
    let mut unassigned_item_ids = Vec::new();
    let mut total = Cents::ZERO;

    for item in items {
        if !within_limit(item.amount) {
            return Err(ReceiptError::AmountOutOfRange {
                item_id: item.id.clone(),
                amount: item.amount,
            });
        }
        let overflow = || ReceiptError::Overflow {
            item_id: item.id.clone(),
        };
        let cents = to_cents(item.amount);
        total = total.checked_add(cents).ok_or_else(overflow)?;

        if !item.is_assigned() {
            unassigned_item_ids.push(item.id.clone());
            continue;
        }

        let parts = split_even_cents(cents, item.assigned_participant_ids.len())?;
        for (id, part) in item.assigned_participant_ids.iter().zip(parts) {
            let running = per_participant.entry(id.clone()).or_insert(Cents::ZERO);
            *running = running.checked_add(part).ok_or_else(overflow)?;
        }
    }

    if !unassigned_item_ids.is_empty() {
        log::debug!(
            "{} of {} receipt items unassigned",
            unassigned_item_ids.len(),
            items.len()
        );
    }

    Ok(ReceiptAllocationSummary {
        per_participant: per_participant
            .into_iter()
            .map(|(id, cents)| (id, from_cents(cents)))
            .collect(),
        unassigned_item_ids,
        total: from_cents(total),
    })
}
