use crate::core::money::Cents;
use crate::core::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from posting to a [`Ledger`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{0} is not tracked by this ledger")]
    UnknownParticipant(ParticipantId),
    #[error("{column} total for {participant} overflowed")]
    Overflow {
        participant: ParticipantId,
        column: &'static str,
    },
}

/// Running totals for one participant, in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// What the participant fronted.
    pub paid: Cents,
    /// What the participant's shares add up to.
    pub owes: Cents,
}

impl LedgerEntry {
    /// Positive = owed money by the group, negative = owes the group.
    ///
    /// Saturates if the difference leaves the `i64` range.
    pub fn net(&self) -> Cents {
        Cents::new(self.paid.value().saturating_sub(self.owes.value()))
    }
}

/// Tracks what each participant paid and owes across an event.
///
/// Only participants registered with [`Ledger::open`] are tracked. Postings
/// against any other id, or postings that would overflow, are rejected and
/// leave the ledger untouched.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    /// Declaration order is kept so reports list participants as declared.
    entries: Vec<(ParticipantId, LedgerEntry)>,
    index: HashMap<ParticipantId, usize>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant with zero totals. Re-opening an id is a no-op.
    pub fn open(&mut self, participant: &ParticipantId) {
        if self.index.contains_key(participant) {
            return;
        }
        self.index.insert(participant.clone(), self.entries.len());
        self.entries
            .push((participant.clone(), LedgerEntry::default()));
    }

    /// Record money fronted.
    pub fn credit_paid(
        &mut self,
        participant: &ParticipantId,
        amount: Cents,
    ) -> Result<(), LedgerError> {
        let entry = self.entry_mut(participant)?;
        entry.paid = entry
            .paid
            .checked_add(amount)
            .ok_or_else(|| overflow(participant, "paid"))?;
        Ok(())
    }

    /// Record a share owed.
    pub fn debit_owes(
        &mut self,
        participant: &ParticipantId,
        amount: Cents,
    ) -> Result<(), LedgerError> {
        let entry = self.entry_mut(participant)?;
        entry.owes = entry
            .owes
            .checked_add(amount)
            .ok_or_else(|| overflow(participant, "owes"))?;
        Ok(())
    }

    pub fn entry(&self, participant: &ParticipantId) -> Option<&LedgerEntry> {
        self.index.get(participant).map(|&i| &self.entries[i].1)
    }

    pub fn net(&self, participant: &ParticipantId) -> Cents {
        self.entry(participant)
            .map(LedgerEntry::net)
            .unwrap_or(Cents::ZERO)
    }

    /// All entries in registration order.
    pub fn entries(&self) -> &[(ParticipantId, LedgerEntry)] {
        &self.entries
    }

    /// Total paid equals total owed, i.e. the nets sum to zero.
    pub fn is_balanced(&self) -> bool {
        self.entries
            .iter()
            .try_fold(Cents::ZERO, |acc, (_, e)| acc.checked_add(e.net()))
            == Some(Cents::ZERO)
    }

    fn entry_mut(
        &mut self,
        participant: &ParticipantId,
    ) -> Result<&mut LedgerEntry, LedgerError> {
        let i = *self
            .index
            .get(participant)
            .ok_or_else(|| LedgerError::UnknownParticipant(participant.clone()))?;
        Ok(&mut self.entries[i].1)
    }
}

fn overflow(participant: &ParticipantId, column: &'static str) -> LedgerError {
    LedgerError::Overflow {
        participant: participant.clone(),
        column,
    }
}
