use crate::core::currency::CurrencyCode;
use crate::core::participant::{Participant, ParticipantId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Identifier of an expense within an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random (UUID v4) identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExpenseId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// How much of an expense a given participant fronted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerAllocation {
    pub participant_id: ParticipantId,
    pub amount: Decimal,
}

impl PayerAllocation {
    pub fn new(participant_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            participant_id: ParticipantId::new(participant_id),
            amount,
        }
    }
}

/// One participant's weight in a shares split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareWeight {
    pub participant_id: ParticipantId,
    pub weight: Decimal,
}

impl ShareWeight {
    pub fn new(participant_id: impl Into<String>, weight: Decimal) -> Self {
        Self {
            participant_id: ParticipantId::new(participant_id),
            weight,
        }
    }
}

/// A caller-specified amount in an exact split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactAllocation {
    pub participant_id: ParticipantId,
    pub amount: Decimal,
}

impl ExactAllocation {
    pub fn new(participant_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            participant_id: ParticipantId::new(participant_id),
            amount,
        }
    }
}

/// The rule for dividing one expense among participants.
///
/// Serialized with a `type` tag:
///
/// ```
/// use split_engine::core::expense::SplitInstruction;
///
/// let split: SplitInstruction = serde_json::from_str(
///     r#"{ "type": "even", "participant_ids": ["a", "b"] }"#,
/// ).unwrap();
/// assert_eq!(split.kind(), "even");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SplitInstruction {
    /// Equal shares; extra cents go to the first participants in list order.
    Even { participant_ids: Vec<ParticipantId> },
    /// Proportional to weight, apportioned by largest remainder.
    Shares { shares: Vec<ShareWeight> },
    /// Caller-specified amounts; drift is absorbed by the first allocation.
    Exact { allocations: Vec<ExactAllocation> },
}

impl SplitInstruction {
    /// Even split over the given ids.
    pub fn even<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SplitInstruction::Even {
            participant_ids: ids.into_iter().map(ParticipantId::new).collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SplitInstruction::Even { .. } => "even",
            SplitInstruction::Shares { .. } => "shares",
            SplitInstruction::Exact { .. } => "exact",
        }
    }

    /// Every participant referenced by this split, in declaration order.
    pub fn participant_ids(&self) -> Vec<&ParticipantId> {
        match self {
            SplitInstruction::Even { participant_ids } => participant_ids.iter().collect(),
            SplitInstruction::Shares { shares } => {
                shares.iter().map(|s| &s.participant_id).collect()
            }
            SplitInstruction::Exact { allocations } => {
                allocations.iter().map(|a| &a.participant_id).collect()
            }
        }
    }
}

/// A single shared cost within an event.
///
/// Expenses are immutable once created; editing an expense means replacing
/// it and recomputing balances.
///
/// # Examples
///
/// ```
/// use split_engine::core::currency::CurrencyCode;
/// use split_engine::core::expense::{Expense, PayerAllocation, SplitInstruction};
/// use rust_decimal_macros::dec;
///
/// let dinner = Expense::new(
///     "Dinner",
///     dec!(90),
///     CurrencyCode::new("EUR"),
///     vec![PayerAllocation::new("a", dec!(90))],
///     SplitInstruction::even(["a", "b", "c"]),
/// );
/// assert_eq!(dinner.amount(), dec!(90));
/// assert_eq!(dinner.split().kind(), "even");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(default = "ExpenseId::generate")]
    id: ExpenseId,
    #[serde(default)]
    description: String,
    /// Total cost in currency units.
    amount: Decimal,
    #[serde(default)]
    currency: CurrencyCode,
    /// Who fronted the money. Expected to sum to `amount`.
    paid_by: Vec<PayerAllocation>,
    split: SplitInstruction,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

impl Expense {
    /// Create an expense with a freshly generated id.
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        currency: CurrencyCode,
        paid_by: Vec<PayerAllocation>,
        split: SplitInstruction,
    ) -> Self {
        Self::with_id(
            ExpenseId::generate(),
            description,
            amount,
            currency,
            paid_by,
            split,
        )
    }

    /// Create an expense with a specific id (useful for testing / determinism).
    pub fn with_id(
        id: ExpenseId,
        description: impl Into<String>,
        amount: Decimal,
        currency: CurrencyCode,
        paid_by: Vec<PayerAllocation>,
        split: SplitInstruction,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            amount,
            currency,
            paid_by,
            split,
            date: None,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> &ExpenseId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn paid_by(&self) -> &[PayerAllocation] {
        &self.paid_by
    }

    pub fn split(&self) -> &SplitInstruction {
        &self.split
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }
}

/// Which side of an expense a dangling participant reference sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceRole {
    Payer,
    Split,
}

/// A participant id referenced by an expense but not declared in the event.
///
/// These arise when a participant is removed from an event while older
/// expenses still mention them. Aggregation drops such references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingReference {
    pub expense_id: ExpenseId,
    pub participant_id: ParticipantId,
    pub role: ReferenceRole,
}

/// A shared-expense occasion: the participants and everything they spent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub currency: CurrencyCode,
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl Event {
    pub fn new(name: impl Into<String>, currency: CurrencyCode) -> Self {
        Self {
            name: name.into(),
            currency,
            participants: Vec::new(),
            expenses: Vec::new(),
        }
    }

    pub fn add_participant(&mut self, participant: Participant) {
        self.participants.push(participant);
    }

    pub fn add_expense(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    /// Simple sum of expense amounts.
    pub fn total_expenses(&self) -> Decimal {
        self.expenses.iter().map(|e| e.amount()).sum()
    }

    /// Every payer or split reference to a participant not declared in this event.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let known: HashSet<&ParticipantId> = self.participants.iter().map(|p| &p.id).collect();
        let mut dangling = Vec::new();

        for expense in &self.expenses {
            let payers = expense
                .paid_by()
                .iter()
                .map(|p| (&p.participant_id, ReferenceRole::Payer));
            let split = expense
                .split()
                .participant_ids()
                .into_iter()
                .map(|id| (id, ReferenceRole::Split));

            for (id, role) in payers.chain(split) {
                if !known.contains(id) {
                    dangling.push(DanglingReference {
                        expense_id: expense.id().clone(),
                        participant_id: id.clone(),
                        role,
                    });
                }
            }
        }
        dangling
    }
}
