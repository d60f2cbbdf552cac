//! Split distribution: turning one expense total into per-participant shares.
//!
//! All three strategies work on integer cents and guarantee that the shares
//! add up to exactly the expense total. Who receives a leftover cent is a
//! pure function of input order, never randomized and never sorted by id.

use crate::core::expense::{ExactAllocation, ShareWeight, SplitInstruction};
use crate::core::money::{from_cents, to_cents, Cents};
use crate::core::participant::ParticipantId;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors arising from split distribution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("{kind} split has no participants to divide {total} among")]
    EmptySplit { kind: &'static str, total: Cents },
    #[error("share weights overflowed while apportioning {total}")]
    WeightOverflow { total: Cents },
    #[error("exact allocations overflowed while checking them against {total}")]
    AllocationOverflow { total: Cents },
}

/// A participant's share of an expense, in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentShare {
    pub participant_id: ParticipantId,
    pub cents: Cents,
}

/// A participant's share of an expense, in currency units (two decimals).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub participant_id: ParticipantId,
    pub amount: Decimal,
}

/// Divide `amount` according to `split`.
///
/// The returned shares are in split order and sum exactly to the amount
/// rounded to cents.
///
/// # Examples
///
/// ```
/// use split_engine::allocation::split::distribute_split;
/// use split_engine::core::expense::{ShareWeight, SplitInstruction};
/// use rust_decimal_macros::dec;
///
/// let split = SplitInstruction::Shares {
///     shares: vec![
///         ShareWeight::new("a", dec!(2)),
///         ShareWeight::new("b", dec!(1)),
///         ShareWeight::new("c", dec!(1)),
///     ],
/// };
/// let shares = distribute_split(dec!(75), &split).unwrap();
/// let amounts: Vec<_> = shares.iter().map(|s| s.amount).collect();
/// assert_eq!(amounts, vec![dec!(37.50), dec!(18.75), dec!(18.75)]);
/// ```
pub fn distribute_split(
    amount: Decimal,
    split: &SplitInstruction,
) -> Result<Vec<Share>, SplitError> {
    let shares = distribute_split_cents(to_cents(amount), split)?;
    Ok(shares
        .into_iter()
        .map(|s| Share {
            participant_id: s.participant_id,
            amount: from_cents(s.cents),
        })
        .collect())
}

/// Integer-cent core of [`distribute_split`].
pub fn distribute_split_cents(
    total: Cents,
    split: &SplitInstruction,
) -> Result<Vec<CentShare>, SplitError> {
    match split {
        SplitInstruction::Even { participant_ids } => distribute_even(total, participant_ids),
        SplitInstruction::Shares { shares } => distribute_shares(total, shares),
        SplitInstruction::Exact { allocations } => distribute_exact(total, allocations),
    }
}

/// Split `total` into `count` near-equal parts.
///
/// Every part is `floor(total / count)`; the first `total mod count` parts
/// get one extra cent.
///
/// ```
/// use split_engine::allocation::split::split_even_cents;
/// use split_engine::core::money::Cents;
///
/// let parts = split_even_cents(Cents::new(10), 4).unwrap();
/// assert_eq!(parts, vec![Cents::new(3), Cents::new(3), Cents::new(2), Cents::new(2)]);
/// ```
pub fn split_even_cents(total: Cents, count: usize) -> Result<Vec<Cents>, SplitError> {
    if count == 0 {
        return Err(SplitError::EmptySplit { kind: "even", total });
    }
    let n = count as i64;
    let base = total.value().div_euclid(n);
    let remainder = total.value().rem_euclid(n) as usize;

    Ok((0..count)
        .map(|i| {
            if i < remainder {
                Cents::new(base + 1)
            } else {
                Cents::new(base)
            }
        })
        .collect())
}

fn distribute_even(total: Cents, ids: &[ParticipantId]) -> Result<Vec<CentShare>, SplitError> {
    let parts = split_even_cents(total, ids.len())?;
    Ok(ids
        .iter()
        .zip(parts)
        .map(|(id, cents)| CentShare {
            participant_id: id.clone(),
            cents,
        })
        .collect())
}

/// Largest-remainder apportionment over the positive weights.
///
/// Falls back to an even split over every listed participant when no weight
/// is positive.
fn distribute_shares(total: Cents, shares: &[ShareWeight]) -> Result<Vec<CentShare>, SplitError> {
    let positive: Vec<&ShareWeight> = shares
        .iter()
        .filter(|s| s.weight > Decimal::ZERO)
        .collect();

    if positive.is_empty() {
        if shares.is_empty() {
            return Err(SplitError::EmptySplit { kind: "shares", total });
        }
        log::debug!(
            "no positive weights among {} shares, splitting {} evenly",
            shares.len(),
            total
        );
        let ids: Vec<ParticipantId> = shares.iter().map(|s| s.participant_id.clone()).collect();
        return distribute_even(total, &ids);
    }

    let total_weight = positive
        .iter()
        .try_fold(Decimal::ZERO, |acc, s| acc.checked_add(s.weight))
        .ok_or(SplitError::WeightOverflow { total })?;
    let total_dec = Decimal::from(total.value());

    let mut allotted: Vec<i64> = Vec::with_capacity(positive.len());
    let mut fractions: Vec<(usize, Decimal)> = Vec::with_capacity(positive.len());
    for (i, share) in positive.iter().enumerate() {
        // Multiply before dividing so whole results stay whole.
        let exact = share
            .weight
            .checked_mul(total_dec)
            .and_then(|v| v.checked_div(total_weight))
            .ok_or(SplitError::WeightOverflow { total })?;
        let floor = exact.floor();
        allotted.push(floor.to_i64().ok_or(SplitError::WeightOverflow { total })?);
        fractions.push((i, exact - floor));
    }

    let leftover = total.value() - allotted.iter().sum::<i64>();
    // sort_by is stable: equal fractions keep their original order.
    fractions.sort_by(|a, b| b.1.cmp(&a.1));
    for (i, _) in fractions.iter().cycle().take(leftover.max(0) as usize) {
        allotted[*i] += 1;
    }

    Ok(positive
        .iter()
        .zip(allotted)
        .map(|(share, cents)| CentShare {
            participant_id: share.participant_id.clone(),
            cents: Cents::new(cents),
        })
        .collect())
}

/// Caller-specified amounts; any drift from the total lands on the first entry.
fn distribute_exact(
    total: Cents,
    allocations: &[ExactAllocation],
) -> Result<Vec<CentShare>, SplitError> {
    if allocations.is_empty() {
        return Err(SplitError::EmptySplit { kind: "exact", total });
    }

    let mut shares: Vec<CentShare> = allocations
        .iter()
        .map(|a| CentShare {
            participant_id: a.participant_id.clone(),
            cents: to_cents(a.amount),
        })
        .collect();

    let overflow = SplitError::AllocationOverflow { total };
    let allocated = shares
        .iter()
        .try_fold(Cents::ZERO, |acc, s| acc.checked_add(s.cents))
        .ok_or(overflow.clone())?;
    let difference = total.checked_sub(allocated).ok_or(overflow.clone())?;
    if !difference.is_zero() {
        log::debug!(
            "exact split off by {}; adjusting first allocation ({})",
            difference,
            shares[0].participant_id
        );
        shares[0].cents = shares[0].cents.checked_add(difference).ok_or(overflow)?;
    }
    Ok(shares)
}
