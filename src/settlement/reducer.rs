use crate::core::money::round_money;
use crate::core::participant::ParticipantId;
use crate::settlement::balances::ParticipantBalance;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Balances within this distance of zero are treated as settled.
pub const DEFAULT_TOLERANCE: Decimal = dec!(0.01);

/// A suggested payment from a debtor to a creditor.
///
/// Suggestions carry no payment state; tracking partial payments against a
/// `(from, to)` pair is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// The participant who pays.
    pub from: ParticipantId,
    /// The participant who receives.
    pub to: ParticipantId,
    pub amount: Decimal,
}

/// Knobs for settlement suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementConfig {
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,
}

fn default_tolerance() -> Decimal {
    DEFAULT_TOLERANCE
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Reduce net balances to a list of debtor → creditor payments.
///
/// # Algorithm
///
/// Greedy largest-first matching, not a general min-cash-flow solver:
///
/// 1. Creditors (`net > tolerance`) sorted by net descending; debtors
///    (`net < -tolerance`) sorted by net ascending. Both sorts are stable.
/// 2. Pair the current creditor with the current debtor and transfer
///    `min(credit, |debt|)`.
/// 3. Move past whichever side (or both) is now within `tolerance` of zero.
/// 4. Stop when either side runs out.
///
/// Emits at most `creditors + debtors - 1` settlements. The nets are
/// expected to sum to roughly zero; if they do not, the result is simply
/// incomplete.
///
/// # Examples
///
/// ```
/// use split_engine::settlement::balances::ParticipantBalance;
/// use split_engine::settlement::reducer::{suggest_settlements, DEFAULT_TOLERANCE};
/// use rust_decimal_macros::dec;
///
/// let balances = vec![
///     ParticipantBalance::from_net("a", dec!(30)),
///     ParticipantBalance::from_net("b", dec!(-10)),
///     ParticipantBalance::from_net("c", dec!(-20)),
/// ];
/// let settlements = suggest_settlements(&balances, DEFAULT_TOLERANCE);
/// assert_eq!(settlements.len(), 2);
/// assert_eq!(settlements[0].from.as_str(), "c");
/// assert_eq!(settlements[0].amount, dec!(20));
/// ```
pub fn suggest_settlements(
    balances: &[ParticipantBalance],
    tolerance: Decimal,
) -> Vec<Settlement> {
    let tolerance = tolerance.max(Decimal::ZERO);

    let net_sum: Decimal = balances.iter().map(|b| b.net).sum();
    if net_sum.abs() > tolerance {
        log::debug!(
            "balances net to {} rather than zero; settlement will be incomplete",
            net_sum
        );
    }

    // Nets are rounded to cents up front so every transfer zeroes one side.
    let mut creditors: Vec<(&ParticipantId, Decimal)> = balances
        .iter()
        .map(|b| (&b.participant_id, round_money(b.net)))
        .filter(|(_, net)| *net > tolerance)
        .collect();
    creditors.sort_by(|a, b| b.1.cmp(&a.1));

    let mut debtors: Vec<(&ParticipantId, Decimal)> = balances
        .iter()
        .map(|b| (&b.participant_id, round_money(b.net)))
        .filter(|(_, net)| *net < -tolerance)
        .collect();
    debtors.sort_by(|a, b| a.1.cmp(&b.1));

    let mut settlements = Vec::new();
    let (mut ci, mut di) = (0, 0);

    while ci < creditors.len() && di < debtors.len() {
        let (creditor, credit) = creditors[ci];
        let (debtor, debt) = debtors[di];
        let amount = round_money(credit.min(-debt));

        settlements.push(Settlement {
            from: debtor.clone(),
            to: creditor.clone(),
            amount,
        });

        creditors[ci].1 = round_money(credit - amount);
        debtors[di].1 = round_money(debt + amount);

        if creditors[ci].1 <= tolerance {
            ci += 1;
        }
        if debtors[di].1.abs() <= tolerance {
            di += 1;
        }
    }

    log::debug!(
        "{} creditors, {} debtors -> {} settlements",
        creditors.len(),
        debtors.len(),
        settlements.len()
    );
    settlements
}

/// Balances as they would stand once every settlement has been paid.
///
/// The payer's `paid` and the receiver's `owes` grow by the settlement
/// amount. Settlements naming unknown participants only affect the known side.
pub fn apply_settlements(
    balances: &[ParticipantBalance],
    settlements: &[Settlement],
) -> Vec<ParticipantBalance> {
    let mut adjusted = balances.to_vec();

    for settlement in settlements {
        for balance in adjusted.iter_mut() {
            if balance.participant_id == settlement.from {
                balance.paid += settlement.amount;
            } else if balance.participant_id == settlement.to {
                balance.owes += settlement.amount;
            } else {
                continue;
            }
            balance.net = round_money(balance.paid - balance.owes);
        }
    }
    adjusted
}

/// A settlement suggestion together with the tolerance it was computed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    settlements: Vec<Settlement>,
    tolerance: Decimal,
}

impl SettlementPlan {
    pub fn from_balances(balances: &[ParticipantBalance], config: &SettlementConfig) -> Self {
        Self {
            settlements: suggest_settlements(balances, config.tolerance),
            tolerance: config.tolerance,
        }
    }

    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.settlements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settlements.is_empty()
    }

    /// Total money moved by the plan.
    pub fn total_transferred(&self) -> Decimal {
        self.settlements.iter().map(|s| s.amount).sum()
    }

    /// Settlements in which `participant` pays or receives.
    pub fn transfers_for<'a>(
        &'a self,
        participant: &'a ParticipantId,
    ) -> impl Iterator<Item = &'a Settlement> + 'a {
        self.settlements
            .iter()
            .filter(move |s| &s.from == participant || &s.to == participant)
    }
}

impl std::fmt::Display for SettlementPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Settlement Plan ===")?;
        writeln!(f, "Transfers:        {}", self.len())?;
        writeln!(f, "Total Moved:      {}", self.total_transferred())?;
        writeln!(f, "Tolerance:        {}", self.tolerance)?;
        if self.is_empty() {
            writeln!(f, "\nEveryone is settled up.")?;
            return Ok(());
        }
        writeln!(f)?;
        for s in &self.settlements {
            writeln!(f, "  {} → {}: {}", s.from, s.to, s.amount)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balances(nets: &[(&str, Decimal)]) -> Vec<ParticipantBalance> {
        nets.iter()
            .map(|(id, net)| ParticipantBalance::from_net(*id, *net))
            .collect()
    }

    fn triples(settlements: &[Settlement]) -> Vec<(&str, &str, Decimal)> {
        settlements
            .iter()
            .map(|s| (s.from.as_str(), s.to.as_str(), s.amount))
            .collect()
    }

    #[test]
    fn test_single_pair() {
        let b = balances(&[("a", dec!(25)), ("b", dec!(-25))]);
        let s = suggest_settlements(&b, DEFAULT_TOLERANCE);
        assert_eq!(triples(&s), vec![("b", "a", dec!(25))]);
    }

    #[test]
    fn test_largest_creditor_meets_largest_debtor() {
        let b = balances(&[
            ("a", dec!(240)),
            ("b", dec!(-40)),
            ("c", dec!(-75)),
            ("d", dec!(-125)),
        ]);
        let s = suggest_settlements(&b, DEFAULT_TOLERANCE);
        assert_eq!(
            triples(&s),
            vec![
                ("d", "a", dec!(125)),
                ("c", "a", dec!(75)),
                ("b", "a", dec!(40)),
            ]
        );
    }

    #[test]
    fn test_both_pointers_advance_together() {
        let b = balances(&[
            ("a", dec!(50)),
            ("b", dec!(30)),
            ("c", dec!(-50)),
            ("d", dec!(-30)),
        ]);
        let s = suggest_settlements(&b, DEFAULT_TOLERANCE);
        assert_eq!(triples(&s), vec![("c", "a", dec!(50)), ("d", "b", dec!(30))]);
    }

    #[test]
    fn test_debtor_split_across_creditors() {
        let b = balances(&[("a", dec!(10)), ("b", dec!(20)), ("c", dec!(-30))]);
        let s = suggest_settlements(&b, DEFAULT_TOLERANCE);
        assert_eq!(triples(&s), vec![("c", "b", dec!(20)), ("c", "a", dec!(10))]);
    }

    #[test]
    fn test_equal_nets_keep_input_order() {
        let b = balances(&[
            ("x", dec!(10)),
            ("y", dec!(10)),
            ("p", dec!(-10)),
            ("q", dec!(-10)),
        ]);
        let s = suggest_settlements(&b, DEFAULT_TOLERANCE);
        assert_eq!(triples(&s), vec![("p", "x", dec!(10)), ("q", "y", dec!(10))]);
    }

    #[test]
    fn test_dust_within_tolerance_is_ignored() {
        let b = balances(&[("a", dec!(0.01)), ("b", dec!(-0.01)), ("c", Decimal::ZERO)]);
        assert!(suggest_settlements(&b, DEFAULT_TOLERANCE).is_empty());
        // With a zero tolerance the cent does move.
        assert_eq!(
            triples(&suggest_settlements(&b, Decimal::ZERO)),
            vec![("b", "a", dec!(0.01))]
        );
    }

    #[test]
    fn test_unbalanced_input_terminates_early() {
        let b = balances(&[("a", dec!(100)), ("b", dec!(-40))]);
        let s = suggest_settlements(&b, DEFAULT_TOLERANCE);
        assert_eq!(triples(&s), vec![("b", "a", dec!(40))]);
    }

    #[test]
    fn test_apply_settlements_zeroes_balances() {
        let b = balances(&[
            ("a", dec!(33.34)),
            ("b", dec!(-16.67)),
            ("c", dec!(-16.67)),
        ]);
        let s = suggest_settlements(&b, DEFAULT_TOLERANCE);
        let settled = apply_settlements(&b, &s);
        assert!(settled.iter().all(|b| b.net.abs() <= DEFAULT_TOLERANCE));
        assert_eq!(settled[1].paid, dec!(16.67));
        assert_eq!(settled[0].owes, dec!(33.34));
    }

    #[test]
    fn test_plan_summary() {
        let b = balances(&[("a", dec!(10)), ("b", dec!(20)), ("c", dec!(-30))]);
        let plan = SettlementPlan::from_balances(&b, &SettlementConfig::default());
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.total_transferred(), dec!(30));
        assert_eq!(plan.tolerance(), DEFAULT_TOLERANCE);
        assert_eq!(plan.transfers_for(&ParticipantId::new("a")).count(), 1);
        assert_eq!(plan.transfers_for(&ParticipantId::new("c")).count(), 2);

        let text = plan.to_string();
        assert!(text.contains("c → b: 20"));
    }

    #[test]
    fn test_empty_plan_display() {
        let plan = SettlementPlan::from_balances(&[], &SettlementConfig::default());
        assert!(plan.is_empty());
        assert!(plan.to_string().contains("settled up"));
    }

    #[test]
    fn test_config_deserializes_with_default_tolerance() {
        let config: SettlementConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SettlementConfig::default());
    }
}
