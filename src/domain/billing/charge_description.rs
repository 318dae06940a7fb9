//! Human-readable descriptions of charges.
//!
//! The same payment is described twice: once for the holder's receipt and
//! ledger comment, once for the accountants' view in the gateway
//! dashboard.

use crate::domain::foundation::{MembershipNumber, Money};

/// Builds the user- and accounts-facing strings for one charge.
#[derive(Debug, Clone)]
pub struct ChargeDescription {
    amount: Money,
    tier_name: String,
    membership_number: MembershipNumber,

    /// Whether this payment settles the balance in full.
    settles_balance: bool,
}

impl ChargeDescription {
    pub fn new(
        amount: Money,
        tier_name: impl Into<String>,
        membership_number: MembershipNumber,
        settles_balance: bool,
    ) -> Self {
        Self {
            amount,
            tier_name: tier_name.into(),
            membership_number,
            settles_balance,
        }
    }

    /// Receipt and ledger-comment wording.
    pub fn for_users(&self) -> String {
        let kind = if self.settles_balance {
            "Fully paid"
        } else {
            "Instalment"
        };
        format!(
            "{} payment of {} for {} membership {}",
            kind, self.amount, self.tier_name, self.membership_number
        )
    }

    /// Gateway-dashboard wording.
    pub fn for_accounts(&self) -> String {
        format!(
            "{} membership {}",
            self.tier_name, self.membership_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Currency, Money};

    #[test]
    fn instalment_wording_for_partial_payment() {
        let description = ChargeDescription::new(
            Money::new(50_00, Currency::Nzd),
            "adult",
            MembershipNumber::new(105),
            false,
        );
        assert_eq!(
            description.for_users(),
            "Instalment payment of $50.00 NZD for adult membership #105"
        );
    }

    #[test]
    fn settled_wording_for_final_payment() {
        let description = ChargeDescription::new(
            Money::new(225_00, Currency::Nzd),
            "young_adult",
            MembershipNumber::new(100),
            true,
        );
        assert!(description.for_users().starts_with("Fully paid payment"));
    }

    #[test]
    fn accounts_wording_omits_amount() {
        let description = ChargeDescription::new(
            Money::new(50_00, Currency::Nzd),
            "adult",
            MembershipNumber::new(105),
            false,
        );
        assert_eq!(description.for_accounts(), "adult membership #105");
    }
}
