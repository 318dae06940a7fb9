//! ChargeCustomerHandler - the payment orchestrator.
//!
//! Drives one payment attempt end to end: overpayment pre-check, gateway
//! call, ledger row, reservation state flip, receipt. The ledger row and
//! the state flip share one transaction; the receipt is fire-and-forget.
//!
//! # Failure semantics
//!
//! - Validation failures (missing/zero/over amount) happen before any
//!   money moves and write nothing.
//! - A gateway decline writes a failed ledger row (the audit trail) and
//!   surfaces a user-facing message; gateway error types never escape.
//! - A timeout is an *unknown* outcome: the attempt is reconciled through
//!   the gateway's idempotent lookup before anything is recorded. Only
//!   when the lookup itself fails does the caller see
//!   `GatewayUnknownOutcome`, with no ledger row, so a retry with the
//!   same key reconciles first instead of double-charging.
//! - A storage failure after the gateway confirmed payment is the one
//!   place external money and internal bookkeeping can diverge; it is
//!   logged loudly and surfaced as `LedgerInconsistency`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::billing::{BillingError, ChargeDescription};
use crate::domain::foundation::{ChargeId, Money, ReservationId, Timestamp, UserId};
use crate::domain::ledger::{
    attribute_cart_charges, Charge, PaymentMethod, PaymentTarget,
};
use crate::domain::reservation::ReservationState;
use crate::ports::{
    CartRepository, CatalogRepository, CreateChargeRequest, CreateCustomerRequest,
    CustomerDirectory, GatewayCharge, LedgerRepository, PaymentGateway, PaymentNotifier,
    PaymentReceipt, ReservationRepository,
};

use super::BalanceQuery;

/// Command to take a payment against a reservation or cart.
#[derive(Debug, Clone)]
pub struct ChargeCommand {
    pub target: PaymentTarget,
    pub user_id: UserId,
    pub email: String,
    pub card_token: String,
    pub amount: Money,
}

/// Result of a successful payment.
#[derive(Debug, Clone)]
pub struct ChargeOutcome {
    /// The ledger row that was written.
    pub charge: Charge,

    /// Balance remaining after this payment.
    pub outstanding: Money,

    /// True when this payment settled the balance in full.
    pub settled: bool,
}

/// Handler for taking payments.
pub struct ChargeCustomerHandler {
    balance: Arc<BalanceQuery>,
    reservations: Arc<dyn ReservationRepository>,
    ledger: Arc<dyn LedgerRepository>,
    carts: Arc<dyn CartRepository>,
    catalog: Arc<dyn CatalogRepository>,
    gateway: Arc<dyn PaymentGateway>,
    directory: Arc<dyn CustomerDirectory>,
    notifier: Arc<dyn PaymentNotifier>,
}

impl ChargeCustomerHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        balance: Arc<BalanceQuery>,
        reservations: Arc<dyn ReservationRepository>,
        ledger: Arc<dyn LedgerRepository>,
        carts: Arc<dyn CartRepository>,
        catalog: Arc<dyn CatalogRepository>,
        gateway: Arc<dyn PaymentGateway>,
        directory: Arc<dyn CustomerDirectory>,
        notifier: Arc<dyn PaymentNotifier>,
    ) -> Self {
        Self {
            balance,
            reservations,
            ledger,
            carts,
            catalog,
            gateway,
            directory,
            notifier,
        }
    }

    pub async fn handle(&self, cmd: ChargeCommand) -> Result<ChargeOutcome, BillingError> {
        // 1. Amount sanity, then the overpayment pre-check. Nothing is
        //    written on either failure.
        if !cmd.amount.is_positive() {
            return Err(BillingError::invalid_amount(
                "amount must be more than 0 cents",
            ));
        }
        let owed = self.amount_owed_for_target(cmd.target).await?;
        if cmd.amount.compare(owed)? == std::cmp::Ordering::Greater {
            return Err(BillingError::overpayment_rejected(owed, cmd.amount));
        }

        // 2. The charge id doubles as the gateway idempotency key.
        let charge_id = ChargeId::new();
        let description = self.describe(&cmd).await?;

        // 3. One gateway customer per user, created on first use.
        let customer_id = match self.ensure_customer(&cmd, charge_id).await {
            Ok(id) => id,
            Err(outcome) => return Err(outcome),
        };

        // 4. The gateway attempt.
        let mut metadata = HashMap::new();
        metadata.insert("charge_id".to_string(), charge_id.to_string());
        match cmd.target {
            PaymentTarget::Reservation { reservation_id } => {
                metadata.insert("reservation_id".to_string(), reservation_id.to_string());
            }
            PaymentTarget::Cart { cart_id } => {
                metadata.insert("cart_id".to_string(), cart_id.to_string());
            }
        }

        let attempt = self
            .gateway
            .create_charge(CreateChargeRequest {
                customer_id,
                amount: cmd.amount,
                description: description.for_accounts(),
                metadata,
                idempotency_key: charge_id.idempotency_key(),
            })
            .await;

        let gateway_charge = match attempt {
            Ok(charge) if charge.paid => charge,
            Ok(charge) => {
                self.record_failure(&cmd, charge_id, "charge was not paid", charge.raw)
                    .await?;
                return Err(BillingError::gateway_declined(
                    "the payment was not completed",
                ));
            }
            Err(err) if err.outcome_unknown() => match self.reconcile(charge_id).await? {
                Some(charge) if charge.paid => charge,
                Some(charge) => {
                    self.record_failure(&cmd, charge_id, &err.message(), charge.raw)
                        .await?;
                    return Err(BillingError::gateway_declined(err.message()));
                }
                None => {
                    self.record_failure(
                        &cmd,
                        charge_id,
                        "charge never reached the gateway",
                        serde_json::Value::Null,
                    )
                    .await?;
                    return Err(BillingError::gateway_declined(
                        "the payment did not complete; it is safe to try again",
                    ));
                }
            },
            Err(err) => {
                self.record_failure(&cmd, charge_id, &err.message(), err.raw_response())
                    .await?;
                return Err(BillingError::gateway_declined(err.message()));
            }
        };

        // 5. Trust the gateway's canonical amount over the requested one
        //    (partial authorization).
        let canonical = gateway_charge.amount;
        let outstanding = owed.subtract(canonical)?.max_zero();
        let settled = outstanding.is_zero();

        let comment = description.for_users(canonical, settled);
        let charge = Charge::successful(
            charge_id,
            cmd.target,
            cmd.user_id.clone(),
            canonical,
            PaymentMethod::Card,
            comment.clone(),
            Timestamp::now(),
        )?
        .with_gateway_response(gateway_charge.id.clone(), gateway_charge.raw.clone());

        // 6. Ledger row + state flips in one transaction.
        let states = self.states_after(&cmd, &charge, settled).await?;
        if let Err(err) = self.ledger.append_with_states(&charge, &states).await {
            tracing::error!(
                charge_id = %charge_id,
                gateway_charge = %gateway_charge.id,
                amount = %canonical,
                error = %err,
                "payment succeeded at the gateway but could not be recorded; \
                 manual reconciliation required"
            );
            return Err(BillingError::ledger_inconsistency(err.to_string()));
        }

        // 7. Receipt, fire-and-forget. Failure is logged, never bubbled.
        let notifier = Arc::clone(&self.notifier);
        let receipt = PaymentReceipt {
            user_id: cmd.user_id.clone(),
            email: cmd.email.clone(),
            description: comment,
            amount: canonical,
            outstanding,
        };
        tokio::spawn(async move {
            if let Err(err) = notifier.payment_receipt(receipt).await {
                tracing::warn!(error = %err, "payment receipt delivery failed");
            }
        });

        Ok(ChargeOutcome {
            charge,
            outstanding,
            settled,
        })
    }

    async fn amount_owed_for_target(&self, target: PaymentTarget) -> Result<Money, BillingError> {
        match target {
            PaymentTarget::Reservation { reservation_id } => {
                self.balance.amount_owed(reservation_id).await
            }
            PaymentTarget::Cart { cart_id } => self.balance.amount_owed_for_cart(cart_id).await,
        }
    }

    /// Looks up or creates the gateway customer for the paying user.
    ///
    /// Customer-creation failures are recorded as failed charges, exactly
    /// like a decline; no money has moved at that point.
    async fn ensure_customer(
        &self,
        cmd: &ChargeCommand,
        charge_id: ChargeId,
    ) -> Result<String, BillingError> {
        if let Some(existing) = self.directory.gateway_customer_id(&cmd.user_id).await? {
            return Ok(existing);
        }
        match self
            .gateway
            .create_customer(CreateCustomerRequest {
                user_id: cmd.user_id.clone(),
                email: cmd.email.clone(),
                card_token: cmd.card_token.clone(),
            })
            .await
        {
            Ok(customer) => {
                self.directory
                    .remember_gateway_customer(&cmd.user_id, &customer.id)
                    .await?;
                Ok(customer.id)
            }
            Err(err) => {
                let message = format!("Failed to set up customer - {}", err.message());
                self.record_failure(cmd, charge_id, &message, err.raw_response())
                    .await?;
                Err(BillingError::gateway_declined(err.message()))
            }
        }
    }

    /// Verifies a timed-out attempt through the gateway's idempotent
    /// lookup. `Ok(None)` means the gateway has no record: no money
    /// moved.
    async fn reconcile(&self, charge_id: ChargeId) -> Result<Option<GatewayCharge>, BillingError> {
        match self
            .gateway
            .find_charge(&charge_id.idempotency_key())
            .await
        {
            Ok(found) => Ok(found),
            Err(lookup_err) => {
                tracing::warn!(
                    charge_id = %charge_id,
                    error = %lookup_err,
                    "gateway outcome unknown and reconciliation failed; \
                     surfacing as retry-after-verification"
                );
                Err(BillingError::gateway_unknown_outcome())
            }
        }
    }

    async fn record_failure(
        &self,
        cmd: &ChargeCommand,
        charge_id: ChargeId,
        message: &str,
        raw: serde_json::Value,
    ) -> Result<(), BillingError> {
        let mut failed = Charge::failed(
            charge_id,
            cmd.target,
            cmd.user_id.clone(),
            cmd.amount,
            PaymentMethod::Card,
            message,
            Timestamp::now(),
        )?;
        failed.gateway_response = raw;
        self.ledger.append(&failed).await?;
        Ok(())
    }

    /// The reservation states implied by this charge landing, computed
    /// ahead of the transaction so row and flips commit together.
    async fn states_after(
        &self,
        cmd: &ChargeCommand,
        charge: &Charge,
        settled: bool,
    ) -> Result<Vec<(ReservationId, ReservationState)>, BillingError> {
        match cmd.target {
            PaymentTarget::Reservation { reservation_id } => {
                let state = if settled {
                    ReservationState::Paid
                } else {
                    ReservationState::Instalment
                };
                Ok(vec![(reservation_id, state)])
            }
            PaymentTarget::Cart { cart_id } => {
                // Simulate the attribution with and without the new
                // charge; the difference is what this payment credits
                // each member reservation.
                let items = self.carts.items_for_cart(cart_id).await?;
                let existing = self.ledger.charges_for_cart(cart_id).await?;
                let mut with_new = existing.clone();
                with_new.push(charge.clone());
                let currency = charge.amount.currency();
                let before = attribute_cart_charges(currency, cart_id, &items, &existing)?;
                let after = attribute_cart_charges(currency, cart_id, &items, &with_new)?;

                let mut reservation_ids: Vec<ReservationId> = Vec::new();
                for item in &items {
                    if !reservation_ids.contains(&item.reservation_id) {
                        reservation_ids.push(item.reservation_id);
                    }
                }

                let mut states = Vec::new();
                for reservation_id in reservation_ids {
                    let sheet = self.balance.balance_sheet(reservation_id).await?;
                    let owed_before = sheet.amount_owed()?;
                    let new_credit = after
                        .credited_to(reservation_id)?
                        .subtract(before.credited_to(reservation_id)?)?
                        .max_zero();
                    let owed_after = owed_before.subtract(new_credit)?.max_zero();
                    let state = if owed_after.is_zero() {
                        ReservationState::Paid
                    } else {
                        ReservationState::Instalment
                    };
                    states.push((reservation_id, state));
                }
                Ok(states)
            }
        }
    }

    /// Builds the accounts- and user-facing descriptions for a charge.
    async fn describe(&self, cmd: &ChargeCommand) -> Result<Descriptions, BillingError> {
        match cmd.target {
            PaymentTarget::Reservation { reservation_id } => {
                let reservation = self
                    .reservations
                    .find(reservation_id)
                    .await?
                    .ok_or(BillingError::ReservationNotFound(reservation_id))?;
                let order = self
                    .reservations
                    .active_order(reservation_id)
                    .await?
                    .ok_or_else(|| {
                        BillingError::invariant_violation(format!(
                            "reservation {} has no active order",
                            reservation.membership_number
                        ))
                    })?;
                let catalog = self.catalog.load().await?;
                let tier = catalog.tier(order.tier_id).ok_or_else(|| {
                    BillingError::invariant_violation(format!(
                        "order {} references unknown tier {}",
                        order.id, order.tier_id
                    ))
                })?;
                Ok(Descriptions::Reservation {
                    tier_name: tier.name.as_str().to_string(),
                    membership_number: reservation.membership_number,
                })
            }
            PaymentTarget::Cart { cart_id } => {
                let items = self.carts.items_for_cart(cart_id).await?;
                Ok(Descriptions::Cart {
                    member_count: items.len(),
                })
            }
        }
    }
}

/// Description strings for the two audiences a charge has.
enum Descriptions {
    Reservation {
        tier_name: String,
        membership_number: crate::domain::foundation::MembershipNumber,
    },
    Cart {
        member_count: usize,
    },
}

impl Descriptions {
    fn for_users(&self, amount: Money, settled: bool) -> String {
        match self {
            Descriptions::Reservation {
                tier_name,
                membership_number,
            } => ChargeDescription::new(amount, tier_name, *membership_number, settled)
                .for_users(),
            Descriptions::Cart { member_count } => format!(
                "Cart payment of {} covering {} membership(s)",
                amount, member_count
            ),
        }
    }

    fn for_accounts(&self) -> String {
        match self {
            Descriptions::Reservation {
                tier_name,
                membership_number,
            } => format!("{} membership {}", tier_name, membership_number),
            Descriptions::Cart { member_count } => {
                format!("cart of {} membership(s)", member_count)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryCatalog, InMemoryStore};
    use crate::adapters::notification::RecordingNotifier;
    use crate::adapters::stripe::{ChargeScript, MockPaymentGateway};
    use crate::domain::foundation::{Currency, ReservationId};
    use crate::domain::ledger::ChargeState;
    use crate::ports::NewReservation;

    fn nzd(cents: i64) -> Money {
        Money::new(cents, Currency::Nzd)
    }

    struct Harness {
        handler: ChargeCustomerHandler,
        balance: Arc<BalanceQuery>,
        store: Arc<InMemoryStore>,
        catalog: Arc<InMemoryCatalog>,
        gateway: Arc<MockPaymentGateway>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryStore::new());
        let catalog = Arc::new(InMemoryCatalog::with_default_tiers(
            Timestamp::from_unix_secs(0),
        ));
        let gateway = Arc::new(MockPaymentGateway::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let balance = Arc::new(BalanceQuery::new(
            store.clone(),
            store.clone(),
            catalog.clone(),
            store.clone(),
        ));
        let handler = ChargeCustomerHandler::new(
            balance.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            catalog.clone(),
            gateway.clone(),
            store.clone(),
            notifier.clone(),
        );
        Harness {
            handler,
            balance,
            store,
            catalog,
            gateway,
            notifier,
        }
    }

    async fn reserve(harness: &Harness, tier_name: &str) -> ReservationId {
        let tier = harness.catalog.tier_by_name(tier_name).await.unwrap();
        harness
            .store
            .insert_new(NewReservation {
                tier_id: tier.id,
                user_id: UserId::new("holder").unwrap(),
                initial_state: ReservationState::Instalment,
                membership_number: None,
                contact: None,
                at: Timestamp::from_unix_secs(10),
            })
            .await
            .unwrap()
            .id
    }

    fn command(reservation_id: ReservationId, cents: i64) -> ChargeCommand {
        ChargeCommand {
            target: PaymentTarget::reservation(reservation_id),
            user_id: UserId::new("holder").unwrap(),
            email: "holder@example.com".to_string(),
            card_token: "tok_visa".to_string(),
            amount: nzd(cents),
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Validation
    // ════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn zero_amount_is_rejected_before_anything_happens() {
        let harness = harness();
        let reservation = reserve(&harness, "young_adult").await;

        let result = harness.handler.handle(command(reservation, 0)).await;
        assert!(matches!(result, Err(BillingError::InvalidAmount { .. })));
        assert!(harness.store.all_charges().await.is_empty());
    }

    #[tokio::test]
    async fn overpayment_is_rejected_with_no_charge_rows() {
        let harness = harness();
        // $100-style scenario: supporting tier is $75, pay $150.
        let reservation = reserve(&harness, "supporting").await;

        let result = harness.handler.handle(command(reservation, 150_00)).await;
        assert!(matches!(
            result,
            Err(BillingError::OverpaymentRejected { .. })
        ));
        assert!(harness.store.all_charges().await.is_empty());

        // Balance and state are untouched.
        let owed = harness.balance.amount_owed(reservation).await.unwrap();
        assert_eq!(owed, nzd(75_00));
        let stored = harness.store.find(reservation).await.unwrap().unwrap();
        assert_eq!(stored.state, ReservationState::Instalment);
    }

    // ════════════════════════════════════════════════════════════════
    // Successful payments
    // ════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn full_payment_settles_the_reservation() {
        let harness = harness();
        let reservation = reserve(&harness, "supporting").await;

        let outcome = harness
            .handler
            .handle(command(reservation, 75_00))
            .await
            .unwrap();

        assert!(outcome.settled);
        assert!(outcome.outstanding.is_zero());
        let stored = harness.store.find(reservation).await.unwrap().unwrap();
        assert_eq!(stored.state, ReservationState::Paid);
    }

    #[tokio::test]
    async fn instalments_flip_to_paid_exactly_at_the_full_price() {
        let harness = harness();
        let reservation = reserve(&harness, "young_adult").await; // $225

        for expected_state in [
            ReservationState::Instalment,
            ReservationState::Instalment,
            ReservationState::Instalment,
            ReservationState::Instalment,
        ] {
            let outcome = harness
                .handler
                .handle(command(reservation, 50_00))
                .await
                .unwrap();
            assert!(!outcome.settled);
            let stored = harness.store.find(reservation).await.unwrap().unwrap();
            assert_eq!(stored.state, expected_state);
        }

        // $200 paid; the final $25 settles it.
        let outcome = harness
            .handler
            .handle(command(reservation, 25_00))
            .await
            .unwrap();
        assert!(outcome.settled);
        let stored = harness.store.find(reservation).await.unwrap().unwrap();
        assert_eq!(stored.state, ReservationState::Paid);
    }

    #[tokio::test]
    async fn gateway_canonical_amount_is_trusted_over_requested() {
        let harness = harness();
        let reservation = reserve(&harness, "young_adult").await;
        harness
            .gateway
            .script(ChargeScript::SucceedWith(nzd(40_00)));

        let outcome = harness
            .handler
            .handle(command(reservation, 50_00))
            .await
            .unwrap();

        assert_eq!(outcome.charge.amount, nzd(40_00));
        let owed = harness.balance.amount_owed(reservation).await.unwrap();
        assert_eq!(owed, nzd(185_00));
    }

    #[tokio::test]
    async fn receipt_is_sent_after_success() {
        let harness = harness();
        let reservation = reserve(&harness, "supporting").await;

        harness
            .handler
            .handle(command(reservation, 75_00))
            .await
            .unwrap();

        // The receipt is spawned; give it a beat to land.
        let mut receipts = harness.notifier.receipts().await;
        for _ in 0..50 {
            if !receipts.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            receipts = harness.notifier.receipts().await;
        }
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].amount, nzd(75_00));
        assert!(receipts[0].outstanding.is_zero());
    }

    #[tokio::test]
    async fn gateway_customer_is_created_once_and_reused() {
        let harness = harness();
        let reservation = reserve(&harness, "young_adult").await;

        harness
            .handler
            .handle(command(reservation, 50_00))
            .await
            .unwrap();
        harness
            .handler
            .handle(command(reservation, 50_00))
            .await
            .unwrap();

        let stored = harness
            .store
            .gateway_customer_id(&UserId::new("holder").unwrap())
            .await
            .unwrap();
        assert_eq!(stored.as_deref(), Some("cus_holder"));
    }

    // ════════════════════════════════════════════════════════════════
    // Failures
    // ════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn decline_records_failed_charge_and_leaves_state_alone() {
        let harness = harness();
        let reservation = reserve(&harness, "young_adult").await;
        harness
            .gateway
            .script(ChargeScript::Decline("insufficient funds".to_string()));

        let result = harness.handler.handle(command(reservation, 50_00)).await;
        assert!(matches!(
            result,
            Err(BillingError::GatewayDeclined { .. })
        ));

        let charges = harness.store.all_charges().await;
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].state, ChargeState::Failed);
        assert!(charges[0].comment.contains("insufficient funds"));

        // Failed charges never count toward the balance.
        let owed = harness.balance.amount_owed(reservation).await.unwrap();
        assert_eq!(owed, nzd(225_00));
        let stored = harness.store.find(reservation).await.unwrap().unwrap();
        assert_eq!(stored.state, ReservationState::Instalment);
    }

    #[tokio::test]
    async fn timeout_with_completed_charge_reconciles_to_one_successful_row() {
        let harness = harness();
        let reservation = reserve(&harness, "young_adult").await;
        harness.gateway.script(ChargeScript::TimeoutThenComplete);

        let outcome = harness
            .handler
            .handle(command(reservation, 50_00))
            .await
            .unwrap();

        assert_eq!(outcome.charge.state, ChargeState::Successful);
        let charges = harness.store.all_charges().await;
        assert_eq!(charges.len(), 1);
        assert_eq!(harness.gateway.recorded_charge_count(), 1);
        let owed = harness.balance.amount_owed(reservation).await.unwrap();
        assert_eq!(owed, nzd(175_00));
    }

    #[tokio::test]
    async fn timeout_with_vanished_charge_records_failure() {
        let harness = harness();
        let reservation = reserve(&harness, "young_adult").await;
        harness.gateway.script(ChargeScript::TimeoutVanish);

        let result = harness.handler.handle(command(reservation, 50_00)).await;
        assert!(matches!(
            result,
            Err(BillingError::GatewayDeclined { .. })
        ));

        let charges = harness.store.all_charges().await;
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].state, ChargeState::Failed);
        let owed = harness.balance.amount_owed(reservation).await.unwrap();
        assert_eq!(owed, nzd(225_00));
    }

    #[tokio::test]
    async fn timeout_with_failed_lookup_surfaces_unknown_outcome_and_writes_nothing() {
        let harness = harness();
        let reservation = reserve(&harness, "young_adult").await;
        harness.gateway.script(ChargeScript::TimeoutVanish);
        harness.gateway.fail_lookup();

        let result = harness.handler.handle(command(reservation, 50_00)).await;
        assert!(matches!(result, Err(BillingError::GatewayUnknownOutcome)));
        assert!(harness.store.all_charges().await.is_empty());
    }

    #[tokio::test]
    async fn customer_creation_failure_records_failed_charge() {
        let harness = harness();
        let reservation = reserve(&harness, "young_adult").await;
        harness.gateway.fail_customer_creation();

        let result = harness.handler.handle(command(reservation, 50_00)).await;
        assert!(matches!(
            result,
            Err(BillingError::GatewayDeclined { .. })
        ));

        let charges = harness.store.all_charges().await;
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].state, ChargeState::Failed);
        assert!(charges[0].comment.contains("Failed to set up customer"));
    }
}
