//! UpgradeMembershipHandler - moves a reservation to a higher tier.
//!
//! Validates the upgrade path against the catalog, snapshots the
//! proration baseline *before* touching the order history, then applies
//! the order swap, the baseline and the recomputed payment state as one
//! atomic tier change.
//!
//! # Ordering
//!
//! The baseline snapshot must happen strictly before the order swap: the
//! baseline is "the tier that was settled in full at the moment the
//! upgrade happened", and after the swap that tier is no longer the
//! current one.

use std::sync::Arc;

use crate::domain::billing::BalanceSheet;
use crate::domain::catalog::MembershipTier;
use crate::domain::foundation::{Money, ReservationId, TierId, Timestamp};
use crate::domain::reservation::{Order, Reservation, ReservationError, ReservationState};
use crate::ports::{AuditLog, CatalogRepository, ReservationRepository, TierChange};

use super::super::billing::BalanceQuery;

/// Command to upgrade a reservation to another tier.
#[derive(Debug, Clone)]
pub struct UpgradeMembershipCommand {
    pub reservation_id: ReservationId,
    pub to_tier: TierId,

    /// Support operator applying the change, for the audit trail.
    pub audit_actor: Option<String>,
}

/// Result of a successful upgrade.
#[derive(Debug, Clone)]
pub struct UpgradeOutcome {
    /// The newly opened order.
    pub order: Order,

    /// Payment state after the upgrade.
    pub state: ReservationState,

    /// Amount owed after the upgrade.
    pub amount_owed: Money,
}

/// Handler for membership upgrades.
pub struct UpgradeMembershipHandler {
    balance: Arc<BalanceQuery>,
    reservations: Arc<dyn ReservationRepository>,
    catalog: Arc<dyn CatalogRepository>,
    audit: Arc<dyn AuditLog>,
}

impl UpgradeMembershipHandler {
    pub fn new(
        balance: Arc<BalanceQuery>,
        reservations: Arc<dyn ReservationRepository>,
        catalog: Arc<dyn CatalogRepository>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            balance,
            reservations,
            catalog,
            audit,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpgradeMembershipCommand,
    ) -> Result<UpgradeOutcome, ReservationError> {
        let now = Timestamp::now();

        // 1. Load the reservation, its active order and both tiers.
        let reservation = self
            .reservations
            .find(cmd.reservation_id)
            .await?
            .ok_or(ReservationError::NotFound(cmd.reservation_id))?;
        let order = self
            .reservations
            .active_order(cmd.reservation_id)
            .await?
            .ok_or_else(|| {
                ReservationError::invariant_violation(format!(
                    "reservation {} has no active order",
                    reservation.membership_number
                ))
            })?;
        let catalog = self.catalog.load().await?;
        let current = catalog.tier(order.tier_id).ok_or_else(|| {
            ReservationError::invariant_violation(format!(
                "order {} references unknown tier {}",
                order.id, order.tier_id
            ))
        })?;
        let target = catalog
            .tier(cmd.to_tier)
            .ok_or_else(|| ReservationError::unknown_tier(cmd.to_tier.to_string()))?;

        // 2. The catalog defines which upgrades exist: a different name
        //    at an equal-or-higher price.
        let offers = catalog
            .upgrade_offers_from(current, now)
            .map_err(|e| ReservationError::invariant_violation(e.to_string()))?;
        if !offers.iter().any(|o| o.to_tier.id == target.id) {
            return Err(ReservationError::no_upgrade_path(
                current.name.as_str(),
                target.name.as_str(),
            ));
        }

        // 3. Baseline snapshot, against the pre-upgrade tier.
        let sheet = self
            .balance
            .balance_sheet(cmd.reservation_id)
            .await
            .map_err(|e| ReservationError::infrastructure(e.to_string()))?;
        let owed = sheet
            .amount_owed()
            .map_err(|e| ReservationError::infrastructure(e.to_string()))?;
        let record_fully_paid_tier = if owed.is_zero() {
            baseline_after_settling(&catalog, &reservation, current)
        } else {
            None
        };

        // 4. Audit note, best-effort.
        if let Some(actor) = &cmd.audit_actor {
            if let Ok(Some(claim)) = self.reservations.active_claim(cmd.reservation_id).await {
                let note = format!(
                    "{} set membership for {} from {} to {}",
                    actor, reservation.membership_number, current.name, target.name
                );
                if let Err(err) = self.audit.record_note(&claim.user_id, &note).await {
                    tracing::warn!(error = %err, "audit note for upgrade failed");
                }
            }
        }

        // 5. The post-swap state, computed analytically so the whole
        //    change commits in one transaction.
        let effective_baseline =
            record_fully_paid_tier.or(reservation.last_fully_paid_tier);
        let proration_since = if record_fully_paid_tier.is_some() {
            now
        } else {
            reservation.last_fully_paid_at.unwrap_or(now)
        };
        let new_sheet = BalanceSheet {
            effective_price: effective_new_price(&catalog, &reservation, target),
            proration_baseline: baseline_price(&catalog, effective_baseline, target),
            proration_since,
            direct_charges: sheet.direct_charges.clone(),
            cart_credits: sheet.cart_credits.clone(),
        };
        let new_owed = new_sheet
            .amount_owed()
            .map_err(|e| ReservationError::infrastructure(e.to_string()))?;
        let new_state = if new_owed.is_zero() {
            ReservationState::Paid
        } else {
            ReservationState::Instalment
        };

        // 6. Atomic: close old order, open new one, persist baseline and
        //    state together.
        let new_order = self
            .reservations
            .apply_tier_change(
                cmd.reservation_id,
                TierChange {
                    new_tier_id: target.id,
                    record_fully_paid_tier,
                    new_state,
                    at: now,
                },
            )
            .await?;

        Ok(UpgradeOutcome {
            order: new_order,
            state: new_state,
            amount_owed: new_owed,
        })
    }
}

/// The baseline to record now that `settled` is fully paid: moves forward
/// only, never to a cheaper tier than an already-recorded baseline.
fn baseline_after_settling(
    catalog: &crate::domain::catalog::MembershipCatalog,
    reservation: &Reservation,
    settled: &MembershipTier,
) -> Option<TierId> {
    match reservation
        .last_fully_paid_tier
        .and_then(|id| catalog.tier(id))
    {
        Some(existing) => {
            let keep_existing = matches!(
                settled.price.compare(existing.price),
                Ok(std::cmp::Ordering::Less)
            );
            if keep_existing {
                None
            } else {
                Some(settled.id)
            }
        }
        None => Some(settled.id),
    }
}

/// Price of the target tier, honoring a price lock.
fn effective_new_price(
    catalog: &crate::domain::catalog::MembershipCatalog,
    reservation: &Reservation,
    target: &MembershipTier,
) -> Money {
    if let Some(lock) = reservation.price_lock_date {
        if let Some(locked) = catalog.active_at(&target.name, lock) {
            return locked.price;
        }
    }
    target.price
}

/// Price of the baseline tier when it differs from the target.
fn baseline_price(
    catalog: &crate::domain::catalog::MembershipCatalog,
    baseline: Option<TierId>,
    target: &MembershipTier,
) -> Option<Money> {
    let id = baseline?;
    if id == target.id {
        return None;
    }
    catalog.tier(id).map(|t| t.price)
}
