//! Scriptable mock payment gateway.
//!
//! Used by handler tests and local development. Each charge attempt
//! consumes the next scripted behavior (defaulting to success), and
//! completed attempts are recorded by idempotency key so the
//! reconciliation path can be exercised exactly like the real gateway's
//! charge search.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::Money;
use crate::ports::{
    CreateChargeRequest, CreateCustomerRequest, GatewayCharge, GatewayCustomer, GatewayError,
    PaymentGateway,
};

/// Behavior of one scripted charge attempt.
#[derive(Debug, Clone)]
pub enum ChargeScript {
    /// Charge succeeds at the requested amount.
    Succeed,

    /// Charge succeeds, but the gateway authorizes a different canonical
    /// amount (partial authorization).
    SucceedWith(Money),

    /// Card declined; nothing recorded.
    Decline(String),

    /// The call times out, but the charge actually completed; a
    /// reconciliation lookup will find it.
    TimeoutThenComplete,

    /// The call times out and the charge never happened; a lookup finds
    /// nothing.
    TimeoutVanish,

    /// Connection drops mid-flight; nothing recorded.
    NetworkError,
}

#[derive(Default)]
struct State {
    scripts: VecDeque<ChargeScript>,
    recorded: HashMap<String, GatewayCharge>,
    fail_customer_creation: bool,
    fail_lookup: bool,
}

/// Mock implementation of the `PaymentGateway` port.
#[derive(Default)]
pub struct MockPaymentGateway {
    state: Mutex<State>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a behavior for the next charge attempt.
    pub fn script(&self, behavior: ChargeScript) {
        self.state.lock().unwrap().scripts.push_back(behavior);
    }

    /// Makes customer creation fail.
    pub fn fail_customer_creation(&self) {
        self.state.lock().unwrap().fail_customer_creation = true;
    }

    /// Makes reconciliation lookups fail.
    pub fn fail_lookup(&self) {
        self.state.lock().unwrap().fail_lookup = true;
    }

    /// Number of completed charges the gateway has recorded.
    pub fn recorded_charge_count(&self) -> usize {
        self.state.lock().unwrap().recorded.len()
    }

    fn record(state: &mut State, request: &CreateChargeRequest, amount: Money) -> GatewayCharge {
        let charge = GatewayCharge {
            id: format!("ch_{}", state.recorded.len() + 1),
            amount,
            paid: true,
            description: request.description.clone(),
            raw: serde_json::json!({
                "id": format!("ch_{}", state.recorded.len() + 1),
                "amount": amount.minor_units(),
                "paid": true,
                "description": request.description,
            }),
        };
        state
            .recorded
            .insert(request.idempotency_key.clone(), charge.clone());
        charge
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<GatewayCustomer, GatewayError> {
        let state = self.state.lock().unwrap();
        if state.fail_customer_creation {
            return Err(GatewayError::Api {
                message: "customer creation failed".to_string(),
            });
        }
        Ok(GatewayCustomer {
            id: format!("cus_{}", request.user_id),
            email: request.email,
        })
    }

    async fn create_charge(
        &self,
        request: CreateChargeRequest,
    ) -> Result<GatewayCharge, GatewayError> {
        let mut state = self.state.lock().unwrap();

        // An idempotent replay of a completed attempt returns the
        // original charge, like the real gateway would.
        if let Some(existing) = state.recorded.get(&request.idempotency_key) {
            return Ok(existing.clone());
        }

        let behavior = state.scripts.pop_front().unwrap_or(ChargeScript::Succeed);
        match behavior {
            ChargeScript::Succeed => Ok(Self::record(&mut state, &request, request.amount)),
            ChargeScript::SucceedWith(amount) => Ok(Self::record(&mut state, &request, amount)),
            ChargeScript::Decline(message) => Err(GatewayError::Declined {
                message,
                decline_code: Some("card_declined".to_string()),
                raw: serde_json::json!({"error": {"type": "card_error"}}),
            }),
            ChargeScript::TimeoutThenComplete => {
                Self::record(&mut state, &request, request.amount);
                Err(GatewayError::Timeout)
            }
            ChargeScript::TimeoutVanish => Err(GatewayError::Timeout),
            ChargeScript::NetworkError => Err(GatewayError::network("connection reset")),
        }
    }

    async fn find_charge(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<GatewayCharge>, GatewayError> {
        let state = self.state.lock().unwrap();
        if state.fail_lookup {
            return Err(GatewayError::network("lookup unavailable"));
        }
        Ok(state.recorded.get(idempotency_key).cloned())
    }
}
