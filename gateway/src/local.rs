//! Offline gateway for development and tests.
//!
//! Orders are minted locally and never leave the process. Signatures use the
//! same scheme as the real provider so callbacks can be produced with [`Local::sign`].

use crate::{gateway::*, signature, Error, Result};
use rand::{distributions::Alphanumeric, Rng};
use std::time::{SystemTime, UNIX_EPOCH};

const ID_LEN: usize = 14;

#[derive(Clone, Debug)]
pub struct Local {
    secret: Vec<u8>,
}

fn rand_id(prefix: &str) -> String {
    let id: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect();
    format!("{}_{}", prefix, id)
}

impl Local {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// signature the provider would hand to the browser
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        signature::sign(&self.secret, order_id, payment_id)
    }

    /// new payment reference
    pub fn payment_id(&self) -> String {
        rand_id("pay")
    }
}

#[async_trait::async_trait]
impl Gateway for Local {
    fn name(&self) -> &str {
        "local"
    }

    async fn create_order(&self, req: OrderRequest) -> Result<Order> {
        if req.amount == 0 {
            return Err(Error::Rejected {
                status: 400,
                code: "BAD_REQUEST_ERROR".to_owned(),
                description: "amount must be greater than zero".to_owned(),
            });
        }
        if req.currency.is_empty() {
            return Err(Error::Rejected {
                status: 400,
                code: "BAD_REQUEST_ERROR".to_owned(),
                description: "currency is required".to_owned(),
            });
        }
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Ok(Order {
            id: rand_id("order"),
            amount: req.amount,
            currency: req.currency,
            receipt: Some(req.receipt),
            status: "created".to_owned(),
            created_at,
        })
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        signature::verify(&self.secret, order_id, payment_id, signature)
    }
}
