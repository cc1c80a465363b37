use crate::Result;
use serde::{Deserialize, Serialize};

/// Create order request, `amount` in the currency's minor unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderRequest {
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
}

/// Order descriptor returned by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: u64,
}

/// the payment gateway trait for multiple providers
#[async_trait::async_trait]
pub trait Gateway {
    /// provider name, recorded in logs
    fn name(&self) -> &str;

    /// open a new order at the provider
    async fn create_order(&self, req: OrderRequest) -> Result<Order>;

    /// check a client relayed callback signature in constant time
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
}
