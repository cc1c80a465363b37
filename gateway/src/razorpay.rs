//! Razorpay orders api v1

use crate::{gateway::*, signature, Error, Result};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_URL: &str = "https://api.razorpay.com";

#[derive(Clone, Debug)]
pub struct Razorpay {
    client: reqwest::Client,
    url: String,
    key_id: String,
    key_secret: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorDetail {
    code: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error: ErrorDetail,
}

fn rejected(status: u16, body: &[u8]) -> Error {
    let detail = serde_json::from_slice::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_default();
    let description = if detail.description.is_empty() {
        String::from_utf8_lossy(body).into_owned()
    } else {
        detail.description
    };
    Error::Rejected {
        status,
        code: detail.code,
        description,
    }
}

impl Razorpay {
    pub fn new(
        url: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let key_id = key_id.into();
        let key_secret = key_secret.into();
        if key_id.is_empty() || key_secret.is_empty() {
            return Err(Error::Invalid("razorpay key id and secret required".to_owned()));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let mut url = url.into();
        if url.is_empty() {
            url = DEFAULT_URL.to_owned();
        }
        Ok(Self {
            client: builder.build()?,
            url: url.trim_end_matches('/').to_owned(),
            key_id,
            key_secret,
        })
    }

    fn orders_url(&self) -> String {
        format!("{}/v1/orders", self.url)
    }
}

#[async_trait::async_trait]
impl Gateway for Razorpay {
    fn name(&self) -> &str {
        "razorpay"
    }

    async fn create_order(&self, req: OrderRequest) -> Result<Order> {
        let res = self
            .client
            .post(self.orders_url())
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&req)
            .send()
            .await?;
        let status = res.status();
        let body = res.bytes().await?;
        if status.is_success() {
            Ok(serde_json::from_slice(&body)?)
        } else {
            Err(rejected(status.as_u16(), &body))
        }
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        signature::verify(self.key_secret.as_bytes(), order_id, payment_id, signature)
    }
}
