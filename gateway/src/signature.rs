//! Callback signatures.
//!
//! The provider signs `order_id|payment_id` with HMAC-SHA256 using the api key
//! secret and hands the lowercase hex digest to the browser.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac(secret: &[u8], order_id: &str, payment_id: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Some(mac)
}

/// Hex encoded signature for the order and payment pair.
pub fn sign(secret: &[u8], order_id: &str, payment_id: &str) -> String {
    mac(secret, order_id, payment_id)
        .map(|m| hex::encode(m.finalize().into_bytes()))
        .unwrap_or_default()
}

/// Constant time check of a hex encoded signature.
pub fn verify(secret: &[u8], order_id: &str, payment_id: &str, signature: &str) -> bool {
    let expected = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    match mac(secret, order_id, payment_id) {
        Some(m) => m.verify_slice(&expected).is_ok(),
        None => false,
    }
}

/// Constant time equality of two shared secrets of any length.
///
/// Both sides are digested under the same key, so timing depends only on the digest.
pub fn secret_eq(expected: &[u8], given: &[u8]) -> bool {
    let digest = |value: &[u8]| {
        HmacSha256::new_from_slice(b"secret_eq").map(|mut m| {
            m.update(value);
            m
        })
    };
    match (digest(expected), digest(given)) {
        (Ok(expected), Ok(given)) => given.verify_slice(&expected.finalize().into_bytes()).is_ok(),
        _ => false,
    }
}
