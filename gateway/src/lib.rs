#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid: {0}")]
    Invalid(String),
    #[error("gateway rejected the request ({status}): {description}")]
    Rejected {
        status: u16,
        code: String,
        description: String,
    },
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

pub mod gateway;
pub use gateway::{Gateway, Order, OrderRequest};

pub mod razorpay;
pub use razorpay::Razorpay;

pub mod local;
pub use local::Local;

pub mod signature;
