pub mod donation;
pub mod user;
