//! HTTP client for the account portal backend

mod client;
mod error;
mod traits;

pub use client::{ApiClient, DEFAULT_API_ADDRESS};
pub use error::ApiError;
pub use traits::AccountApi;

#[cfg(test)]
pub use traits::MockAccountApi;
