pub mod client;
pub mod error;
pub mod types;

pub use client::{API_URL, ShomClient, TideApi};
pub use error::ApiError;
pub use types::{JobAccepted, StatusResponse};
