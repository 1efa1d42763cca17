//! `SerpAPI` Google News client for recent company coverage.

pub mod client;
pub mod error;
pub mod types;

pub use client::SerpApiClient;
pub use error::NewsError;
