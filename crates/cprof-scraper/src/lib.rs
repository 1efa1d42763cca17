pub mod client;
pub mod error;
pub mod parse;

pub use client::SiteClient;
pub use error::ScraperError;
pub use parse::parse_page;
