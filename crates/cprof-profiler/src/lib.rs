//! Company profile pipeline: check the store, scrape, fetch news, generate
//! insights, persist.

pub mod adapters;
pub mod error;
pub mod pipeline;
pub mod traits;
pub mod types;

pub use adapters::{PgProfileStore, SitePageSource};
pub use error::ProfileError;
pub use pipeline::{assemble_profile, Profiler};
pub use traits::{InsightSource, NewsSource, PageSource, ProfileStore};
pub use types::{ProfileRun, RunStatus, Step, StepFailure};
