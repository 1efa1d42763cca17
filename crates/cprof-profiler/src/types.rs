use std::fmt;

use cprof_core::CompanyProfile;
use serde::Serialize;

/// Whether the run produced a new profile or found a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Created,
    Exists,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Exists => write!(f, "exists"),
        }
    }
}

/// Pipeline steps whose failures are absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Scrape,
    News,
    Insights,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scrape => write!(f, "scrape"),
            Self::News => write!(f, "news"),
            Self::Insights => write!(f, "insights"),
        }
    }
}

/// A step that failed and was replaced by an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub step: Step,
    pub error: String,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileRun {
    pub status: RunStatus,
    pub profile: CompanyProfile,
    /// Diagnostics only; empty for `Exists` runs.
    pub degraded: Vec<StepFailure>,
}

impl ProfileRun {
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.degraded.is_empty()
    }
}
