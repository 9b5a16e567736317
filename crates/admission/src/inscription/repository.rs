use serde::Serialize;

use super::domain::{Determination, Proposition, PropositionId, PropositionStatus};
use crate::calendar::AcademicCalendarType;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait PropositionRepository: Send + Sync {
    fn fetch(&self, id: &PropositionId) -> Result<Option<Proposition>, RepositoryError>;
    fn update(&self, proposition: Proposition) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository and translator failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized representation of a proposition returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct PropositionStatusView {
    pub uuid: PropositionId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<AcademicCalendarType>,
}

impl PropositionStatusView {
    pub fn from_proposition(proposition: &Proposition) -> Self {
        Self {
            uuid: proposition.id.clone(),
            status: proposition.status.label(),
            year: proposition.computed_year,
            pool: proposition.computed_pool,
        }
    }
}

impl Proposition {
    /// Store the computed year and pool; returns whether anything changed.
    pub fn record_determination(&mut self, determination: Determination) -> bool {
        let changed = self.computed_year != Some(determination.year)
            || self.computed_pool != Some(determination.pool);
        self.computed_year = Some(determination.year);
        self.computed_pool = Some(determination.pool);
        changed
    }

    /// Record the verified determination and move to `Submitted`.
    pub fn mark_submitted(&mut self, determination: Determination) {
        self.record_determination(determination);
        self.status = PropositionStatus::Submitted;
    }
}
