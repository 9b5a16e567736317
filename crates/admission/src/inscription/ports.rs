//! Read services consumed by the resolver and the confirmation elements.

use chrono::NaiveDate;

use super::domain::{
    AccessTitles, Coordinates, Identification, InstitutionChanges, Period, Training,
    TrainingIdentity,
};
use super::repository::RepositoryError;
use crate::calendar::{CalculationYears, OpenPools, TrainingType};

/// Candidate profile sections owned by the personal data context.
pub trait CandidateProfileTranslator: Send + Sync {
    fn identification(&self, candidate_id: &str) -> Result<Identification, RepositoryError>;
    fn coordinates(&self, candidate_id: &str) -> Result<Coordinates, RepositoryError>;
    /// Access conditions met by the curriculum, for the given training type.
    fn access_titles(
        &self,
        candidate_id: &str,
        training_type: TrainingType,
    ) -> Result<AccessTitles, RepositoryError>;
    fn institution_changes(
        &self,
        candidate_id: &str,
        years: &[i32],
    ) -> Result<InstitutionChanges, RepositoryError>;
    /// Secondary studies completed in the French-speaking Belgian community.
    fn has_french_speaking_belgian_secondary_studies(
        &self,
        candidate_id: &str,
    ) -> Result<bool, RepositoryError>;
}

/// Training catalogue lookups.
pub trait TrainingTranslator: Send + Sync {
    fn get(&self, id: &TrainingIdentity) -> Result<Training, RepositoryError>;
    fn exists(&self, acronym: &str, year: i32) -> Result<bool, RepositoryError>;
}

/// Snapshot of the academic calendar as seen by one resolution.
pub trait EnrollmentCalendar: Send + Sync {
    fn today(&self) -> NaiveDate;
    fn open_pools(&self) -> OpenPools;
    fn years_for_calculation(&self, training_type: TrainingType) -> CalculationYears;
    fn medicine_dentistry_period(&self) -> Option<Period>;
}
