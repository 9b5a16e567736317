use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use super::confirmation::{self, ConfirmationElement};
use super::domain::{
    AccessTitles, Determination, Proposition, PropositionId, PropositionStatus, Training,
};
use super::errors::{AdmissionError, InscriptionError, MultipleBusinessErrors};
use super::ports::{CandidateProfileTranslator, EnrollmentCalendar, TrainingTranslator};
use super::repository::{PropositionRepository, RepositoryError};
use super::resolver::{PoolQuery, PoolResolver, SubmittedChoice};
use crate::calendar::AcademicCalendarType;

/// Final submission payload: the year/pool shown to the candidate and their acknowledgements.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionRequest {
    pub year: i32,
    pub pool: AcademicCalendarType,
    #[serde(default)]
    pub elements: BTreeMap<String, String>,
}

/// Service composing the resolver, the confirmation elements and the read services.
pub struct AdmissionService<R, P, T, C> {
    repository: Arc<R>,
    profiles: Arc<P>,
    trainings: Arc<T>,
    calendar: Arc<C>,
    resolver: Arc<PoolResolver>,
}

struct Loaded {
    proposition: Proposition,
    training: Training,
    access_titles: AccessTitles,
}

impl Loaded {
    fn query(&self) -> PoolQuery<'_> {
        PoolQuery {
            training_id: &self.proposition.training,
            candidate_id: &self.proposition.candidate_id,
            access_titles: &self.access_titles,
            training: &self.training,
            proposition: Some(&self.proposition),
        }
    }
}

impl<R, P, T, C> AdmissionService<R, P, T, C>
where
    R: PropositionRepository + 'static,
    P: CandidateProfileTranslator + 'static,
    T: TrainingTranslator + 'static,
    C: EnrollmentCalendar + 'static,
{
    pub fn new(
        repository: Arc<R>,
        profiles: Arc<P>,
        trainings: Arc<T>,
        calendar: Arc<C>,
        resolver: PoolResolver,
    ) -> Self {
        Self {
            repository,
            profiles,
            trainings,
            calendar,
            resolver: Arc::new(resolver),
        }
    }

    pub fn resolver(&self) -> &PoolResolver {
        &self.resolver
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Current (year, pool) for a proposition, recorded on it while in progress.
    pub fn determine(&self, id: &PropositionId) -> Result<Determination, AdmissionServiceError> {
        let loaded = self.load(id)?;
        let determination = self.resolver.determine_year_and_pool(
            &loaded.query(),
            self.profiles.as_ref(),
            self.calendar.as_ref(),
        )?;

        let mut proposition = loaded.proposition;
        if proposition.status == PropositionStatus::InProgress
            && proposition.record_determination(determination)
        {
            self.repository.update(proposition)?;
        }
        Ok(determination)
    }

    pub fn verify(
        &self,
        id: &PropositionId,
        submitted: SubmittedChoice,
    ) -> Result<Determination, AdmissionServiceError> {
        let loaded = self.load(id)?;
        self.verify_loaded(&loaded, submitted)
    }

    pub fn confirmation_elements(
        &self,
        id: &PropositionId,
        submitted_year: Option<i32>,
    ) -> Result<Vec<ConfirmationElement>, AdmissionServiceError> {
        let proposition = self.fetch(id)?;
        let elements = confirmation::retrieve(
            &proposition,
            self.trainings.as_ref(),
            self.profiles.as_ref(),
            submitted_year,
        )?;
        Ok(elements)
    }

    pub fn validate_confirmation(
        &self,
        id: &PropositionId,
        submitted_year: Option<i32>,
        answers: &BTreeMap<String, String>,
    ) -> Result<(), AdmissionServiceError> {
        let proposition = self.fetch(id)?;
        confirmation::validate(
            answers,
            &proposition,
            submitted_year,
            self.trainings.as_ref(),
            self.profiles.as_ref(),
        )?;
        Ok(())
    }

    /// All missing prerequisites at once.
    pub fn prerequisites(&self, id: &PropositionId) -> Result<(), AdmissionServiceError> {
        let loaded = self.load(id)?;
        self.resolver
            .prerequisite_errors(&loaded.query(), self.profiles.as_ref(), self.calendar.as_ref())?
            .into_result()?;
        Ok(())
    }

    /// Verify, validate the acknowledgements, then persist the determination.
    pub fn submit(
        &self,
        id: &PropositionId,
        request: SubmissionRequest,
    ) -> Result<Proposition, AdmissionServiceError> {
        match self.submit_inner(id, request) {
            Ok(proposition) => {
                info!(
                    proposition = %id.0,
                    year = ?proposition.computed_year,
                    pool = ?proposition.computed_pool,
                    "proposition submitted"
                );
                Ok(proposition)
            }
            Err(error) => {
                warn!(proposition = %id.0, code = error.code(), %error, "submission rejected");
                Err(error)
            }
        }
    }

    fn submit_inner(
        &self,
        id: &PropositionId,
        request: SubmissionRequest,
    ) -> Result<Proposition, AdmissionServiceError> {
        let loaded = self.load(id)?;
        if loaded.proposition.status != PropositionStatus::InProgress {
            return Err(AdmissionServiceError::NotSubmittable(id.clone()));
        }

        self.resolver
            .prerequisite_errors(&loaded.query(), self.profiles.as_ref(), self.calendar.as_ref())?
            .into_result()?;

        let determination = self.verify_loaded(
            &loaded,
            SubmittedChoice {
                year: Some(request.year),
                pool: Some(request.pool),
            },
        )?;

        let mut proposition = loaded.proposition;
        proposition.record_determination(determination);
        confirmation::validate(
            &request.elements,
            &proposition,
            Some(request.year),
            self.trainings.as_ref(),
            self.profiles.as_ref(),
        )?;

        proposition.mark_submitted(determination);
        self.repository.update(proposition.clone())?;
        Ok(proposition)
    }

    fn verify_loaded(
        &self,
        loaded: &Loaded,
        submitted: SubmittedChoice,
    ) -> Result<Determination, AdmissionServiceError> {
        let determination = self.resolver.verify(
            &loaded.query(),
            self.profiles.as_ref(),
            self.trainings.as_ref(),
            self.calendar.as_ref(),
            submitted,
        )?;
        Ok(determination)
    }

    fn fetch(&self, id: &PropositionId) -> Result<Proposition, AdmissionServiceError> {
        let proposition = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(proposition)
    }

    fn load(&self, id: &PropositionId) -> Result<Loaded, AdmissionServiceError> {
        let proposition = self.fetch(id)?;
        let training = self.trainings.get(&proposition.training)?;
        let access_titles = self
            .profiles
            .access_titles(&proposition.candidate_id, training.training_type)?;
        Ok(Loaded {
            proposition,
            training,
            access_titles,
        })
    }
}

/// Error raised by the admission service.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionServiceError {
    #[error(transparent)]
    Business(#[from] AdmissionError),
    #[error(transparent)]
    Multiple(#[from] MultipleBusinessErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("proposition {0} can no longer be submitted")]
    NotSubmittable(PropositionId),
}

impl AdmissionServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            AdmissionServiceError::Business(err) => err.code(),
            AdmissionServiceError::Multiple(_) => "MULTIPLE",
            AdmissionServiceError::Repository(_) => "REPOSITORY",
            AdmissionServiceError::NotSubmittable(_) => "NOT_SUBMITTABLE",
        }
    }
}

impl From<InscriptionError> for AdmissionServiceError {
    fn from(value: InscriptionError) -> Self {
        match value {
            InscriptionError::Business(err) => Self::Business(err),
            InscriptionError::Repository(err) => Self::Repository(err),
        }
    }
}
