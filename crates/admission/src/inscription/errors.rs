use chrono::NaiveDate;
use serde::Serialize;

use super::repository::RepositoryError;
use crate::calendar::AcademicCalendarType;

/// How the caller is expected to react to a business error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The candidate can fix it by completing their file.
    IncompletePrerequisite,
    /// Terminal for the current request.
    PolicyViolation,
    /// Client and server disagree; reload and resubmit.
    Consistency,
    /// Configuration left a candidate without any pool.
    InvariantViolation,
}

/// Business errors raised while determining or verifying a pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("Formation is not available for this year ({acronym} in {year}).")]
    TrainingNotFound { acronym: String, year: i32 },
    #[error("You must answer the question about reorientation.")]
    ReorientationNotConfirmed,
    #[error("You must answer the question about external enrollment change.")]
    ModificationNotConfirmed,
    #[error("The limited training you are enrolling into is not opened yet.")]
    QuotaPoolNotOpen,
    #[error("You must answer the question about residency.")]
    ResidencyNotSpecified,
    #[error("No pool was found to match.")]
    NoMatchingPool,
    #[error("The resulting calculated academic year or pool is not consistent.")]
    YearOrPoolMismatch {
        computed_year: i32,
        computed_pool: AcademicCalendarType,
        submitted_year: i32,
        submitted_pool: AcademicCalendarType,
    },
    #[error("The submitted information is not consistent with information requested.")]
    ConfirmationElementsMismatch,
    #[error(
        "You cannot continue your application. The registration procedure for the <em>{training_name}</em> \
         for non-resident students is managed on another registration platform. We invite you to consult \
         the complete registration procedure on the following page: \
         <a href=\"{url}\" target=\"_blank\">{url}</a>",
        url = LIMITED_ENROLMENT_URL
    )]
    ResidencyUnavailableForQuota { training_name: String },
    #[error("{}", outside_period_message(.period_start))]
    OutsideSpecificPeriod { period_start: Option<NaiveDate> },
    #[error("Please fill in all the required information in the 'Personal Data > Identification' tab.")]
    IdentificationIncomplete,
    #[error("Please fill in all the required information in the 'Personal Data > Coordinates' tab.")]
    LegalAddressIncomplete,
}

pub const LIMITED_ENROLMENT_URL: &str = "https://www.uclouvain.be/en/enrolment/limited-enrolment-courses";

fn outside_period_message(period_start: &Option<NaiveDate>) -> String {
    match period_start {
        Some(start) => format!(
            "Pending the publication of the results of the medical and dental entrance examination, \
             your application can only be submitted from {}.",
            start.format("%-d %B %Y")
        ),
        None => "Your application cannot be submitted now.".to_string(),
    }
}

impl AdmissionError {
    /// Stable code shared with the front-end.
    pub const fn code(&self) -> &'static str {
        match self {
            AdmissionError::TrainingNotFound { .. } => "ADMISSION-7",
            AdmissionError::ReorientationNotConfirmed => "ADMISSION-8",
            AdmissionError::ModificationNotConfirmed => "ADMISSION-9",
            AdmissionError::QuotaPoolNotOpen => "ADMISSION-10",
            AdmissionError::ResidencyNotSpecified => "ADMISSION-11",
            AdmissionError::NoMatchingPool => "ADMISSION-12",
            AdmissionError::YearOrPoolMismatch { .. } => "ADMISSION-13",
            AdmissionError::ConfirmationElementsMismatch => "ADMISSION-14",
            AdmissionError::ResidencyUnavailableForQuota { .. } => "ADMISSION-20",
            AdmissionError::OutsideSpecificPeriod { .. } => "ADMISSION-24",
            AdmissionError::IdentificationIncomplete => "PROPOSITION-25",
            AdmissionError::LegalAddressIncomplete => "PROPOSITION-31",
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            AdmissionError::ReorientationNotConfirmed
            | AdmissionError::ModificationNotConfirmed
            | AdmissionError::ResidencyNotSpecified
            | AdmissionError::IdentificationIncomplete
            | AdmissionError::LegalAddressIncomplete => ErrorKind::IncompletePrerequisite,
            AdmissionError::TrainingNotFound { .. }
            | AdmissionError::QuotaPoolNotOpen
            | AdmissionError::ResidencyUnavailableForQuota { .. }
            | AdmissionError::OutsideSpecificPeriod { .. } => ErrorKind::PolicyViolation,
            AdmissionError::YearOrPoolMismatch { .. }
            | AdmissionError::ConfirmationElementsMismatch => ErrorKind::Consistency,
            AdmissionError::NoMatchingPool => ErrorKind::InvariantViolation,
        }
    }

    pub fn view(&self) -> ErrorView {
        ErrorView {
            status_code: self.code(),
            kind: self.kind(),
            detail: self.to_string(),
        }
    }
}

/// Serialisable form of a business error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorView {
    pub status_code: &'static str,
    pub kind: ErrorKind,
    pub detail: String,
}

/// Several business errors reported together so the candidate sees every missing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{} business error(s): {}", .errors.len(), summary(.errors))]
pub struct MultipleBusinessErrors {
    pub errors: Vec<AdmissionError>,
}

fn summary(errors: &[AdmissionError]) -> String {
    errors
        .iter()
        .map(AdmissionError::code)
        .collect::<Vec<_>>()
        .join(", ")
}

impl MultipleBusinessErrors {
    pub fn push(&mut self, error: AdmissionError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), MultipleBusinessErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn views(&self) -> Vec<ErrorView> {
        self.errors.iter().map(AdmissionError::view).collect()
    }
}

impl From<AdmissionError> for MultipleBusinessErrors {
    fn from(error: AdmissionError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

/// Failure of a resolution: a business rule, or a read service that could not answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InscriptionError {
    #[error(transparent)]
    Business(#[from] AdmissionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl InscriptionError {
    pub fn business(&self) -> Option<&AdmissionError> {
        match self {
            InscriptionError::Business(err) => Some(err),
            InscriptionError::Repository(_) => None,
        }
    }
}
