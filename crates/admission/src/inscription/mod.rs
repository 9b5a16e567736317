//! Admission inscription context: pool resolution, confirmation elements and submission.

pub mod confirmation;
pub mod domain;
pub mod eligibility;
pub mod errors;
pub mod in_memory;
pub mod ports;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod service;

pub use confirmation::{ConfirmationElement, ElementType};
pub use domain::{
    Determination, Proposition, PropositionId, PropositionKind, PropositionStatus, Training,
    TrainingIdentity,
};
pub use errors::{AdmissionError, ErrorKind, InscriptionError, MultipleBusinessErrors};
pub use in_memory::{
    CalendarView, CandidateRecord, InMemoryProfiles, InMemoryPropositions, InMemoryTrainings,
    Scenario, ScenarioError,
};
pub use ports::{CandidateProfileTranslator, EnrollmentCalendar, TrainingTranslator};
pub use repository::{PropositionRepository, PropositionStatusView, RepositoryError};
pub use resolver::{
    PathwayGate, PoolQuery, PoolResolver, ResolverSettings, ResolverVariant, SubmittedChoice,
};
pub use router::admission_router;
pub use service::{AdmissionService, AdmissionServiceError, SubmissionRequest};

#[cfg(test)]
mod tests;
