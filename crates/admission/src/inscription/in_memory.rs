//! In-process adapters backing the CLI, the demo server and the tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde::Deserialize;

use super::domain::{
    AccessTitles, Coordinates, Identification, InstitutionChanges, Period, Proposition,
    PropositionId, Training, TrainingIdentity,
};
use super::ports::{CandidateProfileTranslator, EnrollmentCalendar, TrainingTranslator};
use super::repository::{PropositionRepository, RepositoryError};
use crate::calendar::{
    AcademicCalendar, CalculationYears, CutoverYearPolicy, OpenPools, TrainingType,
};

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("in-memory store poisoned".to_string())
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryPropositions {
    records: Arc<Mutex<HashMap<PropositionId, Proposition>>>,
}

impl InMemoryPropositions {
    pub fn with(propositions: impl IntoIterator<Item = Proposition>) -> Self {
        let records = propositions
            .into_iter()
            .map(|proposition| (proposition.id.clone(), proposition))
            .collect();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub fn insert(&self, proposition: Proposition) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(|_| poisoned())?;
        if guard.contains_key(&proposition.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(proposition.id.clone(), proposition);
        Ok(())
    }
}

impl PropositionRepository for InMemoryPropositions {
    fn fetch(&self, id: &PropositionId) -> Result<Option<Proposition>, RepositoryError> {
        let guard = self.records.lock().map_err(|_| poisoned())?;
        Ok(guard.get(id).cloned())
    }

    fn update(&self, proposition: Proposition) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(|_| poisoned())?;
        if !guard.contains_key(&proposition.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(proposition.id.clone(), proposition);
        Ok(())
    }
}

/// Everything the profile translator knows about one candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateRecord {
    pub identification: Identification,
    #[serde(default)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub access_conditions: BTreeSet<crate::calendar::ConditionAccess>,
    #[serde(default)]
    pub institution_changes: InstitutionChanges,
    #[serde(default)]
    pub french_speaking_belgian_secondary_studies: bool,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryProfiles {
    candidates: BTreeMap<String, CandidateRecord>,
}

impl InMemoryProfiles {
    pub fn with(candidates: impl IntoIterator<Item = CandidateRecord>) -> Self {
        Self {
            candidates: candidates
                .into_iter()
                .map(|record| (record.identification.candidate_id.clone(), record))
                .collect(),
        }
    }

    fn candidate(&self, candidate_id: &str) -> Result<&CandidateRecord, RepositoryError> {
        self.candidates
            .get(candidate_id)
            .ok_or(RepositoryError::NotFound)
    }
}

impl CandidateProfileTranslator for InMemoryProfiles {
    fn identification(&self, candidate_id: &str) -> Result<Identification, RepositoryError> {
        Ok(self.candidate(candidate_id)?.identification.clone())
    }

    fn coordinates(&self, candidate_id: &str) -> Result<Coordinates, RepositoryError> {
        Ok(self.candidate(candidate_id)?.coordinates.clone())
    }

    fn access_titles(
        &self,
        candidate_id: &str,
        _training_type: TrainingType,
    ) -> Result<AccessTitles, RepositoryError> {
        let record = self.candidate(candidate_id)?;
        Ok(AccessTitles::new(record.access_conditions.iter().copied()))
    }

    fn institution_changes(
        &self,
        candidate_id: &str,
        years: &[i32],
    ) -> Result<InstitutionChanges, RepositoryError> {
        let record = self.candidate(candidate_id)?;
        Ok(years
            .iter()
            .map(|year| {
                let changed = record
                    .institution_changes
                    .get(year)
                    .copied()
                    .unwrap_or(false);
                (*year, changed)
            })
            .collect())
    }

    fn has_french_speaking_belgian_secondary_studies(
        &self,
        candidate_id: &str,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .candidate(candidate_id)?
            .french_speaking_belgian_secondary_studies)
    }
}

/// Catalogue of trainings; a training exists for a year when an entry with that identity is known.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTrainings {
    trainings: BTreeMap<TrainingIdentity, Training>,
}

impl InMemoryTrainings {
    pub fn with(trainings: impl IntoIterator<Item = Training>) -> Self {
        Self {
            trainings: trainings
                .into_iter()
                .map(|training| (training.id.clone(), training))
                .collect(),
        }
    }

    /// Register the same training for additional academic years.
    pub fn offered_in(mut self, acronym: &str, years: impl IntoIterator<Item = i32>) -> Self {
        let template = self
            .trainings
            .values()
            .find(|training| training.id.acronym == acronym)
            .cloned();
        if let Some(template) = template {
            for year in years {
                let mut training = template.clone();
                training.id = TrainingIdentity::new(acronym, year);
                self.trainings.insert(training.id.clone(), training);
            }
        }
        self
    }
}

impl TrainingTranslator for InMemoryTrainings {
    fn get(&self, id: &TrainingIdentity) -> Result<Training, RepositoryError> {
        self.trainings
            .get(id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    fn exists(&self, acronym: &str, year: i32) -> Result<bool, RepositoryError> {
        Ok(self
            .trainings
            .contains_key(&TrainingIdentity::new(acronym, year)))
    }
}

/// Calendar port backed by an [`AcademicCalendar`] and a year policy.
#[derive(Debug, Clone)]
pub struct CalendarView {
    calendar: AcademicCalendar,
    policy: CutoverYearPolicy,
    today: Option<NaiveDate>,
    medicine_dentistry_period: Option<Period>,
}

impl CalendarView {
    pub fn new(calendar: AcademicCalendar) -> Self {
        Self {
            calendar,
            policy: CutoverYearPolicy::default(),
            today: None,
            medicine_dentistry_period: None,
        }
    }

    /// Freeze the clock, e.g. for the CLI or tests.
    pub fn at(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn with_policy(mut self, policy: CutoverYearPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_medicine_dentistry_period(mut self, period: Option<Period>) -> Self {
        self.medicine_dentistry_period = period;
        self
    }

    pub fn calendar(&self) -> &AcademicCalendar {
        &self.calendar
    }
}

impl EnrollmentCalendar for CalendarView {
    fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    fn open_pools(&self) -> OpenPools {
        self.calendar.open_pools(self.today())
    }

    fn years_for_calculation(&self, _training_type: TrainingType) -> CalculationYears {
        self.policy.years_for_calculation(self.today())
    }

    fn medicine_dentistry_period(&self) -> Option<Period> {
        self.medicine_dentistry_period
    }
}

/// Self-contained JSON description of one proposition and its candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub proposition: Proposition,
    pub training: Training,
    pub candidate: CandidateRecord,
    /// Extra academic years the training is organised in.
    #[serde(default)]
    pub training_offered_in: Vec<i32>,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Scenario {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn adapters(&self) -> (InMemoryPropositions, InMemoryProfiles, InMemoryTrainings) {
        let propositions = InMemoryPropositions::with([self.proposition.clone()]);
        let profiles = InMemoryProfiles::with([self.candidate.clone()]);
        let trainings = InMemoryTrainings::with([self.training.clone()]).offered_in(
            &self.training.id.acronym,
            self.training_offered_in.iter().copied(),
        );
        (propositions, profiles, trainings)
    }
}
