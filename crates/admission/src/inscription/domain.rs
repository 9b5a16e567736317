use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{AcademicCalendarType, ConditionAccess, TrainingType};

/// Identifier wrapper for admission propositions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropositionId(pub String);

impl fmt::Display for PropositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Training acronym plus the academic year it is organised in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrainingIdentity {
    pub acronym: String,
    pub year: i32,
}

impl TrainingIdentity {
    pub fn new(acronym: impl Into<String>, year: i32) -> Self {
        Self {
            acronym: acronym.into(),
            year,
        }
    }
}

/// Training read model used by the resolver and the confirmation elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Training {
    pub id: TrainingIdentity,
    pub title_fr: String,
    pub title_en: String,
    pub training_type: TrainingType,
    #[serde(default)]
    pub is_medicine_or_dentistry: bool,
}

/// Lifecycle of a proposition as far as submission is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropositionStatus {
    #[default]
    InProgress,
    Submitted,
    Cancelled,
}

impl PropositionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PropositionStatus::InProgress => "in_progress",
            PropositionStatus::Submitted => "submitted",
            PropositionStatus::Cancelled => "cancelled",
        }
    }
}

/// Assimilation situations declared in the accounting section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssimilationSituation {
    AucuneAssimilation,
    AutorisationEtablissementOuResidentLongueDuree,
    RefugieOuApatrideOuProtectionSubsidiaireTemporaire,
    AutorisationSejourEtRevenusProfessionnelsOuRemplacement,
    PrisEnChargeOuDesigneCpas,
    ProcheANationaliteUeOuRespecteAssimilations1A4,
    ABourseArticle105Paragraph2,
    ResidentLongueDureeUeHorsBelgique,
}

impl AssimilationSituation {
    pub const fn is_assimilated(self) -> bool {
        !matches!(self, AssimilationSituation::AucuneAssimilation)
    }
}

/// Answers only collected for general education (bachelor/master) propositions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralEducationAnswers {
    pub non_resident_by_decree: Option<bool>,
    pub external_reorientation: Option<bool>,
    pub regular_enrollment_certificate: Vec<String>,
    pub reorientation_form: Vec<String>,
    pub external_modification: Option<bool>,
    pub modification_form: Vec<String>,
    pub regular_enrollment_certificate_for_modification: Vec<String>,
    pub double_degree_scholarship: Option<String>,
    pub erasmus_mundus_scholarship: Option<String>,
    pub international_scholarship: Option<String>,
    pub assimilation: Option<AssimilationSituation>,
}

impl GeneralEducationAnswers {
    pub fn has_scholarship(&self) -> bool {
        self.double_degree_scholarship.is_some()
            || self.erasmus_mundus_scholarship.is_some()
            || self.international_scholarship.is_some()
    }

    /// Reorientation question left unanswered, or answered yes without both documents.
    pub fn reorientation_incomplete(&self) -> bool {
        match self.external_reorientation {
            None => true,
            Some(true) => {
                self.regular_enrollment_certificate.is_empty() || self.reorientation_form.is_empty()
            }
            Some(false) => false,
        }
    }

    /// Modification question left unanswered, or answered yes without both documents.
    pub fn modification_incomplete(&self) -> bool {
        match self.external_modification {
            None => true,
            Some(true) => {
                self.modification_form.is_empty()
                    || self.regular_enrollment_certificate_for_modification.is_empty()
            }
            Some(false) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropositionKind {
    GeneralEducation(GeneralEducationAnswers),
    ContinuingEducation,
    Doctorate,
}

/// In-progress admission application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposition {
    pub id: PropositionId,
    pub candidate_id: String,
    pub training: TrainingIdentity,
    #[serde(default)]
    pub computed_year: Option<i32>,
    #[serde(default)]
    pub computed_pool: Option<AcademicCalendarType>,
    #[serde(default)]
    pub status: PropositionStatus,
    pub kind: PropositionKind,
}

impl Proposition {
    pub fn general_answers(&self) -> Option<&GeneralEducationAnswers> {
        match &self.kind {
            PropositionKind::GeneralEducation(answers) => Some(answers),
            _ => None,
        }
    }

    pub fn is_general_education(&self) -> bool {
        matches!(self.kind, PropositionKind::GeneralEducation(_))
    }

    pub fn is_continuing_education(&self) -> bool {
        matches!(self.kind, PropositionKind::ContinuingEducation)
    }

    pub fn is_doctorate(&self) -> bool {
        matches!(self.kind, PropositionKind::Doctorate)
    }
}

/// Identification section of the candidate profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub candidate_id: String,
    /// ISO 3166 alpha-2 code of the nationality.
    pub nationality: Option<String>,
    #[serde(default)]
    pub nationality_is_eu: bool,
    #[serde(default)]
    pub last_ucl_enrollment_year: Option<i32>,
    #[serde(default)]
    pub concerned_by_visa: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub country: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub legal_address: Option<Address>,
    #[serde(default)]
    pub contact_address: Option<Address>,
}

/// Access titles summary computed from the candidate's curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessTitles {
    pub conditions: BTreeSet<ConditionAccess>,
}

impl AccessTitles {
    pub fn new(conditions: impl IntoIterator<Item = ConditionAccess>) -> Self {
        Self {
            conditions: conditions.into_iter().collect(),
        }
    }

    pub fn valid_conditions(&self) -> &BTreeSet<ConditionAccess> {
        &self.conditions
    }
}

/// Institution changes per academic year.
pub type InstitutionChanges = BTreeMap<i32, bool>;

/// Closed date range, both bounds included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Outcome of a pool resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Determination {
    pub year: i32,
    pub pool: AcademicCalendarType,
}

impl Determination {
    pub fn new(year: i32, pool: AcademicCalendarType) -> Self {
        Self { year, pool }
    }
}
