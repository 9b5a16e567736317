use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::calendar::{AcademicCalendar, ConditionAccess, PoolRegistry, TrainingType};
use crate::inscription::domain::{
    Address, AssimilationSituation, Coordinates, GeneralEducationAnswers, Identification, Period,
    Proposition, PropositionId, PropositionKind, PropositionStatus, Training, TrainingIdentity,
};
use crate::inscription::in_memory::{
    CalendarView, CandidateRecord, InMemoryProfiles, InMemoryPropositions, InMemoryTrainings,
};
use crate::inscription::repository::PropositionRepository;
use crate::inscription::resolver::{PoolResolver, ResolverSettings, ResolverVariant};
use crate::inscription::service::AdmissionService;

pub(super) type TestService =
    AdmissionService<InMemoryPropositions, InMemoryProfiles, InMemoryTrainings, CalendarView>;

pub(super) const ACADEMIC_YEAR: i32 = 2024;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Mid October: modification window open, reorientation not yet.
pub(super) fn autumn() -> NaiveDate {
    date(2024, 10, 17)
}

pub(super) fn calendar_at(today: NaiveDate) -> CalendarView {
    CalendarView::new(AcademicCalendar::generate(
        &PoolRegistry::standard(),
        ACADEMIC_YEAR,
    ))
    .at(today)
}

pub(super) fn training(acronym: &str, training_type: TrainingType) -> Training {
    let (title_fr, title_en) = match acronym {
        "ECGE1BA" => (
            "Bachelier en sciences économiques et de gestion",
            "Bachelor in Economics and Management",
        ),
        "VETE1BA" => (
            "Bachelier en médecine vétérinaire",
            "Bachelor in Veterinary Medicine",
        ),
        "MD1BA" => ("Bachelier en médecine", "Bachelor in Medicine"),
        "ECON2M" => ("Master en sciences économiques", "Master in Economics"),
        "ECON3DP" => ("Doctorat en sciences économiques", "PhD in Economics"),
        _ => ("Certificat d'université", ""),
    };
    Training {
        id: TrainingIdentity::new(acronym, ACADEMIC_YEAR),
        title_fr: title_fr.to_string(),
        title_en: title_en.to_string(),
        training_type,
        is_medicine_or_dentistry: acronym == "MD1BA",
    }
}

pub(super) fn catalogue() -> InMemoryTrainings {
    InMemoryTrainings::with([
        training("ECGE1BA", TrainingType::Bachelor),
        training("VETE1BA", TrainingType::Bachelor),
        training("MD1BA", TrainingType::Bachelor),
        training("ECON2M", TrainingType::MasterMa120),
        training("ECON3DP", TrainingType::Phd),
        training("DROI9FC", TrainingType::CertificateOfParticipation),
    ])
    .offered_in("ECGE1BA", [2025])
}

/// Both external questions answered "no".
pub(super) fn answered() -> GeneralEducationAnswers {
    GeneralEducationAnswers {
        external_reorientation: Some(false),
        external_modification: Some(false),
        ..GeneralEducationAnswers::default()
    }
}

pub(super) fn proposition(
    uuid: &str,
    candidate_id: &str,
    acronym: &str,
    kind: PropositionKind,
) -> Proposition {
    Proposition {
        id: PropositionId(uuid.to_string()),
        candidate_id: candidate_id.to_string(),
        training: TrainingIdentity::new(acronym, ACADEMIC_YEAR),
        computed_year: None,
        computed_pool: None,
        status: PropositionStatus::InProgress,
        kind,
    }
}

pub(super) fn general(
    uuid: &str,
    candidate_id: &str,
    acronym: &str,
    answers: GeneralEducationAnswers,
) -> Proposition {
    proposition(
        uuid,
        candidate_id,
        acronym,
        PropositionKind::GeneralEducation(answers),
    )
}

fn address(country: &str) -> Address {
    Address {
        country: country.to_string(),
        postal_code: Some("1348".to_string()),
        city: Some("Louvain-la-Neuve".to_string()),
        street: Some("Place de l'Université 1".to_string()),
    }
}

pub(super) fn belgian(candidate_id: &str) -> CandidateRecord {
    CandidateRecord {
        identification: Identification {
            candidate_id: candidate_id.to_string(),
            nationality: Some("BE".to_string()),
            nationality_is_eu: true,
            last_ucl_enrollment_year: None,
            concerned_by_visa: false,
        },
        coordinates: Coordinates {
            legal_address: Some(address("BE")),
            contact_address: None,
        },
        access_conditions: [ConditionAccess::DiplomationSecondaireBelge]
            .into_iter()
            .collect(),
        institution_changes: Default::default(),
        french_speaking_belgian_secondary_studies: true,
    }
}

/// Cameroonian national living in Belgium with a foreign secondary diploma.
pub(super) fn non_european(candidate_id: &str) -> CandidateRecord {
    CandidateRecord {
        identification: Identification {
            candidate_id: candidate_id.to_string(),
            nationality: Some("CM".to_string()),
            nationality_is_eu: false,
            last_ucl_enrollment_year: None,
            concerned_by_visa: false,
        },
        coordinates: Coordinates {
            legal_address: Some(address("BE")),
            contact_address: None,
        },
        access_conditions: [ConditionAccess::DiplomationSecondaireNonUe]
            .into_iter()
            .collect(),
        institution_changes: Default::default(),
        french_speaking_belgian_secondary_studies: false,
    }
}

/// Candidate who has filled in neither identification nor coordinates.
pub(super) fn incomplete(candidate_id: &str) -> CandidateRecord {
    let mut record = belgian(candidate_id);
    record.identification.nationality = None;
    record.identification.nationality_is_eu = false;
    record.coordinates = Coordinates::default();
    record
}

pub(super) fn not_assimilated() -> GeneralEducationAnswers {
    GeneralEducationAnswers {
        assimilation: Some(AssimilationSituation::AucuneAssimilation),
        ..answered()
    }
}

pub(super) struct Harness {
    pub(super) service: Arc<TestService>,
    pub(super) propositions: InMemoryPropositions,
}

impl Harness {
    pub(super) fn stored(&self, uuid: &str) -> Proposition {
        self.propositions
            .fetch(&PropositionId(uuid.to_string()))
            .expect("fetch")
            .expect("stored proposition")
    }
}

pub(super) fn build_service(
    propositions: Vec<Proposition>,
    candidates: Vec<CandidateRecord>,
    calendar: CalendarView,
    resolver: PoolResolver,
) -> Harness {
    let store = InMemoryPropositions::with(propositions);
    let service = AdmissionService::new(
        Arc::new(store.clone()),
        Arc::new(InMemoryProfiles::with(candidates)),
        Arc::new(catalogue()),
        Arc::new(calendar),
        resolver,
    );
    Harness {
        service: Arc::new(service),
        propositions: store,
    }
}

/// One proposition, one candidate, current resolver.
pub(super) fn single(
    proposition: Proposition,
    candidate: CandidateRecord,
    today: NaiveDate,
) -> Harness {
    build_service(
        vec![proposition],
        vec![candidate],
        calendar_at(today),
        PoolResolver::default(),
    )
}

pub(super) fn with_settings(
    proposition: Proposition,
    candidate: CandidateRecord,
    today: NaiveDate,
    settings: ResolverSettings,
) -> Harness {
    build_service(
        vec![proposition],
        vec![candidate],
        calendar_at(today),
        PoolResolver::new(PoolRegistry::standard(), settings),
    )
}

/// One proposition, one candidate, legacy pools and settings.
pub(super) fn legacy(
    proposition: Proposition,
    candidate: CandidateRecord,
    today: NaiveDate,
) -> Harness {
    build_service(
        vec![proposition],
        vec![candidate],
        calendar_at(today),
        PoolResolver::for_variant(ResolverVariant::Legacy),
    )
}

pub(super) fn medicine_period() -> Period {
    Period {
        start: date(2024, 7, 1),
        end: date(2024, 7, 15),
    }
}

pub(super) fn id(uuid: &str) -> PropositionId {
    PropositionId(uuid.to_string())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
