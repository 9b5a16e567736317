use std::collections::BTreeSet;

use serde::Serialize;

use super::types::{AcademicCalendarType, ConditionAccess, TrainingType, BE_ISO_CODE, SIGLES_WITH_QUOTA};
use super::window::{DateOffset, WindowEnd};
use crate::inscription::domain::{Address, InstitutionChanges, Proposition, Training};
use crate::inscription::resolver::ResolverVariant;

/// Everything a pool may look at when deciding whether a candidate falls into it.
#[derive(Debug, Clone, Copy)]
pub struct PoolContext<'a> {
    pub academic_year: i32,
    pub acronym: &'a str,
    pub ue_plus_5: bool,
    pub access_diplomas: &'a BTreeSet<ConditionAccess>,
    pub training_type: TrainingType,
    pub legal_address: Option<&'a Address>,
    pub last_ucl_enrollment_year: Option<i32>,
    pub candidate_id: &'a str,
    pub institution_changes: &'a InstitutionChanges,
    pub proposition: Option<&'a Proposition>,
    pub training: &'a Training,
}

impl PoolContext<'_> {
    fn general_education(&self) -> bool {
        self.proposition
            .map(Proposition::is_general_education)
            .unwrap_or(false)
    }

    fn quota_non_resident(&self) -> bool {
        is_quota_non_resident(self.acronym, self.proposition)
    }

    fn has_belgian_diploma(&self) -> bool {
        self.access_diplomas
            .iter()
            .any(|condition| condition.is_belgian())
    }

    fn residence_country(&self) -> Option<&str> {
        self.legal_address.map(|address| address.country.as_str())
    }
}

/// Quota program applied for by a candidate who declared being non-resident by decree.
pub fn is_quota_non_resident(acronym: &str, proposition: Option<&Proposition>) -> bool {
    SIGLES_WITH_QUOTA.contains(&acronym)
        && proposition
            .and_then(Proposition::general_answers)
            .and_then(|answers| answers.non_resident_by_decree)
            == Some(true)
}

/// Named enrollment window with its eligibility rule and yearly calendar shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolCalendar {
    kind: AcademicCalendarType,
    cutover: DateOffset,
    end: WindowEnd,
}

impl PoolCalendar {
    pub const fn new(kind: AcademicCalendarType, cutover: DateOffset, end: WindowEnd) -> Self {
        Self { kind, cutover, end }
    }

    /// Default calendar shape for a pool.
    pub const fn standard(kind: AcademicCalendarType) -> Self {
        use AcademicCalendarType::*;

        let (cutover, end) = match kind {
            DoctorateEducationEnrollment => (DateOffset::new(1, 11, -1), WindowEnd::DayBeforeNext),
            ContinuingEducationEnrollment => (DateOffset::new(1, 9, -1), WindowEnd::DayBeforeNext),
            AdmissionPoolExternalEnrollmentChange => (
                DateOffset::new(1, 10, 0),
                WindowEnd::Fixed(DateOffset::new(31, 10, 0)),
            ),
            AdmissionPoolExternalReorientation => (
                DateOffset::new(1, 11, 0),
                WindowEnd::Fixed(DateOffset::new(15, 2, 1)),
            ),
            AdmissionPoolMedicineDentistryStandardPeriod => (
                DateOffset::new(1, 11, -1),
                WindowEnd::Fixed(DateOffset::new(30, 9, 0)),
            ),
            AdmissionPoolVip => (DateOffset::new(1, 11, -1), WindowEnd::DayBeforeNext),
            AdmissionPoolHueUclPathwayChange => {
                (DateOffset::new(1, 11, -1), WindowEnd::DayBeforeNext)
            }
            AdmissionPoolInstitutChange => (DateOffset::new(1, 10, -1), WindowEnd::DayBeforeNext),
            AdmissionPoolUe5Belgian => (DateOffset::new(1, 11, -1), WindowEnd::DayBeforeNext),
            AdmissionPoolUe5NonBelgian => (DateOffset::new(1, 9, -1), WindowEnd::DayBeforeNext),
            AdmissionPoolHue5BelgiumResidency => {
                (DateOffset::new(1, 9, -1), WindowEnd::DayBeforeNext)
            }
            AdmissionPoolHue5ForeignResidency => (
                DateOffset::new(1, 5, -1),
                WindowEnd::Fixed(DateOffset::new(31, 3, 0)),
            ),
            AdmissionPoolNonResidentQuota => (
                DateOffset::new(1, 6, 0),
                WindowEnd::Fixed(DateOffset::new(3, 6, 0)),
            ),
        };

        Self::new(kind, cutover, end)
    }

    pub const fn kind(&self) -> AcademicCalendarType {
        self.kind
    }

    pub const fn event_reference(&self) -> &'static str {
        self.kind.event_reference()
    }

    pub const fn cutover(&self) -> DateOffset {
        self.cutover
    }

    pub const fn end(&self) -> WindowEnd {
        self.end
    }

    /// Whether the candidate described by `ctx` belongs to this pool.
    ///
    /// Total over every context the resolver can build: a missing legal address simply
    /// fails residency based rules.
    pub fn matches_criteria(&self, ctx: &PoolContext<'_>) -> bool {
        use AcademicCalendarType::*;

        match self.kind {
            DoctorateEducationEnrollment => ctx.training_type.is_doctorate(),
            ContinuingEducationEnrollment => ctx.training_type.is_continuing_education(),
            AdmissionPoolExternalEnrollmentChange => {
                ctx.training_type == TrainingType::Bachelor
                    && general_answer(ctx, |answers| answers.external_modification)
                    && !ctx.quota_non_resident()
            }
            AdmissionPoolExternalReorientation => {
                ctx.training_type == TrainingType::Bachelor
                    && general_answer(ctx, |answers| answers.external_reorientation)
                    && !ctx.quota_non_resident()
            }
            AdmissionPoolMedicineDentistryStandardPeriod => {
                ctx.general_education()
                    && ctx.training_type == TrainingType::Bachelor
                    && ctx.training.is_medicine_or_dentistry
                    && !ctx.quota_non_resident()
            }
            AdmissionPoolVip => {
                ctx.training_type.is_second_cycle()
                    && ctx
                        .proposition
                        .and_then(Proposition::general_answers)
                        .map(|answers| answers.has_scholarship())
                        .unwrap_or(false)
            }
            AdmissionPoolHueUclPathwayChange => {
                ctx.general_education()
                    && !ctx.ue_plus_5
                    && ctx.last_ucl_enrollment_year == Some(ctx.academic_year - 1)
                    && !ctx.quota_non_resident()
            }
            AdmissionPoolInstitutChange => {
                ctx.general_education()
                    && ctx.has_belgian_diploma()
                    && ctx.residence_country() == Some(BE_ISO_CODE)
                    && ctx
                        .institution_changes
                        .get(&ctx.academic_year)
                        .copied()
                        .unwrap_or(false)
                    && !ctx.quota_non_resident()
            }
            AdmissionPoolUe5Belgian => {
                ctx.general_education()
                    && ctx.ue_plus_5
                    && ctx.has_belgian_diploma()
                    && !ctx.quota_non_resident()
            }
            AdmissionPoolUe5NonBelgian => {
                ctx.general_education()
                    && ctx.ue_plus_5
                    && !ctx.access_diplomas.is_empty()
                    && !ctx.has_belgian_diploma()
                    && !ctx.quota_non_resident()
            }
            AdmissionPoolHue5BelgiumResidency => {
                ctx.general_education()
                    && !ctx.ue_plus_5
                    && ctx.residence_country() == Some(BE_ISO_CODE)
                    && !ctx.quota_non_resident()
            }
            AdmissionPoolHue5ForeignResidency => {
                ctx.general_education()
                    && !ctx.ue_plus_5
                    && matches!(ctx.residence_country(), Some(country) if country != BE_ISO_CODE)
                    && !ctx.quota_non_resident()
            }
            AdmissionPoolNonResidentQuota => ctx.general_education() && ctx.quota_non_resident(),
        }
    }

    /// Whether the rule can ever accept a candidate for the given training type.
    pub fn can_apply_to(&self, training_type: TrainingType) -> bool {
        use AcademicCalendarType::*;

        let general = !training_type.is_doctorate() && !training_type.is_continuing_education();
        match self.kind {
            DoctorateEducationEnrollment => training_type.is_doctorate(),
            ContinuingEducationEnrollment => training_type.is_continuing_education(),
            AdmissionPoolExternalEnrollmentChange
            | AdmissionPoolExternalReorientation
            | AdmissionPoolMedicineDentistryStandardPeriod
            | AdmissionPoolNonResidentQuota => training_type == TrainingType::Bachelor,
            AdmissionPoolVip => training_type.is_second_cycle(),
            AdmissionPoolHueUclPathwayChange
            | AdmissionPoolInstitutChange
            | AdmissionPoolUe5Belgian
            | AdmissionPoolUe5NonBelgian
            | AdmissionPoolHue5BelgiumResidency
            | AdmissionPoolHue5ForeignResidency => general,
        }
    }
}

fn general_answer(
    ctx: &PoolContext<'_>,
    pick: impl Fn(&crate::inscription::domain::GeneralEducationAnswers) -> Option<bool>,
) -> bool {
    ctx.proposition
        .and_then(Proposition::general_answers)
        .and_then(pick)
        .unwrap_or(false)
}

/// Raised when the configured pools leave a training type without any candidate pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no configured pool can ever apply to training type {0:?}")]
pub struct UncoveredTrainingType(pub TrainingType);

/// Ordered pool lists consulted by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRegistry {
    priority_pools: Vec<PoolCalendar>,
    pools: Vec<PoolCalendar>,
}

impl PoolRegistry {
    pub fn new(priority_pools: Vec<PoolCalendar>, pools: Vec<PoolCalendar>) -> Self {
        Self {
            priority_pools,
            pools,
        }
    }

    /// Production ordering: declaration order encodes priority within each tier.
    pub fn standard() -> Self {
        use AcademicCalendarType::*;

        let pools = [
            DoctorateEducationEnrollment,
            ContinuingEducationEnrollment,
            AdmissionPoolExternalEnrollmentChange,
            AdmissionPoolMedicineDentistryStandardPeriod,
            AdmissionPoolVip,
            AdmissionPoolHueUclPathwayChange,
            AdmissionPoolInstitutChange,
            AdmissionPoolUe5Belgian,
            AdmissionPoolUe5NonBelgian,
            AdmissionPoolHue5BelgiumResidency,
            AdmissionPoolHue5ForeignResidency,
            AdmissionPoolNonResidentQuota,
        ]
        .into_iter()
        .map(PoolCalendar::standard)
        .collect();

        let priority_pools = vec![PoolCalendar::standard(AdmissionPoolExternalReorientation)];

        Self::new(priority_pools, pools)
    }

    /// Single-tier ordering of the legacy resolver: reorientation follows the
    /// enrollment change pool and there is no medicine/dentistry pool.
    pub fn legacy() -> Self {
        use AcademicCalendarType::*;

        let pools = [
            DoctorateEducationEnrollment,
            ContinuingEducationEnrollment,
            AdmissionPoolExternalEnrollmentChange,
            AdmissionPoolExternalReorientation,
            AdmissionPoolVip,
            AdmissionPoolHueUclPathwayChange,
            AdmissionPoolInstitutChange,
            AdmissionPoolUe5Belgian,
            AdmissionPoolUe5NonBelgian,
            AdmissionPoolHue5BelgiumResidency,
            AdmissionPoolHue5ForeignResidency,
            AdmissionPoolNonResidentQuota,
        ]
        .into_iter()
        .map(PoolCalendar::standard)
        .collect();

        Self::new(Vec::new(), pools)
    }

    pub fn for_variant(variant: ResolverVariant) -> Self {
        match variant {
            ResolverVariant::Current => Self::standard(),
            ResolverVariant::Legacy => Self::legacy(),
        }
    }

    pub fn priority_pools(&self) -> &[PoolCalendar] {
        &self.priority_pools
    }

    pub fn pools(&self) -> &[PoolCalendar] {
        &self.pools
    }

    pub fn all_pools(&self) -> impl Iterator<Item = &PoolCalendar> {
        self.priority_pools.iter().chain(self.pools.iter())
    }

    pub fn find(&self, kind: AcademicCalendarType) -> Option<&PoolCalendar> {
        self.all_pools().find(|pool| pool.kind() == kind)
    }

    /// Check that every training type is reachable by at least one configured pool.
    pub fn validate(&self) -> Result<(), UncoveredTrainingType> {
        for training_type in TrainingType::ALL {
            if !self.all_pools().any(|pool| pool.can_apply_to(training_type)) {
                return Err(UncoveredTrainingType(training_type));
            }
        }
        Ok(())
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inscription::domain::{
        GeneralEducationAnswers, PropositionId, PropositionKind, PropositionStatus,
        TrainingIdentity,
    };

    fn training(training_type: TrainingType) -> Training {
        Training {
            id: TrainingIdentity::new("ECGE1BA", 2024),
            title_fr: "Bachelier en sciences économiques".to_string(),
            title_en: "Bachelor in economics".to_string(),
            training_type,
            is_medicine_or_dentistry: false,
        }
    }

    fn proposition(acronym: &str, answers: GeneralEducationAnswers) -> Proposition {
        Proposition {
            id: PropositionId(format!("uuid-{acronym}")),
            candidate_id: "0000000001".to_string(),
            training: TrainingIdentity::new(acronym, 2024),
            computed_year: None,
            computed_pool: None,
            status: PropositionStatus::InProgress,
            kind: PropositionKind::GeneralEducation(answers),
        }
    }

    struct Fixture {
        diplomas: BTreeSet<ConditionAccess>,
        changes: InstitutionChanges,
        address: Option<Address>,
        training: Training,
        proposition: Option<Proposition>,
    }

    impl Fixture {
        fn new(training_type: TrainingType, proposition: Option<Proposition>) -> Self {
            Self {
                diplomas: BTreeSet::new(),
                changes: InstitutionChanges::new(),
                address: Some(Address {
                    country: "BE".to_string(),
                    postal_code: Some("1348".to_string()),
                    city: Some("Louvain-la-Neuve".to_string()),
                    street: None,
                }),
                training: training(training_type),
                proposition,
            }
        }

        fn context(&self, ue_plus_5: bool) -> PoolContext<'_> {
            PoolContext {
                academic_year: 2024,
                acronym: self
                    .proposition
                    .as_ref()
                    .map(|p| p.training.acronym.as_str())
                    .unwrap_or("ECGE1BA"),
                ue_plus_5,
                access_diplomas: &self.diplomas,
                training_type: self.training.training_type,
                legal_address: self.address.as_ref(),
                last_ucl_enrollment_year: None,
                candidate_id: "0000000001",
                institution_changes: &self.changes,
                proposition: self.proposition.as_ref(),
                training: &self.training,
            }
        }
    }

    #[test]
    fn doctorate_pool_only_checks_training_type() {
        let pool = PoolCalendar::standard(AcademicCalendarType::DoctorateEducationEnrollment);
        let fixture = Fixture::new(TrainingType::Phd, None);
        assert!(pool.matches_criteria(&fixture.context(true)));

        let fixture = Fixture::new(TrainingType::Bachelor, None);
        assert!(!pool.matches_criteria(&fixture.context(true)));
    }

    #[test]
    fn quota_pool_requires_declared_non_residency() {
        let pool = PoolCalendar::standard(AcademicCalendarType::AdmissionPoolNonResidentQuota);
        let answers = GeneralEducationAnswers {
            non_resident_by_decree: Some(true),
            ..GeneralEducationAnswers::default()
        };
        let fixture = Fixture::new(TrainingType::Bachelor, Some(proposition("VETE1BA", answers)));
        assert!(pool.matches_criteria(&fixture.context(false)));

        let resident = Fixture::new(
            TrainingType::Bachelor,
            Some(proposition("VETE1BA", GeneralEducationAnswers::default())),
        );
        assert!(!pool.matches_criteria(&resident.context(false)));
    }

    #[test]
    fn residency_pools_are_total_without_legal_address() {
        let mut fixture = Fixture::new(
            TrainingType::Bachelor,
            Some(proposition("ECGE1BA", GeneralEducationAnswers::default())),
        );
        fixture.address = None;

        for kind in [
            AcademicCalendarType::AdmissionPoolHue5BelgiumResidency,
            AcademicCalendarType::AdmissionPoolHue5ForeignResidency,
            AcademicCalendarType::AdmissionPoolInstitutChange,
        ] {
            assert!(!PoolCalendar::standard(kind).matches_criteria(&fixture.context(false)));
        }
    }

    #[test]
    fn ue5_pools_split_on_belgian_diploma() {
        let mut fixture = Fixture::new(
            TrainingType::Bachelor,
            Some(proposition("ECGE1BA", GeneralEducationAnswers::default())),
        );
        let belgian = PoolCalendar::standard(AcademicCalendarType::AdmissionPoolUe5Belgian);
        let foreign = PoolCalendar::standard(AcademicCalendarType::AdmissionPoolUe5NonBelgian);

        assert!(!belgian.matches_criteria(&fixture.context(true)));
        assert!(!foreign.matches_criteria(&fixture.context(true)));

        fixture.diplomas.insert(ConditionAccess::DiplomationSecondaireUe);
        assert!(foreign.matches_criteria(&fixture.context(true)));
        assert!(!belgian.matches_criteria(&fixture.context(true)));

        fixture.diplomas.insert(ConditionAccess::DiplomationSecondaireBelge);
        assert!(belgian.matches_criteria(&fixture.context(true)));
        assert!(!foreign.matches_criteria(&fixture.context(true)));
    }

    #[test]
    fn vip_pool_needs_second_cycle_and_scholarship() {
        let pool = PoolCalendar::standard(AcademicCalendarType::AdmissionPoolVip);
        let answers = GeneralEducationAnswers {
            erasmus_mundus_scholarship: Some("EM-2024".to_string()),
            ..GeneralEducationAnswers::default()
        };
        let master = Fixture::new(TrainingType::MasterMa120, Some(proposition("ECGE2M", answers.clone())));
        assert!(pool.matches_criteria(&master.context(false)));

        let bachelor = Fixture::new(TrainingType::Bachelor, Some(proposition("ECGE1BA", answers)));
        assert!(!pool.matches_criteria(&bachelor.context(false)));
    }

    #[test]
    fn pathway_change_looks_at_previous_year_enrollment() {
        let pool = PoolCalendar::standard(AcademicCalendarType::AdmissionPoolHueUclPathwayChange);
        let fixture = Fixture::new(
            TrainingType::Bachelor,
            Some(proposition("ECGE1BA", GeneralEducationAnswers::default())),
        );
        let mut ctx = fixture.context(false);
        ctx.last_ucl_enrollment_year = Some(2023);
        assert!(pool.matches_criteria(&ctx));

        ctx.last_ucl_enrollment_year = Some(2022);
        assert!(!pool.matches_criteria(&ctx));
    }

    #[test]
    fn standard_registry_covers_every_training_type() {
        let registry = PoolRegistry::standard();
        assert!(registry.validate().is_ok());
        assert_eq!(registry.priority_pools().len(), 1);
        assert_eq!(registry.all_pools().count(), 13);
    }

    #[test]
    fn legacy_registry_has_a_single_tier() {
        let registry = PoolRegistry::legacy();
        assert!(registry.validate().is_ok());
        assert!(registry.priority_pools().is_empty());
        assert!(registry
            .find(AcademicCalendarType::AdmissionPoolMedicineDentistryStandardPeriod)
            .is_none());

        let order: Vec<_> = registry.pools().iter().map(PoolCalendar::kind).collect();
        assert_eq!(
            order[2..4],
            [
                AcademicCalendarType::AdmissionPoolExternalEnrollmentChange,
                AcademicCalendarType::AdmissionPoolExternalReorientation,
            ]
        );
    }

    #[test]
    fn registry_without_doctorate_pool_is_rejected() {
        let registry = PoolRegistry::new(
            Vec::new(),
            vec![PoolCalendar::standard(
                AcademicCalendarType::AdmissionPoolHue5ForeignResidency,
            )],
        );
        assert!(matches!(registry.validate(), Err(UncoveredTrainingType(_))));
    }
}
