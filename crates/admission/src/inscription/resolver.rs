use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    AccessTitles, Address, Determination, Proposition, Training, TrainingIdentity,
};
use super::eligibility::{
    eligible_for_modification, eligible_for_reorientation, enrolled_in_quota_training,
    is_ue_plus_5,
};
use super::errors::{AdmissionError, InscriptionError, MultipleBusinessErrors};
use super::ports::{CandidateProfileTranslator, EnrollmentCalendar, TrainingTranslator};
use super::repository::RepositoryError;
use crate::calendar::{
    is_quota_non_resident, AcademicCalendarType, OpenPools, PoolCalendar, PoolContext,
    PoolRegistry, TrainingType,
};

/// Which of the two historical resolver behaviours to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverVariant {
    #[default]
    Current,
    Legacy,
}

impl fmt::Display for ResolverVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverVariant::Current => f.write_str("current"),
            ResolverVariant::Legacy => f.write_str("legacy"),
        }
    }
}

impl FromStr for ResolverVariant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(ResolverVariant::Current),
            "legacy" => Ok(ResolverVariant::Legacy),
            other => Err(other.to_string()),
        }
    }
}

/// How the external reorientation and enrollment change questions gate resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathwayGate {
    /// Answer needed while the pool is open for the training's year.
    AnswerForTrainingYear,
    /// Answer needed while the pool is open for any year; a yes needs both documents.
    AnswerWithDocuments,
}

/// Behavioural switches separating the legacy and current resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolverSettings {
    /// Count an assimilation situation towards UE+5.
    pub assimilation_in_ue_plus_5: bool,
    /// Gate medicine/dentistry bachelors on their dedicated submission period.
    pub specific_period_check: bool,
    /// Refuse quota programs to candidates declared non-resident by decree.
    pub block_quota_non_resident: bool,
    pub pathway_gate: PathwayGate,
    /// Refuse general education propositions whose candidate has no legal address.
    pub legal_address_check: bool,
}

impl ResolverSettings {
    pub const fn current() -> Self {
        Self {
            assimilation_in_ue_plus_5: true,
            specific_period_check: true,
            block_quota_non_resident: true,
            pathway_gate: PathwayGate::AnswerWithDocuments,
            legal_address_check: true,
        }
    }

    pub const fn legacy() -> Self {
        Self {
            assimilation_in_ue_plus_5: false,
            specific_period_check: false,
            block_quota_non_resident: false,
            pathway_gate: PathwayGate::AnswerForTrainingYear,
            legal_address_check: false,
        }
    }

    pub const fn for_variant(variant: ResolverVariant) -> Self {
        match variant {
            ResolverVariant::Current => Self::current(),
            ResolverVariant::Legacy => Self::legacy(),
        }
    }

    pub const fn with_quota_block(mut self, block: bool) -> Self {
        self.block_quota_non_resident = block;
        self
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::current()
    }
}

/// Inputs describing the proposition being resolved.
#[derive(Debug, Clone, Copy)]
pub struct PoolQuery<'a> {
    pub training_id: &'a TrainingIdentity,
    pub candidate_id: &'a str,
    pub access_titles: &'a AccessTitles,
    pub training: &'a Training,
    pub proposition: Option<&'a Proposition>,
}

/// Year and pool previously shown to the candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedChoice {
    pub year: Option<i32>,
    pub pool: Option<AcademicCalendarType>,
}

/// Selects the (academic year, pool) pair governing a proposition.
#[derive(Debug, Clone)]
pub struct PoolResolver {
    registry: PoolRegistry,
    settings: ResolverSettings,
}

impl PoolResolver {
    pub fn new(registry: PoolRegistry, settings: ResolverSettings) -> Self {
        Self { registry, settings }
    }

    /// Registry and settings of one of the two historical resolvers.
    pub fn for_variant(variant: ResolverVariant) -> Self {
        Self::new(
            PoolRegistry::for_variant(variant),
            ResolverSettings::for_variant(variant),
        )
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    pub fn settings(&self) -> ResolverSettings {
        self.settings
    }

    /// First open and matching pool, priority pools first, earlier years first.
    pub fn determine_year_and_pool<P, C>(
        &self,
        query: &PoolQuery<'_>,
        profile: &P,
        calendar: &C,
    ) -> Result<Determination, InscriptionError>
    where
        P: CandidateProfileTranslator + ?Sized,
        C: EnrollmentCalendar + ?Sized,
    {
        let training_type = query.training.training_type;
        let acronym = query.training_id.acronym.as_str();
        let open_pools = calendar.open_pools();

        self.check_residency_by_decree(query)?;
        self.check_reorientation_answered(query, &open_pools)?;
        self.check_modification_answered(query, &open_pools)?;
        check_quota_pool_open(acronym, query.proposition, query.training_id.year, &open_pools)?;

        let identification = profile.identification(query.candidate_id)?;
        let legal_address = profile.coordinates(query.candidate_id)?.legal_address;
        if identification.nationality.is_none() {
            return Err(AdmissionError::IdentificationIncomplete.into());
        }
        self.check_legal_address(query.proposition, legal_address.as_ref())?;

        let assimilation = if self.settings.assimilation_in_ue_plus_5 {
            query
                .proposition
                .and_then(Proposition::general_answers)
                .and_then(|answers| answers.assimilation)
        } else {
            None
        };
        let ue_plus_5 = is_ue_plus_5(&identification, assimilation);
        let years = calendar.years_for_calculation(training_type);
        let institution_changes =
            profile.institution_changes(query.candidate_id, &years.regular)?;

        debug!(
            years = ?years,
            training = %query.training_id.acronym,
            training_year = query.training_id.year,
            ue_plus_5,
            access_diplomas = ?query.access_titles.valid_conditions(),
            training_type = ?training_type,
            residential_address = ?legal_address,
            last_ucl_enrollment_year = ?identification.last_ucl_enrollment_year,
            candidate = query.candidate_id,
            institution_changes = ?institution_changes,
            proposition = ?query.proposition.map(|proposition| &proposition.id),
            "pool determination"
        );

        let base = PoolContext {
            academic_year: query.training_id.year,
            acronym,
            ue_plus_5,
            access_diplomas: query.access_titles.valid_conditions(),
            training_type,
            legal_address: legal_address.as_ref(),
            last_ucl_enrollment_year: identification.last_ucl_enrollment_year,
            candidate_id: query.candidate_id,
            institution_changes: &institution_changes,
            proposition: query.proposition,
            training: query.training,
        };

        let tiers = [
            (&years.priority, self.registry.priority_pools()),
            (&years.regular, self.registry.pools()),
        ];
        for (tier_years, pools) in tiers {
            for &year in tier_years.iter() {
                let ctx = PoolContext {
                    academic_year: year,
                    ..base
                };
                if let Some(pool) = probe_year(pools, &ctx, &open_pools) {
                    let determination = Determination::new(year, pool);
                    debug!(year, pool = %pool, "pool determined");
                    return Ok(determination);
                }
            }
        }

        debug!(candidate = query.candidate_id, "no pool matched");
        Err(AdmissionError::NoMatchingPool.into())
    }

    /// Resolution plus the consistency checks run at submission time.
    pub fn verify<P, T, C>(
        &self,
        query: &PoolQuery<'_>,
        profile: &P,
        trainings: &T,
        calendar: &C,
        submitted: SubmittedChoice,
    ) -> Result<Determination, InscriptionError>
    where
        P: CandidateProfileTranslator + ?Sized,
        T: TrainingTranslator + ?Sized,
        C: EnrollmentCalendar + ?Sized,
    {
        let determination = self.determine_year_and_pool(query, profile, calendar)?;

        if determination.year != query.training_id.year
            && !trainings.exists(&query.training_id.acronym, determination.year)?
        {
            return Err(AdmissionError::TrainingNotFound {
                acronym: query.training_id.acronym.clone(),
                year: determination.year,
            }
            .into());
        }

        if self.settings.specific_period_check {
            check_specific_period(query.training, calendar)?;
        }

        if let (Some(year), Some(pool)) = (submitted.year, submitted.pool) {
            if year != determination.year || pool != determination.pool {
                return Err(AdmissionError::YearOrPoolMismatch {
                    computed_year: determination.year,
                    computed_pool: determination.pool,
                    submitted_year: year,
                    submitted_pool: pool,
                }
                .into());
            }
        }

        Ok(determination)
    }

    /// Every incomplete-prerequisite error at once, without resolving a pool.
    pub fn prerequisite_errors<P, C>(
        &self,
        query: &PoolQuery<'_>,
        profile: &P,
        calendar: &C,
    ) -> Result<MultipleBusinessErrors, RepositoryError>
    where
        P: CandidateProfileTranslator + ?Sized,
        C: EnrollmentCalendar + ?Sized,
    {
        let open_pools = calendar.open_pools();
        let mut errors = MultipleBusinessErrors::default();

        let checks = [
            self.check_residency_by_decree(query),
            self.check_reorientation_answered(query, &open_pools),
            self.check_modification_answered(query, &open_pools),
        ];
        for error in checks.into_iter().filter_map(Result::err) {
            errors.push(error);
        }

        if profile.identification(query.candidate_id)?.nationality.is_none() {
            errors.push(AdmissionError::IdentificationIncomplete);
        }
        let coordinates = profile.coordinates(query.candidate_id)?;
        if let Err(error) =
            self.check_legal_address(query.proposition, coordinates.legal_address.as_ref())
        {
            errors.push(error);
        }

        Ok(errors)
    }

    fn check_residency_by_decree(&self, query: &PoolQuery<'_>) -> Result<(), AdmissionError> {
        if !enrolled_in_quota_training(&query.training_id.acronym) {
            return Ok(());
        }
        let Some(answers) = query.proposition.and_then(Proposition::general_answers) else {
            return Ok(());
        };

        match answers.non_resident_by_decree {
            None => Err(AdmissionError::ResidencyNotSpecified),
            Some(true) if self.settings.block_quota_non_resident => {
                Err(AdmissionError::ResidencyUnavailableForQuota {
                    training_name: training_name(query.training),
                })
            }
            Some(_) => Ok(()),
        }
    }

    fn check_reorientation_answered(
        &self,
        query: &PoolQuery<'_>,
        open_pools: &OpenPools,
    ) -> Result<(), AdmissionError> {
        let Some(answers) = query.proposition.and_then(Proposition::general_answers) else {
            return Ok(());
        };
        let training_type = query.training.training_type;
        let acronym = query.training_id.acronym.as_str();
        let unconfirmed = match self.settings.pathway_gate {
            PathwayGate::AnswerWithDocuments => {
                eligible_for_reorientation(training_type, acronym, query.proposition, open_pools)
                    && answers.reorientation_incomplete()
            }
            PathwayGate::AnswerForTrainingYear => {
                open_for_training_year(
                    AcademicCalendarType::AdmissionPoolExternalReorientation,
                    query,
                    open_pools,
                ) && answers.external_reorientation.is_none()
            }
        };
        if unconfirmed {
            return Err(AdmissionError::ReorientationNotConfirmed);
        }
        Ok(())
    }

    fn check_modification_answered(
        &self,
        query: &PoolQuery<'_>,
        open_pools: &OpenPools,
    ) -> Result<(), AdmissionError> {
        let Some(answers) = query.proposition.and_then(Proposition::general_answers) else {
            return Ok(());
        };
        let training_type = query.training.training_type;
        let acronym = query.training_id.acronym.as_str();
        let unconfirmed = match self.settings.pathway_gate {
            PathwayGate::AnswerWithDocuments => {
                eligible_for_modification(training_type, acronym, query.proposition, open_pools)
                    && answers.modification_incomplete()
            }
            PathwayGate::AnswerForTrainingYear => {
                open_for_training_year(
                    AcademicCalendarType::AdmissionPoolExternalEnrollmentChange,
                    query,
                    open_pools,
                ) && answers.external_modification.is_none()
            }
        };
        if unconfirmed {
            return Err(AdmissionError::ModificationNotConfirmed);
        }
        Ok(())
    }

    fn check_legal_address(
        &self,
        proposition: Option<&Proposition>,
        legal_address: Option<&Address>,
    ) -> Result<(), AdmissionError> {
        if !self.settings.legal_address_check {
            return Ok(());
        }
        let general = proposition
            .map(Proposition::is_general_education)
            .unwrap_or(false);
        if general && legal_address.is_none() {
            return Err(AdmissionError::LegalAddressIncomplete);
        }
        Ok(())
    }
}

/// Bachelor outside the non-resident quota whose pool is open for the training's own year.
fn open_for_training_year(
    pool: AcademicCalendarType,
    query: &PoolQuery<'_>,
    open_pools: &OpenPools,
) -> bool {
    query.training.training_type == TrainingType::Bachelor
        && !is_quota_non_resident(&query.training_id.acronym, query.proposition)
        && open_pools.contains(pool, query.training_id.year)
}

impl Default for PoolResolver {
    fn default() -> Self {
        Self::new(PoolRegistry::standard(), ResolverSettings::current())
    }
}

fn probe_year(
    pools: &[PoolCalendar],
    ctx: &PoolContext<'_>,
    open_pools: &OpenPools,
) -> Option<AcademicCalendarType> {
    for pool in pools {
        let open = open_pools.contains(pool.kind(), ctx.academic_year);
        let matches = pool.matches_criteria(ctx);
        debug!(
            pool = %pool.kind(),
            year = ctx.academic_year,
            pool_est_ouvert = open,
            matches_criteria = matches,
            "probe"
        );
        if open && matches {
            return Some(pool.kind());
        }
    }
    None
}

fn training_name(training: &Training) -> String {
    if training.title_en.trim().is_empty() {
        training.title_fr.clone()
    } else {
        training.title_en.clone()
    }
}

fn check_quota_pool_open(
    acronym: &str,
    proposition: Option<&Proposition>,
    training_year: i32,
    open_pools: &OpenPools,
) -> Result<(), AdmissionError> {
    if is_quota_non_resident(acronym, proposition)
        && !open_pools.contains(
            AcademicCalendarType::AdmissionPoolNonResidentQuota,
            training_year,
        )
    {
        return Err(AdmissionError::QuotaPoolNotOpen);
    }
    Ok(())
}

fn check_specific_period<C>(training: &Training, calendar: &C) -> Result<(), AdmissionError>
where
    C: EnrollmentCalendar + ?Sized,
{
    if training.training_type != TrainingType::Bachelor || !training.is_medicine_or_dentistry {
        return Ok(());
    }
    match calendar.medicine_dentistry_period() {
        Some(period) if !period.contains(calendar.today()) => {
            Err(AdmissionError::OutsideSpecificPeriod {
                period_start: Some(period.start),
            })
        }
        _ => Ok(()),
    }
}
