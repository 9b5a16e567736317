//! Stand-alone predicates shared by the resolver and the forms deciding which questions to show.

use super::domain::{AssimilationSituation, Identification, Proposition};
use crate::calendar::{
    is_quota_non_resident, AcademicCalendarType, OpenPools, TrainingType, PLUS_5_ISO_CODES,
    SIGLES_WITH_QUOTA,
};

pub fn enrolled_in_quota_training(acronym: &str) -> bool {
    SIGLES_WITH_QUOTA.contains(&acronym)
}

/// Bachelor, not quota non-resident, with the reorientation pool open for any year.
pub fn eligible_for_reorientation(
    training_type: TrainingType,
    acronym: &str,
    proposition: Option<&Proposition>,
    open_pools: &OpenPools,
) -> bool {
    eligible_for_pool(
        AcademicCalendarType::AdmissionPoolExternalReorientation,
        training_type,
        acronym,
        proposition,
        open_pools,
    )
}

/// Same as [`eligible_for_reorientation`] for the external enrollment change pool.
pub fn eligible_for_modification(
    training_type: TrainingType,
    acronym: &str,
    proposition: Option<&Proposition>,
    open_pools: &OpenPools,
) -> bool {
    eligible_for_pool(
        AcademicCalendarType::AdmissionPoolExternalEnrollmentChange,
        training_type,
        acronym,
        proposition,
        open_pools,
    )
}

fn eligible_for_pool(
    pool: AcademicCalendarType,
    training_type: TrainingType,
    acronym: &str,
    proposition: Option<&Proposition>,
    open_pools: &OpenPools,
) -> bool {
    training_type == TrainingType::Bachelor
        && !is_quota_non_resident(acronym, proposition)
        && open_pools.is_open(pool)
}

/// EU national, national of a PLUS_5 country, or (when given) assimilated.
pub fn is_ue_plus_5(
    identification: &Identification,
    assimilation: Option<AssimilationSituation>,
) -> bool {
    let plus_5 = identification
        .nationality
        .as_deref()
        .map(|iso| PLUS_5_ISO_CODES.contains(&iso))
        .unwrap_or(false);

    identification.nationality_is_eu
        || plus_5
        || assimilation.map(AssimilationSituation::is_assimilated).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identification(nationality: &str, eu: bool) -> Identification {
        Identification {
            candidate_id: "0000000001".to_string(),
            nationality: Some(nationality.to_string()),
            nationality_is_eu: eu,
            last_ucl_enrollment_year: None,
            concerned_by_visa: false,
        }
    }

    #[test]
    fn quota_training_membership() {
        assert!(enrolled_in_quota_training("KINE1BA"));
        assert!(!enrolled_in_quota_training("ECGE1BA"));
    }

    #[test]
    fn ue_plus_5_covers_neighbours_and_assimilation() {
        assert!(is_ue_plus_5(&identification("FR", true), None));
        assert!(is_ue_plus_5(&identification("CH", false), None));
        assert!(!is_ue_plus_5(&identification("CA", false), None));
        assert!(is_ue_plus_5(
            &identification("CA", false),
            Some(AssimilationSituation::RefugieOuApatrideOuProtectionSubsidiaireTemporaire)
        ));
        assert!(!is_ue_plus_5(
            &identification("CA", false),
            Some(AssimilationSituation::AucuneAssimilation)
        ));
    }

    #[test]
    fn reorientation_depends_on_open_pool_any_year() {
        let mut open = OpenPools::new();
        assert!(!eligible_for_reorientation(
            TrainingType::Bachelor,
            "ECGE1BA",
            None,
            &open
        ));

        open.insert(AcademicCalendarType::AdmissionPoolExternalReorientation, 2031);
        assert!(eligible_for_reorientation(
            TrainingType::Bachelor,
            "ECGE1BA",
            None,
            &open
        ));
        assert!(!eligible_for_reorientation(
            TrainingType::MasterMa120,
            "ECGE2M",
            None,
            &open
        ));
        assert!(!eligible_for_modification(
            TrainingType::Bachelor,
            "ECGE1BA",
            None,
            &open
        ));
    }
}
