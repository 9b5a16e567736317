//! Legal statements a candidate acknowledges at submission, and their validation.

pub mod texts;

use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{AssimilationSituation, Proposition, PropositionKind};
use super::errors::{AdmissionError, InscriptionError};
use super::ports::{CandidateProfileTranslator, TrainingTranslator};
use super::repository::RepositoryError;
use crate::calendar::{AcademicCalendarType, TrainingType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Checkbox,
    Radio,
}

/// View computed per request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationElement {
    pub name: &'static str,
    pub text: String,
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<&'static str>>,
    #[serde(rename = "type")]
    pub element_type: ElementType,
}

impl ConfirmationElement {
    fn checkbox(name: &'static str, text: impl Into<String>) -> Self {
        Self {
            name,
            text: text.into(),
            title: texts::title(name),
            answers: None,
            element_type: ElementType::Checkbox,
        }
    }

    fn radio(name: &'static str, text: impl Into<String>, answers: &[&'static str]) -> Self {
        Self {
            name,
            text: text.into(),
            title: texts::title(name),
            answers: Some(answers.to_vec()),
            element_type: ElementType::Radio,
        }
    }

    /// Values accepted for this element in a submitted answer map.
    pub fn accepted_values(&self) -> Vec<String> {
        match &self.answers {
            Some(answers) => answers
                .iter()
                .map(|answer| format!("{answer} {}", self.text))
                .collect(),
            None => vec![self.text.clone()],
        }
    }

    fn accepts(&self, submitted: Option<&String>) -> bool {
        let Some(value) = submitted else {
            return false;
        };
        match self.element_type {
            ElementType::Checkbox => *value == self.text,
            ElementType::Radio => self.accepted_values().iter().any(|accepted| accepted == value),
        }
    }
}

/// Pools whose candidates are exempt from the application fee.
const FEE_EXEMPT_POOLS: [AcademicCalendarType; 4] = [
    AcademicCalendarType::AdmissionPoolNonResidentQuota,
    AcademicCalendarType::AdmissionPoolVip,
    AcademicCalendarType::AdmissionPoolExternalEnrollmentChange,
    AcademicCalendarType::AdmissionPoolExternalReorientation,
];

/// Ordered list of statements the candidate must acknowledge.
pub fn retrieve<T, P>(
    proposition: &Proposition,
    trainings: &T,
    profile: &P,
    submitted_year: Option<i32>,
) -> Result<Vec<ConfirmationElement>, RepositoryError>
where
    T: TrainingTranslator + ?Sized,
    P: CandidateProfileTranslator + ?Sized,
{
    let mut elements = Vec::new();
    let identification = match proposition.kind {
        PropositionKind::GeneralEducation(_) => {
            Some(profile.identification(&proposition.candidate_id)?)
        }
        _ => None,
    };
    let continuing = proposition.is_continuing_education();

    let year = submitted_year.or(proposition.computed_year);
    if let Some(year) = year {
        if !continuing && year > proposition.training.year {
            let range = match year.checked_add(1) {
                Some(next) => format!("{year}-{next}"),
                None => year.to_string(),
            };
            elements.push(ConfirmationElement::checkbox(
                "hors_delai",
                texts::render(texts::HORS_DELAI, &[("year", range.as_str())]),
            ));
        }
    }

    if proposition.is_doctorate() {
        elements.push(ConfirmationElement::checkbox(
            "reglement_doctorat",
            texts::REGLEMENT_DOCTORAT,
        ));
        elements.push(ConfirmationElement::checkbox(
            "reglement_doctorat_deontologie",
            texts::REGLEMENT_DOCTORAT_DEONTOLOGIE,
        ));
    } else {
        elements.push(ConfirmationElement::checkbox(
            "reglement_general",
            texts::REGLEMENT_GENERAL,
        ));
    }

    elements.push(ConfirmationElement::checkbox(
        "protection_donnees",
        texts::PROTECTION_DONNEES,
    ));
    elements.push(ConfirmationElement::checkbox(
        "professions_reglementees",
        texts::PROFESSIONS_REGLEMENTEES,
    ));

    if let (Some(answers), Some(identification)) =
        (proposition.general_answers(), identification.as_ref())
    {
        let exempt_pool = proposition
            .computed_pool
            .map(|pool| FEE_EXEMPT_POOLS.contains(&pool))
            .unwrap_or(false);
        let not_assimilated = answers.assimilation == Some(AssimilationSituation::AucuneAssimilation);

        if !exempt_pool && not_assimilated && !identification.nationality_is_eu {
            let training = trainings.get(&proposition.training)?;
            if training.training_type != TrainingType::MasterMc {
                elements.push(ConfirmationElement::checkbox(
                    "frais_dossier",
                    texts::FRAIS_DOSSIER,
                ));
            }
        }
    }

    if medicine_or_dentistry_cycle(proposition, trainings)? {
        elements.push(ConfirmationElement::checkbox(
            "convention_cadre_stages",
            texts::CONVENTION_CADRE_STAGE,
        ));
        elements.push(ConfirmationElement::checkbox(
            "communication_hopitaux",
            texts::COMMUNICATION_HOPITAUX,
        ));
    }

    if proposition.computed_pool == Some(AcademicCalendarType::AdmissionPoolNonResidentQuota) {
        elements.push(ConfirmationElement::checkbox(
            "documents_etudes_contingentees",
            texts::DOCUMENTS_ETUDES_CONTINGENTEES,
        ));
    }

    if identification
        .as_ref()
        .map(|identification| identification.concerned_by_visa)
        .unwrap_or(false)
    {
        elements.push(ConfirmationElement::checkbox("visa", texts::VISA));
    }

    if !continuing
        && profile.has_french_speaking_belgian_secondary_studies(&proposition.candidate_id)?
    {
        elements.push(ConfirmationElement::radio(
            "communication_ecole_secondaire",
            texts::COMMUNICATION_ECOLE_SECONDAIRE,
            &texts::SECONDARY_SCHOOL_ANSWERS,
        ));
    }

    let (by_service, to_service) = if continuing {
        (texts::BY_FACULTY, texts::TO_FACULTY)
    } else {
        (texts::BY_ENROLMENT_OFFICE, texts::TO_REGISTRATION_SERVICE)
    };
    elements.push(ConfirmationElement::checkbox(
        "justificatifs",
        texts::render(texts::JUSTIFICATIFS, &[("by_service", by_service)]),
    ));
    elements.push(ConfirmationElement::checkbox(
        "declaration_sur_lhonneur",
        texts::render(texts::DECLARATION_SUR_LHONNEUR, &[("to_service", to_service)]),
    ));

    if continuing {
        elements.push(ConfirmationElement::checkbox(
            "droits_inscription_iufc",
            texts::DROITS_INSCRIPTION_IUFC,
        ));
    }

    Ok(elements)
}

/// Fails with a single generic error on any difference with [`retrieve`].
pub fn validate<T, P>(
    submitted: &BTreeMap<String, String>,
    proposition: &Proposition,
    submitted_year: Option<i32>,
    trainings: &T,
    profile: &P,
) -> Result<(), InscriptionError>
where
    T: TrainingTranslator + ?Sized,
    P: CandidateProfileTranslator + ?Sized,
{
    let expected = retrieve(proposition, trainings, profile, submitted_year)?;
    if submitted.len() != expected.len() {
        return Err(AdmissionError::ConfirmationElementsMismatch.into());
    }

    for element in &expected {
        if !element.accepts(submitted.get(element.name)) {
            return Err(AdmissionError::ConfirmationElementsMismatch.into());
        }
    }

    Ok(())
}

fn medicine_or_dentistry_cycle<T>(
    proposition: &Proposition,
    trainings: &T,
) -> Result<bool, RepositoryError>
where
    T: TrainingTranslator + ?Sized,
{
    if !proposition.is_general_education() || proposition.computed_year.is_none() {
        return Ok(false);
    }
    let training = trainings.get(&proposition.training)?;
    Ok(training.is_medicine_or_dentistry && training.training_type.is_medicine_dentistry_cycle())
}

/// Answer map that [`validate`] accepts for `elements`, picking the first radio answer.
pub fn expected_answers(elements: &[ConfirmationElement]) -> BTreeMap<String, String> {
    elements
        .iter()
        .filter_map(|element| {
            element
                .accepted_values()
                .into_iter()
                .next()
                .map(|value| (element.name.to_string(), value))
        })
        .collect()
}
