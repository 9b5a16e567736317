use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Calendar events backing the admission pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcademicCalendarType {
    DoctorateEducationEnrollment,
    ContinuingEducationEnrollment,
    AdmissionPoolExternalEnrollmentChange,
    AdmissionPoolExternalReorientation,
    AdmissionPoolMedicineDentistryStandardPeriod,
    AdmissionPoolVip,
    AdmissionPoolHueUclPathwayChange,
    AdmissionPoolInstitutChange,
    AdmissionPoolUe5Belgian,
    AdmissionPoolUe5NonBelgian,
    AdmissionPoolHue5BelgiumResidency,
    AdmissionPoolHue5ForeignResidency,
    AdmissionPoolNonResidentQuota,
}

impl AcademicCalendarType {
    pub const ALL: [AcademicCalendarType; 13] = [
        AcademicCalendarType::DoctorateEducationEnrollment,
        AcademicCalendarType::ContinuingEducationEnrollment,
        AcademicCalendarType::AdmissionPoolExternalEnrollmentChange,
        AcademicCalendarType::AdmissionPoolExternalReorientation,
        AcademicCalendarType::AdmissionPoolMedicineDentistryStandardPeriod,
        AcademicCalendarType::AdmissionPoolVip,
        AcademicCalendarType::AdmissionPoolHueUclPathwayChange,
        AcademicCalendarType::AdmissionPoolInstitutChange,
        AcademicCalendarType::AdmissionPoolUe5Belgian,
        AcademicCalendarType::AdmissionPoolUe5NonBelgian,
        AcademicCalendarType::AdmissionPoolHue5BelgiumResidency,
        AcademicCalendarType::AdmissionPoolHue5ForeignResidency,
        AcademicCalendarType::AdmissionPoolNonResidentQuota,
    ];

    /// Stable reference shared with the academic calendar read model.
    pub const fn event_reference(self) -> &'static str {
        match self {
            Self::DoctorateEducationEnrollment => "DOCTORATE_EDUCATION_ENROLLMENT",
            Self::ContinuingEducationEnrollment => "CONTINUING_EDUCATION_ENROLLMENT",
            Self::AdmissionPoolExternalEnrollmentChange => "ADMISSION_POOL_EXTERNAL_ENROLLMENT_CHANGE",
            Self::AdmissionPoolExternalReorientation => "ADMISSION_POOL_EXTERNAL_REORIENTATION",
            Self::AdmissionPoolMedicineDentistryStandardPeriod => {
                "ADMISSION_POOL_MEDICINE_DENTISTRY_STANDARD_PERIOD"
            }
            Self::AdmissionPoolVip => "ADMISSION_POOL_VIP",
            Self::AdmissionPoolHueUclPathwayChange => "ADMISSION_POOL_HUE_UCL_PATHWAY_CHANGE",
            Self::AdmissionPoolInstitutChange => "ADMISSION_POOL_INSTITUT_CHANGE",
            Self::AdmissionPoolUe5Belgian => "ADMISSION_POOL_UE5_BELGIAN",
            Self::AdmissionPoolUe5NonBelgian => "ADMISSION_POOL_UE5_NON_BELGIAN",
            Self::AdmissionPoolHue5BelgiumResidency => "ADMISSION_POOL_HUE5_BELGIUM_RESIDENCY",
            Self::AdmissionPoolHue5ForeignResidency => "ADMISSION_POOL_HUE5_FOREIGN_RESIDENCY",
            Self::AdmissionPoolNonResidentQuota => "ADMISSION_POOL_NON_RESIDENT_QUOTA",
        }
    }

    /// Human readable title used when seeding calendar entries.
    pub const fn label(self) -> &'static str {
        match self {
            Self::DoctorateEducationEnrollment => "Admission - Doctorat",
            Self::ContinuingEducationEnrollment => "Admission - Formation continue",
            Self::AdmissionPoolExternalEnrollmentChange => {
                "Admission - Modification d'inscription externe"
            }
            Self::AdmissionPoolExternalReorientation => "Admission - Réorientation externe",
            Self::AdmissionPoolMedicineDentistryStandardPeriod => {
                "Admission - Bachelier médecine et dentisterie, période standard"
            }
            Self::AdmissionPoolVip => "Admission - VIP (DD, ErasmusM, boursierI)",
            Self::AdmissionPoolHueUclPathwayChange => {
                "Admission - HUE changement de filière au sein de l'UCLouvain"
            }
            Self::AdmissionPoolInstitutChange => "Admission - Changement d'établissement",
            Self::AdmissionPoolUe5Belgian => "Admission - Nationalité UE+5 et diplôme d'accès belge",
            Self::AdmissionPoolUe5NonBelgian => {
                "Admission - Nationalité UE+5 et diplôme d'accès non-belge"
            }
            Self::AdmissionPoolHue5BelgiumResidency => {
                "Admission - Nationalité Hors(UE+5) et résidence en Belgique"
            }
            Self::AdmissionPoolHue5ForeignResidency => {
                "Admission - Nationalité Hors(UE+5) et résidence à l'étranger"
            }
            Self::AdmissionPoolNonResidentQuota => {
                "Admission - Contingenté non-résident (au sens du décret)"
            }
        }
    }
}

impl fmt::Display for AcademicCalendarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_reference())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown academic calendar reference '{0}'")]
pub struct UnknownCalendarReference(pub String);

impl FromStr for AcademicCalendarType {
    type Err = UnknownCalendarReference;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.event_reference().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownCalendarReference(trimmed.to_string()))
    }
}

/// Education group types handled by admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainingType {
    Bachelor,
    #[serde(rename = "MASTER_MA_120")]
    MasterMa120,
    #[serde(rename = "MASTER_MD_120")]
    MasterMd120,
    #[serde(rename = "MASTER_MS_120")]
    MasterMs120,
    #[serde(rename = "MASTER_MS_180_240")]
    MasterMs180240,
    #[serde(rename = "MASTER_M1")]
    MasterM1,
    MasterMc,
    #[serde(rename = "MASTER_M4")]
    MasterM4,
    #[serde(rename = "MASTER_M5")]
    MasterM5,
    Aggregation,
    Capaes,
    UniversityFirstCycleCertificate,
    UniversitySecondCycleCertificate,
    CertificateOfParticipation,
    CertificateOfSuccess,
    CertificateOfHoldingCredits,
    ResearchCertificate,
    Certificate,
    Phd,
}

impl TrainingType {
    pub const ALL: [TrainingType; 19] = [
        TrainingType::Bachelor,
        TrainingType::MasterMa120,
        TrainingType::MasterMd120,
        TrainingType::MasterMs120,
        TrainingType::MasterMs180240,
        TrainingType::MasterM1,
        TrainingType::MasterMc,
        TrainingType::MasterM4,
        TrainingType::MasterM5,
        TrainingType::Aggregation,
        TrainingType::Capaes,
        TrainingType::UniversityFirstCycleCertificate,
        TrainingType::UniversitySecondCycleCertificate,
        TrainingType::CertificateOfParticipation,
        TrainingType::CertificateOfSuccess,
        TrainingType::CertificateOfHoldingCredits,
        TrainingType::ResearchCertificate,
        TrainingType::Certificate,
        TrainingType::Phd,
    ];

    pub const fn is_master(self) -> bool {
        matches!(
            self,
            Self::MasterMa120
                | Self::MasterMd120
                | Self::MasterMs120
                | Self::MasterMs180240
                | Self::MasterM1
                | Self::MasterMc
                | Self::MasterM4
                | Self::MasterM5
        )
    }

    /// Second cycle programs, the only ones open to scholarship (VIP) admissions.
    pub const fn is_second_cycle(self) -> bool {
        self.is_master()
            || matches!(
                self,
                Self::Aggregation | Self::Capaes | Self::UniversitySecondCycleCertificate
            )
    }

    pub const fn is_continuing_education(self) -> bool {
        matches!(
            self,
            Self::CertificateOfParticipation
                | Self::CertificateOfSuccess
                | Self::CertificateOfHoldingCredits
                | Self::UniversityFirstCycleCertificate
                | Self::UniversitySecondCycleCertificate
        )
    }

    pub const fn is_doctorate(self) -> bool {
        matches!(self, Self::Phd)
    }

    /// Bachelor or master variants covered by the medicine/dentistry internship agreements.
    pub const fn is_medicine_dentistry_cycle(self) -> bool {
        matches!(self, Self::Bachelor) || self.is_master()
    }
}

/// Access title conditions fulfilled by the candidate's curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionAccess {
    DiplomationPotentielMasterBelge,
    PotentielMasterBelgeSansDiplomation,
    DiplomationSecondaireBelge,
    DiplomationAcademiqueBelge,
    PotentielBachelierBelgeSansDiplomation,
    DiplomationPotentielDoctoratBelge,
    PotentielAccesVae,
    AlternativeEtudesSecondaires,
    DiplomationSecondaireUe,
    DiplomationSecondaireNonUe,
    DiplomationAcademiqueEtrangere,
    DiplomationPotentielMasterEtranger,
    PotentielMasterEtrangerSansDiplomation,
    DiplomationPotentielDoctoratEtranger,
    PotentielDoctoratEtrangerSansDiplomation,
}

impl ConditionAccess {
    pub fn is_belgian(self) -> bool {
        BELGIAN_ACCESS_DIPLOMAS.contains(&self)
    }
}

pub const BELGIAN_ACCESS_DIPLOMAS: [ConditionAccess; 8] = [
    ConditionAccess::DiplomationPotentielMasterBelge,
    ConditionAccess::PotentielMasterBelgeSansDiplomation,
    ConditionAccess::DiplomationSecondaireBelge,
    ConditionAccess::DiplomationAcademiqueBelge,
    ConditionAccess::PotentielBachelierBelgeSansDiplomation,
    ConditionAccess::DiplomationPotentielDoctoratBelge,
    ConditionAccess::PotentielAccesVae,
    ConditionAccess::AlternativeEtudesSecondaires,
];

/// Programs with a capped non-resident intake.
pub const SIGLES_WITH_QUOTA: [&str; 3] = ["KINE1BA", "VETE1BA", "LOGO1BA"];

/// Nationalities treated like EU members for pool purposes.
pub const PLUS_5_ISO_CODES: [&str; 5] = ["CH", "IS", "NO", "LI", "MC"];

pub const BE_ISO_CODE: &str = "BE";
