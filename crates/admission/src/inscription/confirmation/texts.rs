//! Legal statements shown at submission. Their wording is a compliance artifact: bump
//! [`LEGAL_TEXTS_VERSION`] whenever a text changes.

pub const LEGAL_TEXTS_VERSION: &str = "2024.1";

pub const HORS_DELAI: &str = "In accordance with the registration calendar \
<a href=\"https://uclouvain.be/en/study/inscriptions/calendrier-inscriptions.html\" target=\"_blank\">\
www.uclouvain.be/enrolment-calendar</a>, I confirm that I am applying for the academic year %(year)s.";

pub const REGLEMENT_DOCTORAT: &str = "I hereby declare that I have read and understood the regulations of \
the General PhD Committee and the specific requirements of the PhD Field Committee, to which I adhere.";

pub const REGLEMENT_DOCTORAT_DEONTOLOGIE: &str = "I confirm that I have read the PhD regulations on research \
ethics and certify that my project complies with these regulations.";

pub const REGLEMENT_GENERAL: &str = "In accordance with the information at <a target=\"_blank\" href=\"\
https://uclouvain.be/en/study/inscriptions/reglementations.html\">\
https://uclouvain.be/en/study/inscriptions/reglementations.html</a>, \
I declare that I have read the university regulations and accept their terms.";

pub const PROTECTION_DONNEES: &str = "In accordance with the information at <a target=\"_blank\" href=\"\
https://uclouvain.be/en/study/inscriptions/vie-privee.html\">\
https://uclouvain.be/en/study/inscriptions/vie-privee.html</a>, \
I declare that I have read the data protection policy of the Universite catholique de Louvain and accept \
its terms.";

pub const PROFESSIONS_REGLEMENTEES: &str = "In accordance with the information at <a target=\"_blank\" href=\"\
https://uclouvain.be/en/study/inscriptions/acces-aux-professions-reglementees.html\">\
https://uclouvain.be/en/study/inscriptions/acces-aux-professions-reglementees.html</a>, I declare that, if \
the courses listed therein concern me, I have received the information relating to their requirements \
for admission or continuation and to the specific rules or restrictions of accreditation or professional \
establishment to which the professional or accredited title is subject and I accept the terms thereof.";

pub const FRAIS_DOSSIER: &str = "I am aware that as an applicant without a European Union nationality or \
Belgian student status, I am required to pay an application fee of &euro;200 via online payment. The \
application fee must be received by UCLouvain within 15 calendar days. Otherwise, my application will not \
be considered. For more information: \
<a href=\"https://uclouvain.be/en/study/inscriptions/tuition-fees-non-eu-students.html\" \
target=\"_blank\">https://uclouvain.be/en/study/inscriptions/tuition-fees-non-eu-students.html</a>.";

pub const CONVENTION_CADRE_STAGE: &str = "I have read and understood the latest version of the Internship \
Framework Agreement between UCLouvain and the Host Hospitals drawn up as part of the UCLouvain bachelor's \
or master's course in medicine with a view to acquiring the corresponding course units, and I undertake \
to comply with its terms: \
<a href=\"https://cdn.uclouvain.be/groups/cms-editors-mede/ConventionStageMed.pdf\" \
target=\"_blank\">https://cdn.uclouvain.be/groups/cms-editors-mede/ConventionStageMed.pdf</a>";

pub const COMMUNICATION_HOPITAUX: &str = "I am aware that the UCLouvain Faculty of Medicine and Dentistry \
has provided certain personal details (surname(s), first name(s), NOMA, date of birth, place of birth, \
address) to the Host Hospitals in order to establish the various user rights that I will need as part of \
my internships, in compliance with the General Data Protection Regulation (GDPR) and the law of 30 July \
2018 on the protection of individuals with regard to the processing of personal data. My data is kept for \
the time necessary for the proper performance of the internship and is never transmitted to parties other \
than those mentioned above. Appropriate technical and organisational measures are put in place to ensure \
an adequate level of protection for this data.";

pub const DOCUMENTS_ETUDES_CONTINGENTEES: &str = "I am aware that no additional documents specific to \
limited-enrolment courses can be added once my online application has been confirmed.";

pub const VISA: &str = "I am aware that the university may verify with third parties all of the \
application information I provide. In this context, I understand UCLouvain reserves the right to send the \
information or documents in my application to the selected diplomatic post (e.g. diplomas, transcripts, \
enrolment authorisation, etc.) in order to ensure their authenticity.";

pub const COMMUNICATION_ECOLE_SECONDAIRE: &str = "UCLouvain to forward to the secondary school at which I \
obtained my Belgian secondary school, information relating to the successful completion of the first year \
of the bachelor's course, and any academic degree obtained with the possible mention of";

pub const JUSTIFICATIFS: &str = "I undertake to send any supporting documents requested %(by_service)s \
<strong>within 15 calendar days</strong>. If I fail to do so, I acknowledge and accept that my application \
will be considered inadmissible in accordance with Article 9 of the Academic Regulations and Procedures \
(RGEE).";

pub const DECLARATION_SUR_LHONNEUR: &str = "<ul><li>the information I have provided is accurate and \
complete. UCLouvain reserves the right to verify the information contained in the application with third \
parties</li><li>I have uploaded all relevant documents confirming the information provided</li>\
<li>I undertake to inform %(to_service)s of any changes to the information in my application</li></ul>";

pub const DROITS_INSCRIPTION_IUFC: &str = "By finalising my application, I undertake to pay the \
registration fees upon receipt of the invoice (provided my application is accepted). In case of \
cancellation, the modalities depend on the faculties.";

pub const SECONDARY_SCHOOL_ANSWERS: [&str; 2] = ["I authorise", "I do not authorize"];

pub const BY_FACULTY: &str = "by the faculty";
pub const BY_ENROLMENT_OFFICE: &str = "by the Enrolment Office";
pub const TO_FACULTY: &str = "to the faculty";
pub const TO_REGISTRATION_SERVICE: &str = "to the UCLouvain Registration Service";

/// Display heading of an element.
pub fn title(name: &str) -> &'static str {
    match name {
        "reglement_doctorat" => "Doctorate Regulations",
        "reglement_doctorat_deontologie" => "Doctorate Ethics Regulations",
        "reglement_general" => "Academic Regulations",
        "protection_donnees" => "Data protection",
        "professions_reglementees" => "Admission to regulated professions",
        "frais_dossier" => "Application fee",
        "convention_cadre_stages" => "Internship Framework Agreement",
        "communication_hopitaux" => "Communication with Host Hospitals",
        "documents_etudes_contingentees" => "Documents specific to limited-enrolment courses",
        "communication_ecole_secondaire" => "Communication with your secondary school",
        "justificatifs" => "Supporting documents",
        "declaration_sur_lhonneur" => "I hereby declare that",
        "droits_inscription_iufc" => "Registration fees",
        "visa" => "Communication with the diplomatic post for your visa application",
        _ => "",
    }
}

/// Substitute `%(name)s` placeholders. Unknown placeholders are left untouched.
pub fn render(template: &str, params: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in params {
        rendered = rendered.replace(&format!("%({key})s"), value);
    }
    rendered
}
