use serde::{Deserialize, Serialize};

use super::groups::{ClinicalCategory, NtaBandCutoffs, NursingGroup, TherapyGroup};

/// One ADL band inside a therapy cut-point row. A band matches when the
/// ADL score is `<= max_adl`; rows list bands in ascending order and end
/// with a catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TherapyBand {
    pub max_adl: u8,
    pub group: TherapyGroup,
}

/// Cut-point row crossing a clinical category with independence bands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TherapyCutPointRow {
    pub category: ClinicalCategory,
    pub bands: Vec<TherapyBand>,
}

impl TherapyCutPointRow {
    /// Band lookup; a missing score resolves to the most independent
    /// (first, lowest-acuity) band.
    pub fn group_for(&self, adl_score: Option<u8>) -> TherapyGroup {
        let Some(score) = adl_score else {
            return self.bands.first().map(|band| band.group).unwrap_or(TherapyGroup::TE);
        };
        self.bands
            .iter()
            .find(|band| score <= band.max_adl)
            .or_else(|| self.bands.last())
            .map(|band| band.group)
            .unwrap_or(TherapyGroup::TE)
    }
}

/// A scored NTA comorbidity: ICD-10 prefixes and the fixed point value each
/// matching code contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NtaCondition {
    pub condition: String,
    pub prefixes: Vec<String>,
    pub points: u32,
}

/// Baseline length-of-stay figures by PT group plus special-service adders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LosTable {
    pub base_by_group: Vec<(TherapyGroup, u16)>,
    pub default_base: u16,
    pub dialysis_adder: u16,
    pub wound_vac_adder: u16,
    pub trach_adder: u16,
}

impl LosTable {
    pub fn base_for(&self, group: TherapyGroup) -> u16 {
        self.base_by_group
            .iter()
            .find(|(candidate, _)| *candidate == group)
            .map(|(_, days)| *days)
            .unwrap_or(self.default_base)
    }
}

/// Immutable lookup tables backing the case-mix classifier. Versioned
/// configuration data supplied by the administrative collaborator; the
/// `standard` constructor carries the shipped defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationTables {
    pub diagnosis_categories: Vec<(ClinicalCategory, Vec<String>)>,
    pub therapy_cut_points: Vec<TherapyCutPointRow>,
    pub nursing_categories: Vec<(NursingGroup, Vec<ClinicalCategory>)>,
    pub slp_prefixes: Vec<String>,
    pub nta_conditions: Vec<NtaCondition>,
    pub dialysis_points: u32,
    pub nta_cutoffs: NtaBandCutoffs,
    /// ADL score at or above which extensive services classify as ES1.
    pub extensive_adl_cutoff: u8,
    /// ICD-10 prefixes treated as an active depression diagnosis for the
    /// nursing end-split.
    pub depression_prefixes: Vec<String>,
    /// ADL score at or above which depression promotes a low-base nursing
    /// group to the matching high-base group.
    pub depression_adl_cutoff: u8,
    /// Cognitive screen at or below this value escalates the SLP group.
    pub cognitive_impairment_cutoff: u8,
    pub los: LosTable,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn condition(name: &str, prefixes: &[&str], points: u32) -> NtaCondition {
    NtaCondition {
        condition: name.to_string(),
        prefixes: strings(prefixes),
        points,
    }
}

impl ClassificationTables {
    /// Shipped defaults, distilled from the CMS PDPM mappings the intake
    /// team maintains. Production deployments load facility-specific
    /// versions through configuration.
    pub fn standard() -> Self {
        let diagnosis_categories = vec![
            (
                ClinicalCategory::MajorJoint,
                strings(&["Z96.6", "M96.6", "Z47.1", "T84"]),
            ),
            (
                ClinicalCategory::NonSurgicalOrtho,
                strings(&["M16", "M17", "M19", "M25", "M54", "S72", "S82"]),
            ),
            (
                ClinicalCategory::AcuteInfections,
                strings(&["A40", "A41", "J15", "J18", "L03", "N39.0"]),
            ),
            (
                ClinicalCategory::Cardiovascular,
                strings(&["I50", "I48", "I21", "I63", "I25", "I10"]),
            ),
            (
                ClinicalCategory::Pulmonary,
                strings(&["J44", "J96", "J45", "J81"]),
            ),
            (
                ClinicalCategory::SurgeryNeuro,
                strings(&["I60", "I61", "I62", "G81", "G83"]),
            ),
        ];

        let therapy_cut_points = vec![
            cut_points(ClinicalCategory::MajorJoint, [TherapyGroup::TA, TherapyGroup::TA, TherapyGroup::TB]),
            cut_points(ClinicalCategory::NonSurgicalOrtho, [TherapyGroup::TB, TherapyGroup::TB, TherapyGroup::TC]),
            cut_points(ClinicalCategory::AcuteInfections, [TherapyGroup::TC, TherapyGroup::TC, TherapyGroup::TD]),
            cut_points(ClinicalCategory::SurgeryNeuro, [TherapyGroup::TC, TherapyGroup::TD, TherapyGroup::TD]),
            cut_points(ClinicalCategory::Cardiovascular, [TherapyGroup::TD, TherapyGroup::TD, TherapyGroup::TE]),
            cut_points(ClinicalCategory::Pulmonary, [TherapyGroup::TD, TherapyGroup::TD, TherapyGroup::TE]),
            cut_points(ClinicalCategory::Other, [TherapyGroup::TE, TherapyGroup::TE, TherapyGroup::TE]),
        ];

        let nursing_categories = vec![
            (
                NursingGroup::HBS1,
                vec![ClinicalCategory::SurgeryNeuro, ClinicalCategory::MajorJoint],
            ),
            (
                NursingGroup::HBS2,
                vec![ClinicalCategory::Cardiovascular, ClinicalCategory::Pulmonary],
            ),
            (NursingGroup::LBS1, vec![ClinicalCategory::NonSurgicalOrtho]),
            (NursingGroup::LBS2, vec![ClinicalCategory::AcuteInfections]),
        ];

        let slp_prefixes = strings(&["R13", "R47", "R48", "F80", "I69"]);

        let nta_conditions = vec![
            condition("pneumonia", &["J15", "J18"], 5),
            condition("septicemia", &["A40", "A41"], 6),
            condition("diabetes", &["E10", "E11"], 3),
            condition("copd", &["J44"], 4),
            condition("uti", &["N39.0"], 4),
            condition("chf", &["I50"], 5),
            condition("hiv", &["B20"], 6),
            condition("multiple sclerosis", &["G35"], 6),
            condition("parkinsons", &["G20"], 5),
            condition("hemiplegia", &["G81"], 6),
            condition("aphasia", &["R47.01"], 5),
            condition("malnutrition", &["E46"], 4),
            condition("depression", &["F32"], 3),
            condition("bipolar", &["F31"], 4),
            condition("schizophrenia", &["F20"], 4),
        ];

        Self {
            diagnosis_categories,
            therapy_cut_points,
            nursing_categories,
            slp_prefixes,
            nta_conditions,
            dialysis_points: 8,
            nta_cutoffs: NtaBandCutoffs::default(),
            extensive_adl_cutoff: 15,
            depression_prefixes: strings(&["F31", "F32", "F33"]),
            depression_adl_cutoff: 10,
            cognitive_impairment_cutoff: 7,
            los: LosTable {
                base_by_group: vec![
                    (TherapyGroup::TA, 12),
                    (TherapyGroup::TB, 14),
                    (TherapyGroup::TC, 18),
                    (TherapyGroup::TD, 16),
                    (TherapyGroup::TE, 15),
                ],
                default_base: 15,
                dialysis_adder: 5,
                wound_vac_adder: 3,
                trach_adder: 7,
            },
        }
    }

    pub fn category_for(&self, code: &str) -> Option<ClinicalCategory> {
        for (category, prefixes) in &self.diagnosis_categories {
            if prefixes.iter().any(|prefix| code.starts_with(prefix.as_str())) {
                return Some(*category);
            }
        }
        None
    }

    pub fn therapy_row(&self, category: ClinicalCategory) -> Option<&TherapyCutPointRow> {
        self.therapy_cut_points
            .iter()
            .find(|row| row.category == category)
    }

    pub fn nursing_group_for(&self, category: ClinicalCategory) -> Option<NursingGroup> {
        self.nursing_categories
            .iter()
            .find(|(_, categories)| categories.contains(&category))
            .map(|(group, _)| *group)
    }
}

/// Three-band row over the standard independence cuts: independent
/// (ADL <= 7), moderate (8-14), dependent (15+).
fn cut_points(category: ClinicalCategory, groups: [TherapyGroup; 3]) -> TherapyCutPointRow {
    TherapyCutPointRow {
        category,
        bands: vec![
            TherapyBand {
                max_adl: 7,
                group: groups[0],
            },
            TherapyBand {
                max_adl: 14,
                group: groups[1],
            },
            TherapyBand {
                max_adl: u8::MAX,
                group: groups[2],
            },
        ],
    }
}
