mod groups;
mod tables;

pub use groups::{
    AcuityBand, ClinicalCategory, NtaBand, NtaBandCutoffs, NursingGroup, SlpGroup, TherapyGroup,
};
pub use tables::{ClassificationTables, LosTable, NtaCondition, TherapyBand, TherapyCutPointRow};

use serde::{Deserialize, Serialize};

use super::domain::{ClinicalFeatures, SpecialServices};

/// Case-mix groups resolved for one admission. Every field resolves to a
/// member of its enumeration; unmapped inputs fall back to the defined
/// lowest-acuity defaults and are reported through the warnings channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseMixClassification {
    pub pt_group: TherapyGroup,
    pub ot_group: TherapyGroup,
    pub slp_group: SlpGroup,
    pub nursing_group: NursingGroup,
    pub nta_score: u32,
    pub nta_band: NtaBand,
    pub clinical_category: ClinicalCategory,
    /// Special-care flags carried forward so downstream calculators do not
    /// reach back into the raw clinical record.
    pub special_care: SpecialServices,
}

impl CaseMixClassification {
    pub fn acuity_band(&self) -> AcuityBand {
        AcuityBand::from_nursing_group(self.nursing_group)
    }
}

/// Stateless classifier applying the configured lookup tables to a
/// clinical feature set. Never fails; degraded inputs produce warnings.
#[derive(Debug, Clone)]
pub struct CaseMixClassifier {
    tables: ClassificationTables,
}

impl CaseMixClassifier {
    pub fn new(tables: ClassificationTables) -> Self {
        Self { tables }
    }

    pub fn standard() -> Self {
        Self::new(ClassificationTables::standard())
    }

    pub fn tables(&self) -> &ClassificationTables {
        &self.tables
    }

    /// Resolve the full case-mix classification. Returns the classification
    /// alongside non-fatal warnings accumulated while defaulting unmapped
    /// or missing inputs.
    pub fn classify(&self, features: &ClinicalFeatures) -> (CaseMixClassification, Vec<String>) {
        let mut warnings = Vec::new();

        let clinical_category = self.resolve_category(features, &mut warnings);
        let (pt_group, ot_group) = self.therapy_groups(features, clinical_category, &mut warnings);
        let slp_group = self.slp_group(features);
        let nursing_group = self.nursing_group(features, clinical_category);
        let nta_score = self.nta_score(features);
        let nta_band = NtaBand::from_score(nta_score, &self.tables.nta_cutoffs);

        let classification = CaseMixClassification {
            pt_group,
            ot_group,
            slp_group,
            nursing_group,
            nta_score,
            nta_band,
            clinical_category,
            special_care: features.special_services,
        };

        (classification, warnings)
    }

    /// Baseline stay estimate for what-if projections when the caller has
    /// no authorized length of stay yet.
    pub fn estimate_los(&self, classification: &CaseMixClassification) -> u16 {
        let mut los = self.tables.los.base_for(classification.pt_group);
        let services = classification.special_care;
        if services.dialysis {
            los += self.tables.los.dialysis_adder;
        }
        if services.wound_vac {
            los += self.tables.los.wound_vac_adder;
        }
        if services.trach {
            los += self.tables.los.trach_adder;
        }
        los
    }

    fn resolve_category(
        &self,
        features: &ClinicalFeatures,
        warnings: &mut Vec<String>,
    ) -> ClinicalCategory {
        if let Some(category) = self.tables.category_for(&features.primary_diagnosis) {
            return category;
        }

        // The primary diagnosis drives payment; comorbidity matches are a
        // fallback before defaulting.
        for code in &features.comorbidities {
            if let Some(category) = self.tables.category_for(code) {
                warnings.push(format!(
                    "primary diagnosis {} is not mapped; clinical category {} taken from comorbidity {}",
                    features.primary_diagnosis,
                    category.label(),
                    code
                ));
                return category;
            }
        }

        warnings.push(format!(
            "diagnosis {} is not mapped to a clinical category; defaulting to other",
            features.primary_diagnosis
        ));
        ClinicalCategory::Other
    }

    fn therapy_groups(
        &self,
        features: &ClinicalFeatures,
        category: ClinicalCategory,
        warnings: &mut Vec<String>,
    ) -> (TherapyGroup, TherapyGroup) {
        let adl = features.functional_status.adl_score;
        if adl.is_none() {
            warnings.push(
                "missing ADL score; PT/OT groups default to the most independent band".to_string(),
            );
        }

        let group = self
            .tables
            .therapy_row(category)
            .map(|row| row.group_for(adl))
            .unwrap_or(TherapyGroup::TE);

        // PT and OT track the same clinical category and function bands.
        (group, group)
    }

    fn slp_group(&self, features: &ClinicalFeatures) -> SlpGroup {
        let comorbidity_match = features.comorbidities.iter().any(|code| {
            self.tables
                .slp_prefixes
                .iter()
                .any(|prefix| code.starts_with(prefix.as_str()))
        });

        if !comorbidity_match && !features.therapy_needs.speech {
            return SlpGroup::None;
        }

        match features.functional_status.cognitive_score {
            Some(score) if score <= self.tables.cognitive_impairment_cutoff => SlpGroup::SL2,
            _ => SlpGroup::SL1,
        }
    }

    fn nursing_group(
        &self,
        features: &ClinicalFeatures,
        category: ClinicalCategory,
    ) -> NursingGroup {
        let adl = features.functional_status.adl_score;

        if features.special_services.extensive() {
            return match adl {
                Some(score) if score >= self.tables.extensive_adl_cutoff => NursingGroup::ES1,
                _ => NursingGroup::ES2,
            };
        }

        let base = self
            .tables
            .nursing_group_for(category)
            .unwrap_or(NursingGroup::LBS2);

        // Depression end-split: an active mood diagnosis on a dependent
        // resident promotes the low-base groups.
        let depressed = features.comorbidities.iter().any(|code| {
            self.tables
                .depression_prefixes
                .iter()
                .any(|prefix| code.starts_with(prefix.as_str()))
        });
        let dependent = adl
            .map(|score| score >= self.tables.depression_adl_cutoff)
            .unwrap_or(false);

        match (base, depressed && dependent) {
            (NursingGroup::LBS1, true) => NursingGroup::HBS1,
            (NursingGroup::LBS2, true) => NursingGroup::HBS2,
            (group, _) => group,
        }
    }

    fn nta_score(&self, features: &ClinicalFeatures) -> u32 {
        let mut score = 0;

        for code in &features.comorbidities {
            for condition in &self.tables.nta_conditions {
                if condition
                    .prefixes
                    .iter()
                    .any(|prefix| code.starts_with(prefix.as_str()))
                {
                    score += condition.points;
                }
            }
        }

        if features.special_services.dialysis {
            score += self.tables.dialysis_points;
        }

        score
    }
}
