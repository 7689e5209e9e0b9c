use serde::{Deserialize, Serialize};

/// Clinical category derived from the primary diagnosis mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicalCategory {
    MajorJoint,
    NonSurgicalOrtho,
    AcuteInfections,
    Cardiovascular,
    Pulmonary,
    SurgeryNeuro,
    Other,
}

impl ClinicalCategory {
    pub const fn label(self) -> &'static str {
        match self {
            ClinicalCategory::MajorJoint => "major joint replacement or spinal surgery",
            ClinicalCategory::NonSurgicalOrtho => "non-surgical orthopedic",
            ClinicalCategory::AcuteInfections => "acute infections",
            ClinicalCategory::Cardiovascular => "cardiovascular and coagulations",
            ClinicalCategory::Pulmonary => "pulmonary",
            ClinicalCategory::SurgeryNeuro => "non-orthopedic surgery or acute neurologic",
            ClinicalCategory::Other => "other",
        }
    }
}

/// PT/OT case-mix groups, ordered roughly by expected therapy intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TherapyGroup {
    TA,
    TB,
    TC,
    TD,
    TE,
}

impl TherapyGroup {
    pub const fn code(self) -> &'static str {
        match self {
            TherapyGroup::TA => "TA",
            TherapyGroup::TB => "TB",
            TherapyGroup::TC => "TC",
            TherapyGroup::TD => "TD",
            TherapyGroup::TE => "TE",
        }
    }
}

/// Speech-language pathology case-mix groups. `None` means no SLP services
/// are indicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlpGroup {
    None,
    SL1,
    SL2,
}

impl SlpGroup {
    pub const fn code(self) -> &'static str {
        match self {
            SlpGroup::None => "None",
            SlpGroup::SL1 => "SL1",
            SlpGroup::SL2 => "SL2",
        }
    }

    pub const fn indicated(self) -> bool {
        !matches!(self, SlpGroup::None)
    }
}

/// Nursing case-mix groups. ES = extensive services, HBS/LBS = high/low
/// base score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NursingGroup {
    ES1,
    ES2,
    HBS1,
    HBS2,
    LBS1,
    LBS2,
}

impl NursingGroup {
    pub const fn code(self) -> &'static str {
        match self {
            NursingGroup::ES1 => "ES1",
            NursingGroup::ES2 => "ES2",
            NursingGroup::HBS1 => "HBS1",
            NursingGroup::HBS2 => "HBS2",
            NursingGroup::LBS1 => "LBS1",
            NursingGroup::LBS2 => "LBS2",
        }
    }

    pub const fn is_extensive(self) -> bool {
        matches!(self, NursingGroup::ES1 | NursingGroup::ES2)
    }
}

/// Score bands for the non-therapy ancillary score. The raw score is
/// unbounded above; the bands absorb anything past the upper cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NtaBand {
    Low,
    Moderate,
    High,
}

/// Configurable NTA band boundaries. `moderate_from..high_from` is the
/// middle band; defaults follow the 0-5 / 6-11 / 12+ convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NtaBandCutoffs {
    pub moderate_from: u32,
    pub high_from: u32,
}

impl Default for NtaBandCutoffs {
    fn default() -> Self {
        Self {
            moderate_from: 6,
            high_from: 12,
        }
    }
}

impl NtaBand {
    pub fn from_score(score: u32, cutoffs: &NtaBandCutoffs) -> Self {
        if score >= cutoffs.high_from {
            NtaBand::High
        } else if score >= cutoffs.moderate_from {
            NtaBand::Moderate
        } else {
            NtaBand::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            NtaBand::Low => "0-5",
            NtaBand::Moderate => "6-11",
            NtaBand::High => "12+",
        }
    }
}

/// Coarse complexity tier used to select a facility cost model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcuityBand {
    Low,
    Medium,
    High,
    Complex,
}

impl AcuityBand {
    pub fn from_nursing_group(group: NursingGroup) -> Self {
        match group {
            NursingGroup::ES1 | NursingGroup::ES2 => AcuityBand::Complex,
            NursingGroup::HBS1 | NursingGroup::HBS2 => AcuityBand::High,
            NursingGroup::LBS1 => AcuityBand::Medium,
            NursingGroup::LBS2 => AcuityBand::Low,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AcuityBand::Low => "low",
            AcuityBand::Medium => "medium",
            AcuityBand::High => "high",
            AcuityBand::Complex => "complex",
        }
    }
}
