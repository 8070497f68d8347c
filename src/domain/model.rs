use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Age stratum used by the K-WAB norm table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgeBand {
    #[serde(rename = "15-65")]
    Under65,
    #[serde(rename = "65+")]
    From65,
}

impl AgeBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBand::Under65 => "15-65",
            AgeBand::From65 => "65+",
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Education stratum used by the K-WAB norm table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EducationGroup {
    #[serde(rename = "0")]
    NoSchooling,
    #[serde(rename = "1-6")]
    OneToSix,
    #[serde(rename = "7+")]
    SevenPlus,
}

impl EducationGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            EducationGroup::NoSchooling => "0",
            EducationGroup::OneToSix => "1-6",
            EducationGroup::SevenPlus => "7+",
        }
    }
}

impl fmt::Display for EducationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of an AQ score relative to the normative thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SdBand {
    #[serde(rename = ">=-1SD")]
    WithinOneSd,
    #[serde(rename = "-1SD~-2SD")]
    OneToTwoSd,
    #[serde(rename = "<-2SD")]
    BelowTwoSd,
}

impl SdBand {
    pub const ALL: [SdBand; 3] = [SdBand::WithinOneSd, SdBand::OneToTwoSd, SdBand::BelowTwoSd];

    pub fn as_str(&self) -> &'static str {
        match self {
            SdBand::WithinOneSd => ">=-1SD",
            SdBand::OneToTwoSd => "-1SD~-2SD",
            SdBand::BelowTwoSd => "<-2SD",
        }
    }
}

impl fmt::Display for SdBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite key of the norm table, holding the labels exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormKey {
    pub age_band: String,
    pub education_group: String,
}

impl NormKey {
    pub fn new(age_band: impl Into<String>, education_group: impl Into<String>) -> Self {
        Self {
            age_band: age_band.into(),
            education_group: education_group.into(),
        }
    }
}

/// One row of the norm table. The numeric columns are kept verbatim so they
/// can be copied to the output unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NormRow {
    pub age_band: String,
    /// Holds the education group label ("0", "1-6", "7+"), not a year count.
    pub education_years: String,
    pub aq_mean: String,
    pub aq_minus_1sd: String,
    pub aq_minus_2sd: String,
}

impl NormRow {
    pub fn key(&self) -> NormKey {
        NormKey::new(self.age_band.clone(), self.education_years.clone())
    }
}

/// A case row as read from the input file, before any numeric coercion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawCase {
    pub case_id: String,
    pub eval_date: String,
    pub age: String,
    pub education_years: String,
    pub content_delivery_score_0_10: String,
    pub fluency_dialog_score_0_10: String,
    pub fluency_beach_score_0_10: String,
    pub aq_score_0_100: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    pub case_id: String,
    pub eval_date: String,
    pub age: i64,
    pub education_years: i64,
    pub content_delivery_score_0_10: f64,
    pub fluency_dialog_score_0_10: f64,
    pub fluency_beach_score_0_10: f64,
    pub aq_score_0_100: f64,
}

/// Output row. Field order is the output column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub case_id: String,
    pub eval_date: String,
    pub age: i64,
    pub education_years: i64,
    #[serde(serialize_with = "serialize_real")]
    pub content_delivery_score_0_10: f64,
    #[serde(serialize_with = "serialize_real")]
    pub fluency_dialog_score_0_10: f64,
    #[serde(serialize_with = "serialize_real")]
    pub fluency_beach_score_0_10: f64,
    #[serde(serialize_with = "serialize_real")]
    pub fluency_score_avg_0_10: f64,
    #[serde(serialize_with = "serialize_real")]
    pub spontaneous_speech_total_0_20: f64,
    #[serde(serialize_with = "serialize_real")]
    pub aq_score_0_100: f64,
    pub aq_age_band: AgeBand,
    pub aq_education_group: EducationGroup,
    pub aq_mean: String,
    pub aq_minus_1sd: String,
    pub aq_minus_2sd: String,
    pub aq_sd_band: SdBand,
}

fn serialize_real<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&crate::core::numfmt::format_real(*value))
}

/// Everything the transform step needs: the norm table and the raw cases.
#[derive(Debug, Clone)]
pub struct ExtractedData {
    pub norms: crate::core::norms::NormTable,
    pub cases: Vec<RawCase>,
}

/// Number of cases that fell into each SD band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandSummary {
    pub within_one_sd: usize,
    pub one_to_two_sd: usize,
    pub below_two_sd: usize,
}

impl BandSummary {
    pub fn record(&mut self, band: SdBand) {
        match band {
            SdBand::WithinOneSd => self.within_one_sd += 1,
            SdBand::OneToTwoSd => self.one_to_two_sd += 1,
            SdBand::BelowTwoSd => self.below_two_sd += 1,
        }
    }

    pub fn count(&self, band: SdBand) -> usize {
        match band {
            SdBand::WithinOneSd => self.within_one_sd,
            SdBand::OneToTwoSd => self.one_to_two_sd,
            SdBand::BelowTwoSd => self.below_two_sd,
        }
    }

    pub fn total(&self) -> usize {
        self.within_one_sd + self.one_to_two_sd + self.below_two_sd
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub processed_records: Vec<ResultRecord>,
    pub csv_output: Vec<u8>,
    pub band_summary: BandSummary,
}
