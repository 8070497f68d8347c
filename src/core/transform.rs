use crate::core::classify::{age_band, edu_group, sd_band};
use crate::core::norms::{NormTable, SdThresholds};
use crate::core::numfmt::{format_real, parse_real, parse_truncated, round2};
use crate::domain::model::{CaseRecord, RawCase, ResultRecord};
use crate::utils::error::{KwabError, Result};
use std::fmt;

impl CaseRecord {
    /// Coerces the numeric columns of a raw row. Age and education years are
    /// read as decimals and truncated toward zero.
    pub fn from_raw(raw: &RawCase) -> Result<Self> {
        let invalid = |field: &str, value: &str| KwabError::ParseError {
            case_id: raw.case_id.clone(),
            field: field.to_string(),
            value: value.to_string(),
        };
        let real = |field: &str, value: &str| parse_real(value).ok_or_else(|| invalid(field, value));
        let whole =
            |field: &str, value: &str| parse_truncated(value).ok_or_else(|| invalid(field, value));

        Ok(Self {
            case_id: raw.case_id.clone(),
            eval_date: raw.eval_date.clone(),
            age: whole("age", &raw.age)?,
            education_years: whole("education_years", &raw.education_years)?,
            content_delivery_score_0_10: real(
                "content_delivery_score_0_10",
                &raw.content_delivery_score_0_10,
            )?,
            fluency_dialog_score_0_10: real(
                "fluency_dialog_score_0_10",
                &raw.fluency_dialog_score_0_10,
            )?,
            fluency_beach_score_0_10: real(
                "fluency_beach_score_0_10",
                &raw.fluency_beach_score_0_10,
            )?,
            aq_score_0_100: real("aq_score_0_100", &raw.aq_score_0_100)?,
        })
    }
}

/// A finished case together with the thresholds it was banded against.
/// `Display` renders the per-case trace block (without the trailing blank line).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCase {
    pub record: ResultRecord,
    pub thresholds: SdThresholds,
}

pub fn score_case(case: CaseRecord, norms: &NormTable) -> Result<ScoredCase> {
    let fluency_score_avg =
        round2((case.fluency_dialog_score_0_10 + case.fluency_beach_score_0_10) / 2.0);
    let spontaneous_total = round2(case.content_delivery_score_0_10 + fluency_score_avg);

    let a_band = age_band(case.age);
    let e_group = edu_group(case.education_years);
    let norm = norms.lookup(a_band, e_group)?;
    let thresholds = norm.thresholds(&case.case_id)?;
    let band = sd_band(case.aq_score_0_100, thresholds.minus_1sd, thresholds.minus_2sd);

    tracing::debug!(
        case_id = %case.case_id,
        age_band = %a_band,
        education_group = %e_group,
        sd_band = %band,
        "Scored case"
    );

    let record = ResultRecord {
        case_id: case.case_id,
        eval_date: case.eval_date,
        age: case.age,
        education_years: case.education_years,
        content_delivery_score_0_10: case.content_delivery_score_0_10,
        fluency_dialog_score_0_10: case.fluency_dialog_score_0_10,
        fluency_beach_score_0_10: case.fluency_beach_score_0_10,
        fluency_score_avg_0_10: fluency_score_avg,
        spontaneous_speech_total_0_20: spontaneous_total,
        aq_score_0_100: case.aq_score_0_100,
        aq_age_band: a_band,
        aq_education_group: e_group,
        aq_mean: norm.aq_mean.clone(),
        aq_minus_1sd: norm.aq_minus_1sd.clone(),
        aq_minus_2sd: norm.aq_minus_2sd.clone(),
        aq_sd_band: band,
    };

    Ok(ScoredCase { record, thresholds })
}

impl fmt::Display for ScoredCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.record;
        writeln!(f, "[CASE] {}", r.case_id)?;
        writeln!(f, "  age={} -> age_band={}", r.age, r.aq_age_band)?;
        writeln!(
            f,
            "  education_years={} -> education_group={}",
            r.education_years, r.aq_education_group
        )?;
        writeln!(
            f,
            "  fluency_score_avg=(dialog {} + beach {}) / 2 = {}",
            format_real(r.fluency_dialog_score_0_10),
            format_real(r.fluency_beach_score_0_10),
            format_real(r.fluency_score_avg_0_10)
        )?;
        writeln!(
            f,
            "  spontaneous_total=content {} + fluency_avg {} = {}",
            format_real(r.content_delivery_score_0_10),
            format_real(r.fluency_score_avg_0_10),
            format_real(r.spontaneous_speech_total_0_20)
        )?;
        write!(
            f,
            "  aq_band compare: aq={}, -1SD={}, -2SD={} -> {}",
            format_real(r.aq_score_0_100),
            format_real(self.thresholds.minus_1sd),
            format_real(self.thresholds.minus_2sd),
            r.aq_sd_band
        )
    }
}
