use crate::core::numfmt::parse_real;
use crate::core::rows::read_rows;
use crate::domain::model::{AgeBand, EducationGroup, NormKey, NormRow};
use crate::utils::error::{KwabError, Result};
use std::collections::HashMap;

/// Normative AQ statistics keyed by (age band, education group label).
#[derive(Debug, Clone, Default)]
pub struct NormTable {
    rows: HashMap<NormKey, NormRow>,
}

impl NormTable {
    /// Loads the table from CSV. Group labels are taken as stored; a later
    /// row with the same key replaces an earlier one.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        let mut rows = HashMap::new();
        for row in read_rows::<NormRow>(bytes)? {
            rows.insert(row.key(), row);
        }

        tracing::debug!("Loaded {} norm rows", rows.len());
        Ok(Self { rows })
    }

    pub fn from_rows(rows: impl IntoIterator<Item = NormRow>) -> Self {
        Self {
            rows: rows.into_iter().map(|row| (row.key(), row)).collect(),
        }
    }

    pub fn lookup(&self, age_band: AgeBand, education_group: EducationGroup) -> Result<&NormRow> {
        let key = NormKey::new(age_band.as_str(), education_group.as_str());
        self.rows
            .get(&key)
            .ok_or_else(|| KwabError::MissingNormError {
                age_band: key.age_band,
                education_group: key.education_group,
            })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The two cut-offs an AQ score is compared against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SdThresholds {
    pub minus_1sd: f64,
    pub minus_2sd: f64,
}

impl NormRow {
    /// Parses the stored thresholds. `case_id` names the case being banded
    /// so a bad norm value is reported against the record that hit it.
    pub fn thresholds(&self, case_id: &str) -> Result<SdThresholds> {
        let parse = |field: &str, value: &str| {
            parse_real(value).ok_or_else(|| KwabError::ParseError {
                case_id: case_id.to_string(),
                field: field.to_string(),
                value: value.to_string(),
            })
        };

        Ok(SdThresholds {
            minus_1sd: parse("aq_minus_1sd", &self.aq_minus_1sd)?,
            minus_2sd: parse("aq_minus_2sd", &self.aq_minus_2sd)?,
        })
    }
}
