use crate::core::norms::NormTable;
use crate::core::rows::read_rows;
use crate::core::transform::score_case;
use crate::core::{
    BandSummary, CaseRecord, ConfigProvider, ExtractedData, Pipeline, RawCase, ResultRecord,
    Storage, TransformResult,
};
use crate::utils::error::{KwabError, Result};
use std::io::Write;

/// Scores K-WAB case records against the norm table and writes the
/// augmented CSV.
pub struct KwabPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> KwabPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for KwabPipeline<S, C> {
    fn extract(&self) -> Result<ExtractedData> {
        tracing::debug!("Reading norm table from: {}", self.config.norm_path());
        let norm_bytes = self.storage.read_file(self.config.norm_path())?;
        let norms = NormTable::from_csv_bytes(&norm_bytes)?;

        tracing::debug!("Reading cases from: {}", self.config.input_path());
        let case_bytes = self.storage.read_file(self.config.input_path())?;
        let cases = read_cases(&case_bytes)?;

        tracing::info!(
            "📊 Loaded {} norm rows and {} cases",
            norms.len(),
            cases.len()
        );
        Ok(ExtractedData { norms, cases })
    }

    fn transform(&self, data: ExtractedData) -> Result<TransformResult> {
        let mut processed_records = Vec::with_capacity(data.cases.len());
        let mut band_summary = BandSummary::default();
        let mut trace = std::io::stdout().lock();

        for raw in &data.cases {
            let case = CaseRecord::from_raw(raw)?;
            let scored = score_case(case, &data.norms)?;
            write!(trace, "{}\n\n", scored)?;

            band_summary.record(scored.record.aq_sd_band);
            processed_records.push(scored.record);
        }
        trace.flush()?;

        let csv_output = write_results(&processed_records)?;
        Ok(TransformResult {
            processed_records,
            csv_output,
            band_summary,
        })
    }

    fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = self.config.output_path();
        tracing::debug!(
            "Writing {} records ({} bytes) to {}",
            result.processed_records.len(),
            result.csv_output.len(),
            output_path
        );
        self.storage.write_file(output_path, &result.csv_output)?;
        Ok(self.storage.full_path(output_path))
    }
}

/// Reads the case rows; columns beyond the known ones are ignored and may be
/// left off individual rows.
pub fn read_cases(bytes: &[u8]) -> Result<Vec<RawCase>> {
    read_rows(bytes)
}

/// Serializes results with CRLF terminators. With no records there is no
/// header either and the file holds a single empty line.
pub fn write_results(records: &[ResultRecord]) -> Result<Vec<u8>> {
    if records.is_empty() {
        return Ok(b"\r\n".to_vec());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| KwabError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SdBand;
    use std::cell::RefCell;
    use std::collections::HashMap;

    const NORMS: &str = "age_band,education_years,aq_mean,aq_minus_1sd,aq_minus_2sd\n\
                         65+,1-6,80,70,60\n\
                         15-65,7+,97.21,94.96,92.71\n";

    const HEADER: &str = "case_id,eval_date,age,education_years,content_delivery_score_0_10,\
                          fluency_dialog_score_0_10,fluency_beach_score_0_10,aq_score_0_100\n";

    struct MockStorage {
        files: RefCell<HashMap<String, Vec<u8>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: RefCell::new(HashMap::new()),
            }
        }

        fn with_file(self, path: &str, content: &str) -> Self {
            self.files
                .borrow_mut()
                .insert(path.to_string(), content.as_bytes().to_vec());
            self
        }

        fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.borrow().get(path).cloned()
        }
    }

    impl Storage for &MockStorage {
        fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.files.borrow().get(path).cloned().ok_or_else(|| {
                KwabError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .borrow_mut()
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn full_path(&self, path: &str) -> String {
            format!("mock://{}", path)
        }
    }

    struct MockConfig;

    impl ConfigProvider for MockConfig {
        fn project_root(&self) -> &str {
            "."
        }

        fn input_path(&self) -> &str {
            "cases.csv"
        }

        fn norm_path(&self) -> &str {
            "norms.csv"
        }

        fn output_path(&self) -> &str {
            "out/final.csv"
        }
    }

    #[test]
    fn test_extract_reads_norms_and_cases() {
        let storage = MockStorage::new()
            .with_file("norms.csv", NORMS)
            .with_file(
                "cases.csv",
                &format!("{}C001,2025-03-01,70,5,6.0,7.0,8.0,75.0\n", HEADER),
            );
        let pipeline = KwabPipeline::new(&storage, MockConfig);

        let data = pipeline.extract().unwrap();
        assert_eq!(data.norms.len(), 2);
        assert_eq!(data.cases.len(), 1);
        assert_eq!(data.cases[0].case_id, "C001");
    }

    #[test]
    fn test_extract_missing_norm_file() {
        let storage = MockStorage::new().with_file("cases.csv", HEADER);
        let pipeline = KwabPipeline::new(&storage, MockConfig);
        assert!(matches!(pipeline.extract(), Err(KwabError::IoError(_))));
    }

    #[test]
    fn test_read_cases_ignores_extra_columns_and_strips_bom() {
        let csv = "\u{feff}case_id,eval_date,age,education_years,content_delivery_score_0_10,\
                   fluency_dialog_score_0_10,fluency_beach_score_0_10,aq_score_0_100,notes\n\
                   C001,2025-03-01,70,5,6.0,7.0,8.0,75.0,first visit\n";
        let cases = read_cases(csv.as_bytes()).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].case_id, "C001");
        assert_eq!(cases[0].aq_score_0_100, "75.0");
    }

    #[test]
    fn test_read_cases_row_without_trailing_extra_column() {
        let csv = "case_id,eval_date,age,education_years,content_delivery_score_0_10,\
                   fluency_dialog_score_0_10,fluency_beach_score_0_10,aq_score_0_100,note\n\
                   C1,2025-03-01,70,5,6,7,8,75,x\n\
                   C2,2025-03-02,70,5,6,7,8,75\n";
        let cases = read_cases(csv.as_bytes()).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[1].case_id, "C2");
        assert_eq!(cases[1].aq_score_0_100, "75");
    }

    #[test]
    fn test_read_cases_short_row_fails_on_missing_score() {
        let storage = MockStorage::new().with_file("norms.csv", NORMS).with_file(
            "cases.csv",
            &format!("{}C1,2025-03-01,70,5,6,7\n", HEADER),
        );
        let pipeline = KwabPipeline::new(&storage, MockConfig);

        let data = pipeline.extract().unwrap();
        match pipeline.transform(data) {
            Err(KwabError::ParseError { case_id, field, value }) => {
                assert_eq!(case_id, "C1");
                assert_eq!(field, "fluency_beach_score_0_10");
                assert_eq!(value, "");
            }
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_read_cases_missing_column() {
        let csv = "case_id,eval_date,age\nC001,2025-03-01,70\n";
        assert!(matches!(read_cases(csv.as_bytes()), Err(KwabError::CsvError(_))));
    }

    #[test]
    fn test_transform_and_load() {
        let storage = MockStorage::new().with_file("norms.csv", NORMS).with_file(
            "cases.csv",
            &format!(
                "{}C001,2025-03-01,70,5,6.0,7.0,8.0,75.0\nC002,2025-03-02,40,12,5,7.1,7.2,93\n",
                HEADER
            ),
        );
        let pipeline = KwabPipeline::new(&storage, MockConfig);

        let data = pipeline.extract().unwrap();
        let result = pipeline.transform(data).unwrap();
        assert_eq!(result.processed_records.len(), 2);
        assert_eq!(result.band_summary.count(SdBand::WithinOneSd), 1);
        assert_eq!(result.band_summary.count(SdBand::OneToTwoSd), 1);

        let location = pipeline.load(result).unwrap();
        assert_eq!(location, "mock://out/final.csv");

        let written = String::from_utf8(storage.get_file("out/final.csv").unwrap()).unwrap();
        let lines: Vec<&str> = written.split("\r\n").collect();
        assert_eq!(
            lines[0],
            "case_id,eval_date,age,education_years,content_delivery_score_0_10,\
             fluency_dialog_score_0_10,fluency_beach_score_0_10,fluency_score_avg_0_10,\
             spontaneous_speech_total_0_20,aq_score_0_100,aq_age_band,aq_education_group,\
             aq_mean,aq_minus_1sd,aq_minus_2sd,aq_sd_band"
        );
        assert_eq!(
            lines[1],
            "C001,2025-03-01,70,5,6.0,7.0,8.0,7.5,13.5,75.0,65+,1-6,80,70,60,>=-1SD"
        );
        assert_eq!(
            lines[2],
            "C002,2025-03-02,40,12,5.0,7.1,7.2,7.15,12.15,93.0,15-65,7+,97.21,94.96,92.71,-1SD~-2SD"
        );
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_transform_stops_at_first_bad_record() {
        let storage = MockStorage::new().with_file("norms.csv", NORMS).with_file(
            "cases.csv",
            &format!(
                "{}C001,2025-03-01,70,5,6,7,8,75\nC002,2025-03-02,seventy,5,6,7,8,75\n",
                HEADER
            ),
        );
        let pipeline = KwabPipeline::new(&storage, MockConfig);

        let data = pipeline.extract().unwrap();
        match pipeline.transform(data) {
            Err(KwabError::ParseError { case_id, field, .. }) => {
                assert_eq!(case_id, "C002");
                assert_eq!(field, "age");
            }
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_write_results_empty() {
        assert_eq!(write_results(&[]).unwrap(), b"\r\n".to_vec());
    }
}
