use crate::core::{Pipeline, TransformResult};
use crate::domain::model::SdBand;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract, transform and load. Nothing is written unless every
    /// record was scored.
    pub fn run(&self) -> Result<String> {
        let transformed = self.extract_and_transform()?;

        tracing::info!("💾 Writing output");
        let output_path = self.pipeline.load(transformed)?;
        println!("[DONE] wrote: {}", output_path);

        Ok(output_path)
    }

    /// Same as [`run`](Self::run) without the load step.
    pub fn dry_run(&self) -> Result<TransformResult> {
        let transformed = self.extract_and_transform()?;
        tracing::info!("🧪 Dry run: output not written");
        Ok(transformed)
    }

    fn extract_and_transform(&self) -> Result<TransformResult> {
        tracing::info!("🚀 Starting K-WAB scoring");

        let extracted = self.pipeline.extract()?;
        let transformed = self.pipeline.transform(extracted)?;

        let summary = &transformed.band_summary;
        tracing::info!("✅ Scored {} cases", summary.total());
        for band in SdBand::ALL {
            tracing::info!("   {:<10} {}", band.as_str(), summary.count(band));
        }

        Ok(transformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::norms::NormTable;
    use crate::domain::model::{BandSummary, ExtractedData};
    use crate::utils::error::KwabError;
    use std::cell::Cell;

    struct StubPipeline {
        fail_transform: bool,
        loads: Cell<usize>,
    }

    impl StubPipeline {
        fn new(fail_transform: bool) -> Self {
            Self {
                fail_transform,
                loads: Cell::new(0),
            }
        }
    }

    impl Pipeline for &StubPipeline {
        fn extract(&self) -> Result<ExtractedData> {
            Ok(ExtractedData {
                norms: NormTable::default(),
                cases: vec![],
            })
        }

        fn transform(&self, _data: ExtractedData) -> Result<TransformResult> {
            if self.fail_transform {
                return Err(KwabError::MissingNormError {
                    age_band: "65+".to_string(),
                    education_group: "0".to_string(),
                });
            }
            Ok(TransformResult {
                processed_records: vec![],
                csv_output: b"\r\n".to_vec(),
                band_summary: BandSummary::default(),
            })
        }

        fn load(&self, _result: TransformResult) -> Result<String> {
            self.loads.set(self.loads.get() + 1);
            Ok("out.csv".to_string())
        }
    }

    #[test]
    fn test_run_loads_after_transform() {
        let stub = StubPipeline::new(false);
        let engine = EtlEngine::new(&stub);
        assert_eq!(engine.run().unwrap(), "out.csv");
        assert_eq!(stub.loads.get(), 1);
    }

    #[test]
    fn test_failed_transform_skips_load() {
        let stub = StubPipeline::new(true);
        let engine = EtlEngine::new(&stub);
        assert!(engine.run().is_err());
        assert_eq!(stub.loads.get(), 0);
    }

    #[test]
    fn test_dry_run_never_loads() {
        let stub = StubPipeline::new(false);
        let engine = EtlEngine::new(&stub);
        let result = engine.dry_run().unwrap();
        assert!(result.processed_records.is_empty());
        assert_eq!(stub.loads.get(), 0);
    }
}
