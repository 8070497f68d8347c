pub mod classify;
pub mod etl;
pub mod norms;
pub mod numfmt;
pub mod pipeline;
pub mod rows;
pub mod transform;

pub use crate::domain::model::{
    BandSummary, CaseRecord, ExtractedData, RawCase, ResultRecord, TransformResult,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
