use crate::domain::model::{ExtractedData, TransformResult};
use crate::utils::error::Result;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    /// Human readable location of `path`, used in the completion message.
    fn full_path(&self, path: &str) -> String;
}

pub trait ConfigProvider {
    fn project_root(&self) -> &str;
    fn input_path(&self) -> &str;
    fn norm_path(&self) -> &str;
    fn output_path(&self) -> &str;
}

pub trait Pipeline {
    fn extract(&self) -> Result<ExtractedData>;
    fn transform(&self, data: ExtractedData) -> Result<TransformResult>;
    fn load(&self, result: TransformResult) -> Result<String>;
}
