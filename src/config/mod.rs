pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_csv_path, validate_path, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

pub const DEFAULT_ROOT: &str = ".";
pub const DEFAULT_INPUT: &str = "data/k_wab/result_entry_template.csv";
pub const DEFAULT_NORMS: &str = "data/k_wab/aq_norm_sd.csv";
pub const DEFAULT_OUTPUT: &str = "data/k_wab/final_result_table.csv";

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "kwab-etl")]
#[command(about = "Fill K-WAB result tables with fluency scores and AQ norm bands")]
pub struct CliConfig {
    /// Project root the data paths are resolved against
    #[arg(long, default_value = DEFAULT_ROOT)]
    pub root: String,

    /// Case records CSV, relative to the root
    #[arg(long, default_value = DEFAULT_INPUT)]
    pub input: String,

    /// AQ norm table CSV, relative to the root
    #[arg(long, default_value = DEFAULT_NORMS)]
    pub norms: String,

    /// Result CSV to write, relative to the root
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// Optional TOML file providing the paths. Its values replace any path
    /// flag still equal to its default, even when that flag was given explicitly
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Score and trace every case without writing the output file
    #[arg(long)]
    pub dry_run: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            input: DEFAULT_INPUT.to_string(),
            norms: DEFAULT_NORMS.to_string(),
            output: DEFAULT_OUTPUT.to_string(),
            config: None,
            verbose: false,
            dry_run: false,
        }
    }
}

impl CliConfig {
    /// Loads `--config` when given and lets it fill in every path whose value
    /// equals its default. A flag passed explicitly with the default value
    /// cannot be told apart from an omitted one, so the file wins there too.
    pub fn resolve(self) -> Result<Self> {
        match &self.config {
            Some(path) => {
                let file_config = TomlConfig::from_file(path)?;
                file_config.validate()?;
                Ok(self.merge_toml(&file_config))
            }
            None => Ok(self),
        }
    }

    pub fn merge_toml(mut self, file_config: &TomlConfig) -> Self {
        let paths = &file_config.paths;
        fill_default(&mut self.root, DEFAULT_ROOT, &paths.root);
        fill_default(&mut self.input, DEFAULT_INPUT, &paths.input);
        fill_default(&mut self.norms, DEFAULT_NORMS, &paths.norms);
        fill_default(&mut self.output, DEFAULT_OUTPUT, &paths.output);
        self
    }
}

fn fill_default(value: &mut String, default: &str, from_file: &Option<String>) {
    if value == default {
        if let Some(path) = from_file {
            *value = path.clone();
        }
    }
}

impl ConfigProvider for CliConfig {
    fn project_root(&self) -> &str {
        &self.root
    }

    fn input_path(&self) -> &str {
        &self.input
    }

    fn norm_path(&self) -> &str {
        &self.norms
    }

    fn output_path(&self) -> &str {
        &self.output
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("root", &self.root)?;
        validate_csv_path("input", &self.input)?;
        validate_csv_path("norms", &self.norms)?;
        validate_csv_path("output", &self.output)?;
        Ok(())
    }
}
