pub mod json;
pub mod table;

use crate::error::InsightsError;
use crate::path::PathNormalizer;
use crate::types::analysis::AnalysisResult;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Table,
    Json,
}

pub fn render(
    result: &AnalysisResult,
    normalizer: &PathNormalizer,
    format: OutputFormat,
) -> Result<String, InsightsError> {
    match format {
        OutputFormat::Table => Ok(table::to_table(result, normalizer)),
        OutputFormat::Json => json::to_json(result).map_err(InsightsError::Json),
    }
}
