use crate::error::{InsightsError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSpecificError {
    pub file: String,
    pub line: Option<u32>,
    pub message: String,
}

impl FileSpecificError {
    pub fn new(file: impl Into<String>, line: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

/// Snapshot of one analyzer run. Both error lists keep the order the
/// analyzer produced them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub file_specific_errors: Vec<FileSpecificError>,
    pub not_file_specific_errors: Vec<String>,
}

impl AnalysisResult {
    pub fn new(
        file_specific_errors: Vec<FileSpecificError>,
        not_file_specific_errors: Vec<String>,
    ) -> Self {
        Self {
            file_specific_errors,
            not_file_specific_errors,
        }
    }

    pub fn total_errors(&self) -> usize {
        self.file_specific_errors.len() + self.not_file_specific_errors.len()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors() > 0
    }

    /// Parses the analyzer's JSON error format. `totals` is ignored and the
    /// counts are recomputed from the listed errors.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: RawAnalysis = serde_json::from_str(content)?;

        // an empty `files` list is encoded as `[]` rather than `{}`
        let files = match raw.files {
            Value::Object(files) => files,
            Value::Null => Map::new(),
            Value::Array(items) if items.is_empty() => Map::new(),
            other => {
                return Err(InsightsError::Input(format!(
                    "`files` must be an object, got {other}"
                )))
            }
        };

        let mut file_specific_errors = Vec::new();
        for (file, value) in files {
            let entry: RawFile = serde_json::from_value(value)
                .map_err(|e| InsightsError::Input(format!("{file}: {e}")))?;
            file_specific_errors.extend(
                entry
                    .messages
                    .into_iter()
                    .map(|message| FileSpecificError::new(&file, message.line, message.message)),
            );
        }

        Ok(Self::new(file_specific_errors, raw.errors))
    }
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    // insertion-ordered with serde_json's preserve_order
    #[serde(default)]
    files: Value,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawFile {
    #[serde(default)]
    messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    message: String,
    line: Option<u32>,
}
