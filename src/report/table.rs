use crate::path::PathNormalizer;
use crate::types::analysis::AnalysisResult;

pub fn to_table(result: &AnalysisResult, normalizer: &PathNormalizer) -> String {
    let mut output = String::new();

    let mut current_file: Option<&str> = None;
    for error in &result.file_specific_errors {
        if current_file != Some(error.file.as_str()) {
            if current_file.is_some() {
                output.push('\n');
            }
            output.push_str(&format!(" {}\n", normalizer.normalize(&error.file)));
            current_file = Some(error.file.as_str());
        }
        let line = error
            .line
            .map(|line| line.to_string())
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!("  {:>6}  {}\n", line, error.message));
    }
    if current_file.is_some() {
        output.push('\n');
    }

    if !result.not_file_specific_errors.is_empty() {
        output.push_str(" Errors not tied to a file\n");
        for message in &result.not_file_specific_errors {
            output.push_str(&format!("  {message}\n"));
        }
        output.push('\n');
    }

    match result.total_errors() {
        0 => output.push_str(" [OK] No errors\n"),
        1 => output.push_str(" [ERROR] Found 1 error\n"),
        count => output.push_str(&format!(" [ERROR] Found {count} errors\n")),
    }

    output
}
