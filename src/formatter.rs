use crate::client::{ReportClient, BULK_ANNOTATION_LIMIT};
use crate::config::SubmitMode;
use crate::error::Result;
use crate::exit_code;
use crate::path::PathNormalizer;
use crate::report::{self, OutputFormat};
use crate::types::analysis::AnalysisResult;
use crate::types::insights::{Annotation, ReportId};
use std::io::Write;

/// Prints an analysis result and mirrors it into one remote report with an
/// annotation per error.
pub struct ErrorFormatter {
    client: ReportClient,
    normalizer: PathNormalizer,
    output_format: OutputFormat,
    submit_mode: SubmitMode,
}

impl ErrorFormatter {
    pub fn new(client: ReportClient, normalizer: PathNormalizer) -> Self {
        Self {
            client,
            normalizer,
            output_format: OutputFormat::Table,
            submit_mode: SubmitMode::Single,
        }
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_submit_mode(mut self, mode: SubmitMode) -> Self {
        self.submit_mode = mode;
        self
    }

    /// Writes the console report, then publishes the remote report. The
    /// returned exit code reflects the analysis only; remote failures come
    /// back as `Err` after the console output has been flushed.
    pub fn format(&self, result: &AnalysisResult, output: &mut impl Write) -> Result<i32> {
        let rendered = report::render(result, &self.normalizer, self.output_format)?;
        output.write_all(rendered.as_bytes())?;
        output.flush()?;

        let total = result.total_errors();
        let report_id = self.client.create_report(&report_title(total), total)?;

        let annotations = self.annotations(result);
        match self.submit_mode {
            SubmitMode::Single => self.submit_each(report_id, &annotations)?,
            SubmitMode::Bulk => self.submit_bulk(report_id, &annotations)?,
        }
        tracing::info!(
            report = %report_id,
            annotations = annotations.len(),
            "published code insights report"
        );

        Ok(if result.has_errors() {
            exit_code::ISSUES
        } else {
            exit_code::SUCCESS
        })
    }

    /// File-specific errors first, then the rest, each in analyzer order.
    fn annotations(&self, result: &AnalysisResult) -> Vec<Annotation> {
        let file_specific = result.file_specific_errors.iter().map(|error| {
            Annotation::new(
                error.message.clone(),
                Some(self.normalizer.normalize(&error.file)),
                error.line,
            )
        });
        let general = result
            .not_file_specific_errors
            .iter()
            .map(|message| Annotation::new(message.clone(), None, None));
        file_specific.chain(general).collect()
    }

    fn submit_each(&self, report_id: ReportId, annotations: &[Annotation]) -> Result<()> {
        for annotation in annotations {
            self.client.add_annotation(
                report_id,
                &annotation.summary,
                annotation.path.as_deref(),
                annotation.line,
            )?;
        }
        Ok(())
    }

    fn submit_bulk(&self, report_id: ReportId, annotations: &[Annotation]) -> Result<()> {
        for chunk in annotations.chunks(BULK_ANNOTATION_LIMIT) {
            match self.client.add_annotations_bulk(report_id, chunk) {
                Ok(_) => {}
                Err(err) if err.is_transport() => {
                    tracing::warn!(
                        error = %err,
                        size = chunk.len(),
                        "bulk annotation submit rejected, sending one by one"
                    );
                    self.submit_each(report_id, chunk)?;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

pub fn report_title(total_errors: usize) -> String {
    match total_errors {
        0 => "No issues found".to_string(),
        1 => "1 issue found".to_string(),
        count => format!("{count} issues found"),
    }
}
