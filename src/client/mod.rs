pub mod transport;

use crate::config::InsightsConfig;
use crate::error::{InsightsError, Result};
use crate::path::PathNormalizer;
use crate::types::insights::{
    Annotation, AnnotationId, AnnotationPayload, ReportId, ReportPayload, ANNOTATION_TYPE_BUG,
};
use serde_json::Value;
use transport::{HttpTransport, Method, Transport};
use uuid::Uuid;

/// Largest batch the bulk annotations endpoint accepts in one request.
pub const BULK_ANNOTATION_LIMIT: usize = 100;

/// Raw body of a bulk annotation call. Entries are not matched back to the
/// submitted annotations; callers that need that must correlate themselves.
pub type BulkResponse = Value;

/// Client for the commit reports API. Owns URL construction, payload shape
/// and identifier parsing; every call goes through the injected transport.
pub struct ReportClient {
    base_url: String,
    repo_owner: String,
    repo_slug: String,
    commit: String,
    normalizer: PathNormalizer,
    transport: Box<dyn Transport>,
    name_source: Box<dyn Fn() -> Uuid>,
}

impl ReportClient {
    pub fn new(config: &InsightsConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            repo_owner: config.repo_owner.clone(),
            repo_slug: config.repo_slug.clone(),
            commit: config.commit.clone(),
            normalizer: PathNormalizer::new(&config.clone_dir),
            transport,
            name_source: Box::new(Uuid::new_v4),
        }
    }

    pub fn over_http(config: &InsightsConfig) -> Result<Self> {
        Ok(Self::new(config, Box::new(HttpTransport::new(config)?)))
    }

    /// Replaces the generator behind report and annotation names.
    #[cfg(test)]
    pub fn with_name_source(mut self, source: impl Fn() -> Uuid + 'static) -> Self {
        self.name_source = Box::new(source);
        self
    }

    /// Creates (or replaces, on a repeated name) a report for the configured
    /// commit and returns the identifier the API assigned to it.
    pub fn create_report(&self, title: &str, issue_count: usize) -> Result<ReportId> {
        let payload = ReportPayload::new(title, issue_count);
        let url = self.report_url(None);
        let response = self
            .transport
            .send(Method::Put, &url, &serde_json::to_value(&payload)?)?;
        let id = ReportId(parse_uuid(&response)?);
        tracing::info!(report = %id, result = ?payload.result, "created report");
        Ok(id)
    }

    pub fn add_annotation(
        &self,
        report: ReportId,
        summary: &str,
        file_path: Option<&str>,
        line: Option<u32>,
    ) -> Result<AnnotationId> {
        let payload = self.annotation_payload(summary, file_path, line);
        let url = self.annotation_url(report);
        let response = self
            .transport
            .send(Method::Put, &url, &serde_json::to_value(&payload)?)?;
        let id = AnnotationId(parse_uuid(&response)?);
        tracing::debug!(annotation = %id, path = ?payload.path, "added annotation");
        Ok(id)
    }

    /// Submits all annotations in one request. The response is handed back
    /// undecoded, see [`BulkResponse`].
    pub fn add_annotations_bulk(
        &self,
        report: ReportId,
        annotations: &[Annotation],
    ) -> Result<BulkResponse> {
        if annotations.len() > BULK_ANNOTATION_LIMIT {
            return Err(InsightsError::BatchTooLarge {
                size: annotations.len(),
                limit: BULK_ANNOTATION_LIMIT,
            });
        }

        let payload: Vec<AnnotationPayload> = annotations
            .iter()
            .map(|annotation| {
                self.annotation_payload(
                    &annotation.summary,
                    annotation.path.as_deref(),
                    annotation.line,
                )
            })
            .collect();
        let url = self.annotations_bulk_url(report);
        self.transport
            .send(Method::Post, &url, &serde_json::to_value(&payload)?)
    }

    fn annotation_payload(
        &self,
        summary: &str,
        file_path: Option<&str>,
        line: Option<u32>,
    ) -> AnnotationPayload {
        AnnotationPayload {
            annotation_type: ANNOTATION_TYPE_BUG,
            summary: summary.to_string(),
            path: file_path.map(|path| self.normalizer.normalize(path)),
            line,
        }
    }

    fn report_url(&self, report: Option<ReportId>) -> String {
        let segment = match report {
            Some(id) => id.braced(),
            None => self.report_name(),
        };
        format!(
            "{}/repositories/{}/{}/commit/{}/reports/{}",
            self.base_url, self.repo_owner, self.repo_slug, self.commit, segment
        )
    }

    fn annotations_bulk_url(&self, report: ReportId) -> String {
        format!("{}/annotations", self.report_url(Some(report)))
    }

    fn annotation_url(&self, report: ReportId) -> String {
        format!(
            "{}/annotations/{}",
            self.report_url(Some(report)),
            self.annotation_name()
        )
    }

    fn report_name(&self) -> String {
        format!("{}-{}", self.repo_slug, (self.name_source)())
    }

    fn annotation_name(&self) -> String {
        format!("{}-annotation-{}", self.repo_slug, (self.name_source)())
    }
}

fn parse_uuid(body: &Value) -> Result<Uuid> {
    let raw = body
        .get("uuid")
        .and_then(Value::as_str)
        .ok_or_else(|| InsightsError::Parse("response has no `uuid` field".to_string()))?;
    Uuid::parse_str(raw).map_err(|e| InsightsError::Parse(format!("malformed uuid {raw:?}: {e}")))
}
