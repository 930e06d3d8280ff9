//! Export report endpoints
//!
//! Reports are generated asynchronously by Kraken: request one, poll its
//! status until it is `Processed`, then retrieve the zip archive.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, instrument};

use super::{fetch_list, require};
use crate::dispatcher::{ApiCall, Dispatcher};
use crate::error::RestResult;
use crate::types::{ExportReport, ExportRequest, RemoveExportResult, RemoveKind, ReportKind};

#[derive(Deserialize)]
struct ExportId {
    id: String,
}

/// File name a retrieved report is saved under
pub fn report_file_name(id: &str) -> String {
    format!("Report_{id}.zip")
}

/// Export report endpoints
#[derive(Debug, Clone, Copy)]
pub struct ExportEndpoints<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> ExportEndpoints<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Request a report; returns its ID
    #[instrument(skip(self))]
    pub async fn request_report(&self, request: &ExportRequest) -> RestResult<String> {
        require("description", &request.description)?;
        let call = ApiCall::private("AddExport")
            .param("report", request.report.as_str())
            .param("description", &request.description)
            .param("format", request.format.as_str())
            .opt_param("fields", request.fields.as_deref())
            .opt_param("asset", request.asset.as_deref())
            .opt_param("starttm", request.starttm)
            .opt_param("endtm", request.endtm);

        let export: ExportId = self.dispatcher.execute_json(call).await?;
        Ok(export.id)
    }

    /// Status of all reports of one kind
    #[instrument(skip(self))]
    pub async fn report_status(&self, report: ReportKind) -> RestResult<Vec<ExportReport>> {
        let call = ApiCall::private("ExportStatus").param("report", report.as_str());
        fetch_list(self.dispatcher, call).await
    }

    /// Download a processed report
    ///
    /// Returns the zip archive. When `save_dir` is given the archive is also
    /// written to `<save_dir>/Report_<id>.zip`.
    #[instrument(skip(self, save_dir))]
    pub async fn retrieve_report(&self, id: &str, save_dir: Option<&Path>) -> RestResult<Vec<u8>> {
        require("id", id)?;
        let call = ApiCall::private("RetrieveExport").param("id", id);
        let report = self.dispatcher.execute(call).await?.into_bytes()?;

        if let Some(dir) = save_dir {
            let path: PathBuf = dir.join(report_file_name(id));
            tokio::fs::write(&path, &report).await?;
            info!(path = %path.display(), bytes = report.len(), "Saved export report");
        }

        Ok(report)
    }

    /// Cancel a queued report or delete a processed one
    #[instrument(skip(self))]
    pub async fn delete_report(&self, id: &str, kind: RemoveKind) -> RestResult<RemoveExportResult> {
        require("id", id)?;
        let call = ApiCall::private("RemoveExport")
            .param("id", id)
            .param("type", kind.as_str());

        self.dispatcher.execute_json(call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_file_name() {
        assert_eq!(report_file_name("TCJA"), "Report_TCJA.zip");
    }
}
