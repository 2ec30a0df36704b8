use crate::config::DatasetConfig;
use crate::datasets::{DatasetLoader, DatasetSource};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) loader: Arc<DatasetLoader>,
    pub(crate) datasets: DatasetConfig,
}

/// Where a dataset for one request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SourceOrigin {
    Inline,
    Configured,
}

/// Inline payloads win over the configured paths; the upload path of the
/// dashboard sends CSV text in the request body.
pub(crate) fn resolve_source(
    inline_csv: Option<String>,
    configured: &std::path::Path,
) -> (DatasetSource, SourceOrigin) {
    match inline_csv {
        Some(csv) => (DatasetSource::bytes(csv.into_bytes()), SourceOrigin::Inline),
        None => (DatasetSource::path(configured), SourceOrigin::Configured),
    }
}
