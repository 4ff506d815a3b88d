//! Pipeline metrics, emitted through the `metrics` facade.
//!
//! Nothing here installs a recorder; the server does that at startup. Without
//! one every call is a no-op.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

use crate::error::{ImportError, Pipeline};

/// Reset and upload requests received.
pub const REQUESTS_TOTAL: &str = "http_requests_total_import";
/// Terminal failures, labelled by pipeline and stage.
pub const FAILURES_TOTAL: &str = "import_failures_total";
/// Wall time of a pipeline run after authorization.
pub const PIPELINE_DURATION: &str = "import_pipeline_duration_seconds";

/// Register descriptions with the installed recorder.
pub fn describe() {
    describe_counter!(REQUESTS_TOTAL, "The total number of import requests");
    describe_counter!(FAILURES_TOTAL, "Import pipeline failures by pipeline and stage");
    describe_histogram!(
        PIPELINE_DURATION,
        Unit::Seconds,
        "Duration of reset and upload pipeline runs"
    );
}

pub(crate) fn record_request() {
    counter!(REQUESTS_TOTAL).increment(1);
}

pub(crate) fn record_failure(err: &ImportError) {
    let stage = err.stage().map_or("task", |s| s.as_str());
    counter!(
        FAILURES_TOTAL,
        "pipeline" => err.pipeline().as_str(),
        "stage" => stage
    )
    .increment(1);
}

pub(crate) fn record_duration(pipeline: Pipeline, elapsed: Duration) {
    histogram!(PIPELINE_DURATION, "pipeline" => pipeline.as_str()).record(elapsed.as_secs_f64());
}
