//! Metrics definitions for the Sheets client.

use shared::metrics_defs::{MetricDef, MetricType};

pub const TOKEN_REFRESH: MetricDef = MetricDef {
    name: "sheets.token.refresh",
    metric_type: MetricType::Counter,
    description: "Number of access tokens obtained from the Google token endpoint",
};

pub const API_REQUEST_DURATION: MetricDef = MetricDef {
    name: "sheets.request.duration",
    metric_type: MetricType::Histogram,
    description: "Sheets API request duration in seconds. Tagged with operation.",
};

pub const ALL_METRICS: &[MetricDef] = &[TOKEN_REFRESH, API_REQUEST_DURATION];
