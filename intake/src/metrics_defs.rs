use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Payment submission duration in seconds. Tagged with status.",
};

pub const REQUESTS_INFLIGHT: MetricDef = MetricDef {
    name: "requests.inflight",
    metric_type: MetricType::Gauge,
    description: "Number of payment submissions currently being processed",
};

pub const PAYMENTS_APPENDED: MetricDef = MetricDef {
    name: "payments.appended",
    metric_type: MetricType::Counter,
    description: "Payments appended to the spreadsheet. Tagged with tag.",
};

pub const WORKSHEETS_CREATED: MetricDef = MetricDef {
    name: "worksheets.created",
    metric_type: MetricType::Counter,
    description: "Worksheets created on first use of a tag",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REQUEST_DURATION,
    REQUESTS_INFLIGHT,
    PAYMENTS_APPENDED,
    WORKSHEETS_CREATED,
];
