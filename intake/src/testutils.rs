use crate::payment::HEADER_ROW;
use async_trait::async_trait;
use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use sheets::{AppendedRange, CellValue, SheetsError, Spreadsheet};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A write made against a `FakeSpreadsheet`.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    AddWorksheet(String, u32, u32),
    Append(String, Vec<CellValue>),
}

pub fn header_op(worksheet: &str) -> Op {
    Op::Append(
        worksheet.into(),
        HEADER_ROW.iter().map(|&h| CellValue::from(h)).collect(),
    )
}

#[derive(Default)]
struct Inner {
    worksheets: Vec<String>,
    writes: Vec<Op>,
    failure: Option<String>,
    failing_appends: bool,
}

/// In-memory `Spreadsheet` that records every write.
#[derive(Default)]
pub struct FakeSpreadsheet {
    inner: Mutex<Inner>,
}

impl FakeSpreadsheet {
    pub fn with_worksheets(titles: &[&str]) -> Self {
        FakeSpreadsheet {
            inner: Mutex::new(Inner {
                worksheets: titles.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            }),
        }
    }

    /// Every subsequent call fails with a 500 carrying `message`.
    pub fn fail_with(&self, message: &str) {
        self.inner.lock().unwrap().failure = Some(message.to_string());
    }

    /// Toggles a 500 on `append_row` only.
    pub fn fail_appends(&self, failing: bool) {
        self.inner.lock().unwrap().failing_appends = failing;
    }

    pub fn writes(&self) -> Vec<Op> {
        self.inner.lock().unwrap().writes.clone()
    }

    fn check(inner: &Inner) -> Result<(), SheetsError> {
        match &inner.failure {
            Some(message) => Err(SheetsError::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Spreadsheet for FakeSpreadsheet {
    async fn worksheet_titles(&self) -> Result<Vec<String>, SheetsError> {
        let inner = self.inner.lock().unwrap();
        Self::check(&inner)?;
        Ok(inner.worksheets.clone())
    }

    async fn add_worksheet(&self, title: &str, rows: u32, cols: u32) -> Result<(), SheetsError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check(&inner)?;
        if inner.worksheets.iter().any(|t| t == title) {
            return Err(SheetsError::Api {
                status: 400,
                message: format!("A sheet with the name \"{title}\" already exists."),
            });
        }
        inner.worksheets.push(title.to_string());
        inner
            .writes
            .push(Op::AddWorksheet(title.to_string(), rows, cols));
        Ok(())
    }

    async fn append_row(
        &self,
        worksheet: &str,
        row: &[CellValue],
    ) -> Result<AppendedRange, SheetsError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check(&inner)?;
        if inner.failing_appends {
            return Err(SheetsError::Api {
                status: 500,
                message: "Internal error encountered.".into(),
            });
        }
        inner
            .writes
            .push(Op::Append(worksheet.to_string(), row.to_vec()));
        let n = inner
            .writes
            .iter()
            .filter(|op| matches!(op, Op::Append(ws, _) if ws == worksheet))
            .count();
        Ok(AppendedRange {
            updated_range: Some(format!("'{worksheet}'!A{n}:D{n}")),
        })
    }
}

/// A `Spreadsheet` whose calls never complete.
pub struct PendingSpreadsheet;

#[async_trait]
impl Spreadsheet for PendingSpreadsheet {
    async fn worksheet_titles(&self) -> Result<Vec<String>, SheetsError> {
        std::future::pending().await
    }

    async fn add_worksheet(&self, _title: &str, _rows: u32, _cols: u32) -> Result<(), SheetsError> {
        std::future::pending().await
    }

    async fn append_row(
        &self,
        _worksheet: &str,
        _row: &[CellValue],
    ) -> Result<AppendedRange, SheetsError> {
        std::future::pending().await
    }
}

/// Recorder that keeps gauge values and discards everything else.
#[derive(Default)]
pub struct GaugeRecorder {
    gauges: Mutex<HashMap<String, Arc<AtomicU64>>>,
}

impl GaugeRecorder {
    pub fn gauge(&self, name: &str) -> f64 {
        self.gauges
            .lock()
            .unwrap()
            .get(name)
            .map(|v| f64::from_bits(v.load(Ordering::Acquire)))
            .unwrap_or(0.0)
    }
}

impl Recorder for GaugeRecorder {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, _: &Key, _: &Metadata<'_>) -> Counter {
        Counter::noop()
    }

    fn register_gauge(&self, key: &Key, _: &Metadata<'_>) -> Gauge {
        let value = self
            .gauges
            .lock()
            .unwrap()
            .entry(key.name().to_string())
            .or_default()
            .clone();
        Gauge::from_arc(value)
    }

    fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}
