use crate::errors::IntakeError;
use crate::metrics_defs::{PAYMENTS_APPENDED, WORKSHEETS_CREATED};
use crate::payment::{HEADER_ROW, PaymentRecord, Receipt};
use sheets::{CellValue, Spreadsheet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Grid size of a worksheet created on first use.
pub const NEW_WORKSHEET_ROWS: u32 = 100;
pub const NEW_WORKSHEET_COLS: u32 = 4;

/// Writes accepted payments into the worksheet selected by their tag.
///
/// Holds no per-request state. Readiness flips to true after the first
/// successful spreadsheet call and stays there.
pub struct PaymentIntake {
    spreadsheet: Arc<dyn Spreadsheet>,
    ready: AtomicBool,
}

impl PaymentIntake {
    pub fn new(spreadsheet: Arc<dyn Spreadsheet>) -> Self {
        PaymentIntake {
            spreadsheet,
            ready: AtomicBool::new(false),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    /// Lists the spreadsheet's worksheets to confirm it is reachable.
    pub async fn probe(&self) -> Result<Vec<String>, IntakeError> {
        let titles = self.spreadsheet.worksheet_titles().await?;
        self.ready.store(true, Ordering::Relaxed);
        Ok(titles)
    }

    /// Appends `record` to its worksheet, creating the worksheet first if needed.
    pub async fn submit(&self, record: &PaymentRecord) -> Result<Receipt, IntakeError> {
        let worksheet = record.tag.worksheet();

        self.ensure_worksheet(worksheet).await?;
        let appended = self
            .spreadsheet
            .append_row(worksheet, &record.to_row())
            .await?;

        self.ready.store(true, Ordering::Relaxed);
        shared::counter!(PAYMENTS_APPENDED, "tag" => record.tag.as_str()).increment(1);
        tracing::info!(
            tag = %record.tag,
            worksheet,
            range = appended.updated_range.as_deref().unwrap_or("unknown"),
            "Payment saved"
        );

        Ok(Receipt {
            message: format!("Payment saved successfully in {worksheet}"),
            tag: record.tag,
        })
    }

    /// Returns true if the worksheet had to be created.
    ///
    /// Creation and the header append are two separate calls. If the header
    /// append fails the worksheet stays without a header, and later calls
    /// find it present and do not write one.
    async fn ensure_worksheet(&self, title: &str) -> Result<bool, IntakeError> {
        let titles = self.spreadsheet.worksheet_titles().await?;
        if titles.iter().any(|t| t == title) {
            return Ok(false);
        }

        self.spreadsheet
            .add_worksheet(title, NEW_WORKSHEET_ROWS, NEW_WORKSHEET_COLS)
            .await?;
        let header: Vec<CellValue> = HEADER_ROW.iter().map(|&h| CellValue::from(h)).collect();
        self.spreadsheet.append_row(title, &header).await?;

        shared::counter!(WORKSHEETS_CREATED).increment(1);
        tracing::info!(worksheet = title, "Created worksheet with header row");

        Ok(true)
    }
}
