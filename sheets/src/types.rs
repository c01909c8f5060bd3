use serde::{Deserialize, Serialize};

/// One cell of a row written to a worksheet.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// Where an append landed, as reported by the API (e.g. `'Sheet1'!A5:D5`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppendedRange {
    pub updated_range: Option<String>,
}

/// Builds an A1 range anchored on `cell` of the worksheet `title`.
///
/// Titles are always quoted; embedded single quotes are doubled.
pub fn a1_range(title: &str, cell: &str) -> String {
    format!("'{}'!{}", title.replace('\'', "''"), cell)
}

#[derive(Deserialize)]
pub(crate) struct SpreadsheetMetadata {
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
pub(crate) struct SheetEntry {
    pub properties: Option<SheetProperties>,
}

#[derive(Deserialize)]
pub(crate) struct SheetProperties {
    pub title: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppendValuesResponse {
    pub updates: Option<UpdateValuesResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateValuesResponse {
    pub updated_range: Option<String>,
}

/// Google's error envelope: `{"error": {"code": .., "message": .., "status": ..}}`.
#[derive(Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub message: String,
}
