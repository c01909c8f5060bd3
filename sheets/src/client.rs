use crate::auth::ServiceAccountAuth;
use crate::config::Config;
use crate::credentials::ServiceAccountKey;
use crate::errors::SheetsError;
use crate::metrics_defs::API_REQUEST_DURATION;
use crate::types::{
    AppendValuesResponse, AppendedRange, ApiErrorResponse, CellValue, SpreadsheetMetadata,
    a1_range,
};
use async_trait::async_trait;
use serde_json::json;
use std::time::{Duration, Instant};
use url::Url;

/// The worksheet operations the intake service needs from a spreadsheet.
#[async_trait]
pub trait Spreadsheet: Send + Sync {
    /// Titles of all worksheets, in tab order.
    async fn worksheet_titles(&self) -> Result<Vec<String>, SheetsError>;

    /// Adds an empty worksheet with the given grid size.
    async fn add_worksheet(&self, title: &str, rows: u32, cols: u32) -> Result<(), SheetsError>;

    /// Appends `row` after the last row holding data in `worksheet`.
    async fn append_row(
        &self,
        worksheet: &str,
        row: &[CellValue],
    ) -> Result<AppendedRange, SheetsError>;
}

/// Sheets v4 REST client for a single spreadsheet.
pub struct SheetsClient {
    http: reqwest::Client,
    auth: ServiceAccountAuth,
    api_url: Url,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn new(
        config: &Config,
        key: ServiceAccountKey,
        spreadsheet_id: String,
    ) -> Result<Self, SheetsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let auth = ServiceAccountAuth::new(key, http.clone())?;

        Ok(SheetsClient {
            http,
            auth,
            api_url: config.api_url.clone(),
            spreadsheet_id,
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn client_email(&self) -> &str {
        self.auth.client_email()
    }

    /// `{api_url}/v4/spreadsheets/{segments..}` with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, SheetsError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, SheetsError> {
        let token = self.auth.access_token().await?;

        let start = Instant::now();
        let result = request.bearer_auth(token).send().await;
        shared::histogram!(API_REQUEST_DURATION, "operation" => operation)
            .record(start.elapsed().as_secs_f64());

        let response = result?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        tracing::warn!(
            operation,
            status = status.as_u16(),
            error = %message,
            "Sheets API request failed"
        );

        Err(SheetsError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Spreadsheet for SheetsClient {
    async fn worksheet_titles(&self) -> Result<Vec<String>, SheetsError> {
        let url = self.url(&[self.spreadsheet_id.as_str()])?;
        let request = self
            .http
            .get(url)
            .query(&[("fields", "sheets.properties.title")]);

        let metadata: SpreadsheetMetadata = self.send("get", request).await?.json().await?;

        Ok(metadata
            .sheets
            .into_iter()
            .filter_map(|sheet| sheet.properties.and_then(|p| p.title))
            .collect())
    }

    async fn add_worksheet(&self, title: &str, rows: u32, cols: u32) -> Result<(), SheetsError> {
        let segment = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.url(&[segment.as_str()])?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "sheetType": "GRID",
                        "gridProperties": {"rowCount": rows, "columnCount": cols},
                    }
                }
            }]
        });

        self.send("add_sheet", self.http.post(url).json(&body)).await?;

        tracing::info!(worksheet = title, rows, cols, "Added worksheet");
        Ok(())
    }

    async fn append_row(
        &self,
        worksheet: &str,
        row: &[CellValue],
    ) -> Result<AppendedRange, SheetsError> {
        let segment = format!("{}:append", a1_range(worksheet, "A1"));
        let url = self.url(&[self.spreadsheet_id.as_str(), "values", segment.as_str()])?;
        let request = self
            .http
            .post(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": [row] }));

        let response: AppendValuesResponse = self.send("append", request).await?.json().await?;

        Ok(AppendedRange {
            updated_range: response.updates.and_then(|u| u.updated_range),
        })
    }
}
