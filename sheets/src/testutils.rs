//! In-process stand-in for the Google token endpoint and the Sheets v4 API.

use crate::auth::Claims;
use crate::config::{Config, CredentialSource};
use crate::credentials::ServiceAccountKey;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;

pub const SERVICE_ACCOUNT_JSON: &str = include_str!("../testdata/service_account.json");
const PUBLIC_KEY_PEM: &str = include_str!("../testdata/service_account.pub.pem");

pub const TEST_SPREADSHEET_ID: &str = "test-spreadsheet";
pub const TEST_ACCESS_TOKEN: &str = "test-access-token";

pub struct MockState {
    pub worksheets: Vec<String>,
    pub rows: HashMap<String, Vec<Vec<Value>>>,
    pub added: Vec<(String, u64, u64)>,
    pub token_requests: usize,
    pub token_expires_in: u64,
    pub reject_tokens: bool,
    pub fail_appends: bool,
    pub last_claims: Option<Claims>,
    pub last_value_input_option: Option<String>,
    token_uri: String,
}

pub struct MockGoogle {
    pub addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
}

impl MockGoogle {
    /// Starts the mock on an ephemeral port. The spreadsheet initially holds `Sheet1`.
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(Mutex::new(MockState {
            worksheets: vec!["Sheet1".to_string()],
            rows: HashMap::new(),
            added: Vec::new(),
            token_requests: 0,
            token_expires_in: 3600,
            reject_tokens: false,
            fail_appends: false,
            last_claims: None,
            last_value_input_option: None,
            token_uri: format!("http://{addr}/token"),
        }));

        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockGoogle { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

/// The fixture key, pointed at the mock's token endpoint.
pub fn test_key(mock: &MockGoogle) -> ServiceAccountKey {
    let mut key = ServiceAccountKey::from_json(SERVICE_ACCOUNT_JSON).unwrap();
    key.token_uri = format!("{}/token", mock.url());
    key
}

pub fn test_config(mock: &MockGoogle) -> Config {
    Config {
        spreadsheet_id: Some(TEST_SPREADSHEET_ID.to_string()),
        credentials: CredentialSource::default(),
        api_url: mock.url().parse().unwrap(),
        request_timeout_secs: 5,
    }
}

fn api_error(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "error": {
            "code": status.as_u16(),
            "message": message,
            "status": status.canonical_reason(),
        }
    });
    (status, axum::Json(body)).into_response()
}

async fn handle(
    State(state): State<Arc<Mutex<MockState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut state = state.lock().unwrap();

    if uri.path() == "/token" && method == Method::POST {
        return token(&mut state, &body);
    }

    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TEST_ACCESS_TOKEN}"));
    if !authorized {
        return api_error(
            StatusCode::UNAUTHORIZED,
            "Request had invalid authentication credentials.",
        );
    }

    let Some(rest) = uri.path().strip_prefix("/v4/spreadsheets/") else {
        return api_error(StatusCode::NOT_FOUND, "Not Found");
    };

    let (spreadsheet_id, action) = match rest.split_once("/values/") {
        Some((id, range)) => (id, Some(range)),
        None => (rest.trim_end_matches(":batchUpdate"), None),
    };
    if spreadsheet_id != TEST_SPREADSHEET_ID {
        return api_error(StatusCode::NOT_FOUND, "Requested entity was not found.");
    }

    match (method, action) {
        (Method::GET, None) => {
            let sheets: Vec<Value> = state
                .worksheets
                .iter()
                .map(|title| json!({"properties": {"title": title}}))
                .collect();
            axum::Json(json!({ "sheets": sheets })).into_response()
        }
        (Method::POST, None) if rest.ends_with(":batchUpdate") => add_sheet(&mut state, &body),
        (Method::POST, Some(range)) => {
            state.last_value_input_option = uri.query().and_then(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .find(|(k, _)| k == "valueInputOption")
                    .map(|(_, v)| v.into_owned())
            });
            append(&mut state, range, &body)
        }
        _ => api_error(StatusCode::NOT_FOUND, "Not Found"),
    }
}

fn token(state: &mut MockState, body: &Bytes) -> Response {
    state.token_requests += 1;

    if state.reject_tokens {
        let body = json!({"error": "invalid_grant", "error_description": "Invalid JWT Signature."});
        return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
    }

    let form: HashMap<String, String> = url::form_urlencoded::parse(body)
        .into_owned()
        .collect();
    assert_eq!(
        form.get("grant_type").map(String::as_str),
        Some("urn:ietf:params:oauth:grant-type:jwt-bearer")
    );

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[state.token_uri.as_str()]);
    let key = DecodingKey::from_rsa_pem(PUBLIC_KEY_PEM.as_bytes()).unwrap();
    let claims = jsonwebtoken::decode::<Claims>(&form["assertion"], &key, &validation)
        .expect("assertion signed with the fixture key")
        .claims;
    state.last_claims = Some(claims);

    axum::Json(json!({
        "access_token": TEST_ACCESS_TOKEN,
        "expires_in": state.token_expires_in,
        "token_type": "Bearer",
    }))
    .into_response()
}

fn add_sheet(state: &mut MockState, body: &Bytes) -> Response {
    let request: Value = serde_json::from_slice(body).unwrap();
    let properties = &request["requests"][0]["addSheet"]["properties"];
    let title = properties["title"].as_str().unwrap().to_string();

    if state.worksheets.contains(&title) {
        return api_error(
            StatusCode::BAD_REQUEST,
            &format!(
                "Invalid requests[0].addSheet: A sheet with the name \"{title}\" already exists. Please enter another name."
            ),
        );
    }

    let rows = properties["gridProperties"]["rowCount"].as_u64().unwrap_or(0);
    let cols = properties["gridProperties"]["columnCount"].as_u64().unwrap_or(0);
    state.added.push((title.clone(), rows, cols));
    state.worksheets.push(title.clone());

    axum::Json(json!({
        "spreadsheetId": TEST_SPREADSHEET_ID,
        "replies": [{"addSheet": {"properties": {"sheetId": state.worksheets.len(), "title": title}}}],
    }))
    .into_response()
}

fn append(state: &mut MockState, range: &str, body: &Bytes) -> Response {
    if state.fail_appends {
        return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error encountered.");
    }

    let range = range.trim_end_matches(":append");
    let title = range
        .split_once('!')
        .map(|(sheet, _)| sheet.trim_matches('\'').replace("''", "'"))
        .unwrap_or_default();

    if !state.worksheets.contains(&title) {
        return api_error(
            StatusCode::BAD_REQUEST,
            &format!("Unable to parse range: {range}"),
        );
    }

    let request: Value = serde_json::from_slice(body).unwrap();
    let values = request["values"].as_array().cloned().unwrap_or_default();
    let rows = state.rows.entry(title.clone()).or_default();
    for row in values {
        rows.push(row.as_array().cloned().unwrap_or_default());
    }
    let row_number = rows.len();

    axum::Json(json!({
        "spreadsheetId": TEST_SPREADSHEET_ID,
        "updates": {
            "updatedRange": format!("'{title}'!A{row_number}:D{row_number}"),
            "updatedRows": 1,
        },
    }))
    .into_response()
}
