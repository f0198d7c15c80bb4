//! Google Sheets v4 store.

use chrono::{DateTime, Duration, Utc};
use futures::future::BoxFuture;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use url::Url;

use crate::logging::{debug, trace};
use crate::sheet::{CellRef, SheetMatrix};

use super::{CellValue, ServiceAccount, SheetStore, StoreError};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;
/// Upper bound on a cached token's lifetime, whatever the token endpoint says.
const MAX_TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

// <https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values#ValueRange>
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<JsonValue>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Sheet store backed by one sheet of a Google spreadsheet.
///
/// Reads fetch the whole sheet; writes update a single cell with
/// `valueInputOption=RAW`. No request timeout is set.
pub struct GoogleSheetsStore {
    client: Client,
    account: ServiceAccount,
    spreadsheet_id: String,
    sheet_name: String,
    base_url: Url,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleSheetsStore {
    pub fn new(
        account: ServiceAccount,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let base_url = Url::parse(SHEETS_API_BASE)
            .map_err(|e| StoreError::Config(format!("invalid api base url: {}", e)))?;
        Ok(Self {
            client: Client::new(),
            account,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            base_url,
            token: Mutex::new(None),
        })
    }

    /// Point the store at a different API root, e.g. a local emulator.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, StoreError> {
        self.base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Config(format!("invalid api base url '{}': {}", base_url, e)))?;
        Ok(self)
    }

    /// URL of the `values` resource for a range.
    fn values_url(&self, range: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Config(format!("api base url '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .push("values")
            .push(range);
        Ok(url)
    }

    async fn access_token(&self) -> Result<String, StoreError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) > now {
                return Ok(token.value.clone());
            }
        }

        debug!(account = %self.account.client_email, "fetching access token");
        let fresh = self
            .account
            .fetch_access_token(&self.client, SPREADSHEETS_SCOPE)
            .await?;
        let expires_in = i64::try_from(fresh.expires_in)
            .unwrap_or(MAX_TOKEN_LIFETIME_SECS)
            .min(MAX_TOKEN_LIFETIME_SECS);
        let value = fresh.access_token;
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: now + Duration::seconds(expires_in),
        });
        Ok(value)
    }

    async fn fetch_rows(&self) -> Result<SheetMatrix, StoreError> {
        let url = self.values_url(&self.sheet_name)?;
        let token = self.access_token().await?;
        trace!(url = %url, "fetching sheet values");

        let response = self.client.get(url).bearer_auth(token).send().await?;
        let range: ValueRange = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        let rows = range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();
        Ok(SheetMatrix::new(rows))
    }

    async fn write_cell(&self, cell: CellRef, value: CellValue) -> Result<(), StoreError> {
        let range = cell.qualified(&self.sheet_name);
        let mut url = self.values_url(&range)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let token = self.access_token().await?;
        debug!(range = %range, value = %value, "writing cell");

        let body = serde_json::json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [[value.to_json()]],
        });
        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

impl SheetStore for GoogleSheetsStore {
    fn get_rows(&self) -> BoxFuture<'_, Result<SheetMatrix, StoreError>> {
        Box::pin(self.fetch_rows())
    }

    fn update_cell(&self, cell: CellRef, value: CellValue) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(self.write_cell(cell, value))
    }
}

/// Turn a non-success response into [`StoreError::Api`] carrying the API's message.
async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| format!("{}: {}", status, body));
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Cells come back as strings for formatted reads, but stay defensive about
/// numbers and booleans.
fn cell_to_string(value: JsonValue) -> String {
    match value {
        JsonValue::String(s) => s,
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
