//! Spreadsheet values API client

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::{A1Range, Rows, SheetStore};
use crate::api::auth::AuthManager;

/// Values are parsed as if typed into the sheet UI
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: String,
    major_dimension: &'a str,
    values: Vec<Vec<Value>>,
}

pub struct SheetsClient {
    http: reqwest::Client,
    auth: Arc<AuthManager>,
    base_url: String,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn new(
        http: reqwest::Client,
        auth: Arc<AuthManager>,
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            auth,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    fn values_url(&self, range: &A1Range, suffix: &str) -> String {
        values_url(&self.base_url, &self.spreadsheet_id, range, suffix)
    }

    async fn send_values(
        &self,
        request: reqwest::RequestBuilder,
        range: &A1Range,
        rows: Rows,
    ) -> Result<()> {
        let token = self.auth.access_token().await?;
        let body = ValueRangeBody {
            range: range.to_string(),
            major_dimension: "ROWS",
            values: rows_to_values(rows),
        };
        let response = request
            .bearer_auth(token)
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to send values for {}", range))?;
        check_status(response, range).await?;
        Ok(())
    }
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn read(&self, range: &A1Range) -> Result<Rows> {
        let token = self.auth.access_token().await?;
        log::debug!("GET values {}", range);
        let response = self
            .http
            .get(self.values_url(range, ""))
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("Failed to read {}", range))?;
        let response = check_status(response, range).await?;
        let parsed: ValueRange = response
            .json()
            .await
            .with_context(|| format!("Failed to parse values for {}", range))?;
        Ok(values_to_rows(parsed.values))
    }

    async fn write(&self, range: &A1Range, rows: Rows) -> Result<()> {
        log::debug!("PUT values {}", range);
        let request = self.http.put(self.values_url(range, ""));
        self.send_values(request, range, rows).await
    }

    async fn append(&self, range: &A1Range, rows: Rows) -> Result<()> {
        log::debug!("POST values {}:append", range);
        let request = self.http.post(self.values_url(range, ":append"));
        self.send_values(request, range, rows).await
    }
}

async fn check_status(response: reqwest::Response, range: &A1Range) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    bail!("Sheets API returned {} for {}: {}", status, range, body);
}

fn values_url(base_url: &str, spreadsheet_id: &str, range: &A1Range, suffix: &str) -> String {
    format!(
        "{}/v4/spreadsheets/{}/values/{}{}",
        base_url,
        urlencoding::encode(spreadsheet_id),
        urlencoding::encode(&range.to_string()),
        suffix
    )
}

/// Cells as text. The API omits trailing empty cells and may return numbers or
/// booleans for unformatted values.
fn values_to_rows(values: Vec<Vec<Value>>) -> Rows {
    values
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    Value::Null => None,
                    Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .collect()
}

fn rows_to_values(rows: Rows) -> Vec<Vec<Value>> {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| cell.map(Value::String).unwrap_or(Value::Null))
                .collect()
        })
        .collect()
}
