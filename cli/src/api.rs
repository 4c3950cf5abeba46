//! HTTP client for the spendbook server.
//!
//! Requests authenticate with the `session_token` cookie, the same credential
//! the browser holds after Google sign-in. `GET /api/auth/session-token`
//! returns it for copying into `SPEND_SESSION_TOKEN`.

use ledger::{Expense, MonthSummary};
use reqwest::StatusCode;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde_json::Value;
use uuid::Uuid;

use crate::CliError;

/// Result of pushing one local record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Created,
    AlreadySynced,
}

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`CliError::MissingSessionToken`] without a token, or an error
    /// if the token is not a valid header value.
    pub fn new(base_url: &str, session_token: Option<&str>) -> Result<Self, CliError> {
        let session_token = session_token.ok_or(CliError::MissingSessionToken)?;

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&format!("session_token={session_token}"))?);

        let client = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_owned(), client })
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, CliError> {
        let response = self.client.get(self.url(path)).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn all(&self) -> Result<Vec<Expense>, CliError> {
        self.get_json("/api/expenses/all").await
    }

    pub async fn today(&self) -> Result<Vec<Expense>, CliError> {
        self.get_json("/api/expenses/today").await
    }

    pub async fn month(&self, year: i32, month0: u32) -> Result<Vec<Expense>, CliError> {
        self.get_json(&month_path("/api/expenses/month", year, month0)).await
    }

    pub async fn stats(&self, year: i32, month0: u32) -> Result<MonthSummary, CliError> {
        self.get_json(&month_path("/api/expenses/stats", year, month0)).await
    }

    /// Push a local record, keeping its id and timestamp.
    pub async fn push(&self, expense: &Expense) -> Result<PushOutcome, CliError> {
        let response = self.client.post(self.url("/api/expenses")).json(expense).send().await?;
        if response.status() == StatusCode::CONFLICT {
            return Ok(PushOutcome::AlreadySynced);
        }
        ensure_success(response).await?;
        Ok(PushOutcome::Created)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), CliError> {
        let response = self.client.delete(self.url(&format!("/api/expenses/{id}"))).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CliError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(ToOwned::to_owned))
        .unwrap_or(body);
    Err(CliError::Server { status: status.as_u16(), message })
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

fn month_path(path: &str, year: i32, month0: u32) -> String {
    format!("{path}?year={year}&month={month0}")
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
