use std::time::Duration;

use receipt_engine::ReceiptRecord;
use reqwest::{Client, Response, Url, header};
use serde::Deserialize;

use crate::{ClientError, ReceiptSource, Result, Snapshot};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(alias = "detail")]
    error: String,
}

/// Receipt backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: Url,
    http: Client,
}

impl HttpSource {
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|err| ClientError::InvalidUrl(format!("{base_url}: {err}")))?;
        // Without the trailing slash `join` would replace the last segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = header::HeaderMap::new();
        if let Some(token) = token {
            let mut auth = header::HeaderValue::try_from(format!("Bearer {token}"))
                .map_err(|err| ClientError::Validation(format!("invalid token: {err}")))?;
            auth.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, auth);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { base_url, http })
    }

    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Marks a receipt as completed (`POST /admin/complete-receipt/{id}`).
    pub async fn complete_receipt(&self, receipt_id: &str) -> Result<()> {
        let mut endpoint = self.endpoint("admin/complete-receipt/")?;
        endpoint
            .path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(receipt_id);

        tracing::info!("completing receipt {receipt_id}");
        let res = self.http.post(endpoint).send().await?;
        check(res).await?;
        Ok(())
    }

    /// Deletes every receipt of the current user (`DELETE /admin/clear-all-receipts`).
    pub async fn clear_receipts(&self) -> Result<()> {
        let endpoint = self.endpoint("admin/clear-all-receipts")?;

        tracing::info!("clearing all receipts");
        let res = self.http.delete(endpoint).send().await?;
        check(res).await?;
        Ok(())
    }

    /// Subscribes an address to anomaly alert emails.
    ///
    /// The backend replies by sending a confirmation email, so success only
    /// means the request was accepted.
    pub async fn subscribe_alerts(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ClientError::Validation(format!(
                "invalid email address: {email:?}"
            )));
        }

        let mut endpoint = self.endpoint("admin/subscribe-anomaly-alerts")?;
        endpoint.query_pairs_mut().append_pair("email", email);

        tracing::info!("subscribing {email} to anomaly alerts");
        let res = self.http.post(endpoint).send().await?;
        check(res).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::InvalidUrl(format!("{path}: {err}")))
    }
}

impl ReceiptSource for HttpSource {
    async fn fetch_receipts(&self) -> Result<Vec<ReceiptRecord>> {
        let endpoint = self.endpoint("receipts")?;

        tracing::debug!("fetching receipts from {endpoint}");
        let res = self.http.get(endpoint).send().await?;
        let snapshot = check(res).await?.json::<Snapshot>().await?;
        let records = snapshot.into_records();
        tracing::info!("fetched {} receipts", records.len());
        Ok(records)
    }
}

/// Passes successful responses through and turns the rest into errors.
async fn check(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let text = res.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorResponse>(&text)
        .map(|err| err.error)
        .unwrap_or_else(|_| {
            if text.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                text
            }
        });

    tracing::warn!("request failed with {status}: {body}");
    Err(ClientError::from_status(status.as_u16(), body))
}

#[derive(Debug)]
pub struct HttpSourceBuilder {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl Default for HttpSourceBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl HttpSourceBuilder {
    pub fn base_url(mut self, base_url: &str) -> HttpSourceBuilder {
        self.base_url = base_url.to_string();
        self
    }

    pub fn token(mut self, token: Option<&str>) -> HttpSourceBuilder {
        self.token = token.filter(|t| !t.is_empty()).map(str::to_string);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> HttpSourceBuilder {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpSource> {
        HttpSource::new(&self.base_url, self.token.as_deref(), self.timeout)
    }
}
