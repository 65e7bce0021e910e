use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::Identity;

use super::{Credentials, RawRecord, StatementSource};

/// Blocking client for the statement bridge of the banking API.
///
/// Each feed is a `GET` returning a JSON array. Requests authenticate with
/// HTTP basic auth and present the account's client certificate.
pub(crate) struct HttpSource {
    client: Client,
    base_url: String,
    identity: String,
    secret: String,
}

impl HttpSource {
    pub(crate) fn new(base_url: &str, credentials: &Credentials) -> Result<Self> {
        let der = std::fs::read(&credentials.cert_path).with_context(|| {
            format!(
                "Failed to read certificate: {}",
                credentials.cert_path.display()
            )
        })?;
        let identity = Identity::from_pkcs12_der(&der, &credentials.secret)
            .context("Failed to load client certificate")?;
        let client = Client::builder()
            .identity(identity)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            identity: credentials.identity.clone(),
            secret: credentials.secret.clone(),
        })
    }

    fn get_feed(&self, path: &str) -> Result<Vec<RawRecord>> {
        let url = format!("{}/{path}", self.base_url);
        tracing::debug!(%url, "Requesting feed");
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.identity, Some(&self.secret))
            .send()
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("Banking API rejected {url}"))?;
        response
            .json::<Vec<RawRecord>>()
            .with_context(|| format!("{url} did not return a JSON list"))
    }
}

impl StatementSource for HttpSource {
    fn card_statements(&self) -> Result<Vec<RawRecord>> {
        self.get_feed("card-statements")
    }

    fn account_feed(&self) -> Result<Vec<RawRecord>> {
        self.get_feed("account-feed")
    }
}
