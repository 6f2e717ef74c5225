//! `reqwest`-backed provider for the myEKZ consumption portal.
//!
//! Only the JSON endpoints are implemented here. Login and session renewal
//! are handled outside this crate; the provider is constructed from an
//! already-authenticated session cookie.

pub mod response;

use async_trait::async_trait;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    config::PortalConfig,
    models::{
        installation::Installation, reading::ConsumptionData,
        request_params::ConsumptionRequestParams,
    },
    providers::{ConsumptionDataProvider, ProviderError},
};

use response::{ApiConsumptionData, ApiInstallationSelectionData};

const BASE_URL: &str = "https://my.ekz.ch/api/portal-services/consumption-view/v1";

/// API date format, `YYYY-MM-DD`.
const API_DATE_FORMAT: &str = "%Y-%m-%d";

/// Provider talking to the portal's consumption-view endpoints.
pub struct EkzProvider {
    client: Client,
    base_url: String,
    _session_cookie: SecretString,
}

impl EkzProvider {
    /// Creates a provider from a pre-authenticated session cookie.
    pub fn new(session_cookie: SecretString) -> Result<Self, ProviderError> {
        Self::with_base_url(session_cookie, BASE_URL)
    }

    /// Creates a provider from the loaded portal configuration.
    pub fn from_config(config: &PortalConfig) -> Result<Self, ProviderError> {
        Self::new(SecretString::new(
            config.session_cookie.expose_secret().into(),
        ))
    }

    /// Same as [`EkzProvider::new`] with a custom endpoint root, for tests
    /// against a local stub server.
    pub fn with_base_url(
        session_cookie: SecretString,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json, text/plain, */*"),
        );
        let mut cookie = header::HeaderValue::from_str(session_cookie.expose_secret())?;
        cookie.set_sensitive(true);
        headers.insert(header::COOKIE, cookie);

        let client = Client::builder()
            .user_agent("metering-ingestor")
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            _session_cookie: session_cookie,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(ProviderError::Api(format!("{status}: {body}")));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ConsumptionDataProvider for EkzProvider {
    async fn list_installations(&self) -> Result<Vec<Installation>, ProviderError> {
        let data: ApiInstallationSelectionData = self
            .get_json(
                "installation-selection-data",
                &[("installationVariant", "CONSUMPTION".to_string())],
            )
            .await?;
        data.into_installations()
    }

    async fn fetch_consumption(
        &self,
        params: &ConsumptionRequestParams,
    ) -> Result<ConsumptionData, ProviderError> {
        if params.date_from > params.date_to {
            return Err(ProviderError::Validation(format!(
                "window start {} is after window end {}",
                params.date_from, params.date_to
            )));
        }

        let data: ApiConsumptionData = self
            .get_json(
                "consumption-data",
                &[
                    ("installationId", params.installation_id.clone()),
                    ("from", params.date_from.format(API_DATE_FORMAT).to_string()),
                    ("to", params.date_to.format(API_DATE_FORMAT).to_string()),
                    ("type", params.reading_type.api_code().to_string()),
                ],
            )
            .await?;
        Ok(data.into_canonical())
    }
}
