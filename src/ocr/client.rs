use chrono::Utc;
use reqwest::Client as ReqwestClient;
use reqwest::Method;
use url::Url;

use crate::auth::{self, Credentials, SignRequest, SignedHeaders};
use crate::error::Error;
use crate::ocr::response::{self, OcrFields};
use crate::ocr::{Config, IdCardRequest, RequestOverrides};
use crate::{Result, Timestamp};

/// Client for the ID card recognition endpoint.
///
/// Holds no secrets: credentials are passed to each call and only live for the
/// duration of one signing operation. One attempt per call, no retries.
#[derive(Clone, Debug)]
pub struct OcrClient {
    config: Config,
    client: ReqwestClient,
}

impl OcrClient {
    /// Creates a client with its own connection pool and the configured timeouts.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = ReqwestClient::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()?;

        Ok(Self { config, client })
    }

    /// Creates a client on top of an existing `reqwest` client.
    ///
    /// `client` is used as is: the timeouts in `config` are not applied to it.
    /// Configure `connect_timeout` and `read_timeout` on the `reqwest` client
    /// you pass in, otherwise requests are not bounded in time.
    pub fn with_client(config: Config, client: ReqwestClient) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, client })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Signs `payload` for this client's host, service and action.
    pub fn sign(
        &self,
        credentials: &Credentials,
        payload: &str,
        timestamp: Timestamp,
    ) -> Result<SignedHeaders> {
        auth::sign(
            credentials,
            &SignRequest::new(
                &self.config.service,
                &self.config.host,
                &self.config.action,
                payload,
                timestamp,
            ),
        )
    }

    /// Sends `request` and returns the raw response body.
    pub async fn recognize_id_card(
        &self,
        credentials: &Credentials,
        request: &IdCardRequest,
    ) -> Result<String> {
        self.recognize_id_card_with_overrides(credentials, request, RequestOverrides::default())
            .await
    }

    /// Sends `request` with per-call overrides and returns the raw response body.
    ///
    /// Bodies carrying a service `Error` object with a string `Message` are
    /// returned as `Ok` whatever
    /// the HTTP status, so the service's own message reaches
    /// [`parse_id_card_response`](crate::ocr::parse_id_card_response). Any other
    /// non-2xx answer is a [`Kind::Status`](crate::error::Kind::Status) error.
    pub async fn recognize_id_card_with_overrides(
        &self,
        credentials: &Credentials,
        request: &IdCardRequest,
        overrides: RequestOverrides,
    ) -> Result<String> {
        let payload = request.to_payload()?;
        let timestamp = resolve_timestamp(overrides.timestamp);
        let headers = self.sign(credentials, &payload, timestamp)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            action = %self.config.action,
            host = %self.config.host,
            card_side = %request.card_side,
            timestamp,
            payload_len = payload.len(),
            "dispatching recognition request"
        );

        let http_request = self
            .client
            .request(Method::POST, self.endpoint())
            .body(payload)
            .build()?;

        let (status, body) =
            crate::request(&self.client, http_request, Some(headers.to_header_map()?)).await?;

        if status.is_success() || response::has_service_error(&body) {
            return Ok(body);
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(%status, "recognition request rejected without a service error");

        Err(Error::status(
            status,
            Method::POST,
            self.endpoint().path(),
            &body,
        ))
    }

    /// Sends `request` and normalizes the answer.
    ///
    /// Transport and status failures are still returned as `Err`; everything
    /// the service says ends up in the returned [`OcrFields`].
    pub async fn recognize_and_parse(
        &self,
        credentials: &Credentials,
        request: &IdCardRequest,
    ) -> Result<OcrFields> {
        let body = self.recognize_id_card(credentials, request).await?;
        Ok(response::parse_id_card_response(&body))
    }

    fn endpoint(&self) -> Url {
        self.config.endpoint.clone()
    }
}

fn resolve_timestamp(override_timestamp: Option<Timestamp>) -> Timestamp {
    override_timestamp.unwrap_or_else(|| Utc::now().timestamp())
}
