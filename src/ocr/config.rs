use std::time::Duration;

use bon::Builder;
use url::Url;

use crate::Result;
use crate::error::Error;

pub const DEFAULT_HOST: &str = "ocr.tencentcloudapi.com";
pub const DEFAULT_SERVICE: &str = "ocr";
pub const ID_CARD_ACTION: &str = "IDCardOCR";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Endpoint and transport settings for [`OcrClient`](crate::ocr::OcrClient).
///
/// `host` is what gets signed and sent as the `Host` header. It normally
/// matches `endpoint`, but can differ when requests go through a proxy or a
/// local test server.
#[derive(Builder, Clone, Debug)]
pub struct Config {
    #[builder(default = default_endpoint())]
    pub endpoint: Url,
    #[builder(into, default = DEFAULT_HOST.to_owned())]
    pub host: String,
    #[builder(into, default = DEFAULT_SERVICE.to_owned())]
    pub service: String,
    #[builder(into, default = ID_CARD_ACTION.to_owned())]
    pub action: String,
    #[builder(default = DEFAULT_TIMEOUT)]
    pub connect_timeout: Duration,
    #[builder(default = DEFAULT_TIMEOUT)]
    pub read_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

impl Config {
    /// Points the client at `endpoint`, signing for the endpoint's own host.
    pub fn for_endpoint(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        let host = endpoint
            .host_str()
            .ok_or_else(|| Error::validation(format!("endpoint `{endpoint}` has no host")))?
            .to_owned();

        let config = Config::builder().endpoint(endpoint).host(host).build();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::validation("host must not be empty"));
        }
        if self.service.trim().is_empty() {
            return Err(Error::validation("service must not be empty"));
        }
        if self.action.trim().is_empty() {
            return Err(Error::validation("action must not be empty"));
        }
        if self.connect_timeout.is_zero() || self.read_timeout.is_zero() {
            return Err(Error::validation("timeouts must be non-zero"));
        }
        if !matches!(self.endpoint.scheme(), "http" | "https") {
            return Err(Error::validation(format!(
                "unsupported endpoint scheme `{}`",
                self.endpoint.scheme()
            )));
        }
        Ok(())
    }
}

fn default_endpoint() -> Url {
    Url::parse("https://ocr.tencentcloudapi.com/").expect("default endpoint is a valid url")
}
