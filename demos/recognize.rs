//! Recognizes one ID card image.
//!
//! ```sh
//! TENCENTCLOUD_SECRET_ID=... TENCENTCLOUD_SECRET_KEY=... \
//!     cargo run --example recognize --features tracing -- card.jpg back
//! ```

use std::env;
use std::fs;

use tencent_ocr_client::auth::Credentials;
use tencent_ocr_client::ocr::{CardSide, Config, IdCardRequest, OcrClient};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: recognize <image> [front|back]"))?;
    let side = args
        .next()
        .map_or(Ok(CardSide::Front), |s| s.parse::<CardSide>())?;

    let credentials = Credentials::from_env()?;
    let client = OcrClient::new(Config::default())?;

    let image = fs::read(&path)?;
    let request = IdCardRequest::from_image_bytes(&image, side);

    let fields = client.recognize_and_parse(&credentials, &request).await?;
    if let Some(message) = fields.error() {
        error!(%message, "recognition failed");
        return Ok(());
    }

    for (label, value) in &fields {
        info!(%label, %value);
    }

    Ok(())
}
