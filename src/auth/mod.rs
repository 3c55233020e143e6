//! Credentials and request signing for Tencent Cloud API 3.0.
//!
//! Only the `TC3-HMAC-SHA256` scheme is implemented, restricted to the shape
//! the OCR endpoints accept: `POST /` with a JSON body, no query string, and
//! exactly two signed headers (`content-type;host`).

pub mod tc3;

use std::env;

use secrecy::{ExposeSecret as _, SecretString};

use crate::Result;
use crate::error::Error;

pub use tc3::{SignRequest, SignedHeaders, sign};

pub const SECRET_ID_ENV: &str = "TENCENTCLOUD_SECRET_ID";
pub const SECRET_KEY_ENV: &str = "TENCENTCLOUD_SECRET_KEY";

/// API key pair issued by Tencent Cloud CAM.
///
/// Both halves are kept as [`SecretString`] so that `Debug` output and logs
/// never contain them.
#[derive(Clone, Debug)]
pub struct Credentials {
    secret_id: SecretString,
    secret_key: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(secret_id: SecretString, secret_key: SecretString) -> Self {
        Self {
            secret_id,
            secret_key,
        }
    }

    /// Reads `TENCENTCLOUD_SECRET_ID` and `TENCENTCLOUD_SECRET_KEY`.
    pub fn from_env() -> Result<Self> {
        let secret_id = read_env(SECRET_ID_ENV)?;
        let secret_key = read_env(SECRET_KEY_ENV)?;
        Ok(Self::new(secret_id, secret_key))
    }

    pub(crate) fn secret_id(&self) -> &str {
        self.secret_id.expose_secret()
    }

    pub(crate) fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

fn read_env(name: &str) -> Result<SecretString> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(SecretString::from(value)),
        Ok(_) => Err(Error::validation(format!("{name} is set but empty"))),
        Err(e) => Err(Error::validation(format!("{name}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret as _;

    use super::*;
    use crate::error::Kind;

    #[test]
    fn debug_output_redacts_both_halves() {
        let credentials = Credentials::new(
            SecretString::from("AKID_VISIBLE"),
            SecretString::from("super-secret-key"),
        );

        let debug = format!("{credentials:?}");
        assert!(!debug.contains("AKID_VISIBLE"), "{debug}");
        assert!(!debug.contains("super-secret-key"), "{debug}");
    }

    #[test]
    fn read_env_present_empty_and_missing() {
        const PRESENT: &str = "TENCENT_OCR_CLIENT_TEST_READ_ENV_PRESENT";
        const EMPTY: &str = "TENCENT_OCR_CLIENT_TEST_READ_ENV_EMPTY";
        const MISSING: &str = "TENCENT_OCR_CLIENT_TEST_READ_ENV_MISSING";

        // SAFETY: these variable names are used by this test only.
        unsafe {
            env::set_var(PRESENT, "AKID_FROM_ENV");
            env::set_var(EMPTY, "");
            env::remove_var(MISSING);
        }

        let value = read_env(PRESENT).unwrap();
        assert_eq!(value.expose_secret(), "AKID_FROM_ENV");

        let err = read_env(EMPTY).unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
        assert!(err.to_string().contains(EMPTY), "{err}");

        let err = read_env(MISSING).unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
        assert!(err.to_string().contains(MISSING), "{err}");
    }
}
