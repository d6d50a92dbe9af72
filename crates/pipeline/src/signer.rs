//! Coupang Partners request signing (`CEA` HMAC-SHA256 scheme).
//!
//! Every outbound affiliate call carries an `Authorization` header of the form
//!
//! ```text
//! CEA algorithm=HmacSHA256, access-key=<key>, signed-date=<YYMMDDTHHmmssZ>, signature=<hex>
//! ```
//!
//! where the signature is computed over `signed-date || method || path || query`.
//! The signed date is read from the injected [`Clock`] immediately before the
//! MAC is computed, so a token is only valid for a short window and must be
//! produced fresh for each request.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::errors::{ConfigError, SignatureError};
use crate::ports::Clock;
use crate::Timestamp;

type HmacSha256 = Hmac<Sha256>;

/// One signed request. Single-use and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: String,
    pub path: String,
    /// Raw query string without the leading `?`; empty when absent.
    pub query: String,
    pub timestamp: Timestamp,
    /// `signed-date` exactly as it entered the MAC.
    pub signed_date: String,
    /// Hex-encoded HMAC-SHA256.
    pub signature: String,
    pub access_key: String,
}

impl SignedRequest {
    /// Renders the `Authorization` header value.
    pub fn authorization(&self) -> String {
        format!(
            "CEA algorithm=HmacSHA256, access-key={}, signed-date={}, signature={}",
            self.access_key, self.signed_date, self.signature
        )
    }
}

/// Produces `Authorization` headers for the affiliate API.
///
/// Holds the key pair for the life of the process; the secret never leaves
/// this type and is never logged.
pub struct RequestSigner {
    access_key: String,
    secret_key: String,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("clock", &self.clock)
            .finish()
    }
}

impl RequestSigner {
    /// Creates a signer.
    ///
    /// Fails if either key is empty: a signer without a key pair is a startup
    /// configuration problem, not something to discover per request.
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let access_key = access_key.into();
        let secret_key = secret_key.into();
        if access_key.trim().is_empty() {
            return Err(ConfigError::new("affiliate access key is missing"));
        }
        if secret_key.trim().is_empty() {
            return Err(ConfigError::new("affiliate secret key is missing"));
        }
        Ok(Self {
            access_key,
            secret_key,
            clock,
        })
    }

    /// Signs `path_with_query` and returns the `Authorization` header value.
    pub fn sign(&self, method: &str, path_with_query: &str) -> Result<String, SignatureError> {
        Ok(self.sign_request(method, path_with_query)?.authorization())
    }

    /// Signs `path_with_query` and returns every component of the signature.
    ///
    /// The input is split on the first `?` only; anything after it, including
    /// further `?` characters, belongs to the query.
    pub fn sign_request(
        &self,
        method: &str,
        path_with_query: &str,
    ) -> Result<SignedRequest, SignatureError> {
        if method.is_empty() || method.chars().any(|c| !c.is_ascii_uppercase()) {
            return Err(SignatureError::InvalidMethod {
                method: method.to_string(),
            });
        }

        let (path, query) = path_with_query
            .split_once('?')
            .unwrap_or((path_with_query, ""));

        let timestamp = self.clock.now();
        let signed_date = timestamp.to_signed_date();
        let message = format!("{signed_date}{method}{path}{query}");

        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes()).map_err(|e| {
            SignatureError::Mac {
                reason: e.to_string(),
            }
        })?;
        mac.update(message.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        debug!(method, path, query, signed_date = %signed_date, "signed affiliate request");

        Ok(SignedRequest {
            method: method.to_string(),
            path: path.to_string(),
            query: query.to_string(),
            timestamp,
            signed_date,
            signature,
            access_key: self.access_key.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{Duration, TimeZone, Utc};

    const SEARCH: &str =
        "/v2/providers/affiliate_open_api/apis/openapi/v1/products/search?keyword=abc&limit=1";

    fn frozen() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2025, 5, 13, 9, 4, 7).unwrap())
    }

    fn signer(clock: &FixedClock) -> RequestSigner {
        RequestSigner::new("access", "secret", Arc::new(clock.clone())).unwrap()
    }

    fn expected_mac(message: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(b"secret").unwrap();
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn header_has_cea_layout() {
        let clock = frozen();
        let header = signer(&clock).sign("GET", SEARCH).unwrap();
        let signed = signer(&clock).sign_request("GET", SEARCH).unwrap();
        assert_eq!(
            header,
            format!(
                "CEA algorithm=HmacSHA256, access-key=access, signed-date=250513T090407Z, signature={}",
                signed.signature
            )
        );
    }

    #[test]
    fn message_is_date_method_path_query_without_question_mark() {
        let clock = frozen();
        let signed = signer(&clock).sign_request("GET", SEARCH).unwrap();
        assert_eq!(
            signed.path,
            "/v2/providers/affiliate_open_api/apis/openapi/v1/products/search"
        );
        assert_eq!(signed.query, "keyword=abc&limit=1");
        let message = format!("250513T090407ZGET{}{}", signed.path, signed.query);
        assert_eq!(signed.signature, expected_mac(&message));
    }

    #[test]
    fn path_without_query_signs_path_only() {
        let clock = frozen();
        let signed = signer(&clock).sign_request("POST", "/v1/deeplink").unwrap();
        assert_eq!(signed.query, "");
        assert_eq!(signed.signature, expected_mac("250513T090407ZPOST/v1/deeplink"));
    }

    #[test]
    fn only_the_first_question_mark_splits() {
        let clock = frozen();
        let signed = signer(&clock).sign_request("GET", "/p?a=1?b=2").unwrap();
        assert_eq!(signed.path, "/p");
        assert_eq!(signed.query, "a=1?b=2");
    }

    #[test]
    fn frozen_clock_gives_identical_signatures() {
        let clock = frozen();
        let s = signer(&clock);
        assert_eq!(s.sign("GET", SEARCH).unwrap(), s.sign("GET", SEARCH).unwrap());
    }

    #[test]
    fn signature_changes_with_the_timestamp() {
        let clock = frozen();
        let s = signer(&clock);
        let first = s.sign_request("GET", SEARCH).unwrap();
        clock.advance(Duration::seconds(1));
        let second = s.sign_request("GET", SEARCH).unwrap();
        assert_ne!(first.signed_date, second.signed_date);
        assert_ne!(first.signature, second.signature);
    }

    #[test]
    fn lower_case_method_is_rejected() {
        let clock = frozen();
        let err = signer(&clock).sign("get", SEARCH).unwrap_err();
        assert!(matches!(err, SignatureError::InvalidMethod { .. }));
        assert!(signer(&clock).sign("", SEARCH).is_err());
    }

    #[test]
    fn missing_keys_are_configuration_errors() {
        let clock: Arc<dyn Clock> = Arc::new(frozen());
        assert!(RequestSigner::new("", "secret", clock.clone()).is_err());
        assert!(RequestSigner::new("access", "  ", clock).is_err());
    }

    #[test]
    fn debug_output_redacts_the_secret() {
        let clock = frozen();
        let rendered = format!("{:?}", signer(&clock));
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("<redacted>"));
    }
}
