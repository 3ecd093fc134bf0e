//! CSRF - token per il form contatti pubblico
//!
//! Token senza stato: un JWT HS256 con `purpose = "contact"` e scadenza breve,
//! firmato con un segreto derivato da quello dei token di sessione.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

const CONTACT_PURPOSE: &str = "contact";

#[derive(Debug, Serialize, Deserialize)]
struct CsrfClaims {
    exp: usize,
    iat: usize,
    purpose: String,
}

pub struct CsrfGuard {
    secret: String,
    ttl_secs: i64,
}

impl CsrfGuard {
    pub fn new(jwt_secret: &str, ttl_secs: i64) -> Self {
        Self {
            secret: format!("{jwt_secret}::csrf"),
            ttl_secs,
        }
    }

    #[instrument(skip(self))]
    pub fn issue(&self) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = CsrfClaims {
            iat: now.timestamp() as usize,
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp() as usize,
            purpose: CONTACT_PURPOSE.to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .inspect_err(|e| error!("Failed to encode CSRF token: {:?}", e))
    }

    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> bool {
        let mut validation = Validation::default();
        validation.leeway = 0;
        match decode::<CsrfClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) if data.claims.purpose == CONTACT_PURPOSE => {
                debug!("CSRF token accepted");
                true
            }
            Ok(_) => {
                warn!("CSRF token with unexpected purpose");
                false
            }
            Err(e) => {
                warn!("CSRF token rejected: {:?}", e.kind());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_verifies() {
        let guard = CsrfGuard::new("secret", 60);
        let token = guard.issue().expect("token");
        assert!(guard.verify(&token));
    }

    #[test]
    fn test_rejects_foreign_and_expired_tokens() {
        let guard = CsrfGuard::new("secret", 60);
        let other = CsrfGuard::new("another-secret", 60);
        assert!(!guard.verify(&other.issue().expect("token")));
        assert!(!guard.verify("not-a-token"));

        let expired = CsrfGuard::new("secret", -120);
        assert!(!guard.verify(&expired.issue().expect("token")));
    }
}
