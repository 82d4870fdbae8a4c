//! SDK authentication token

use crate::config::ZoomConfig;
use crate::meeting::sdk::{MeetingError, MeetingResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Host role
const ROLE_HOST: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkClaims {
    pub app_key: String,
    pub sdk_key: String,
    /// Meeting number the token is scoped to
    pub mn: String,
    pub role: u8,
    pub iat: i64,
    pub exp: i64,
    pub token_exp: i64,
}

impl SdkClaims {
    pub fn new(zoom: &ZoomConfig, iat: i64) -> Self {
        let exp = iat + Duration::hours(TOKEN_LIFETIME_HOURS).num_seconds();
        Self {
            app_key: zoom.sdk_key.clone(),
            sdk_key: zoom.sdk_key.clone(),
            mn: zoom.pmi.clone(),
            role: ROLE_HOST,
            iat,
            exp,
            token_exp: exp,
        }
    }
}

/// HS256 token signed with the SDK secret, valid for 24 hours from now
pub fn generate_jwt(zoom: &ZoomConfig) -> MeetingResult<String> {
    let claims = SdkClaims::new(zoom, Utc::now().timestamp());
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(zoom.sdk_secret.as_bytes()),
    )
    .map_err(|e| MeetingError::Token(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    fn zoom() -> ZoomConfig {
        ZoomConfig {
            sdk_key: "key-123".into(),
            sdk_secret: "s3cret".into(),
            pmi: "5551234567".into(),
            ..ZoomConfig::default()
        }
    }

    #[test]
    fn test_claims_lifetime() {
        let claims = SdkClaims::new(&zoom(), 1_700_000_000);
        assert_eq!(claims.exp - claims.iat, 86_400);
        assert_eq!(claims.token_exp, claims.exp);
        assert_eq!(claims.role, 1);
        assert_eq!(claims.app_key, claims.sdk_key);
    }

    #[test]
    fn test_token_verifies_with_secret() {
        let token = generate_jwt(&zoom()).unwrap();
        let decoded = decode::<SdkClaims>(
            &token,
            &DecodingKey::from_secret(b"s3cret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(decoded.claims.mn, "5551234567");
        assert_eq!(decoded.header.alg, Algorithm::HS256);

        let wrong = decode::<SdkClaims>(
            &token,
            &DecodingKey::from_secret(b"other"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(wrong.is_err());
    }

    #[test]
    fn test_claims_use_camel_case() {
        let json = serde_json::to_value(SdkClaims::new(&zoom(), 0)).unwrap();
        assert!(json.get("appKey").is_some());
        assert!(json.get("tokenExp").is_some());
    }
}
