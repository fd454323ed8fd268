//! Stateless session tokens: HS256 JWTs carrying a user id and an absolute expiry.

use http::HeaderMap;
use http::header::{AUTHORIZATION, COOKIE};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::config::TokenSettings;
use crate::domain::UserId;
use crate::error::{FolioError, Result};

pub const DEFAULT_COOKIE_NAME: &str = "session";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: UserId,
    iat: i64,
    exp: i64,
}

/// An issued token. Immutable; clients discard it on logout.
#[derive(Clone, Debug)]
pub struct SessionToken {
    pub value: String,
    pub expires_at: OffsetDateTime,
}

/// Anything a session token can ride on (cookie jar, headers, ...).
pub trait TokenCarrier {
    fn session_token(&self, cookie_name: &str) -> Option<&str>;
}

impl TokenCarrier for HeaderMap {
    /// Cookie first, then `Authorization: Bearer`.
    fn session_token(&self, cookie_name: &str) -> Option<&str> {
        let from_cookie = self
            .get_all(COOKIE)
            .into_iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == cookie_name && !value.is_empty())
            .map(|(_, value)| value);
        if from_cookie.is_some() {
            return from_cookie;
        }
        self.get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    validity: Duration,
    cookie_name: String,
}

impl TokenCodec {
    pub fn new(settings: &TokenSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(&settings.secret),
            decoding: DecodingKey::from_secret(&settings.secret),
            validation,
            validity: settings.validity,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn issue(&self, user_id: UserId) -> Result<SessionToken> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    fn issue_at(&self, user_id: UserId, now: OffsetDateTime) -> Result<SessionToken> {
        let expires_at = now + self.validity;
        let claims = Claims {
            user_id,
            iat: now.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        };
        let value = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| FolioError::Credential(format!("token signing: {e}")))?;
        Ok(SessionToken { value, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<UserId> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Ok(data.claims.user_id),
            Err(e) => {
                debug!(error = %e, "rejected session token");
                Err(FolioError::InvalidToken)
            }
        }
    }

    /// `NoToken` when the carrier has none, `InvalidToken` when it fails verification.
    pub fn from_carrier<C: TokenCarrier + ?Sized>(&self, carrier: &C) -> Result<UserId> {
        let token = carrier
            .session_token(&self.cookie_name)
            .ok_or(FolioError::NoToken)?;
        self.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn codec_with(secret: u8) -> TokenCodec {
        let settings = TokenSettings::new([secret; 32], Duration::hours(2)).unwrap();
        TokenCodec::new(&settings)
    }

    #[test]
    fn issued_token_verifies_to_user() {
        let codec = codec_with(7);
        let token = codec.issue(42).unwrap();
        assert_eq!(codec.verify(&token.value).unwrap(), 42);
        assert!(token.expires_at > OffsetDateTime::now_utc() + Duration::minutes(119));
    }

    #[test]
    fn expired_token_is_invalid() {
        let codec = codec_with(7);
        let past = OffsetDateTime::now_utc() - Duration::hours(3);
        let token = codec.issue_at(42, past).unwrap();
        assert!(matches!(
            codec.verify(&token.value),
            Err(FolioError::InvalidToken)
        ));
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let token = codec_with(1).issue(9).unwrap();
        assert!(matches!(
            codec_with(2).verify(&token.value),
            Err(FolioError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        let codec = codec_with(7);
        for raw in ["", "abc", "a.b.c"] {
            assert!(matches!(codec.verify(raw), Err(FolioError::InvalidToken)));
        }
    }

    #[test]
    fn carrier_without_token_is_no_token() {
        let codec = codec_with(7);
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert!(matches!(
            codec.from_carrier(&headers),
            Err(FolioError::NoToken)
        ));
    }

    #[test]
    fn carrier_reads_cookie_then_bearer() {
        let codec = codec_with(7);
        let token = codec.issue(5).unwrap();

        let mut cookie = HeaderMap::new();
        let raw = format!("theme=dark; session={}", token.value);
        cookie.insert(COOKIE, HeaderValue::from_str(&raw).unwrap());
        assert_eq!(codec.from_carrier(&cookie).unwrap(), 5);

        let mut bearer = HeaderMap::new();
        let raw = format!("Bearer {}", token.value);
        bearer.insert(AUTHORIZATION, HeaderValue::from_str(&raw).unwrap());
        assert_eq!(codec.from_carrier(&bearer).unwrap(), 5);
    }

    #[test]
    fn carrier_with_bad_token_is_invalid_not_absent() {
        let codec = codec_with(7).with_cookie_name("auth");
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("auth=forged"));
        assert!(matches!(
            codec.from_carrier(&headers),
            Err(FolioError::InvalidToken)
        ));
    }
}
