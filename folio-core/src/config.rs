use time::Duration;

use crate::error::{FolioError, Result};
use crate::util::hex::parse_hex_array;

pub const MIN_TOKEN_VALIDITY: Duration = Duration::hours(2);
pub const MAX_TOKEN_VALIDITY: Duration = Duration::hours(24);
pub const DEFAULT_TOKEN_VALIDITY: Duration = MAX_TOKEN_VALIDITY;

/// Signing material and lifetime for session tokens, owned by process start-up.
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: [u8; 32],
    pub validity: Duration,
}

impl TokenSettings {
    pub fn new(secret: [u8; 32], validity: Duration) -> Result<Self> {
        if validity < MIN_TOKEN_VALIDITY || validity > MAX_TOKEN_VALIDITY {
            return Err(FolioError::Config(format!(
                "token validity must be between {} and {} hours, got {}",
                MIN_TOKEN_VALIDITY.whole_hours(),
                MAX_TOKEN_VALIDITY.whole_hours(),
                validity.whole_hours()
            )));
        }
        Ok(Self { secret, validity })
    }

    pub fn from_hex(secret_hex: &str, validity_hours: i64) -> Result<Self> {
        let secret = parse_hex_array::<32>(secret_hex)?;
        Self::new(secret, Duration::hours(validity_hours))
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("validity", &self.validity)
            .finish()
    }
}
