use tracing::{debug, info};

use crate::credentials::{hash_password, verify_password};
use crate::domain::UserAccount;
use crate::error::{FolioError, Result};
use crate::store::UserDirectory;
use crate::token::{SessionToken, TokenCodec};

pub async fn register<U: UserDirectory>(
    users: &U,
    name: &str,
    email: &str,
    password: &str,
) -> Result<UserAccount> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(FolioError::Invalid(
            "name, email and password are required".into(),
        ));
    }
    let password = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| FolioError::Io(std::io::Error::other(e)))??;
    let account = users.create_user(name.trim(), email.trim(), &hash).await?;
    info!(user_id = account.id, "registered user");
    Ok(account)
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login<U: UserDirectory>(
    users: &U,
    tokens: &TokenCodec,
    email: &str,
    password: &str,
) -> Result<SessionToken> {
    let Some(account) = users.find_by_email(email.trim()).await? else {
        debug!("login for unknown email");
        return Err(FolioError::InvalidCredentials);
    };
    let stored = account.password_hash.clone();
    let candidate = password.to_owned();
    let matches = tokio::task::spawn_blocking(move || verify_password(&stored, &candidate))
        .await
        .map_err(|e| FolioError::Io(std::io::Error::other(e)))?;
    if !matches {
        debug!(user_id = account.id, "login with wrong password");
        return Err(FolioError::InvalidCredentials);
    }
    tokens.issue(account.id)
}
