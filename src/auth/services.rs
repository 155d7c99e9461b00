use tracing::{info, instrument, warn};

use crate::auth::password::verify_password;
use crate::auth::repo_types::User;
use crate::db::Store;
use crate::error::Result;

/// Stored credential for `username`, if any.
#[instrument(skip(st))]
pub async fn lookup_user(st: &Store, username: &str) -> Result<Option<User>> {
    let user = User::find_by_username(&st.db, username).await?;
    info!(found = user.is_some(), "user lookup");
    Ok(user)
}

/// `Ok(false)` for an unknown user or a wrong password; `Err` only when storage fails.
#[instrument(skip(st, password))]
pub async fn authenticate(st: &Store, username: &str, password: &str) -> Result<bool> {
    let Some(user) = User::find_by_username(&st.db, username).await? else {
        info!("authentication failed: user not found");
        return Ok(false);
    };

    let ok = match verify_password(password, &user.password_hash) {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, "stored password hash unreadable; treating as mismatch");
            false
        }
    };
    if ok {
        info!("authentication succeeded");
    } else {
        warn!("authentication failed: wrong password");
    }
    Ok(ok)
}
