use anyhow::{Context, Result};

/// Work factor used when no other cost is configured.
pub const DEFAULT_COST: u32 = 10;

/// Salted bcrypt hash of `plain`.
pub fn hash(plain: &str, cost: u32) -> Result<String> {
    bcrypt::hash(plain, cost).context("hashing password")
}

/// Check a presented secret against a stored hash.
///
/// A malformed stored hash counts as a mismatch; callers decide how to report it.
pub fn verify(plain: &str, stored_hash: &str) -> bool {
    bcrypt::verify(plain, stored_hash).unwrap_or(false)
}

/// [`hash`] on the blocking pool.
pub async fn hash_blocking(plain: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || hash(&plain, cost))
        .await
        .context("password hashing task")?
}

/// [`verify`] on the blocking pool.
pub async fn verify_blocking(plain: String, stored_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify(&plain, &stored_hash))
        .await
        .context("password verification task")
}
