//! Allocation of short public identifiers.
//!
//! Accounts and organizations are addressed externally by an 8-character
//! mixed-case alphanumeric identifier instead of their storage key. The
//! allocator draws uniformly from the 62-symbol alphabet and relies on the
//! reserving INSERT/UPDATE (backed by a unique index) as the authoritative
//! uniqueness check. The pre-insert existence probe in callers is only an
//! optimization; a unique violation on the final write is an ordinary retry.

use std::future::Future;

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::utils::errors::AppError;

pub const PUBLIC_ID_LEN: usize = 8;

/// Retry budget. With 62^8 possible identifiers a collision per draw is
/// astronomically unlikely; the bound exists to cap worst-case latency.
const MAX_ATTEMPTS: u32 = 10;

/// Generate one candidate identifier.
pub fn generate_public_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PUBLIC_ID_LEN)
        .map(char::from)
        .collect()
}

/// Outcome of a single reservation attempt.
pub enum Reservation<T> {
    /// The candidate was persisted into the owning record.
    Reserved(T),
    /// The candidate is already in use (pre-check hit or unique violation
    /// on the write). Counts as one attempt.
    Taken,
}

/// Drive `reserve` with fresh candidates until one sticks or the retry
/// budget runs out. Exhaustion is an operational failure, never shown to
/// the caller in detail.
pub async fn allocate<T, F, Fut>(mut reserve: F) -> Result<T, AppError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Reservation<T>, AppError>>,
{
    for _ in 0..MAX_ATTEMPTS {
        match reserve(generate_public_id()).await? {
            Reservation::Reserved(value) => return Ok(value),
            Reservation::Taken => continue,
        }
    }

    Err(AppError::internal(anyhow::anyhow!(
        "public identifier allocation exhausted after {MAX_ATTEMPTS} attempts"
    )))
}

/// True when `err` is a unique violation on the named constraint.
pub fn is_unique_violation_on(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
    )
}
