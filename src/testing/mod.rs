//! In-memory stand-ins for the hosted backend, used by unit and
//! integration tests to run the full service without network access.

mod identity;
mod records;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use identity::{FakeIdentityProvider, SentEmail, FAKE_TOKEN_TTL_SECS};
pub use records::{MemoryRecordStore, Operation};

/// A panicking test must not take every later assertion down with it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
