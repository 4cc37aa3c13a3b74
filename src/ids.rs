//! Record identifier generation

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::TryRngCore;

/// Returns a fresh record id.
///
/// Uses a v4 UUID drawn from the OS random source. When the OS source is
/// unavailable, falls back to `"{unix_millis}-{hex}"`.
pub fn new_record_id() -> String {
    let mut bytes = [0u8; 16];
    match rand::rngs::OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string(),
        Err(e) => {
            log::warn!("[new_record_id] OS random source unavailable ({}), using fallback", e);
            fallback_record_id()
        }
    }
}

fn fallback_record_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u128(now.as_nanos());
    format!("{}-{:x}", now.as_millis(), hasher.finish())
}
