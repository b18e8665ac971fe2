//! Chronologically ordered document keys.
//!
//! Same shape as realtime database push ids: 8 characters of millisecond
//! timestamp followed by 12 random characters, drawn from an alphabet whose
//! byte order matches its lexicographic order.

use chrono::Utc;
use uuid::Uuid;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// Generate a new push id for the current instant.
pub fn generate() -> String {
    generate_at(Utc::now().timestamp_millis())
}

/// Generate a push id for a given millisecond timestamp.
pub fn generate_at(millis: i64) -> String {
    let mut id = String::with_capacity(20);

    let mut now = millis.max(0) as u64;
    let mut time_chars = [0u8; 8];
    for slot in time_chars.iter_mut().rev() {
        *slot = PUSH_CHARS[(now % 64) as usize];
        now /= 64;
    }
    id.extend(time_chars.iter().map(|&b| b as char));

    let random = Uuid::new_v4();
    for byte in random.as_bytes().iter().take(12) {
        id.push(PUSH_CHARS[(byte % 64) as usize] as char);
    }
    id
}
