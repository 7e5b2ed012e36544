//! Contact passwords, authorization codes and client-chosen contact handles.

use rand::Rng;
use uuid::Uuid;

const PASSWORD_POOL: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()";

/// Random string of `min..=max` characters drawn from `a-z0-9!@#$%^&*()`.
pub fn generate_password(min: usize, max: usize) -> String {
    let mut rng = rand::rng();
    let length = rng.random_range(min..=max.max(min));
    (0..length)
        .map(|_| char::from(PASSWORD_POOL[rng.random_range(0..PASSWORD_POOL.len())]))
        .collect()
}

/// Password stored on newly created contacts.
pub fn contact_password() -> String {
    generate_password(10, 14)
}

/// Transfer authorization code set on domains.
pub fn auth_code() -> String {
    generate_password(6, 8)
}

/// `C` followed by 15 upper-case hex characters; fits the registry's 16-character limit.
pub fn generate_contact_id() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
    format!("C{}", &hex[..15])
}
