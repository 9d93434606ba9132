use rand::{Rng, distributions::Alphanumeric};

pub const PUBLIC_TOKEN_LEN: usize = 32;

/// Generates an unguessable token for unauthenticated access.
pub fn generate_public_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PUBLIC_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Cheap shape check so malformed tokens never reach the database.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == PUBLIC_TOKEN_LEN && token.bytes().all(|b| b.is_ascii_alphanumeric())
}
