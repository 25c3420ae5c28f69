use argon2::password_hash::rand_core::{OsRng, RngCore};

const TOKEN_BYTES: usize = 32;

/// Opaque bearer token: 256 bits from the OS RNG, hex encoded.
pub(crate) fn generate_session_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);

    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::generate_session_token;

    #[test]
    fn tokens_are_64_hex_chars_and_unique() {
        let a = generate_session_token();
        let b = generate_session_token();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
        assert_eq!(hex::decode(&a).expect("valid hex").len(), 32);
    }
}
