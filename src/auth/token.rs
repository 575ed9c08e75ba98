use rand::rngs::OsRng;
use rand::RngCore;

/// generate an opaque email verification token
pub fn generate_verification_token() -> String {
    let mut buffer = [0u8; 32];
    OsRng.fill_bytes(&mut buffer);
    hex::encode(buffer)
}

/// generate an opaque session identifier
pub fn generate_session_id() -> String {
    let mut buffer = [0u8; 32];
    OsRng.fill_bytes(&mut buffer);
    hex::encode(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tokens_are_hex_and_long_enough() {
        let token = generate_verification_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..100).map(|_| generate_verification_token()).collect();
        assert_eq!(tokens.len(), 100);
    }
}
