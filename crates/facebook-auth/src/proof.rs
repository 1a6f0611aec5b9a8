//! Application secret proof
//!
//! Apps that enable "Require App Secret" must accompany every Graph API
//! call with `appsecret_proof`, an HMAC-SHA256 of the access token keyed
//! by the application secret, rendered as lowercase hex. The proof lets
//! the platform reject calls made with a stolen token but no secret.

use std::fmt::Write;

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Compute the `appsecret_proof` parameter for an access token.
pub fn appsecret_proof(app_secret: &str, access_token: &str) -> String {
    let mut mac = <Hmac<Sha256>>::new_from_slice(app_secret.as_bytes())
        .expect("HMAC key must be valid");
    mac.update(access_token.as_bytes());
    let tag = mac.finalize().into_bytes();

    let mut proof = String::with_capacity(tag.len() * 2);
    for b in tag {
        write!(proof, "{:02x}", b).unwrap();
    }
    proof
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_vector() {
        // HMAC-SHA256(key="xyz789", msg="abc123"), hex-encoded
        assert_eq!(
            appsecret_proof("xyz789", "abc123"),
            "4dad02ff1693df832f9c183fe400fc4f601360be06514acb4a73edb783eec345"
        );
    }

    #[test]
    fn proof_is_64_lowercase_hex_chars() {
        let proof = appsecret_proof("secret", "token");
        assert_eq!(proof.len(), 64);
        assert!(proof.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn proof_depends_on_both_inputs() {
        let base = appsecret_proof("secret", "token");
        assert_ne!(base, appsecret_proof("secret2", "token"));
        assert_ne!(base, appsecret_proof("secret", "token2"));
    }
}
