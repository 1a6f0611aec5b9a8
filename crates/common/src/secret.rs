//! Wrapper for the application secret and other sensitive strings
//!
//! The Graph API application secret signs cookie payloads and appsecret
//! proofs, so it must never reach logs or Debug output. Access tokens
//! loaded from configuration get the same treatment.

use std::fmt;
use zeroize::Zeroize;

/// Sensitive value, redacted in Debug/Display and zeroized on drop.
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    /// Wrap a sensitive value.
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the inner value. Call sites should pass the result straight
    /// into the signing or request-building code rather than storing it.
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> Drop for Secret<T> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl From<String> for Secret<String> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let secret = Secret::new(String::from("app-secret-903790"));
        let debug = format!("{:?}", secret);
        assert_eq!(debug, "[REDACTED]");
        assert!(!debug.contains("903790"));
    }

    #[test]
    fn display_output_is_redacted() {
        let secret = Secret::new(String::from("app-secret-903790"));
        assert_eq!(secret.to_string(), "[REDACTED]");
    }

    #[test]
    fn expose_returns_inner_value() {
        let secret = Secret::new(String::from("app-secret-903790"));
        assert_eq!(secret.expose(), "app-secret-903790");
    }

    #[test]
    fn clone_preserves_value() {
        let secret = Secret::from(String::from("abc"));
        let copy = secret.clone();
        assert_eq!(copy.expose(), "abc");
    }
}
