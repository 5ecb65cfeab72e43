//! Wrapper for credential material held in memory

use std::fmt;
use zeroize::Zeroize;

/// A sensitive value (service-account password, token) that must never
/// appear in logs or debug output. The inner value is zeroed on drop.
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the inner value. Call sites should hand the reference straight
    /// to the consumer (request body, comparison) rather than storing it.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display_are_redacted() {
        let password = Secret::new(String::from("hunter2"));
        assert_eq!(format!("{password:?}"), "[REDACTED]");
        assert_eq!(format!("{password}"), "[REDACTED]");
    }

    #[test]
    fn expose_returns_the_value() {
        let password = Secret::new(String::from("hunter2"));
        assert_eq!(password.expose(), "hunter2");
    }

    #[test]
    fn clone_preserves_the_value() {
        let original = Secret::new(String::from("hunter2"));
        let copy = original.clone();
        drop(original);
        assert_eq!(copy.expose(), "hunter2");
    }
}
