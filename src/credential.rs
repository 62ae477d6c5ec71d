//! API credential supplied by the user.

use std::fmt;

/// An opaque secret used to authenticate against the model provider.
///
/// The value is only held in memory for the lifetime of a session and is
/// redacted from `Debug` output so it never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Build a credential from raw user input.
    ///
    /// Returns `None` for empty input; an absent credential gates the rest
    /// of the page rather than being an error. Any other input is kept
    /// exactly as entered.
    pub fn from_input(input: &str) -> Option<Self> {
        if input.is_empty() {
            None
        } else {
            Some(Self(input.to_string()))
        }
    }

    /// Access the secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}
