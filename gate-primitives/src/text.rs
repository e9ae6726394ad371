//! Character-based text capping.

/// Suffix appended whenever text is cut to fit a cap.
pub const TRUNCATION_SUFFIX: &str = "...[truncated]";

/// Text that may have been shortened to honour a size cap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CappedText {
    text: String,
    truncated: bool,
}

impl CappedText {
    /// Caps `text` at `max_chars` characters, appending [`TRUNCATION_SUFFIX`]
    /// when anything was removed.
    #[must_use]
    pub fn new(text: impl Into<String>, max_chars: usize) -> Self {
        let text = text.into();
        match text.char_indices().nth(max_chars) {
            Some((cut, _)) => {
                let mut capped = String::with_capacity(cut + TRUNCATION_SUFFIX.len());
                capped.push_str(&text[..cut]);
                capped.push_str(TRUNCATION_SUFFIX);
                Self {
                    text: capped,
                    truncated: true,
                }
            }
            None => Self {
                text,
                truncated: false,
            },
        }
    }

    /// Whether the original text exceeded the cap.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Returns the capped text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consumes the wrapper and returns the capped text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Returns the first `max_chars` characters of `text`, without a suffix.
#[must_use]
pub fn take_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}
