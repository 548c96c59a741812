//! Configuration options for Sigma writing.
//!
//! The only choice the writer exposes is how binary values are encoded:
//!
//! - **Raw** (`|len|bytes`): the default, smallest output, not valid UTF-8 when the
//!   payload is arbitrary bytes
//! - **Base64** (`*data`): unpadded standard alphabet, keeps the whole document text
//!
//! ## Examples
//!
//! ```rust
//! use sigma::{to_string_with_options, Value, WriterOptions};
//!
//! let value = Value::Binary(vec![0xFF, 0x00]);
//! let text = to_string_with_options(&value, WriterOptions::base64()).unwrap();
//! assert_eq!(text, "*/wA");
//! ```

/// Configuration options for the Sigma writer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriterOptions {
    pub allow_raw_binary: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            allow_raw_binary: true,
        }
    }
}

impl WriterOptions {
    /// Creates default options (raw binary allowed).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigma::WriterOptions;
    ///
    /// assert!(WriterOptions::new().allow_raw_binary);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that encode every binary value as base64 text.
    #[must_use]
    pub fn base64() -> Self {
        WriterOptions {
            allow_raw_binary: false,
        }
    }

    #[must_use]
    pub fn with_raw_binary(mut self, allow: bool) -> Self {
        self.allow_raw_binary = allow;
        self
    }
}
