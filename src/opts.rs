use derive_builder::Builder;

/// How text payloads that are not valid UTF-8 are handled.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TextPolicy {
    /// Fail the read with [`Error::MalformedText`](crate::Error::MalformedText).
    #[default]
    Strict,
    /// Replace invalid sequences with `U+FFFD`.
    Lossy,
}

/// Decoder config
#[derive(Clone, Copy, Debug, Builder)]
#[builder(default, derive(Debug))]
pub struct Config {
    /// Policy applied to string payloads that fail UTF-8 validation.
    pub(crate) text: TextPolicy,
    /// Limit the max element count of a decoded collection, 0 means no limit.
    /// The count prefix is attacker controlled, enable it when decoding
    /// untrusted input.
    pub(crate) max_array_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            text: TextPolicy::Strict,
            max_array_len: 0,
        }
    }
}

impl Config {
    pub fn text(&self) -> TextPolicy {
        self.text
    }

    pub fn max_array_len(&self) -> usize {
        self.max_array_len
    }

    /// Check a decoded collection count against `max_array_len`.
    pub(crate) fn check_array_len(&self, count: usize) -> crate::Result<()> {
        if self.max_array_len != 0 && count > self.max_array_len {
            return Err(crate::Error::ArrayTooLong {
                count,
                limit: self.max_array_len,
            });
        }
        Ok(())
    }
}
