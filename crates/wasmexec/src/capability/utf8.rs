//! UTF-8 encode/decode capability.

use std::ffi::OsStr;

/// Encodes strings to UTF-8 and decodes bytes leniently.
///
/// Invalid sequences decode to U+FFFD rather than failing, so host argv and
/// environment entries that are not valid UTF-8 still reach the guest.
#[derive(Clone, Copy, Debug, Default)]
pub struct Utf8;

impl Utf8 {
    pub fn encode(&self, s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    pub fn decode(&self, bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    pub fn decode_os(&self, s: &OsStr) -> String {
        s.to_string_lossy().into_owned()
    }
}
