//! Guest environment assembly.

use std::collections::BTreeMap;

use crate::capability::Utf8;

pub const TMPDIR: &str = "TMPDIR";

/// Environment presented to the guest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Env {
    vars: BTreeMap<String, String>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// An environment holding only the `TMPDIR` default.
    pub fn with_tmpdir(tmpdir: impl Into<String>) -> Self {
        let mut vars = BTreeMap::new();
        vars.insert(TMPDIR.to_string(), tmpdir.into());
        Self { vars }
    }

    /// Overlays `vars` on top of this environment. Overlaid values win.
    pub fn overlay<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// The host temp directory as a default, overlaid with the inherited
    /// process environment.
    pub fn inherit(utf8: &Utf8) -> Self {
        let tmpdir = utf8.decode_os(std::env::temp_dir().as_os_str());
        Self::with_tmpdir(tmpdir).overlay(
            std::env::vars_os().map(|(k, v)| (utf8.decode_os(&k), utf8.decode_os(&v))),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
