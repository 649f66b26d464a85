//! Filesystem capability.
//!
//! Host reads go through [`Filesystem::read`]. Guest access is limited to the
//! directories granted as preopens.

use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use wasmtime_wasi::DirPerms;
use wasmtime_wasi::FilePerms;
use wasmtime_wasi::WasiCtxBuilder;

use crate::capability::Error;
use crate::capability::Result;

/// A host directory made visible to the guest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preopen {
    pub host: PathBuf,
    pub guest: String,
}

impl Preopen {
    pub fn new(host: impl Into<PathBuf>, guest: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            guest: guest.into(),
        }
    }
}

/// Parses `HOST[::GUEST]`. Without a guest path the host path is reused.
impl FromStr for Preopen {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (host, guest) = match s.split_once("::") {
            Some((host, guest)) => (host, guest),
            None => (s, s),
        };
        if host.is_empty() || guest.is_empty() {
            return Err(Error::Syntax {
                input: s.to_string(),
                expected: "HOST[::GUEST]",
            });
        }
        Ok(Self::new(host, guest))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Filesystem {
    preopens: Vec<Preopen>,
}

impl Filesystem {
    pub fn new(preopens: Vec<Preopen>) -> Self {
        Self { preopens }
    }

    /// Reads a host file fully into memory.
    pub fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Grants every preopen to a WASI context under construction.
    pub fn grant(&self, builder: &mut WasiCtxBuilder) -> Result<()> {
        for preopen in &self.preopens {
            if !preopen.host.is_dir() {
                return Err(Error::Preopen {
                    path: preopen.host.clone(),
                    reason: "not a directory".into(),
                });
            }
            builder
                .preopened_dir(&preopen.host, &preopen.guest, DirPerms::all(), FilePerms::all())
                .map_err(|e| Error::Preopen {
                    path: preopen.host.clone(),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }
}
