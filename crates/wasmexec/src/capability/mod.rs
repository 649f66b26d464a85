//! # Host capabilities
//!
//! The explicit bundle of host functionality a bridge is constructed with:
//! module loading, filesystem access, a UTF-8 codec, a monotonic clock and a
//! secure random source. Nothing is installed globally; a bridge only sees
//! what it is handed here.

pub mod clock;
pub mod fs;
pub mod loader;
pub mod random;
pub mod utf8;

use std::path::Path;
use std::path::PathBuf;

use wasmtime::Engine;
use wasmtime::Module;

pub use clock::Clock;
pub use fs::Filesystem;
pub use fs::Preopen;
pub use loader::Loader;
pub use loader::Preload;
pub use random::SecureRandom;
pub use utf8::Utf8;

#[derive(Debug)]
pub enum Error {
    Read { path: PathBuf, source: std::io::Error },
    Preopen { path: PathBuf, reason: String },
    Compile { name: String, source: wasmtime::Error },
    Syntax { input: String, expected: &'static str },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "Failed to read {}: {}", path.display(), source),
            Self::Preopen { path, reason } => {
                write!(f, "Failed to preopen {}: {}", path.display(), reason)
            }
            Self::Compile { name, source } => write!(f, "Failed to compile {}: {}", name, source),
            Self::Syntax { input, expected } => {
                write!(f, "Invalid value '{}', expected {}", input, expected)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Everything the host grants to a bridge.
pub struct Capabilities {
    pub loader: Loader,
    pub fs: Filesystem,
    pub utf8: Utf8,
    pub clock: Clock,
    pub random: SecureRandom,
}

impl Capabilities {
    /// Host capabilities with no preopened directories and no preloads.
    pub fn new(engine: &Engine) -> Self {
        Self::host(engine, Vec::new(), Vec::new())
    }

    /// Host capabilities granting the given directories and preloads.
    ///
    /// The clock starts counting when the bundle is built.
    pub fn host(engine: &Engine, preopens: Vec<Preopen>, preloads: Vec<Preload>) -> Self {
        Self {
            loader: Loader::new(engine.clone(), preloads),
            fs: Filesystem::new(preopens),
            utf8: Utf8,
            clock: Clock::new(),
            random: SecureRandom,
        }
    }

    /// Reads and compiles a module from the host filesystem.
    pub fn load(&self, path: &Path) -> Result<Module> {
        let bytes = self.fs.read(path)?;
        self.loader.compile(&path.display().to_string(), &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reports_missing_file() {
        let engine = Engine::default();
        let caps = Capabilities::new(&engine);
        let err = caps
            .load(Path::new("/definitely/not/here.wasm"))
            .err()
            .expect("loading a missing file should fail");
        assert!(matches!(err, Error::Read { .. }));
        assert!(err.to_string().contains("/definitely/not/here.wasm"));
    }

    #[test]
    fn syntax_error_names_expected_form() {
        let err = Error::Syntax {
            input: "oops".into(),
            expected: "NAME=PATH",
        };
        assert_eq!(err.to_string(), "Invalid value 'oops', expected NAME=PATH");
    }
}
