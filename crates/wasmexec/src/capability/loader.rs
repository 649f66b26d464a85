//! Module loading capability.

use std::path::PathBuf;
use std::str::FromStr;

use wasmtime::Engine;
use wasmtime::Module;

use crate::capability::Error;
use crate::capability::Result;

/// An auxiliary module the bridge links under `name` before the main module
/// is instantiated, so the main module can import from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preload {
    pub name: String,
    pub path: PathBuf,
}

/// Parses `NAME=PATH`.
impl FromStr for Preload {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((name, path)) if !name.is_empty() && !path.is_empty() => Ok(Self {
                name: name.to_string(),
                path: PathBuf::from(path),
            }),
            _ => Err(Error::Syntax {
                input: s.to_string(),
                expected: "NAME=PATH",
            }),
        }
    }
}

/// Compiles modules against the launcher's engine.
#[derive(Clone)]
pub struct Loader {
    engine: Engine,
    preloads: Vec<Preload>,
}

impl Loader {
    pub fn new(engine: Engine, preloads: Vec<Preload>) -> Self {
        Self { engine, preloads }
    }

    /// Modules the bridge should pull in, in the order they were requested.
    pub fn preloads(&self) -> &[Preload] {
        &self.preloads
    }

    pub fn compile(&self, name: &str, bytes: &[u8]) -> Result<Module> {
        Module::new(&self.engine, bytes).map_err(|source| Error::Compile {
            name: name.to_string(),
            source,
        })
    }
}
