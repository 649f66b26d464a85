//! # Runtime
//!
//! Owns the wasmtime engine shared by the loader, the linker and the store.

use wasmtime::Engine;

#[derive(Debug)]
pub enum Error {
    Engine(wasmtime::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Engine(e) => write!(f, "Engine error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

pub struct Runtime {
    engine: Engine,
}

impl Runtime {
    /// Creates a runtime whose engine supports async instantiation and calls.
    pub fn new() -> Result<Self> {
        let mut config = wasmtime::Config::new();
        config.async_support(true);

        let engine = Engine::new(&config).map_err(Error::Engine)?;
        Ok(Self { engine })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}
