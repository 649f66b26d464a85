//! # Bridge interface
//!
//! A bridge adapts the import surface a compiled guest expects to the host
//! capabilities it was constructed with. The launcher only talks to this
//! trait: it asks for a context, an import object, a run and, if the guest
//! stalls, a resume.

pub mod wasi;

use async_trait::async_trait;
use wasmtime::Instance;
use wasmtime::Linker;
use wasmtime::Store;

use crate::context::ContextBuilder;
use crate::context::ExecCtx;

pub use wasi::Entry;
pub use wasi::WasiBridge;

#[derive(Debug)]
pub enum Error {
    Capability(crate::capability::Error),
    Link(wasmtime::Error),
    MissingEntry,
    Trap(wasmtime::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Capability(e) => write!(f, "Capability error: {}", e),
            Self::Link(e) => write!(f, "Linker error: {}", e),
            Self::MissingEntry => {
                write!(f, "Missing entry point: module exports neither _start nor _initialize")
            }
            Self::Trap(e) => write!(f, "{:?}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<crate::capability::Error> for Error {
    fn from(e: crate::capability::Error) -> Self {
        Self::Capability(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The collaborator that owns a guest's import surface and entry points.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Builds the runtime instance from the launcher's configuration.
    fn context(&self, config: ContextBuilder) -> Result<ExecCtx>;

    /// Installs everything the guest may import.
    async fn import_object(
        &self,
        linker: &mut Linker<ExecCtx>,
        store: &mut Store<ExecCtx>,
    ) -> Result<()>;

    /// Runs the guest. Returns once the guest exits or has nothing left to do.
    async fn run(&self, store: &mut Store<ExecCtx>, instance: &Instance) -> Result<()>;

    /// Re-enters the guest to deliver the context's pending event.
    async fn resume(&self, store: &mut Store<ExecCtx>, instance: &Instance) -> Result<()>;
}
