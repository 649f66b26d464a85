//! # Launcher
//!
//! Drives one guest from bytes on disk to an exit status:
//! capabilities, bridge, configuration, read, instantiate, run, guard.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;
use tracing::info;
use wasmtime::Linker;
use wasmtime::Store;

use crate::bridge::Bridge;
use crate::bridge::WasiBridge;
use crate::capability::Capabilities;
use crate::capability::Preload;
use crate::capability::Preopen;
use crate::context::ContextBuilder;
use crate::env::Env;
use crate::guard::DeadlockGuard;
use crate::runtime::Runtime;

#[derive(Debug)]
pub enum Error {
    Runtime(crate::runtime::Error),
    Capability(crate::capability::Error),
    Bridge(crate::bridge::Error),
    Instantiate(wasmtime::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Runtime(e) => write!(f, "{}", e),
            Self::Capability(e) => write!(f, "{}", e),
            Self::Bridge(e) => write!(f, "{}", e),
            Self::Instantiate(e) => write!(f, "Instantiate error: {:#}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<crate::runtime::Error> for Error {
    fn from(e: crate::runtime::Error) -> Self {
        Self::Runtime(e)
    }
}

impl From<crate::capability::Error> for Error {
    fn from(e: crate::capability::Error) -> Self {
        Self::Capability(e)
    }
}

impl From<crate::bridge::Error> for Error {
    fn from(e: crate::bridge::Error) -> Self {
        Self::Bridge(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// What to run and what to grant it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LaunchConfig {
    pub module: PathBuf,
    /// Arguments after the module path, forwarded verbatim.
    pub argv: Vec<String>,
    pub preopens: Vec<Preopen>,
    pub preloads: Vec<Preload>,
}

/// Exit status chosen by the guest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExitStatus(pub i32);

impl ExitStatus {
    pub const SUCCESS: ExitStatus = ExitStatus(0);

    pub fn code(&self) -> i32 {
        self.0
    }

    /// The low eight bits, as a Unix parent would observe them.
    pub fn byte(&self) -> u8 {
        (self.0 & 0xff) as u8
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.byte())
    }
}

pub struct Launcher {
    runtime: Runtime,
    caps: Arc<Capabilities>,
}

impl Launcher {
    /// Builds the engine and the capability bundle granted by `config`.
    pub fn new(config: &LaunchConfig) -> Result<Self> {
        let runtime = Runtime::new()?;
        Ok(Self::with_runtime(runtime, config))
    }

    pub fn with_runtime(runtime: Runtime, config: &LaunchConfig) -> Self {
        let caps = Capabilities::host(
            runtime.engine(),
            config.preopens.clone(),
            config.preloads.clone(),
        );
        Self {
            runtime,
            caps: Arc::new(caps),
        }
    }

    pub fn capabilities(&self) -> &Arc<Capabilities> {
        &self.caps
    }

    /// Runs the module named by `config` through `bridge`.
    pub async fn launch(&self, bridge: &dyn Bridge, config: LaunchConfig) -> Result<ExitStatus> {
        let engine = self.runtime.engine();

        let env = Env::inherit(&self.caps.utf8);
        let ctx = bridge.context(ContextBuilder::new().argv(config.argv).env(env))?;
        let mut store = Store::new(engine, ctx);
        let mut linker = Linker::new(engine);
        bridge.import_object(&mut linker, &mut store).await?;

        debug!(module = %config.module.display(), "reading module");
        let module = {
            let bytes = self.caps.fs.read(&config.module)?;
            self.caps
                .loader
                .compile(&config.module.display().to_string(), &bytes)?
        };

        let instance = linker
            .instantiate_async(&mut store, &module)
            .await
            .map_err(Error::Instantiate)?;

        bridge.run(&mut store, &instance).await?;
        DeadlockGuard::new()
            .check(bridge, &mut store, &instance)
            .await?;

        let status = ExitStatus(store.data().exit_code().unwrap_or(0));
        info!(
            code = status.code(),
            elapsed_ms = self.caps.clock.now_ms(),
            "guest finished"
        );
        Ok(status)
    }
}

/// Runs `config` with the WASI bridge, using the module path as argv[0].
pub async fn run(config: LaunchConfig) -> Result<ExitStatus> {
    let launcher = Launcher::new(&config)?;
    let program = launcher.caps.utf8.decode_os(config.module.as_os_str());
    let bridge = WasiBridge::new(Arc::clone(&launcher.caps), program);
    launcher.launch(&bridge, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_status_masks_to_byte() {
        assert_eq!(ExitStatus::SUCCESS.byte(), 0);
        assert_eq!(ExitStatus(7).byte(), 7);
        assert_eq!(ExitStatus(256 + 3).byte(), 3);
        assert_eq!(ExitStatus(-1).byte(), 255);
    }

    #[tokio::test]
    async fn missing_module_is_a_read_error() {
        let config = LaunchConfig {
            module: PathBuf::from("/no/such/module.wasm"),
            ..Default::default()
        };
        let err = run(config).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Capability(crate::capability::Error::Read { .. })
        ));
        assert!(err.to_string().contains("Failed to read /no/such/module.wasm"));
    }
}
