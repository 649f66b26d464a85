//! # wasmexec
//!
//! Runs a WebAssembly binary produced by a managed-language toolchain on a
//! wasmtime host, and hands its exit status back to the calling process.
//!
//! ## Architecture
//!
//! - **Capabilities**: the explicit host bundle (module loader, filesystem,
//!   UTF-8 codec, monotonic clock, secure random) a bridge is built with
//! - **Bridge**: adapts a guest's import surface to those capabilities;
//!   [`bridge::WasiBridge`] speaks WASI preview1
//! - **ExecCtx**: per-store runtime instance holding argv, env, scope, the
//!   exit status and the pending-event slot
//! - **Launcher**: the linear path from module bytes to exit status
//! - **DeadlockGuard**: wakes a guest that returned without exiting so the
//!   stall is reported instead of silently exiting 0
//!
//! ## Example
//!
//! ```rust,no_run
//! use wasmexec::launcher::{self, LaunchConfig};
//!
//! # async fn example() -> Result<(), wasmexec::launcher::Error> {
//! let status = launcher::run(LaunchConfig {
//!     module: "hello.wasm".into(),
//!     argv: vec!["--name".into(), "gopher".into()],
//!     ..Default::default()
//! })
//! .await?;
//! std::process::exit(status.code());
//! # }
//! ```

pub mod bridge;
pub mod capability;
pub mod cli;
pub mod context;
pub mod env;
pub mod guard;
pub mod launcher;
pub mod runtime;

pub use bridge::Bridge;
pub use bridge::WasiBridge;
pub use capability::Capabilities;
pub use context::ContextBuilder;
pub use context::ExecCtx;
pub use context::PendingEvent;
pub use env::Env;
pub use guard::DeadlockGuard;
pub use launcher::ExitStatus;
pub use launcher::LaunchConfig;
pub use launcher::Launcher;
pub use runtime::Runtime;
