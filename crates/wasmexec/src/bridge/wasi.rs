//! # WASI preview1 bridge
//!
//! Presents the capability bundle to the guest through the
//! `wasi_snapshot_preview1` import surface: argv, environment, inherited
//! stdio, preopened directories, the monotonic clock and the secure RNG.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use wasmtime::Caller;
use wasmtime::Instance;
use wasmtime::Linker;
use wasmtime::Store;
use wasmtime_wasi::I32Exit;
use wasmtime_wasi::WasiCtxBuilder;

use crate::bridge::Bridge;
use crate::bridge::Error;
use crate::bridge::Result;
use crate::capability::Capabilities;
use crate::context::ContextBuilder;
use crate::context::ExecCtx;
use crate::context::PendingEvent;

/// Which entry point the bridge ran. Kept in the context's scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entry {
    /// `_start`: returning from it is `exit(0)`.
    Command,
    /// `_initialize`: returning from it leaves the guest alive.
    Reactor,
}

impl Entry {
    pub fn export_name(&self) -> &'static str {
        match self {
            Entry::Command => "_start",
            Entry::Reactor => "_initialize",
        }
    }
}

pub struct WasiBridge {
    caps: Arc<Capabilities>,
    program: String,
}

impl WasiBridge {
    /// `program` becomes the guest's argv[0].
    pub fn new(caps: Arc<Capabilities>, program: impl Into<String>) -> Self {
        Self {
            caps,
            program: program.into(),
        }
    }
}

#[async_trait]
impl Bridge for WasiBridge {
    fn context(&self, config: ContextBuilder) -> Result<ExecCtx> {
        let mut argv = Vec::with_capacity(config.get_argv().len() + 1);
        argv.push(self.program.clone());
        argv.extend(config.get_argv().iter().cloned());

        let mut wasi = WasiCtxBuilder::new();
        wasi.inherit_stdio()
            .args(&argv)
            .envs(&config.get_env().to_pairs())
            .monotonic_clock(self.caps.clock)
            .secure_random(self.caps.random);
        self.caps.fs.grant(&mut wasi)?;

        Ok(config.build(wasi.build_p1()))
    }

    async fn import_object(
        &self,
        linker: &mut Linker<ExecCtx>,
        store: &mut Store<ExecCtx>,
    ) -> Result<()> {
        wasmtime_wasi::p1::add_to_linker_async(linker, |ctx: &mut ExecCtx| &mut ctx.wasi)
            .map_err(Error::Link)?;

        // The stock `proc_exit` traps on statuses >= 126; any i32 is a valid exit here.
        linker.allow_shadowing(true);
        linker
            .func_wrap(
                "wasi_snapshot_preview1",
                "proc_exit",
                |mut caller: Caller<'_, ExecCtx>, code: i32| -> wasmtime::Result<()> {
                    caller.data_mut().exit(code);
                    Err(wasmtime::Error::new(I32Exit(code)))
                },
            )
            .map_err(Error::Link)?;
        linker.allow_shadowing(false);

        for preload in self.caps.loader.preloads() {
            debug!(name = %preload.name, path = %preload.path.display(), "linking preload");
            let module = self.caps.load(&preload.path)?;
            linker
                .module_async(&mut *store, &preload.name, &module)
                .await
                .map_err(Error::Link)?;
        }
        Ok(())
    }

    async fn run(&self, store: &mut Store<ExecCtx>, instance: &Instance) -> Result<()> {
        let entry = if instance.get_func(&mut *store, "_start").is_some() {
            Entry::Command
        } else if instance.get_func(&mut *store, "_initialize").is_some() {
            Entry::Reactor
        } else {
            return Err(Error::MissingEntry);
        };
        store.data_mut().scope_mut().insert(entry);

        debug!(entry = entry.export_name(), "running guest");
        let func = instance
            .get_typed_func::<(), ()>(&mut *store, entry.export_name())
            .map_err(Error::Link)?;
        let result = func.call_async(&mut *store, ()).await;
        settle(store.data_mut(), result, entry == Entry::Command)
    }

    async fn resume(&self, store: &mut Store<ExecCtx>, instance: &Instance) -> Result<()> {
        let event = store
            .data_mut()
            .take_pending_event()
            .unwrap_or(PendingEvent::DEADLOCK);

        if instance.get_func(&mut *store, "resume").is_some() {
            debug!(event = event.id, "resuming guest");
            let func = instance
                .get_typed_func::<(), ()>(&mut *store, "resume")
                .map_err(Error::Link)?;
            let result = func.call_async(&mut *store, ()).await;
            return settle(store.data_mut(), result, false);
        }

        let entry = store
            .data()
            .scope()
            .get::<Entry>()
            .map_or("the guest", |entry| entry.export_name());
        eprintln!(
            "fatal error: deadlock: guest returned from {} without exiting and no events are pending (event id {})",
            entry, event.id
        );
        Ok(())
    }
}

/// Folds a guest call's outcome into the context. `proc_exit` surfaces as an
/// `I32Exit` error and counts as an exit, not a failure.
fn settle(ctx: &mut ExecCtx, result: wasmtime::Result<()>, exits_on_return: bool) -> Result<()> {
    match result {
        Ok(()) => {
            if exits_on_return {
                ctx.exit(0);
            }
            Ok(())
        }
        Err(e) => match e.downcast_ref::<I32Exit>() {
            Some(exit) => {
                ctx.exit(exit.0);
                Ok(())
            }
            None => Err(Error::Trap(e)),
        },
    }
}
