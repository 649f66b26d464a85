//! Store context for a running guest.

use wasmtime_wasi::p1::WasiP1Ctx;

use crate::env::Env;

/// An event queued for the bridge to deliver on its next resume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingEvent {
    pub id: u32,
}

impl PendingEvent {
    /// Reserved event used to wake a guest that stalled without exiting.
    pub const DEADLOCK: PendingEvent = PendingEvent { id: 0 };
}

/// Instance configuration handed to a bridge, which turns it into an
/// [`ExecCtx`].
#[derive(Clone, Debug, Default)]
pub struct ContextBuilder {
    argv: Vec<String>,
    env: Env,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments after the module path. argv[0] is left to the bridge.
    pub fn argv<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argv = argv.into_iter().map(Into::into).collect();
        self
    }

    pub fn env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    pub fn get_argv(&self) -> &[String] {
        &self.argv
    }

    pub fn get_env(&self) -> &Env {
        &self.env
    }

    /// Bakes the configuration into a context around the bridge's WASI state.
    pub fn build(self, wasi: WasiP1Ctx) -> ExecCtx {
        ExecCtx {
            wasi,
            argv: self.argv,
            env: self.env,
            scope: anymap::Map::new(),
            exit_code: None,
            pending_event: None,
        }
    }
}

/// Per-instance state stored in Wasmtime's Store.
///
/// `exit` is the only way the exit status is set, and the first call wins.
pub struct ExecCtx {
    pub(crate) wasi: WasiP1Ctx,
    argv: Vec<String>,
    env: Env,
    scope: anymap::Map<dyn anymap::any::Any + Send + Sync>,
    exit_code: Option<i32>,
    pending_event: Option<PendingEvent>,
}

impl ExecCtx {
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Free-form bookkeeping owned by the bridge.
    pub fn scope(&self) -> &anymap::Map<dyn anymap::any::Any + Send + Sync> {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut anymap::Map<dyn anymap::any::Any + Send + Sync> {
        &mut self.scope
    }

    /// Records the guest's exit status.
    pub fn exit(&mut self, code: i32) {
        if self.exit_code.is_none() {
            self.exit_code = Some(code);
        }
    }

    pub fn exited(&self) -> bool {
        self.exit_code.is_some()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn set_pending_event(&mut self, event: PendingEvent) {
        self.pending_event = Some(event);
    }

    pub fn pending_event(&self) -> Option<PendingEvent> {
        self.pending_event
    }

    pub fn take_pending_event(&mut self) -> Option<PendingEvent> {
        self.pending_event.take()
    }

    pub fn wasi_mut(&mut self) -> &mut WasiP1Ctx {
        &mut self.wasi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasmtime_wasi::WasiCtxBuilder;

    fn ctx() -> ExecCtx {
        ContextBuilder::new()
            .argv(["a", "b"])
            .env(Env::with_tmpdir("/tmp"))
            .build(WasiCtxBuilder::new().build_p1())
    }

    #[test]
    fn builder_carries_configuration() {
        let ctx = ctx();
        assert_eq!(ctx.argv(), ["a", "b"]);
        assert_eq!(ctx.env().get("TMPDIR"), Some("/tmp"));
        assert!(ctx.scope().is_empty());
        assert!(!ctx.exited());
    }

    #[test]
    fn first_exit_wins() {
        let mut ctx = ctx();
        ctx.exit(3);
        ctx.exit(0);
        assert!(ctx.exited());
        assert_eq!(ctx.exit_code(), Some(3));
    }

    #[test]
    fn pending_event_is_taken_once() {
        let mut ctx = ctx();
        assert_eq!(ctx.pending_event(), None);
        ctx.set_pending_event(PendingEvent::DEADLOCK);
        assert_eq!(ctx.take_pending_event(), Some(PendingEvent { id: 0 }));
        assert_eq!(ctx.take_pending_event(), None);
    }

    #[test]
    fn scope_holds_bridge_state() {
        #[derive(Debug, PartialEq)]
        struct Marker(u8);

        let mut ctx = ctx();
        ctx.scope_mut().insert(Marker(7));
        assert_eq!(ctx.scope().get::<Marker>(), Some(&Marker(7)));
    }
}
