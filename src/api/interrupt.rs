use std::sync::OnceLock;

use tracing::debug;

/// Callback invoked when the server signals the platform-wide
/// service-unavailable condition.
pub type InterruptHook = Box<dyn Fn() + Send + Sync>;

/// A slot holding at most one interrupt callback.
///
/// The slot is owned by the [`ApiClient`](super::ApiClient) and filled
/// once during application bootstrap, by the session store registering
/// itself. Firing with no registered callback is allowed — the immediate
/// caller still receives its error, nothing global happens.
///
/// The callback may be fired any number of times; registrations after the
/// first are ignored, so a double bootstrap is harmless.
#[derive(Default)]
pub struct InterruptSlot {
    hook: OnceLock<InterruptHook>,
}

impl InterruptSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the callback. Returns `false` when a callback was already
    /// registered, in which case the new one is dropped.
    pub fn register(&self, hook: impl Fn() + Send + Sync + 'static) -> bool {
        let installed = self.hook.set(Box::new(hook)).is_ok();
        if !installed {
            debug!("Interrupt callback already registered, ignoring");
        }
        installed
    }

    pub fn is_registered(&self) -> bool {
        self.hook.get().is_some()
    }

    /// Invoke the registered callback, if any.
    pub fn fire(&self) {
        if let Some(hook) = self.hook.get() {
            hook();
        }
    }
}
