/// Pointer capture mode of the hosting surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerLockMode {
    #[default]
    Unlocked,
    Locked,
}

/// Tracks whether the host has granted exclusive pointer capture.
///
/// Transitions come only from the host: a grant after a user click, a loss,
/// or a capture error. Errors are reported and treated as a loss.
#[derive(Debug, Clone, Default)]
pub struct PointerLock {
    mode: PointerLockMode,
    last_error: Option<String>,
}

impl PointerLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> PointerLockMode {
        self.mode
    }

    pub fn is_locked(&self) -> bool {
        self.mode == PointerLockMode::Locked
    }

    /// Most recent capture error reported by the host, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Host reported a capture change. Returns true if the mode changed.
    pub fn on_change(&mut self, locked: bool) -> bool {
        let next = if locked {
            PointerLockMode::Locked
        } else {
            PointerLockMode::Unlocked
        };
        if next == self.mode {
            return false;
        }
        tracing::debug!(?next, "pointer lock changed");
        self.mode = next;
        if locked {
            self.last_error = None;
        }
        true
    }

    /// Host refused or dropped capture.
    pub fn on_error(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::error!("unable to capture pointer: {reason}");
        self.mode = PointerLockMode::Unlocked;
        self.last_error = Some(reason);
    }
}
