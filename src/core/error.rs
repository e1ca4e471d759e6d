//=========================================================================
// Error Types
//=========================================================================
//
// Two failure families cross the orchestrator:
//   LifecycleError    - a hook returned Err or panicked (always contained)
//   RegistrationError - a system could not be registered
//
// Neither unwinds out of the public Game API. Both are logged at the
// point of containment and forwarded to failure listeners.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use thiserror::Error;

//=== Hook ================================================================

/// Identifies which lifecycle hook was being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Init,
    Awake,
    Start,
    Update,
    LateUpdate,
    OnPause,
    OnResume,
    Destroy,
}

impl Hook {
    /// Hook name as it appears in log output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Awake => "awake",
            Self::Start => "start",
            Self::Update => "update",
            Self::LateUpdate => "late_update",
            Self::OnPause => "on_pause",
            Self::OnResume => "on_resume",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=== Hook Results ========================================================

/// Error type returned by user hook bodies.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Return type of every lifecycle hook.
pub type HookResult = Result<(), HookError>;

//=== LifecycleError ======================================================

/// A contained hook failure.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The hook returned an error.
    #[error("{unit}.{hook} failed: {source}")]
    HookFailed {
        unit: String,
        hook: Hook,
        #[source]
        source: HookError,
    },

    /// The hook panicked; the panic was caught at the call site.
    #[error("{unit}.{hook} panicked: {message}")]
    HookPanicked {
        unit: String,
        hook: Hook,
        message: String,
    },
}

impl LifecycleError {
    /// Name of the unit whose hook failed.
    pub fn unit(&self) -> &str {
        match self {
            Self::HookFailed { unit, .. } | Self::HookPanicked { unit, .. } => unit,
        }
    }

    /// The hook that failed.
    pub fn hook(&self) -> Hook {
        match self {
            Self::HookFailed { hook, .. } | Self::HookPanicked { hook, .. } => *hook,
        }
    }
}

//=== RegistrationError ===================================================

/// Reasons a system registration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A system of the same concrete type is already registered.
    #[error("system {name} is already registered")]
    Duplicate { name: String },

    /// The game has been destroyed and accepts no more systems.
    #[error("game is destroyed")]
    GameDestroyed,

    /// No constructor is registered under this name.
    #[error("no system constructor registered as {name:?}")]
    UnknownSystem { name: String },
}

//=========================================================================
// Unit Tests
//=========================================================================
