use std::fmt;

/// Code used when no `APP_ACCESS_CODE` is configured.
pub const DEFAULT_ACCESS_CODE: &str = "1234";

/// Shared access code check in front of the prediction form.
///
/// This keeps casual visitors out of the form; it is not an authentication system.
#[derive(Clone)]
pub struct AccessGate {
    code: String,
}

impl AccessGate {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    pub fn check(&self, candidate: Option<&str>) -> SessionContext {
        SessionContext {
            authenticated: candidate.is_some_and(|candidate| candidate == self.code),
        }
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(DEFAULT_ACCESS_CODE)
    }
}

impl fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGate")
            .field("code", &"<redacted>")
            .finish()
    }
}

/// Per-request login state. Only an [`AccessGate`] can produce an authenticated context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    authenticated: bool,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
