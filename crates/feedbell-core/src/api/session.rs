use parking_lot::RwLock;

/// Supplies the credential attached to every request. Session management
/// itself (login, refresh) lives outside this crate.
pub trait SessionProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// A provider holding a token set by the host application.
#[derive(Debug, Default)]
pub struct StaticSession {
    token: RwLock<Option<String>>,
}

impl StaticSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }
}

impl SessionProvider for StaticSession {
    fn bearer_token(&self) -> Option<String> {
        self.token.read().clone()
    }
}
