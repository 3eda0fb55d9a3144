use crate::models::{TabMode, UserId};

/// Per-session, per-tab lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControllerPhase {
    #[default]
    Uninitialized,
    LoadingFirstPage,
    Ready,
    LoadingMore,
    /// Last request failed; the store still holds the last good snapshot
    Error,
}

/// Mutable controller bookkeeping. Guarded by a single mutex; the item list
/// itself lives only in the store.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub user_id: Option<UserId>,
    pub tab: TabMode,
    pub expanded: bool,
    pub phase: ControllerPhase,
    /// Bumped on identity change, tab switch and reload
    pub generation: u64,
    /// Bumped only when a session starts or ends
    pub session: u64,
}

impl SessionState {
    pub fn context(&self) -> Option<RequestContext> {
        Some(RequestContext {
            generation: self.generation,
            user_id: self.user_id.clone()?,
            tab: self.tab,
        })
    }

    /// Does a response issued under `ctx` still apply?
    pub fn matches(&self, ctx: &RequestContext) -> bool {
        self.generation == ctx.generation
            && self.tab == ctx.tab
            && self.user_id.as_ref() == Some(&ctx.user_id)
    }
}

/// Where a request came from. Responses are applied only while this still
/// matches the live session (last request wins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestContext {
    pub generation: u64,
    pub user_id: UserId,
    pub tab: TabMode,
}
