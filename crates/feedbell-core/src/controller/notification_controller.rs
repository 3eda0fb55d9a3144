use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::state::{ControllerPhase, RequestContext, SessionState};
use crate::api::{NotificationApi, PageRequest};
use crate::config::CoreConfig;
use crate::constants::paths;
use crate::error::{ErrorContext, ErrorReporter, FeedError, UserFacingError};
use crate::models::{ClientNotificationItem, NotificationRecord, TabMode, UserId};
use crate::navigation::{NavigationTarget, Navigator};
use crate::panel::{PanelView, ScrollMetrics, ViewState};
use crate::polling::PollingScheduler;
use crate::push::{ChannelState, PushChannel, PushHandlers, PushTransport};
use crate::store::{NotificationSnapshot, NotificationStore};

/// Orchestrates the notification feed for one signed-in user.
///
/// Owns the store, the push channel and the polling fallback, and is the
/// only writer to the store. Network failures never escape: list and
/// mutation failures become a dismissible [`UserFacingError`], push and
/// poll failures are logged and self-heal.
pub struct NotificationController {
    config: CoreConfig,
    api: Arc<dyn NotificationApi>,
    navigator: Arc<dyn Navigator>,
    store: NotificationStore,
    push: PushChannel,
    poller: PollingScheduler,
    errors: ErrorReporter,
    state: Mutex<SessionState>,
    // Forwards push records from the channel's handler into `handle_push`
    push_pump: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationController {
    pub fn new(
        config: CoreConfig,
        api: Arc<dyn NotificationApi>,
        transport: Arc<dyn PushTransport>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let poll_target = weak.clone();
            let poller = PollingScheduler::new(move || {
                let controller = poll_target.upgrade();
                async move {
                    match controller {
                        Some(controller) => controller.fetch_badge().await,
                        None => Ok(()),
                    }
                }
            });

            Self {
                push: PushChannel::new(transport, config.reconnect_delay()),
                config,
                api,
                navigator,
                store: NotificationStore::new(),
                poller,
                errors: ErrorReporter::new(),
                state: Mutex::new(SessionState::default()),
                push_pump: Mutex::new(None),
            }
        })
    }

    // ===== Getters =====

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<NotificationSnapshot> {
        self.store.snapshot()
    }

    pub fn phase(&self) -> ControllerPhase {
        self.state.lock().phase
    }

    pub fn tab(&self) -> TabMode {
        self.state.lock().tab
    }

    pub fn is_expanded(&self) -> bool {
        self.state.lock().expanded
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.state.lock().user_id.clone()
    }

    pub fn current_error(&self) -> Option<UserFacingError> {
        self.errors.current()
    }

    pub fn push_state(&self) -> ChannelState {
        self.push.state()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    pub fn view(&self) -> PanelView {
        let state = {
            let st = self.state.lock();
            ViewState {
                tab: st.tab,
                phase: st.phase,
                expanded: st.expanded,
                error: self.errors.current(),
            }
        };
        PanelView::build(&self.store.snapshot(), state, self.config.preview_limit)
    }

    // ===== Session lifecycle =====

    /// Feed the current session identity. Initializes on a new user, tears
    /// down on sign-out, and ignores repeats of the same identity.
    pub async fn set_session(self: &Arc<Self>, user: Option<UserId>) {
        let current = self.user_id();
        match user {
            Some(user) if current.as_ref() == Some(&user) => {}
            Some(user) => {
                if current.is_some() {
                    self.end_session();
                }
                self.start_session(user).await;
            }
            None => {
                if current.is_some() {
                    self.end_session();
                }
            }
        }
    }

    async fn start_session(self: &Arc<Self>, user: UserId) {
        let (ctx, session) = {
            let mut st = self.state.lock();
            st.generation += 1;
            st.session += 1;
            st.user_id = Some(user.clone());
            st.tab = TabMode::Unread;
            st.expanded = false;
            st.phase = ControllerPhase::LoadingFirstPage;
            (st.context(), st.session)
        };
        let Some(ctx) = ctx else {
            return;
        };

        tracing::info!(user_id = %user, "starting notification session");
        self.errors.dismiss();
        self.store.reset_session();
        self.store.set_loading(true);

        let request = PageRequest::first(TabMode::Unread, self.config.page_size);
        let (page, count) = tokio::join!(self.api.list_page(&request), self.api.unread_count());

        {
            let mut st = self.state.lock();
            // Sign-out or another identity took over while we were fetching
            if st.session != session {
                tracing::debug!(user_id = %user, "discarding superseded session init");
                return;
            }
            if st.matches(&ctx) {
                match page {
                    Ok(records) => {
                        self.store.set_all(user.clone(), records, request.size);
                        st.phase = ControllerPhase::Ready;
                    }
                    Err(e) => {
                        self.store.set_loading(false);
                        self.errors.report(ErrorContext::LoadNotifications, &e);
                        st.phase = ControllerPhase::Error;
                    }
                }
            } else {
                tracing::debug!(user_id = %user, "initial page superseded by a newer request");
            }
            match count {
                Ok(count) => self.store.set_badge_unread_count(count),
                Err(e) => tracing::debug!(error = %e, "initial unread count failed"),
            }

            // Under the lock so a concurrent sign-out can't be overtaken
            self.poller.start(self.config.poll_interval());
            self.open_push();
        }
    }

    fn open_push(self: &Arc<Self>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<NotificationRecord>();
        let handlers = PushHandlers::new()
            .on_open(|| tracing::debug!("notification stream open"))
            .on_notification(move |record| {
                let _ = tx.send(record);
            })
            .on_error(|e| tracing::debug!(error = %e, "notification stream error"));

        let weak = Arc::downgrade(self);
        let pump = tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                let Some(controller) = weak.upgrade() else {
                    break;
                };
                controller.handle_push(record).await;
            }
        });
        if let Some(old) = self.push_pump.lock().replace(pump) {
            old.abort();
        }

        let id = self.push.connect(self.config.url(paths::SUBSCRIBE), handlers);
        tracing::debug!(connection = ?id, "push channel requested");
    }

    /// Stop polling, close the channel, clear the store (reverse of init).
    pub fn end_session(&self) {
        let user = {
            let mut st = self.state.lock();
            st.generation += 1;
            st.session += 1;
            st.expanded = false;
            st.tab = TabMode::Unread;
            st.phase = ControllerPhase::Uninitialized;
            st.user_id.take()
        };

        self.poller.stop();
        self.push.disconnect();
        if let Some(pump) = self.push_pump.lock().take() {
            pump.abort();
        }
        self.store.reset_session();
        self.errors.dismiss();

        if let Some(user) = user {
            tracing::info!(user_id = %user, "notification session ended");
        }
    }

    // ===== Tabs and paging =====

    /// Switch between UNREAD and READ. Clears the list before the new
    /// mode's first page is requested, then refreshes the badge.
    pub async fn switch_tab(&self, mode: TabMode) {
        let ctx = {
            let mut st = self.state.lock();
            if st.user_id.is_none() || st.tab == mode {
                return;
            }
            st.tab = mode;
            st.expanded = false;
            st.generation += 1;
            st.phase = ControllerPhase::LoadingFirstPage;
            st.context()
        };
        let Some(ctx) = ctx else {
            return;
        };

        tracing::debug!(tab = %mode, "switching tab");
        self.store.reset();
        self.store.set_loading(true);

        self.fetch_first_page(ctx).await;
        self.refresh_badge().await;
    }

    /// Re-request the first page of the current tab (retry after an error).
    pub async fn reload(&self) {
        let ctx = {
            let mut st = self.state.lock();
            if st.user_id.is_none() {
                return;
            }
            st.generation += 1;
            st.expanded = false;
            st.phase = ControllerPhase::LoadingFirstPage;
            st.context()
        };
        let Some(ctx) = ctx else {
            return;
        };

        self.errors.dismiss();
        self.store.reset();
        self.store.set_loading(true);
        self.fetch_first_page(ctx).await;
        self.refresh_badge().await;
    }

    async fn fetch_first_page(&self, ctx: RequestContext) {
        let request = PageRequest::first(ctx.tab, self.config.page_size);
        let result = self.api.list_page(&request).await;

        let mut st = self.state.lock();
        if !st.matches(&ctx) {
            tracing::debug!(tab = %ctx.tab, "discarding stale first page");
            return;
        }
        match result {
            Ok(records) => {
                self.store.set_all(ctx.user_id, records, request.size);
                st.phase = ControllerPhase::Ready;
            }
            Err(e) => {
                self.store.set_loading(false);
                self.errors.report(ErrorContext::LoadNotifications, &e);
                st.phase = ControllerPhase::Error;
            }
        }
    }

    /// Expand the panel and fetch the next page.
    pub async fn expand(&self) -> bool {
        {
            let mut st = self.state.lock();
            if st.user_id.is_none() {
                return false;
            }
            st.expanded = true;
        }
        self.load_more().await
    }

    pub fn collapse(&self) {
        self.state.lock().expanded = false;
    }

    /// Scroll-proximity trigger for infinite scroll.
    pub async fn on_scroll(&self, metrics: ScrollMetrics) -> bool {
        if !metrics.near_bottom(self.config.scroll_threshold_px) {
            return false;
        }
        self.load_more().await
    }

    /// Fetch the page after the current cursor. Returns whether a request
    /// was issued; a no-op when collapsed, when no more pages are expected,
    /// or while another load is in flight.
    pub async fn load_more(&self) -> bool {
        let (ctx, cursor) = {
            let mut st = self.state.lock();
            if !st.expanded {
                return false;
            }
            let Some(ctx) = st.context() else {
                return false;
            };
            let snapshot = self.store.snapshot();
            if !snapshot.has_next || snapshot.loading || snapshot.loading_more {
                return false;
            }
            let Some(cursor) = snapshot.cursor.clone() else {
                return false;
            };
            self.store.set_loading_more(true);
            st.phase = ControllerPhase::LoadingMore;
            (ctx, cursor)
        };

        tracing::debug!(tab = %ctx.tab, cursor = %cursor, "loading more notifications");
        let request = PageRequest::after(ctx.tab, self.config.page_size, cursor);
        let result = self.api.list_page(&request).await;

        let mut st = self.state.lock();
        if !st.matches(&ctx) {
            tracing::debug!(tab = %ctx.tab, "discarding stale page");
            return true;
        }
        match result {
            Ok(records) => {
                self.store.append_many(records, request.size);
                st.phase = ControllerPhase::Ready;
            }
            Err(e) => {
                self.store.set_loading_more(false);
                self.errors.report(ErrorContext::LoadMore, &e);
                st.phase = ControllerPhase::Error;
            }
        }
        true
    }

    // ===== Read-state mutations =====

    /// Click on an item: mark it read optimistically (UNREAD tab only),
    /// navigate right away, then confirm with the server.
    pub async fn open_item(&self, id: &str) {
        let Some(item) = self.store.snapshot().get(id).cloned() else {
            tracing::debug!(id, "open requested for unknown notification");
            return;
        };
        let ctx = {
            let st = self.state.lock();
            match st.context() {
                Some(ctx) => ctx,
                None => return,
            }
        };

        if ctx.tab == TabMode::Read || item.is_read {
            self.navigate(&item);
            return;
        }

        let prior = self.store.mark_as_read_local(id);
        self.navigate(&item);

        match self.api.mark_read(id).await {
            Ok(()) => {
                tracing::debug!(id, "notification marked read");
            }
            Err(e) => {
                {
                    let st = self.state.lock();
                    if st.matches(&ctx) && self.store.snapshot().contains(id) {
                        if let Some(prior) = prior {
                            self.store.ingest(prior.as_record());
                        }
                    }
                }
                self.errors.report(ErrorContext::MarkRead, &e);
            }
        }

        self.refresh_badge().await;
    }

    fn navigate(&self, item: &ClientNotificationItem) {
        match NavigationTarget::resolve(&item.raw) {
            Some(target) => self.navigator.navigate(&target),
            None => tracing::debug!(id = %item.id, "notification has no navigation target"),
        }
    }

    /// Mark everything read. Flips loaded items and zeroes the badge at
    /// once; on failure only the badge is reconciled. Returns whether the
    /// server call was made.
    pub async fn mark_all_read(&self) -> bool {
        {
            let st = self.state.lock();
            if st.user_id.is_none() || st.tab != TabMode::Unread {
                return false;
            }
            let snapshot = self.store.snapshot();
            if snapshot.badge_unread_count == 0 && snapshot.loaded_unread() == 0 {
                return false;
            }
            self.store.mark_all_as_read_local();
            self.store.set_badge_unread_count(0);
        }

        match self.api.mark_all_read().await {
            Ok(()) => {
                tracing::info!("all notifications marked read");
            }
            Err(e) => {
                self.errors.report(ErrorContext::MarkAllRead, &e);
                self.refresh_badge().await;
            }
        }
        true
    }

    // ===== Push and badge =====

    /// A record delivered by the push channel. The badge is always
    /// refreshed; the record joins the list only on the UNREAD tab.
    pub async fn handle_push(&self, record: NotificationRecord) {
        {
            let st = self.state.lock();
            if st.user_id.is_none() {
                return;
            }
            if st.tab == TabMode::Unread {
                tracing::debug!(id = %record.id, "merging pushed notification");
                self.store.ingest(record);
            }
        }
        self.refresh_badge().await;
    }

    /// Pull the authoritative badge. Failures keep the last known value.
    pub async fn refresh_badge(&self) {
        if let Err(e) = self.fetch_badge().await {
            tracing::debug!(error = %e, "badge refresh failed, keeping last value");
        }
    }

    async fn fetch_badge(&self) -> Result<(), FeedError> {
        let Some(user) = self.user_id() else {
            return Ok(());
        };
        let count = self.api.unread_count().await?;

        let st = self.state.lock();
        if st.user_id.as_ref() == Some(&user) {
            self.store.set_badge_unread_count(count);
        }
        Ok(())
    }

    pub fn dismiss_error(&self) {
        self.errors.dismiss();
        let mut st = self.state.lock();
        if st.phase == ControllerPhase::Error && st.user_id.is_some() {
            st.phase = ControllerPhase::Ready;
        }
    }
}

impl Drop for NotificationController {
    fn drop(&mut self) {
        if let Some(pump) = self.push_pump.get_mut().take() {
            pump.abort();
        }
    }
}
