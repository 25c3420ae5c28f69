//! Background refresh of the feed.
//!
//! Polling only runs while the reader is signed in and not editing a post,
//! so a refresh cannot overwrite an edit in progress.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::ChirpClientResult;
use crate::models::Post;

/// Default pause between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Whether the poller is fetching.
pub enum PollMode {
    /// No timer running.
    Idle,
    /// Re-fetching the full list on every tick.
    Polling,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// View state that decides the [`PollMode`].
pub struct PollerState {
    /// A session is active and the main view is shown.
    pub authenticated: bool,
    /// An inline edit form is open.
    pub editing: bool,
}

impl PollerState {
    /// The mode this state implies.
    pub fn mode(self) -> PollMode {
        if self.authenticated && !self.editing {
            PollMode::Polling
        } else {
            PollMode::Idle
        }
    }

    /// The signed-in main view was entered.
    pub fn enter_main_view(self) -> Self {
        Self {
            authenticated: true,
            editing: false,
        }
    }

    /// The session ended.
    pub fn logout(self) -> Self {
        Self {
            authenticated: false,
            editing: false,
        }
    }

    /// An inline edit form was opened.
    pub fn begin_edit(self) -> Self {
        Self {
            editing: true,
            ..self
        }
    }

    /// The edit form was saved or cancelled.
    pub fn finish_edit(self) -> Self {
        Self {
            editing: false,
            ..self
        }
    }
}

/// Handle the view uses to drive the poller. Dropping it stops the poller.
#[derive(Debug)]
pub struct PollerControl {
    state: watch::Sender<PollerState>,
}

impl Default for PollerControl {
    fn default() -> Self {
        Self::new()
    }
}

impl PollerControl {
    /// Starts in the signed-out state.
    pub fn new() -> Self {
        let (state, _) = watch::channel(PollerState::default());
        Self { state }
    }

    /// Current state.
    pub fn state(&self) -> PollerState {
        *self.state.borrow()
    }

    /// Current mode.
    pub fn mode(&self) -> PollMode {
        self.state().mode()
    }

    /// See [`PollerState::enter_main_view`].
    pub fn enter_main_view(&self) {
        self.transition(PollerState::enter_main_view);
    }

    /// See [`PollerState::logout`].
    pub fn logout(&self) {
        self.transition(PollerState::logout);
    }

    /// See [`PollerState::begin_edit`].
    pub fn begin_edit(&self) {
        self.transition(PollerState::begin_edit);
    }

    /// See [`PollerState::finish_edit`].
    pub fn finish_edit(&self) {
        self.transition(PollerState::finish_edit);
    }

    fn subscribe(&self) -> watch::Receiver<PollerState> {
        self.state.subscribe()
    }

    fn transition(&self, apply: impl FnOnce(PollerState) -> PollerState) {
        self.state.send_if_modified(|state| {
            let next = apply(*state);
            let changed = next != *state;
            *state = next;
            changed
        });
    }
}

/// Where the poller reads the feed from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetches the full post list, newest first.
    async fn fetch_posts(&self) -> ChirpClientResult<Vec<Post>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What the poller reports to the view.
pub enum FeedEvent {
    /// A poll completed while still in [`PollMode::Polling`].
    Fetched(Vec<Post>),
    /// The mode changed.
    ModeChanged(PollMode),
}

/// Fixed-interval fetch loop. Feed the emitted posts to
/// [`Feed::reconcile`](crate::feed::Feed::reconcile).
pub struct FeedPoller<S> {
    source: S,
    interval: Duration,
    control: watch::Receiver<PollerState>,
    events: mpsc::Sender<FeedEvent>,
}

impl<S> FeedPoller<S>
where
    S: FeedSource,
{
    /// Creates a poller driven by `control`, emitting into `events`.
    pub fn new(
        source: S,
        interval: Duration,
        control: &PollerControl,
        events: mpsc::Sender<FeedEvent>,
    ) -> Self {
        Self {
            source,
            interval,
            control: control.subscribe(),
            events,
        }
    }

    /// Runs until the [`PollerControl`] or the event receiver is dropped.
    ///
    /// Polls are awaited inline, so at most one is in flight; ticks that
    /// fall due meanwhile are skipped. Fetch errors are logged and the
    /// loop carries on.
    pub async fn run(mut self) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut mode = self.control.borrow_and_update().mode();

        loop {
            tokio::select! {
                _ = ticker.tick(), if mode == PollMode::Polling => {
                    let posts = match self.source.fetch_posts().await {
                        Ok(posts) => posts,
                        Err(err) => {
                            warn!(error = %err, "feed poll failed");
                            continue;
                        }
                    };

                    // state may have changed while the request was in flight
                    if self.control.borrow().mode() != PollMode::Polling {
                        debug!("dropping poll result after pause");
                        continue;
                    }
                    if self.events.send(FeedEvent::Fetched(posts)).await.is_err() {
                        return;
                    }
                }
                changed = self.control.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    let next = self.control.borrow_and_update().mode();
                    if next == mode {
                        continue;
                    }
                    mode = next;
                    debug!(?mode, "poll mode changed");
                    if mode == PollMode::Polling {
                        ticker.reset_immediately();
                    }
                    if self.events.send(FeedEvent::ModeChanged(mode)).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChirpClientError;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TICK: Duration = Duration::from_millis(10);
    const WAIT: Duration = Duration::from_secs(2);

    #[derive(Clone, Default)]
    struct FakeSource {
        calls: Arc<AtomicUsize>,
        fail_first: bool,
    }

    #[async_trait]
    impl FeedSource for FakeSource {
        async fn fetch_posts(&self) -> ChirpClientResult<Vec<Post>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && call == 0 {
                return Err(ChirpClientError::InvalidRequest("boom".to_string()));
            }
            Ok(vec![Post {
                id: 1,
                author_id: Some(1),
                username: "alice".to_string(),
                content: "hello".to_string(),
                created_at: Utc.timestamp_opt(10, 0).single().expect("valid ts"),
                edited: false,
                edited_at: None,
            }])
        }
    }

    async fn next_event(rx: &mut mpsc::Receiver<FeedEvent>) -> FeedEvent {
        time::timeout(WAIT, rx.recv())
            .await
            .expect("event before timeout")
            .expect("channel open")
    }

    #[test]
    fn state_machine_transitions() {
        let signed_out = PollerState::default();
        assert_eq!(signed_out.mode(), PollMode::Idle);

        let main = signed_out.enter_main_view();
        assert_eq!(main.mode(), PollMode::Polling);

        let editing = main.begin_edit();
        assert_eq!(editing.mode(), PollMode::Idle);
        assert_eq!(editing.finish_edit().mode(), PollMode::Polling);

        assert_eq!(editing.logout().mode(), PollMode::Idle);
        assert_eq!(signed_out.begin_edit().finish_edit().mode(), PollMode::Idle);
    }

    #[tokio::test]
    async fn polls_while_signed_in() {
        let control = PollerControl::new();
        control.enter_main_view();
        let (tx, mut rx) = mpsc::channel(8);
        let source = FakeSource::default();

        tokio::spawn(FeedPoller::new(source.clone(), TICK, &control, tx).run());

        assert!(matches!(next_event(&mut rx).await, FeedEvent::Fetched(posts) if posts.len() == 1));
        assert!(matches!(next_event(&mut rx).await, FeedEvent::Fetched(_)));
        assert!(source.calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn idle_until_main_view_then_pauses_for_edit() {
        let control = PollerControl::new();
        let (tx, mut rx) = mpsc::channel(8);
        let source = FakeSource::default();

        tokio::spawn(FeedPoller::new(source.clone(), TICK, &control, tx).run());

        time::sleep(TICK * 5).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);

        control.enter_main_view();
        assert_eq!(
            next_event(&mut rx).await,
            FeedEvent::ModeChanged(PollMode::Polling)
        );
        assert!(matches!(next_event(&mut rx).await, FeedEvent::Fetched(_)));

        control.begin_edit();
        let paused = loop {
            match next_event(&mut rx).await {
                FeedEvent::Fetched(_) => continue,
                FeedEvent::ModeChanged(mode) => break mode,
            }
        };
        assert_eq!(paused, PollMode::Idle);

        let calls = source.calls.load(Ordering::SeqCst);
        time::sleep(TICK * 5).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), calls);

        control.finish_edit();
        assert_eq!(
            next_event(&mut rx).await,
            FeedEvent::ModeChanged(PollMode::Polling)
        );
    }

    #[tokio::test]
    async fn fetch_errors_do_not_stop_polling() {
        let control = PollerControl::new();
        control.enter_main_view();
        let (tx, mut rx) = mpsc::channel(8);
        let source = FakeSource {
            fail_first: true,
            ..FakeSource::default()
        };

        tokio::spawn(FeedPoller::new(source.clone(), TICK, &control, tx).run());

        assert!(matches!(next_event(&mut rx).await, FeedEvent::Fetched(_)));
        assert!(source.calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn dropping_control_stops_the_loop() {
        let control = PollerControl::new();
        let (tx, _rx) = mpsc::channel(8);

        let handle = tokio::spawn(FeedPoller::new(FakeSource::default(), TICK, &control, tx).run());
        drop(control);

        time::timeout(WAIT, handle)
            .await
            .expect("poller stops")
            .expect("poller task");
    }
}
