// Vote tracker
// Owns the in-memory vote registry and the expiry timers.
//
// Casting and expiring both go through `VoteRegistry::update`, which is atomic per key, so a
// cast racing the expiry is either counted before the close or rejected after it. Votes
// cast at or past the deadline are rejected even if the timer has not fired yet.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::BotError;
use crate::models::config_document::{BannerKind, ConfigDocument};
use crate::models::vote::{VoteKey, VoteSession, VoteTally};
use crate::utils::config::VOTE_DURATION;

/// Storage for live vote sessions
pub trait VoteRegistry: Send + Sync {
    fn get(&self, key: VoteKey) -> Option<VoteSession>;
    fn put(&self, key: VoteKey, session: VoteSession);
    fn delete(&self, key: VoteKey) -> Option<VoteSession>;
    /// Run `f` on the session with exclusive access; false if the key is unknown
    fn update(&self, key: VoteKey, f: &mut dyn FnMut(&mut VoteSession)) -> bool;
}

/// Sharded concurrent map. Ended sessions are left in place.
#[derive(Default)]
pub struct DashMapRegistry {
    sessions: DashMap<VoteKey, VoteSession>,
}

impl VoteRegistry for DashMapRegistry {
    fn get(&self, key: VoteKey) -> Option<VoteSession> {
        self.sessions.get(&key).map(|entry| entry.clone())
    }

    fn put(&self, key: VoteKey, session: VoteSession) {
        self.sessions.insert(key, session);
    }

    fn delete(&self, key: VoteKey) -> Option<VoteSession> {
        self.sessions.remove(&key).map(|(_, session)| session)
    }

    fn update(&self, key: VoteKey, f: &mut dyn FnMut(&mut VoteSession)) -> bool {
        match self.sessions.get_mut(&key) {
            Some(mut entry) => {
                f(entry.value_mut());
                true
            }
            None => false,
        }
    }
}

/// One-shot, non-cancellable timers
pub trait ExpiryScheduler: Send + Sync {
    fn schedule_once(&self, after: Duration, key: VoteKey);
}

/// Sleeps on the tokio runtime, then hands the key to the expiry worker
pub struct TokioScheduler {
    fired: mpsc::UnboundedSender<VoteKey>,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<VoteKey>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { fired: tx }, rx)
    }
}

impl ExpiryScheduler for TokioScheduler {
    fn schedule_once(&self, after: Duration, key: VoteKey) {
        let fired = self.fired.clone();
        let deadline = Instant::now() + after;
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if fired.send(key).is_err() {
                warn!("Expiry worker gone; vote {} not closed", key);
            }
        });
    }
}

pub struct VoteTracker {
    registry: Box<dyn VoteRegistry>,
    scheduler: Box<dyn ExpiryScheduler>,
    // Serializes "state change + message render" per vote
    gates: DashMap<VoteKey, Arc<Mutex<()>>>,
}

impl VoteTracker {
    pub fn new(
        registry: impl VoteRegistry + 'static,
        scheduler: impl ExpiryScheduler + 'static,
    ) -> Self {
        Self {
            registry: Box::new(registry),
            scheduler: Box::new(scheduler),
            gates: DashMap::new(),
        }
    }

    /// Unregistered session for the announcement about to be posted. `votesRequired`
    /// is snapshotted here; later config edits do not reach it.
    pub fn draft(
        &self,
        doc: &ConfigDocument,
        channel_id: serenity::ChannelId,
        initiator: serenity::UserId,
    ) -> VoteSession {
        VoteSession {
            channel_id,
            initiator,
            banner: doc.banner(BannerKind::SessionVote).map(str::to_string),
            voters: Default::default(),
            votes_needed: doc.votes_required(),
            ended: false,
            expires_at: Instant::now() + VOTE_DURATION,
            expires_at_unix: chrono::Utc::now().timestamp() + VOTE_DURATION.as_secs() as i64,
        }
    }

    /// Register the posted announcement and arm its expiry timer
    pub fn start(&self, key: VoteKey, session: VoteSession) -> VoteTally {
        let remaining = session.expires_at.saturating_duration_since(Instant::now());
        let tally = session.tally();
        self.registry.put(key, session);
        self.scheduler.schedule_once(remaining, key);
        info!(
            "Vote {} started by {} ({} votes needed)",
            key, tally.initiator, tally.votes_needed
        );
        tally
    }

    /// Add `voter`; repeated votes by the same user do not count twice
    pub fn cast(
        &self,
        key: VoteKey,
        voter: serenity::UserId,
        now: Instant,
    ) -> Result<VoteTally, BotError> {
        let mut tally = None;
        self.registry.update(key, &mut |session| {
            if session.is_open_at(now) {
                session.voters.insert(voter);
                tally = Some(session.tally());
            }
        });

        match tally {
            Some(tally) => {
                debug!("Vote {}: {} voted ({}/{})", key, voter, tally.count(), tally.votes_needed);
                Ok(tally)
            }
            None => Err(BotError::StaleVoteSession),
        }
    }

    /// Close the vote. Returns the final tally only on the open→ended transition.
    pub fn expire(&self, key: VoteKey) -> Option<VoteTally> {
        let mut tally = None;
        self.registry.update(key, &mut |session| {
            if !session.ended {
                session.ended = true;
                tally = Some(session.tally());
            }
        });
        if let Some(t) = &tally {
            info!("Vote {} ended with {}/{} votes", key, t.count(), t.votes_needed);
        }
        tally
    }

    #[cfg(test)]
    pub fn tally(&self, key: VoteKey) -> Option<VoteTally> {
        self.registry.get(key).map(|session| session.tally())
    }

    pub fn render_gate(&self, key: VoteKey) -> Arc<Mutex<()>> {
        self.gates.entry(key).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config_document::ServerInfo;
    use std::sync::Mutex as StdMutex;

    #[derive(Clone, Default)]
    struct RecordingScheduler {
        calls: Arc<StdMutex<Vec<(Duration, VoteKey)>>>,
    }

    impl ExpiryScheduler for RecordingScheduler {
        fn schedule_once(&self, after: Duration, key: VoteKey) {
            self.calls.lock().unwrap().push((after, key));
        }
    }

    fn doc_with_votes(votes: u32) -> ConfigDocument {
        ConfigDocument {
            server_info: Some(ServerInfo {
                votes_required: votes,
                ..ServerInfo::default()
            }),
            ..ConfigDocument::default()
        }
    }

    fn key() -> VoteKey {
        serenity::MessageId::new(1000)
    }

    fn user(id: u64) -> serenity::UserId {
        serenity::UserId::new(id)
    }

    fn started(votes: u32) -> (VoteTracker, RecordingScheduler) {
        let scheduler = RecordingScheduler::default();
        let tracker = VoteTracker::new(DashMapRegistry::default(), scheduler.clone());
        let draft = tracker.draft(&doc_with_votes(votes), serenity::ChannelId::new(1), user(1));
        tracker.start(key(), draft);
        (tracker, scheduler)
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_schedules_five_minute_expiry() {
        let (tracker, scheduler) = started(5);
        let calls = scheduler.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![(VOTE_DURATION, key())]);

        let tally = tracker.tally(key()).unwrap();
        assert_eq!(tally.count(), 0);
        assert!(!tally.ended);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_vote_counts_once() {
        let (tracker, _) = started(5);
        let first = tracker.cast(key(), user(7), Instant::now()).unwrap();
        let second = tracker.cast(key(), user(7), Instant::now()).unwrap();
        assert_eq!(first.count(), 1);
        assert_eq!(second.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_vote_before_deadline_counts_after_does_not() {
        let (tracker, _) = started(5);
        let before = Instant::now() + VOTE_DURATION - Duration::from_millis(1);
        assert_eq!(tracker.cast(key(), user(2), before).unwrap().count(), 1);

        // Timer has not fired yet, but the deadline has passed
        let after = Instant::now() + VOTE_DURATION + Duration::from_millis(1);
        assert!(matches!(
            tracker.cast(key(), user(3), after),
            Err(BotError::StaleVoteSession)
        ));
        assert_eq!(tracker.tally(key()).unwrap().count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_ignores_later_config_changes() {
        let scheduler = RecordingScheduler::default();
        let tracker = VoteTracker::new(DashMapRegistry::default(), scheduler);
        let mut doc = doc_with_votes(3);
        let draft = tracker.draft(&doc, serenity::ChannelId::new(1), user(1));
        tracker.start(key(), draft);

        doc.server_info.as_mut().unwrap().votes_required = 10;
        let tally = tracker.cast(key(), user(2), Instant::now()).unwrap();
        assert_eq!(tally.votes_needed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_four_of_five_then_expiry() {
        let (tracker, _) = started(5);
        for id in [11, 12, 13, 14] {
            tracker.cast(key(), user(id), Instant::now()).unwrap();
        }

        let final_tally = tracker.expire(key()).unwrap();
        assert!(final_tally.ended);
        assert_eq!(final_tally.count(), 4);
        assert_eq!(final_tally.votes_needed, 5);
        assert!(!final_tally.quorum_reached());
        assert_eq!(final_tally.voters, vec![user(11), user(12), user(13), user(14)]);

        assert!(matches!(
            tracker.cast(key(), user(15), Instant::now()),
            Err(BotError::StaleVoteSession)
        ));
        assert_eq!(tracker.tally(key()).unwrap().count(), 4);
        // A second expiry is a no-op
        assert!(tracker.expire(key()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_quorum_does_not_close_vote() {
        let (tracker, _) = started(2);
        tracker.cast(key(), user(2), Instant::now()).unwrap();
        let tally = tracker.cast(key(), user(3), Instant::now()).unwrap();
        assert!(tally.quorum_reached());
        assert!(!tally.ended);
        assert_eq!(tracker.cast(key(), user(4), Instant::now()).unwrap().count(), 3);
    }

    #[tokio::test]
    async fn test_unknown_vote_is_stale() {
        let tracker = VoteTracker::new(DashMapRegistry::default(), RecordingScheduler::default());
        assert!(matches!(
            tracker.cast(key(), user(2), Instant::now()),
            Err(BotError::StaleVoteSession)
        ));
        assert!(tracker.expire(key()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_fires_after_duration() {
        let (scheduler, mut fired) = TokioScheduler::new();
        let tracker = VoteTracker::new(DashMapRegistry::default(), scheduler);
        let draft = tracker.draft(&doc_with_votes(5), serenity::ChannelId::new(1), user(1));
        tracker.start(key(), draft);

        tokio::time::advance(VOTE_DURATION - Duration::from_secs(1)).await;
        assert!(fired.try_recv().is_err());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(fired.recv().await, Some(key()));
        assert!(tracker.expire(key()).is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_casts_and_expiry_never_count_after_close() {
        let (tracker, _) = started(5);
        let tracker = Arc::new(tracker);

        let mut handles = Vec::new();
        for id in 100..164 {
            let tracker = tracker.clone();
            handles.push(tokio::spawn(async move {
                let _ = tracker.cast(key(), user(id), Instant::now());
            }));
        }
        let closer = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.expire(key()) })
        };

        let final_tally = closer.await.unwrap().unwrap();
        futures::future::join_all(handles).await;

        let after = tracker.tally(key()).unwrap();
        assert!(after.ended);
        assert_eq!(after.count(), final_tally.count());
    }

    #[test]
    fn test_registry_delete() {
        let registry = DashMapRegistry::default();
        let session = VoteSession {
            channel_id: serenity::ChannelId::new(1),
            initiator: user(1),
            banner: None,
            voters: Default::default(),
            votes_needed: 5,
            ended: false,
            expires_at: Instant::now(),
            expires_at_unix: 0,
        };
        registry.put(key(), session);
        assert!(registry.get(key()).is_some());
        assert!(registry.delete(key()).is_some());
        assert!(registry.get(key()).is_none());
        assert!(!registry.update(key(), &mut |_| {}));
    }
}
