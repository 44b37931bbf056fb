// Vote session model
// Transient tally for a single vote announcement; never persisted.

use std::collections::HashSet;

use poise::serenity_prelude as serenity;
use tokio::time::Instant;

/// Registry key: the id of the announcement message carrying the vote button
pub type VoteKey = serenity::MessageId;

#[derive(Debug, Clone)]
pub struct VoteSession {
    /// Channel holding the announcement, needed to edit it on expiry
    pub channel_id: serenity::ChannelId,
    pub initiator: serenity::UserId,
    /// Vote banner at the time the vote started
    pub banner: Option<String>,
    pub voters: HashSet<serenity::UserId>,
    /// Snapshot of `votesRequired` taken when the vote started
    pub votes_needed: u32,
    pub ended: bool,
    pub expires_at: Instant,
    /// Unix seconds of the deadline, for `<t:..:R>` rendering
    pub expires_at_unix: i64,
}

impl VoteSession {
    pub fn is_open_at(&self, now: Instant) -> bool {
        !self.ended && now < self.expires_at
    }

    pub fn tally(&self) -> VoteTally {
        let mut voters: Vec<serenity::UserId> = self.voters.iter().copied().collect();
        voters.sort();
        VoteTally {
            channel_id: self.channel_id,
            initiator: self.initiator,
            banner: self.banner.clone(),
            voters,
            votes_needed: self.votes_needed,
            ended: self.ended,
            expires_at_unix: self.expires_at_unix,
        }
    }
}

/// Render-ready copy of a session's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTally {
    pub channel_id: serenity::ChannelId,
    pub initiator: serenity::UserId,
    pub banner: Option<String>,
    pub voters: Vec<serenity::UserId>,
    pub votes_needed: u32,
    pub ended: bool,
    pub expires_at_unix: i64,
}

impl VoteTally {
    pub fn count(&self) -> usize {
        self.voters.len()
    }

    /// Quorum is informational only
    #[cfg(test)]
    pub fn quorum_reached(&self) -> bool {
        self.voters.len() >= self.votes_needed as usize
    }
}
