// Banner capture
// Resolves banner slots from a window of recent channel messages. Images are only
// referenced by URL, never downloaded.

use std::collections::HashMap;

use poise::serenity_prelude as serenity;

use crate::models::config_document::{BannerKind, Banners};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub filename: String,
    pub url: String,
    pub content_type: Option<String>,
}

impl AttachmentRef {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }
}

/// The parts of a channel message banner capture looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub author: serenity::UserId,
    pub attachments: Vec<AttachmentRef>,
}

impl From<&serenity::Message> for ChannelMessage {
    fn from(msg: &serenity::Message) -> Self {
        Self {
            author: msg.author.id,
            attachments: msg
                .attachments
                .iter()
                .map(|a| AttachmentRef {
                    filename: a.filename.clone(),
                    url: a.url.clone(),
                    content_type: a.content_type.clone(),
                })
                .collect(),
        }
    }
}

/// Capture result; missing kinds are a normal outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedBanners(HashMap<BannerKind, String>);

impl CapturedBanners {
    #[cfg(test)]
    pub fn get(&self, kind: BannerKind) -> Option<&str> {
        self.0.get(&kind).map(String::as_str)
    }

    pub fn missing(&self) -> Vec<BannerKind> {
        BannerKind::ALL
            .into_iter()
            .filter(|kind| !self.0.contains_key(kind))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.0.len() == BannerKind::ALL.len()
    }

    /// Only meaningful once complete; absent kinds become empty references
    pub fn into_banners(self) -> Banners {
        let mut banners = Banners::default();
        for (kind, url) in self.0 {
            banners.set(kind, url);
        }
        banners
    }
}

/// Newest image attachment posted by `author`. `history` is newest-first.
pub fn latest_image_by_author<'a>(
    history: &'a [ChannelMessage],
    author: serenity::UserId,
) -> Option<&'a AttachmentRef> {
    history
        .iter()
        .filter(|msg| msg.author == author)
        .flat_map(|msg| msg.attachments.iter())
        .find(|att| att.is_image())
}

/// Assign attachments to kinds by filename keyword. Each attachment fills at most
/// one kind (first unfilled kind whose keyword it contains) and a filled kind is
/// never overwritten.
pub fn capture_by_keyword(history: &[ChannelMessage]) -> CapturedBanners {
    let mut found = HashMap::new();

    for att in history.iter().flat_map(|msg| msg.attachments.iter()) {
        let name = att.filename.to_lowercase();
        let slot = BannerKind::ALL
            .into_iter()
            .find(|kind| !found.contains_key(kind) && name.contains(kind.keyword()));
        if let Some(kind) = slot {
            found.insert(kind, att.url.clone());
        }
        if found.len() == BannerKind::ALL.len() {
            break;
        }
    }

    CapturedBanners(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn att(filename: &str, content_type: &str) -> AttachmentRef {
        AttachmentRef {
            filename: filename.to_string(),
            url: format!("https://cdn/{}", filename),
            content_type: Some(content_type.to_string()),
        }
    }

    fn msg(author: u64, attachments: Vec<AttachmentRef>) -> ChannelMessage {
        ChannelMessage {
            author: serenity::UserId::new(author),
            attachments,
        }
    }

    #[test]
    fn test_keyword_capture_all_three() {
        let history = vec![
            msg(1, vec![att("Session_START.png", "image/png")]),
            msg(2, vec![att("shutdown.jpg", "image/jpeg"), att("vote.gif", "image/gif")]),
        ];
        let captured = capture_by_keyword(&history);
        assert!(captured.is_complete());
        assert_eq!(captured.get(BannerKind::SessionStart), Some("https://cdn/Session_START.png"));
        assert_eq!(captured.get(BannerKind::SessionShutdown), Some("https://cdn/shutdown.jpg"));
        assert_eq!(captured.get(BannerKind::SessionVote), Some("https://cdn/vote.gif"));
    }

    #[test]
    fn test_keyword_capture_first_match_wins() {
        let history = vec![
            msg(1, vec![att("start-new.png", "image/png")]),
            msg(1, vec![att("start-old.png", "image/png")]),
        ];
        let captured = capture_by_keyword(&history);
        assert_eq!(captured.get(BannerKind::SessionStart), Some("https://cdn/start-new.png"));
        assert_eq!(
            captured.missing(),
            vec![BannerKind::SessionShutdown, BannerKind::SessionVote]
        );
    }

    #[test]
    fn test_keyword_capture_one_attachment_fills_one_kind() {
        let history = vec![msg(1, vec![att("start_vote.png", "image/png")])];
        let captured = capture_by_keyword(&history);
        assert_eq!(captured.get(BannerKind::SessionStart), Some("https://cdn/start_vote.png"));
        assert_eq!(captured.get(BannerKind::SessionVote), None);

        // Once start is filled the same name can land in the vote slot
        let history = vec![
            msg(1, vec![att("start.png", "image/png")]),
            msg(1, vec![att("start_vote.png", "image/png")]),
        ];
        let captured = capture_by_keyword(&history);
        assert_eq!(captured.get(BannerKind::SessionVote), Some("https://cdn/start_vote.png"));
    }

    #[test]
    fn test_keyword_capture_nothing_found() {
        let history = vec![msg(1, vec![]), msg(2, vec![att("cat.png", "image/png")])];
        let captured = capture_by_keyword(&history);
        assert_eq!(captured.missing().len(), 3);
        assert!(!captured.is_complete());
    }

    #[test]
    fn test_latest_image_by_author() {
        let history = vec![
            msg(2, vec![att("other.png", "image/png")]),
            msg(1, vec![att("notes.txt", "text/plain")]),
            msg(1, vec![att("mine-new.png", "image/png")]),
            msg(1, vec![att("mine-old.png", "image/png")]),
        ];
        let found = latest_image_by_author(&history, serenity::UserId::new(1)).unwrap();
        assert_eq!(found.filename, "mine-new.png");
        assert!(latest_image_by_author(&history, serenity::UserId::new(3)).is_none());
    }

    #[test]
    fn test_attachment_without_content_type_is_not_image() {
        let mut a = att("start.png", "image/png");
        a.content_type = None;
        assert!(!a.is_image());
    }
}
