//! Follower and moderator events.

use serde::{Deserialize, Serialize};

/// A peer started following us.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "peerID")]
    pub peer_id: String,
}

/// A peer stopped following us.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unfollow {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "peerID")]
    pub peer_id: String,
}

/// A followed peer registered as a moderator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeratorAdd {
    #[serde(rename = "peerID")]
    pub peer_id: String,
}

/// A followed peer stopped moderating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeratorRemove {
    #[serde(rename = "peerID")]
    pub peer_id: String,
}
