// SPDX-License-Identifier: MIT
// Domain model — schools, coaches, messages, athlete profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Enumerations ─────────────────────────────────────────────────────────────

/// Who authored a message: `outgoing` = the athlete, `incoming` = a coach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// Channel the communication happened over. Informational only — thread
/// assembly never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Email,
    Phone,
    Visit,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Read,
    Unread,
}

macro_rules! str_enum {
    ($ty:ty { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!(
                        "unknown {}: {other:?}",
                        stringify!($ty)
                    )),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Direction { Incoming => "incoming", Outgoing => "outgoing" });
str_enum!(MessageType { Email => "email", Phone => "phone", Visit => "visit", Other => "other" });
str_enum!(MessageStatus { Read => "read", Unread => "unread" });

// ─── School ───────────────────────────────────────────────────────────────────

/// A target school the athlete is tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub location: String,
    pub division: String,
    pub description: String,
    pub athletic_details: String,
    pub volleyball_history: String,
    pub programs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── Coach ────────────────────────────────────────────────────────────────────

/// A coach attached to one school.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coach {
    pub id: String,
    pub user_id: String,
    pub school_id: String,
    pub name: String,
    pub title: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── Message ──────────────────────────────────────────────────────────────────

/// A flat communication record. `parent_id = None` makes it a thread root;
/// `parent_id = Some(root)` makes it a reply, exactly one level deep.
///
/// `timestamp` is assigned at write time and never changes — content edits
/// bump `updated_at` only, so thread ordering stays put.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub user_id: String,
    pub school_id: String,
    pub coach_id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub direction: Direction,
    pub status: MessageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

// ─── Athlete profile ──────────────────────────────────────────────────────────

/// Performance stats shown to coaches and fed into draft generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AthleteStats {
    pub position: String,
    pub height: String,
    pub vertical_jump: String,
    pub approach: String,
    pub block: String,
    pub gpa: String,
    pub graduation_year: String,
    pub club: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaLink {
    #[serde(rename = "type")]
    pub link_type: String,
    pub url: String,
    pub title: String,
}

/// The athlete's own profile. One per user, keyed by the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteProfile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub birthday: DateTime<Utc>,
    pub description: String,
    pub interests: Vec<String>,
    pub stats: AthleteStats,
    pub media_links: Vec<MediaLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_round_trips_through_str() {
        for d in [Direction::Incoming, Direction::Outgoing] {
            assert_eq!(d.as_str().parse::<Direction>().unwrap(), d);
        }
        for t in [
            MessageType::Email,
            MessageType::Phone,
            MessageType::Visit,
            MessageType::Other,
        ] {
            assert_eq!(t.as_str().parse::<MessageType>().unwrap(), t);
        }
        for s in [MessageStatus::Read, MessageStatus::Unread] {
            assert_eq!(s.as_str().parse::<MessageStatus>().unwrap(), s);
        }
    }

    #[test]
    fn unknown_enum_text_is_rejected() {
        assert!("fax".parse::<MessageType>().is_err());
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn message_serializes_with_camel_case_and_type_alias() {
        let msg = Message {
            id: "m1".into(),
            user_id: "u1".into(),
            school_id: "s1".into(),
            coach_id: "c1".into(),
            content: "Hello coach".into(),
            message_type: MessageType::Email,
            direction: Direction::Outgoing,
            status: MessageStatus::Read,
            parent_id: None,
            timestamp: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "email");
        assert_eq!(json["schoolId"], "s1");
        assert_eq!(json["direction"], "outgoing");
        // Roots omit parentId entirely rather than emitting null.
        assert!(json.get("parentId").is_none());
    }
}
