//! Domain entities.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role tag controlling which workflow operations a user may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End user filing tickets.
    User,
    /// Support agent: can be assigned tickets and transition their status.
    Agent,
    /// Administrator: agent powers plus user and category management.
    Admin,
}

impl Role {
    /// Stable string form used in storage and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Agent => "agent",
            Role::Admin => "admin",
        }
    }

    /// Whether this role may manually transition ticket status.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Agent | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "agent" => Ok(Role::Agent),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier (e.g. "user-1", "agent-2").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address, unique across users.
    pub email: String,
    /// Avatar image reference.
    pub avatar: String,
    /// Role tag.
    pub role: Role,
    /// When the account was registered.
    pub registration_date: DateTime<Utc>,
    /// Last login timestamp.
    pub last_login: DateTime<Utc>,
}

/// Ticket lifecycle status.
///
/// The progression is ordered: Open < In Progress < Resolved < Closed.
/// Transitions only move forward; Closed is terminal and re-opening is
/// unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Stable string form used in storage and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Closed => "Closed",
        }
    }

    /// Position in the ordered progression.
    fn rank(&self) -> u8 {
        match self {
            TicketStatus::Open => 0,
            TicketStatus::InProgress => 1,
            TicketStatus::Resolved => 2,
            TicketStatus::Closed => 3,
        }
    }

    /// Whether a manual transition from `self` to `next` is permitted.
    ///
    /// Every pairing is decided here: forward moves (including skips such as
    /// Open -> Closed) are allowed, staying put and moving backward are not.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        self.rank() < next.rank()
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Closed)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(TicketStatus::Open),
            "In Progress" => Ok(TicketStatus::InProgress),
            "Resolved" => Ok(TicketStatus::Resolved),
            "Closed" => Ok(TicketStatus::Closed),
            other => Err(format!("unknown ticket status: {other}")),
        }
    }
}

/// Resolution feedback left by the ticket creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Upvote,
    Downvote,
}

impl Feedback {
    /// Stable string form used in storage and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feedback::Upvote => "upvote",
            Feedback::Downvote => "downvote",
        }
    }
}

impl FromStr for Feedback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(Feedback::Upvote),
            "downvote" => Ok(Feedback::Downvote),
            other => Err(format!("unknown feedback value: {other}")),
        }
    }
}

/// A reply attached to a ticket. Comments are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Stable identifier.
    pub id: String,
    /// Parent ticket, immutable.
    pub ticket_id: String,
    /// Author user id.
    pub author_id: String,
    /// Author display name at time of writing.
    pub author_name: String,
    /// Reply text.
    pub content: String,
    /// Creation timestamp, immutable.
    pub created_at: DateTime<Utc>,
}

/// The central work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Human-readable sequential code (e.g. "TKT-001").
    pub id: String,
    /// One-line summary.
    pub subject: String,
    /// Free-text problem description.
    pub description: String,
    /// Lifecycle status.
    pub status: TicketStatus,
    /// Category id this ticket is filed under.
    pub category_id: String,
    /// Creator user id, immutable.
    pub created_by: String,
    /// Assigned agent user id, if any. Must reference a user with role agent.
    pub assigned_to: Option<String>,
    /// Creation timestamp, immutable.
    pub created_at: DateTime<Utc>,
    /// Bumped on every mutation; always >= `created_at`.
    pub last_modified: DateTime<Utc>,
    /// Set when the ticket first reaches Resolved.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Creator feedback, meaningful only once Resolved.
    pub feedback: Option<Feedback>,
    /// Replies in call order, append-only.
    pub comments: Vec<Comment>,
}

impl Ticket {
    /// Format the sequential human-readable ticket code.
    pub fn format_id(seq: i64) -> String {
        format!("TKT-{seq:03}")
    }
}

/// A classification label managed by admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable identifier (e.g. "cat-1").
    pub id: String,
    /// Unique display name.
    pub name: String,
    /// Short description shown in the ticket form.
    pub description: String,
}
