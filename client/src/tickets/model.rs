//! Ticket wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder rendered for an empty or absent admin response.
pub const RESPONSE_PLACEHOLDER: &str = "-";

/// Unique identifier for a ticket (server-assigned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub Uuid);

impl TicketId {
    /// Generate a new random `TicketId` (tests and fixtures; production
    /// IDs come from the backend).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Ticket category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Technical issue.
    Technical,
    /// Billing question.
    Billing,
    /// Anything else.
    General,
}

impl Category {
    /// Get the category as the backend spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Technical => "TECHNICAL",
            Self::Billing => "BILLING",
            Self::General => "GENERAL",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    /// Parse a category from its wire spelling, normalizing whitespace
    /// and case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TECHNICAL" => Ok(Self::Technical),
            "BILLING" => Ok(Self::Billing),
            "GENERAL" => Ok(Self::General),
            _ => Err(format!("Unknown ticket category: {s}")),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket lifecycle status.
///
/// Documented lifecycle: OPEN → ANSWERED → CLOSED, or straight to CLOSED.
/// The client never enforces transitions (and specifies none out of
/// CLOSED); the server is authoritative on legality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Awaiting a first response.
    Open,
    /// An admin has responded.
    Answered,
    /// Resolved; no further activity expected.
    Closed,
}

impl Status {
    /// Get the status as the backend spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Answered => "ANSWERED",
            Self::Closed => "CLOSED",
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    /// Parse a status from its wire spelling, normalizing whitespace and
    /// case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "ANSWERED" => Ok(Self::Answered),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(format!("Unknown ticket status: {s}")),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A support ticket as the backend serves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Unique identifier.
    pub id: TicketId,

    /// Short summary (non-empty).
    pub title: String,

    /// Full description (non-empty).
    pub description: String,

    /// Category chosen at submission.
    pub category: Category,

    /// Current lifecycle status.
    pub status: Status,

    /// Identifier of the submitting user.
    pub created_by: String,

    /// Admin response, if any. May arrive plain or JSON-wrapped; render
    /// through [`display_admin_response`].
    #[serde(default)]
    pub admin_response: Option<String>,

    /// Creation timestamp (server clock).
    pub created_at: DateTime<Utc>,
}

/// Render an admin response for display.
///
/// The stored value arrives in two historical encodings that coexist in
/// the data: a plain string, or a JSON object carrying an `adminResponse`
/// key. Structured decode is attempted first; on failure the raw value is
/// shown as-is. Empty or absent values render as
/// [`RESPONSE_PLACEHOLDER`]. Valid JSON that lacks a usable
/// `adminResponse` string (including bare numbers and booleans) also
/// renders the placeholder, matching the historical consumer.
#[must_use]
pub fn display_admin_response(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return RESPONSE_PLACEHOLDER.to_string();
    };
    if raw.is_empty() {
        return RESPONSE_PLACEHOLDER.to_string();
    }

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => value
            .get("adminResponse")
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
            .map_or_else(|| RESPONSE_PLACEHOLDER.to_string(), ToString::to_string),
        Err(_) => raw.to_string(),
    }
}
