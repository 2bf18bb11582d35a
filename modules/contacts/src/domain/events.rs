use chrono::{DateTime, Utc};

/// Transport-agnostic view-model change notification.
///
/// Observers re-read the view model after receiving one of these; the event
/// itself only says what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactListEvent {
    /// A new owner was attached (`None` means signed out).
    Attached {
        owner_id: Option<String>,
        generation: u64,
        at: DateTime<Utc>,
    },
    /// The contact collection was swapped for a new one.
    ContactsReplaced {
        count: usize,
        generation: u64,
        at: DateTime<Utc>,
    },
    DisplayNameChanged { at: DateTime<Utc> },
    /// The realtime feed reported an error; contacts were left untouched.
    FeedError {
        message: String,
        generation: u64,
        at: DateTime<Utc>,
    },
}
