use crate::models::auth::Session;
use crate::models::chat::ChatMessage;
use crate::models::dashboard::{ DashboardSnapshot, DatabaseSnapshot };

use super::view::ViewState;

/// State changes pushed to the presentation layer, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SessionStarted(Session),
    SessionEnded,
    MessageAppended(ChatMessage),
    PendingChanged(bool),
    DashboardUpdated(DashboardSnapshot),
    DatabaseUpdated(DatabaseSnapshot),
    ViewChanged(ViewState),
    Notice(String),
}
