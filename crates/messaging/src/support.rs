use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::text::{optional_text, required_text};
use storefront_core::{DomainError, DomainResult, MessageId, TicketId, UserId, string_enum};

const SUBJECT_MAX: usize = 200;
const MESSAGE_MAX: usize = 5_000;

string_enum! {
    pub enum TicketStatus("ticket status") {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
}

string_enum! {
    pub enum TicketPriority("priority") {
        Low => "low",
        Normal => "normal",
        High => "high",
        Urgent => "urgent",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: TicketId,
    pub user_id: UserId,
    pub subject: String,
    pub category: Option<String>,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketMessage {
    pub id: MessageId,
    pub ticket_id: TicketId,
    pub sender_id: UserId,
    pub message: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

impl SupportTicket {
    /// Open a ticket together with its first message.
    pub fn open(
        user_id: UserId,
        subject: &str,
        first_message: &str,
        category: Option<&str>,
        priority: Option<TicketPriority>,
        now: DateTime<Utc>,
    ) -> DomainResult<(Self, TicketMessage)> {
        let mut ticket = Self {
            id: TicketId::new(),
            user_id,
            subject: required_text("subject", subject, SUBJECT_MAX)?,
            category: optional_text("category", category, 50)?.map(|c| c.to_lowercase()),
            priority: priority.unwrap_or(TicketPriority::Normal),
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
        };
        let message = ticket.reply(user_id, first_message, now)?;
        Ok((ticket, message))
    }

    /// Append a message from the ticket owner and bump `updated_at`.
    pub fn reply(&mut self, sender_id: UserId, text: &str, now: DateTime<Utc>) -> DomainResult<TicketMessage> {
        if self.status == TicketStatus::Closed {
            return Err(DomainError::validation("Ticket is closed"));
        }
        let message = TicketMessage {
            id: MessageId::new(),
            ticket_id: self.id,
            sender_id,
            message: required_text("message", text, MESSAGE_MAX)?,
            is_staff: false,
            created_at: now,
        };
        self.updated_at = now;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_first_message() {
        let user = UserId::new();
        let (ticket, msg) =
            SupportTicket::open(user, "Payout missing", "Where is my payout?", Some("Payments"), None, Utc::now())
                .unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, TicketPriority::Normal);
        assert_eq!(ticket.category.as_deref(), Some("payments"));
        assert_eq!(msg.ticket_id, ticket.id);
        assert_eq!(msg.sender_id, user);
        assert!(!msg.is_staff);
    }

    #[test]
    fn reply_bumps_updated_at() {
        let user = UserId::new();
        let t0 = Utc::now();
        let (mut ticket, _) = SupportTicket::open(user, "Help", "Hi", None, None, t0).unwrap();
        let t1 = t0 + chrono::Duration::minutes(3);
        ticket.reply(user, "Any news?", t1).unwrap();
        assert_eq!(ticket.updated_at, t1);
    }

    #[test]
    fn closed_ticket_rejects_replies() {
        let user = UserId::new();
        let (mut ticket, _) = SupportTicket::open(user, "Help", "Hi", None, None, Utc::now()).unwrap();
        ticket.status = TicketStatus::Closed;
        let before = ticket.updated_at;
        assert_eq!(
            ticket.reply(user, "Hello?", Utc::now()),
            Err(DomainError::validation("Ticket is closed"))
        );
        assert_eq!(ticket.updated_at, before);
    }

    #[test]
    fn in_progress_label() {
        assert_eq!("in_progress".parse::<TicketStatus>().unwrap(), TicketStatus::InProgress);
    }
}
