use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::text::{optional_text, required_text};
use storefront_core::{ConversationId, DomainError, DomainResult, MessageId, UserId};

const CONTENT_MAX: usize = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub seller_id: UserId,
    pub customer_id: UserId,
    pub subject: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn open(
        seller_id: UserId,
        customer_id: UserId,
        subject: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if seller_id == customer_id {
            return Err(DomainError::validation("Cannot start a conversation with yourself"));
        }
        Ok(Self {
            id: ConversationId::new(),
            seller_id,
            customer_id,
            subject: optional_text("subject", subject, 200)?,
            last_message_at: None,
            created_at: now,
        })
    }

    /// Most recent activity, used to order the inbox.
    pub fn activity_at(&self) -> DateTime<Utc> {
        self.last_message_at.unwrap_or(self.created_at)
    }

    /// Append a message from `sender_id` and bump `last_message_at`.
    ///
    /// The caller persists the message first and the conversation second.
    pub fn post(&mut self, sender_id: UserId, content: &str, now: DateTime<Utc>) -> DomainResult<ChatMessage> {
        let message = ChatMessage {
            id: MessageId::new(),
            conversation_id: self.id,
            sender_id,
            content: required_text("content", content, CONTENT_MAX)?,
            created_at: now,
        };
        self.last_message_at = Some(now);
        Ok(message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posting_bumps_last_message_at() {
        let opened = Utc::now();
        let mut c = Conversation::open(UserId::new(), UserId::new(), Some("Order #12"), opened).unwrap();
        assert_eq!(c.activity_at(), opened);

        let later = opened + chrono::Duration::seconds(30);
        let msg = c.post(c.seller_id, "Shipped today", later).unwrap();
        assert_eq!(msg.conversation_id, c.id);
        assert_eq!(c.last_message_at, Some(later));
        assert_eq!(c.activity_at(), later);
    }

    #[test]
    fn empty_message_is_rejected_without_bumping() {
        let mut c = Conversation::open(UserId::new(), UserId::new(), None, Utc::now()).unwrap();
        assert!(c.post(c.seller_id, "  ", Utc::now()).is_err());
        assert_eq!(c.last_message_at, None);
    }

    #[test]
    fn cannot_chat_with_self() {
        let me = UserId::new();
        assert!(Conversation::open(me, me, None, Utc::now()).is_err());
    }
}
