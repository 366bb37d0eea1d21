//! `storefront-messaging`: seller/buyer chat and support tickets.
//!
//! Both are append-only message logs hanging off a parent row whose activity
//! timestamp is bumped on every new message. Clients refresh by polling.

pub mod chat;
pub mod support;

pub use chat::{ChatMessage, Conversation};
pub use support::{SupportTicket, TicketMessage, TicketPriority, TicketStatus};
