//! `storefront-core`: shared building blocks for the seller platform.
//!
//! Identifiers, the domain error model, pagination and small text validators.
//! No infrastructure concerns live here.

pub mod error;
pub mod id;
pub mod label;
pub mod page;
pub mod text;

pub use error::{DomainError, DomainResult};
pub use id::{
    ConversationId, ExpenseId, MessageId, ProductId, QuestionId, ReviewId, ReviewRequestId,
    SocialAccountId, StoreId, TicketId, TransactionId, UserId,
};
pub use page::{Page, PageInfo, PageRequest};
