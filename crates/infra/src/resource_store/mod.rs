//! Owner-scoped persistence for every seller-facing table.
//!
//! Each repository trait covers one area of the API. Every query that can
//! return another identity's rows takes the owner id as a parameter, so
//! scoping is enforced by the adapter rather than filtered afterwards.
//!
//! Partial updates are resolved in the domain crates (`*Patch::apply`);
//! adapters always persist whole rows.

mod in_memory;
mod postgres;
mod schema;

pub use in_memory::InMemoryResourceStore;
pub use postgres::PostgresResourceStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use storefront_catalog::{Product, SocialAccount, Store};
use storefront_core::{
    ConversationId, ExpenseId, Page, PageRequest, ProductId, QuestionId, ReviewId, SocialAccountId, StoreId,
    TicketId, UserId,
};
use storefront_finance::{DateRange, Expense, ExpenseFilter, Transaction};
use storefront_messaging::{ChatMessage, Conversation, SupportTicket, TicketMessage, TicketStatus};
use storefront_reviews::{AutoRequestConfig, Question, Review, ReviewFilter, ReviewRequest, ReviewStatus};

/// Resource store error.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing store failed; the message is surfaced to the caller as a 500.
    #[error("{0}")]
    Storage(String),
    /// An update targeted a row that does not exist.
    #[error("row not found")]
    NotFound,
    /// A stored row could not be decoded into its domain type.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn store_by_seller(&self, seller_id: UserId) -> StoreResult<Option<Store>>;

    async fn store_by_slug(&self, slug: &str) -> StoreResult<Option<Store>>;

    async fn store_by_id(&self, id: StoreId) -> StoreResult<Option<Store>>;

    async fn insert_store(&self, store: &Store) -> StoreResult<()>;

    async fn update_store(&self, store: &Store) -> StoreResult<()>;
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Products of one store, newest first.
    async fn list_products(&self, store_id: StoreId) -> StoreResult<Vec<Product>>;

    async fn product(&self, store_id: StoreId, id: ProductId) -> StoreResult<Option<Product>>;

    async fn insert_product(&self, product: &Product) -> StoreResult<()>;

    async fn update_product(&self, product: &Product) -> StoreResult<()>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete_product(&self, store_id: StoreId, id: ProductId) -> StoreResult<bool>;

    async fn list_social_accounts(&self, store_id: StoreId) -> StoreResult<Vec<SocialAccount>>;

    async fn insert_social_account(&self, account: &SocialAccount) -> StoreResult<()>;

    async fn delete_social_account(&self, store_id: StoreId, id: SocialAccountId) -> StoreResult<bool>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// One page of a seller's reviews, newest first.
    async fn list_reviews(&self, seller_id: UserId, filter: ReviewFilter, page: PageRequest)
    -> StoreResult<Page<Review>>;

    async fn all_reviews(&self, seller_id: UserId) -> StoreResult<Vec<Review>>;

    async fn review(&self, seller_id: UserId, id: ReviewId) -> StoreResult<Option<Review>>;

    async fn insert_review(&self, review: &Review) -> StoreResult<()>;

    async fn update_review(&self, review: &Review) -> StoreResult<()>;

    /// Set `status` on the listed reviews that belong to `seller_id`.
    /// Ids owned by anyone else are ignored. Returns the number of distinct
    /// rows changed; repeated ids count once.
    async fn bulk_set_review_status(
        &self,
        seller_id: UserId,
        ids: &[ReviewId],
        status: ReviewStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<u64>;

    /// Unanswered questions on the products of `store_id`, oldest first.
    async fn unanswered_questions(&self, store_id: StoreId) -> StoreResult<Vec<Question>>;

    /// A question together with the store that lists its product.
    async fn question(&self, id: QuestionId) -> StoreResult<Option<(Question, StoreId)>>;

    async fn insert_question(&self, question: &Question) -> StoreResult<()>;

    async fn update_question(&self, question: &Question) -> StoreResult<()>;

    async fn review_requests(&self, seller_id: UserId) -> StoreResult<Vec<ReviewRequest>>;

    async fn insert_review_requests(&self, requests: &[ReviewRequest]) -> StoreResult<()>;

    async fn auto_request_config(&self, seller_id: UserId) -> StoreResult<Option<AutoRequestConfig>>;

    async fn save_auto_request_config(&self, config: &AutoRequestConfig) -> StoreResult<()>;
}

#[async_trait]
pub trait MessagingRepository: Send + Sync {
    /// A seller's conversations, most recent activity first.
    async fn conversations(&self, seller_id: UserId) -> StoreResult<Vec<Conversation>>;

    async fn conversation(&self, seller_id: UserId, id: ConversationId) -> StoreResult<Option<Conversation>>;

    async fn conversation_with(&self, seller_id: UserId, customer_id: UserId) -> StoreResult<Option<Conversation>>;

    async fn insert_conversation(&self, conversation: &Conversation) -> StoreResult<()>;

    async fn update_conversation(&self, conversation: &Conversation) -> StoreResult<()>;

    /// Messages of one conversation, oldest first.
    async fn messages(&self, conversation_id: ConversationId) -> StoreResult<Vec<ChatMessage>>;

    async fn insert_message(&self, message: &ChatMessage) -> StoreResult<()>;

    /// A user's tickets, most recently updated first.
    async fn tickets(&self, user_id: UserId, status: Option<TicketStatus>) -> StoreResult<Vec<SupportTicket>>;

    async fn ticket(&self, user_id: UserId, id: TicketId) -> StoreResult<Option<SupportTicket>>;

    async fn insert_ticket(&self, ticket: &SupportTicket) -> StoreResult<()>;

    async fn update_ticket(&self, ticket: &SupportTicket) -> StoreResult<()>;

    /// Messages of one ticket, oldest first.
    async fn ticket_messages(&self, ticket_id: TicketId) -> StoreResult<Vec<TicketMessage>>;

    async fn insert_ticket_message(&self, message: &TicketMessage) -> StoreResult<()>;
}

#[async_trait]
pub trait FinanceRepository: Send + Sync {
    /// Every transaction of a seller, newest first.
    async fn transactions(&self, seller_id: UserId) -> StoreResult<Vec<Transaction>>;

    async fn transactions_in_range(&self, seller_id: UserId, range: DateRange) -> StoreResult<Vec<Transaction>>;

    async fn insert_transaction(&self, transaction: &Transaction) -> StoreResult<()>;

    async fn active_expenses_in_range(&self, seller_id: UserId, range: DateRange) -> StoreResult<Vec<Expense>>;

    /// One page of a seller's active expenses, latest `expense_date` first.
    async fn list_expenses(
        &self,
        seller_id: UserId,
        filter: &ExpenseFilter,
        page: PageRequest,
    ) -> StoreResult<Page<Expense>>;

    /// An active expense. Soft-deleted rows are reported as absent.
    async fn expense(&self, seller_id: UserId, id: ExpenseId) -> StoreResult<Option<Expense>>;

    async fn insert_expense(&self, expense: &Expense) -> StoreResult<()>;

    async fn update_expense(&self, expense: &Expense) -> StoreResult<()>;
}

/// Everything the API needs from persistence.
pub trait ResourceStore:
    StoreRepository + CatalogRepository + ReviewRepository + MessagingRepository + FinanceRepository
{
}

impl<T> ResourceStore for T where
    T: StoreRepository + CatalogRepository + ReviewRepository + MessagingRepository + FinanceRepository
{
}
