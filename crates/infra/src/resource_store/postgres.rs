//! Postgres-backed resource store.
//!
//! Queries are written by hand and rows are decoded manually with
//! `Row::try_get`, so a column that does not decode surfaces as
//! [`StoreError::Corrupt`] instead of a panic.
//!
//! ## Error mapping
//!
//! | sqlx error | StoreError |
//! |---|---|
//! | Database (any code) | `Storage` with the database message |
//! | PoolClosed / Io / other | `Storage` |
//! | ColumnDecode / type mismatch in row mapping | `Corrupt` |

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row};
use tracing::instrument;
use uuid::Uuid;

use storefront_catalog::{Product, SocialAccount, Store};
use storefront_core::{
    ConversationId, ExpenseId, Page, PageRequest, ProductId, QuestionId, ReviewId, SocialAccountId, StoreId,
    TicketId, UserId,
};
use storefront_finance::{DateRange, Expense, ExpenseFilter, Transaction};
use storefront_messaging::{ChatMessage, Conversation, SupportTicket, TicketMessage, TicketStatus};
use storefront_reviews::{AutoRequestConfig, Question, Review, ReviewFilter, ReviewRequest, ReviewStatus};

use super::schema::SCHEMA;
use super::{
    CatalogRepository, FinanceRepository, MessagingRepository, ReviewRepository, StoreError, StoreRepository,
    StoreResult,
};

/// Resource store over a shared `PgPool`. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresResourceStore {
    pool: Arc<PgPool>,
}

impl PostgresResourceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a pool against `database_url`.
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create any missing tables and indexes.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => StoreError::Storage(format!(
                "database error in {operation} ({code}): {}",
                db_err.message()
            )),
            None => StoreError::Storage(format!("database error in {operation}: {}", db_err.message())),
        },
        sqlx::Error::PoolClosed => StoreError::Storage(format!("connection pool closed in {operation}")),
        sqlx::Error::ColumnDecode { index, source } => {
            StoreError::Corrupt(format!("column {index} in {operation}: {source}"))
        }
        other => StoreError::Storage(format!("sqlx error in {operation}: {other}")),
    }
}

fn expect_row(operation: &str, rows_affected: u64) -> StoreResult<()> {
    if rows_affected == 0 {
        tracing::debug!(operation, "update matched no row");
        return Err(StoreError::NotFound);
    }
    Ok(())
}

// ---- row decoding -------------------------------------------------------

fn col<'r, T>(row: &'r PgRow, name: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name).map_err(|e| StoreError::Corrupt(format!("{name}: {e}")))
}

fn uuid_col<T: From<Uuid>>(row: &PgRow, name: &str) -> StoreResult<T> {
    col::<Uuid>(row, name).map(T::from)
}

fn opt_uuid_col<T: From<Uuid>>(row: &PgRow, name: &str) -> StoreResult<Option<T>> {
    col::<Option<Uuid>>(row, name).map(|v| v.map(T::from))
}

fn label<T>(row: &PgRow, name: &str) -> StoreResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = col(row, name)?;
    raw.parse().map_err(|e| StoreError::Corrupt(format!("{name}: {e}")))
}

fn store_from_row(row: &PgRow) -> StoreResult<Store> {
    Ok(Store {
        id: uuid_col(row, "id")?,
        seller_id: uuid_col(row, "seller_id")?,
        name: col(row, "name")?,
        slug: col(row, "slug")?,
        description: col(row, "description")?,
        logo_url: col(row, "logo_url")?,
        banner_url: col(row, "banner_url")?,
        visibility: label(row, "visibility")?,
        status: label(row, "status")?,
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

fn product_from_row(row: &PgRow) -> StoreResult<Product> {
    Ok(Product {
        id: uuid_col(row, "id")?,
        store_id: uuid_col(row, "store_id")?,
        name: col(row, "name")?,
        description: col(row, "description")?,
        price: col(row, "price")?,
        images: col(row, "images")?,
        status: label(row, "status")?,
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

fn social_account_from_row(row: &PgRow) -> StoreResult<SocialAccount> {
    Ok(SocialAccount {
        id: uuid_col(row, "id")?,
        store_id: uuid_col(row, "store_id")?,
        platform: label(row, "platform")?,
        account_name: col(row, "account_name")?,
        profile_url: col(row, "profile_url")?,
        connected_at: col(row, "connected_at")?,
    })
}

fn review_from_row(row: &PgRow) -> StoreResult<Review> {
    let rating: i16 = col(row, "rating")?;
    Ok(Review {
        id: uuid_col(row, "id")?,
        product_id: uuid_col(row, "product_id")?,
        seller_id: uuid_col(row, "seller_id")?,
        buyer_id: uuid_col(row, "buyer_id")?,
        rating: u8::try_from(rating).map_err(|_| StoreError::Corrupt(format!("rating: {rating}")))?,
        title: col(row, "title")?,
        comment: col(row, "comment")?,
        status: label(row, "status")?,
        seller_response: col(row, "seller_response")?,
        responded_at: col(row, "responded_at")?,
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

fn question_from_row(row: &PgRow) -> StoreResult<Question> {
    Ok(Question {
        id: uuid_col(row, "id")?,
        product_id: uuid_col(row, "product_id")?,
        asker_id: uuid_col(row, "asker_id")?,
        question: col(row, "question")?,
        answer: col(row, "answer")?,
        answered_at: col(row, "answered_at")?,
        created_at: col(row, "created_at")?,
    })
}

fn review_request_from_row(row: &PgRow) -> StoreResult<ReviewRequest> {
    Ok(ReviewRequest {
        id: uuid_col(row, "id")?,
        seller_id: uuid_col(row, "seller_id")?,
        transaction_id: uuid_col(row, "transaction_id")?,
        buyer_id: uuid_col(row, "buyer_id")?,
        product_id: uuid_col(row, "product_id")?,
        created_at: col(row, "created_at")?,
    })
}

fn auto_request_config_from_row(row: &PgRow) -> StoreResult<AutoRequestConfig> {
    let delay_days: i32 = col(row, "delay_days")?;
    Ok(AutoRequestConfig {
        seller_id: uuid_col(row, "seller_id")?,
        enabled: col(row, "enabled")?,
        delay_days: u32::try_from(delay_days)
            .map_err(|_| StoreError::Corrupt(format!("delay_days: {delay_days}")))?,
        message: col(row, "message")?,
        updated_at: col(row, "updated_at")?,
    })
}

fn conversation_from_row(row: &PgRow) -> StoreResult<Conversation> {
    Ok(Conversation {
        id: uuid_col(row, "id")?,
        seller_id: uuid_col(row, "seller_id")?,
        customer_id: uuid_col(row, "customer_id")?,
        subject: col(row, "subject")?,
        last_message_at: col(row, "last_message_at")?,
        created_at: col(row, "created_at")?,
    })
}

fn chat_message_from_row(row: &PgRow) -> StoreResult<ChatMessage> {
    Ok(ChatMessage {
        id: uuid_col(row, "id")?,
        conversation_id: uuid_col(row, "conversation_id")?,
        sender_id: uuid_col(row, "sender_id")?,
        content: col(row, "content")?,
        created_at: col(row, "created_at")?,
    })
}

fn ticket_from_row(row: &PgRow) -> StoreResult<SupportTicket> {
    Ok(SupportTicket {
        id: uuid_col(row, "id")?,
        user_id: uuid_col(row, "user_id")?,
        subject: col(row, "subject")?,
        category: col(row, "category")?,
        priority: label(row, "priority")?,
        status: label(row, "status")?,
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

fn ticket_message_from_row(row: &PgRow) -> StoreResult<TicketMessage> {
    Ok(TicketMessage {
        id: uuid_col(row, "id")?,
        ticket_id: uuid_col(row, "ticket_id")?,
        sender_id: uuid_col(row, "sender_id")?,
        message: col(row, "message")?,
        is_staff: col(row, "is_staff")?,
        created_at: col(row, "created_at")?,
    })
}

fn transaction_from_row(row: &PgRow) -> StoreResult<Transaction> {
    Ok(Transaction {
        id: uuid_col(row, "id")?,
        seller_id: uuid_col(row, "seller_id")?,
        buyer_id: uuid_col(row, "buyer_id")?,
        product_id: opt_uuid_col(row, "product_id")?,
        amount: col(row, "amount")?,
        seller_payout: col(row, "seller_payout")?,
        platform_fee: col(row, "platform_fee")?,
        status: label(row, "status")?,
        created_at: col(row, "created_at")?,
    })
}

fn expense_from_row(row: &PgRow) -> StoreResult<Expense> {
    Ok(Expense {
        id: uuid_col(row, "id")?,
        seller_id: uuid_col(row, "seller_id")?,
        amount: col(row, "amount")?,
        category: col(row, "category")?,
        description: col(row, "description")?,
        expense_date: col(row, "expense_date")?,
        status: label(row, "status")?,
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

fn decode_all<T>(rows: &[PgRow], decode: fn(&PgRow) -> StoreResult<T>) -> StoreResult<Vec<T>> {
    rows.iter().map(decode).collect()
}

fn decode_opt<T>(row: Option<PgRow>, decode: fn(&PgRow) -> StoreResult<T>) -> StoreResult<Option<T>> {
    row.as_ref().map(decode).transpose()
}

fn count(row: &PgRow) -> StoreResult<u64> {
    let total: i64 = col(row, "total")?;
    Ok(total.max(0) as u64)
}

fn limit_offset(page: PageRequest) -> (i64, i64) {
    (i64::from(page.limit()), page.offset().min(i64::MAX as u64) as i64)
}

// ---- repositories ------------------------------------------------------

const STORE_COLUMNS: &str =
    "id, seller_id, name, slug, description, logo_url, banner_url, visibility, status, created_at, updated_at";

#[async_trait]
impl StoreRepository for PostgresResourceStore {
    #[instrument(skip(self), err)]
    async fn store_by_seller(&self, seller_id: UserId) -> StoreResult<Option<Store>> {
        let row = sqlx::query(&format!("SELECT {STORE_COLUMNS} FROM stores WHERE seller_id = $1"))
            .bind(seller_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("store_by_seller", e))?;
        decode_opt(row, store_from_row)
    }

    #[instrument(skip(self), err)]
    async fn store_by_slug(&self, slug: &str) -> StoreResult<Option<Store>> {
        let row = sqlx::query(&format!("SELECT {STORE_COLUMNS} FROM stores WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("store_by_slug", e))?;
        decode_opt(row, store_from_row)
    }

    #[instrument(skip(self), err)]
    async fn store_by_id(&self, id: StoreId) -> StoreResult<Option<Store>> {
        let row = sqlx::query(&format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("store_by_id", e))?;
        decode_opt(row, store_from_row)
    }

    #[instrument(skip(self, store), fields(store_id = %store.id), err)]
    async fn insert_store(&self, store: &Store) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stores
                (id, seller_id, name, slug, description, logo_url, banner_url, visibility, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(store.id.as_uuid())
        .bind(store.seller_id.as_uuid())
        .bind(&store.name)
        .bind(&store.slug)
        .bind(&store.description)
        .bind(&store.logo_url)
        .bind(&store.banner_url)
        .bind(store.visibility.as_str())
        .bind(store.status.as_str())
        .bind(store.created_at)
        .bind(store.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_store", e))?;
        Ok(())
    }

    #[instrument(skip(self, store), fields(store_id = %store.id), err)]
    async fn update_store(&self, store: &Store) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE stores
            SET name = $2, slug = $3, description = $4, logo_url = $5, banner_url = $6,
                visibility = $7, status = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(store.id.as_uuid())
        .bind(&store.name)
        .bind(&store.slug)
        .bind(&store.description)
        .bind(&store.logo_url)
        .bind(&store.banner_url)
        .bind(store.visibility.as_str())
        .bind(store.status.as_str())
        .bind(store.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_store", e))?;
        expect_row("update_store", result.rows_affected())
    }
}

const PRODUCT_COLUMNS: &str = "id, store_id, name, description, price, images, status, created_at, updated_at";
const SOCIAL_COLUMNS: &str = "id, store_id, platform, account_name, profile_url, connected_at";

#[async_trait]
impl CatalogRepository for PostgresResourceStore {
    #[instrument(skip(self), err)]
    async fn list_products(&self, store_id: StoreId) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE store_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(store_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;
        decode_all(&rows, product_from_row)
    }

    #[instrument(skip(self), err)]
    async fn product(&self, store_id: StoreId, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND store_id = $2"
        ))
        .bind(id.as_uuid())
        .bind(store_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("product", e))?;
        decode_opt(row, product_from_row)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, store_id, name, description, price, images, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(product.store_id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.images)
        .bind(product.status.as_str())
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn update_product(&self, product: &Product) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $3, description = $4, price = $5, images = $6, status = $7, updated_at = $8
            WHERE id = $1 AND store_id = $2
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(product.store_id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.images)
        .bind(product.status.as_str())
        .bind(product.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;
        expect_row("update_product", result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn delete_product(&self, store_id: StoreId, id: ProductId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND store_id = $2")
            .bind(id.as_uuid())
            .bind(store_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn list_social_accounts(&self, store_id: StoreId) -> StoreResult<Vec<SocialAccount>> {
        let rows = sqlx::query(&format!(
            "SELECT {SOCIAL_COLUMNS} FROM social_accounts WHERE store_id = $1 ORDER BY connected_at, id"
        ))
        .bind(store_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_social_accounts", e))?;
        decode_all(&rows, social_account_from_row)
    }

    #[instrument(skip(self, account), fields(account_id = %account.id), err)]
    async fn insert_social_account(&self, account: &SocialAccount) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO social_accounts (id, store_id, platform, account_name, profile_url, connected_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(account.store_id.as_uuid())
        .bind(account.platform.as_str())
        .bind(&account.account_name)
        .bind(&account.profile_url)
        .bind(account.connected_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_social_account", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_social_account(&self, store_id: StoreId, id: SocialAccountId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM social_accounts WHERE id = $1 AND store_id = $2")
            .bind(id.as_uuid())
            .bind(store_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_social_account", e))?;
        Ok(result.rows_affected() > 0)
    }
}

const REVIEW_COLUMNS: &str = "id, product_id, seller_id, buyer_id, rating, title, comment, status, \
     seller_response, responded_at, created_at, updated_at";
const QUESTION_COLUMNS: &str = "q.id, q.product_id, q.asker_id, q.question, q.answer, q.answered_at, q.created_at";
const REVIEW_FILTER: &str =
    "seller_id = $1 AND ($2::text IS NULL OR status = $2) AND ($3::smallint IS NULL OR rating = $3)";

#[async_trait]
impl ReviewRepository for PostgresResourceStore {
    #[instrument(skip(self), err)]
    async fn list_reviews(
        &self,
        seller_id: UserId,
        filter: ReviewFilter,
        page: PageRequest,
    ) -> StoreResult<Page<Review>> {
        let status = filter.status.map(|s| s.as_str());
        let rating = filter.rating.map(i16::from);

        let total_row = sqlx::query(&format!("SELECT COUNT(*) AS total FROM reviews WHERE {REVIEW_FILTER}"))
            .bind(seller_id.as_uuid())
            .bind(status)
            .bind(rating)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_reviews", e))?;

        let (limit, offset) = limit_offset(page);
        let rows = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE {REVIEW_FILTER} \
             ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        ))
        .bind(seller_id.as_uuid())
        .bind(status)
        .bind(rating)
        .bind(limit)
        .bind(offset)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_reviews", e))?;

        Ok(Page::new(decode_all(&rows, review_from_row)?, count(&total_row)?, page))
    }

    #[instrument(skip(self), err)]
    async fn all_reviews(&self, seller_id: UserId) -> StoreResult<Vec<Review>> {
        let rows = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE seller_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(seller_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("all_reviews", e))?;
        decode_all(&rows, review_from_row)
    }

    #[instrument(skip(self), err)]
    async fn review(&self, seller_id: UserId, id: ReviewId) -> StoreResult<Option<Review>> {
        let row = sqlx::query(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1 AND seller_id = $2"))
            .bind(id.as_uuid())
            .bind(seller_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("review", e))?;
        decode_opt(row, review_from_row)
    }

    #[instrument(skip(self, review), fields(review_id = %review.id), err)]
    async fn insert_review(&self, review: &Review) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO reviews ({REVIEW_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(review.id.as_uuid())
        .bind(review.product_id.as_uuid())
        .bind(review.seller_id.as_uuid())
        .bind(review.buyer_id.as_uuid())
        .bind(i16::from(review.rating))
        .bind(&review.title)
        .bind(&review.comment)
        .bind(review.status.as_str())
        .bind(&review.seller_response)
        .bind(review.responded_at)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_review", e))?;
        Ok(())
    }

    #[instrument(skip(self, review), fields(review_id = %review.id), err)]
    async fn update_review(&self, review: &Review) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE reviews
            SET status = $3, seller_response = $4, responded_at = $5, updated_at = $6
            WHERE id = $1 AND seller_id = $2
            "#,
        )
        .bind(review.id.as_uuid())
        .bind(review.seller_id.as_uuid())
        .bind(review.status.as_str())
        .bind(&review.seller_response)
        .bind(review.responded_at)
        .bind(review.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_review", e))?;
        expect_row("update_review", result.rows_affected())
    }

    #[instrument(skip(self, ids), fields(requested = ids.len()), err)]
    async fn bulk_set_review_status(
        &self,
        seller_id: UserId,
        ids: &[ReviewId],
        status: ReviewStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let result = sqlx::query(
            "UPDATE reviews SET status = $3, updated_at = $4 WHERE seller_id = $1 AND id = ANY($2)",
        )
        .bind(seller_id.as_uuid())
        .bind(&ids)
        .bind(status.as_str())
        .bind(now)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("bulk_set_review_status", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn unanswered_questions(&self, store_id: StoreId) -> StoreResult<Vec<Question>> {
        let rows = sqlx::query(&format!(
            "SELECT {QUESTION_COLUMNS} FROM product_questions q \
             JOIN products p ON p.id = q.product_id \
             WHERE p.store_id = $1 AND q.answer IS NULL \
             ORDER BY q.created_at, q.id"
        ))
        .bind(store_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("unanswered_questions", e))?;
        decode_all(&rows, question_from_row)
    }

    #[instrument(skip(self), err)]
    async fn question(&self, id: QuestionId) -> StoreResult<Option<(Question, StoreId)>> {
        let row = sqlx::query(&format!(
            "SELECT {QUESTION_COLUMNS}, p.store_id FROM product_questions q \
             JOIN products p ON p.id = q.product_id \
             WHERE q.id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("question", e))?;
        decode_opt(row, |row| Ok((question_from_row(row)?, uuid_col::<StoreId>(row, "store_id")?)))
    }

    #[instrument(skip(self, question), fields(question_id = %question.id), err)]
    async fn insert_question(&self, question: &Question) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO product_questions (id, product_id, asker_id, question, answer, answered_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(question.id.as_uuid())
        .bind(question.product_id.as_uuid())
        .bind(question.asker_id.as_uuid())
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.answered_at)
        .bind(question.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_question", e))?;
        Ok(())
    }

    #[instrument(skip(self, question), fields(question_id = %question.id), err)]
    async fn update_question(&self, question: &Question) -> StoreResult<()> {
        let result = sqlx::query("UPDATE product_questions SET answer = $2, answered_at = $3 WHERE id = $1")
            .bind(question.id.as_uuid())
            .bind(&question.answer)
            .bind(question.answered_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_question", e))?;
        expect_row("update_question", result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn review_requests(&self, seller_id: UserId) -> StoreResult<Vec<ReviewRequest>> {
        let rows = sqlx::query(
            r#"
            SELECT id, seller_id, transaction_id, buyer_id, product_id, created_at
            FROM review_requests
            WHERE seller_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(seller_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("review_requests", e))?;
        decode_all(&rows, review_request_from_row)
    }

    #[instrument(skip(self, requests), fields(count = requests.len()), err)]
    async fn insert_review_requests(&self, requests: &[ReviewRequest]) -> StoreResult<()> {
        if requests.is_empty() {
            return Ok(());
        }
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("insert_review_requests", e))?;
        for request in requests {
            sqlx::query(
                r#"
                INSERT INTO review_requests (id, seller_id, transaction_id, buyer_id, product_id, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (transaction_id) DO NOTHING
                "#,
            )
            .bind(request.id.as_uuid())
            .bind(request.seller_id.as_uuid())
            .bind(request.transaction_id.as_uuid())
            .bind(request.buyer_id.as_uuid())
            .bind(request.product_id.as_uuid())
            .bind(request.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_review_requests", e))?;
        }
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("insert_review_requests", e))
    }

    #[instrument(skip(self), err)]
    async fn auto_request_config(&self, seller_id: UserId) -> StoreResult<Option<AutoRequestConfig>> {
        let row = sqlx::query(
            r#"
            SELECT seller_id, enabled, delay_days, message, updated_at
            FROM review_auto_request_configs
            WHERE seller_id = $1
            "#,
        )
        .bind(seller_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("auto_request_config", e))?;
        decode_opt(row, auto_request_config_from_row)
    }

    #[instrument(skip(self, config), fields(seller_id = %config.seller_id), err)]
    async fn save_auto_request_config(&self, config: &AutoRequestConfig) -> StoreResult<()> {
        let delay_days = i32::try_from(config.delay_days)
            .map_err(|_| StoreError::Storage(format!("delay_days out of range: {}", config.delay_days)))?;
        sqlx::query(
            r#"
            INSERT INTO review_auto_request_configs (seller_id, enabled, delay_days, message, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (seller_id) DO UPDATE
            SET enabled = EXCLUDED.enabled,
                delay_days = EXCLUDED.delay_days,
                message = EXCLUDED.message,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(config.seller_id.as_uuid())
        .bind(config.enabled)
        .bind(delay_days)
        .bind(&config.message)
        .bind(config.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_auto_request_config", e))?;
        Ok(())
    }
}

const CONVERSATION_COLUMNS: &str = "id, seller_id, customer_id, subject, last_message_at, created_at";
const TICKET_COLUMNS: &str = "id, user_id, subject, category, priority, status, created_at, updated_at";

#[async_trait]
impl MessagingRepository for PostgresResourceStore {
    #[instrument(skip(self), err)]
    async fn conversations(&self, seller_id: UserId) -> StoreResult<Vec<Conversation>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM chat_conversations WHERE seller_id = $1 \
             ORDER BY COALESCE(last_message_at, created_at) DESC, id DESC"
        ))
        .bind(seller_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("conversations", e))?;
        decode_all(&rows, conversation_from_row)
    }

    #[instrument(skip(self), err)]
    async fn conversation(&self, seller_id: UserId, id: ConversationId) -> StoreResult<Option<Conversation>> {
        let row = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM chat_conversations WHERE id = $1 AND seller_id = $2"
        ))
        .bind(id.as_uuid())
        .bind(seller_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("conversation", e))?;
        decode_opt(row, conversation_from_row)
    }

    #[instrument(skip(self), err)]
    async fn conversation_with(&self, seller_id: UserId, customer_id: UserId) -> StoreResult<Option<Conversation>> {
        let row = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM chat_conversations \
             WHERE seller_id = $1 AND customer_id = $2 \
             ORDER BY created_at LIMIT 1"
        ))
        .bind(seller_id.as_uuid())
        .bind(customer_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("conversation_with", e))?;
        decode_opt(row, conversation_from_row)
    }

    #[instrument(skip(self, conversation), fields(conversation_id = %conversation.id), err)]
    async fn insert_conversation(&self, conversation: &Conversation) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO chat_conversations ({CONVERSATION_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)"
        ))
        .bind(conversation.id.as_uuid())
        .bind(conversation.seller_id.as_uuid())
        .bind(conversation.customer_id.as_uuid())
        .bind(&conversation.subject)
        .bind(conversation.last_message_at)
        .bind(conversation.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_conversation", e))?;
        Ok(())
    }

    #[instrument(skip(self, conversation), fields(conversation_id = %conversation.id), err)]
    async fn update_conversation(&self, conversation: &Conversation) -> StoreResult<()> {
        let result = sqlx::query("UPDATE chat_conversations SET subject = $2, last_message_at = $3 WHERE id = $1")
            .bind(conversation.id.as_uuid())
            .bind(&conversation.subject)
            .bind(conversation.last_message_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_conversation", e))?;
        expect_row("update_conversation", result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn messages(&self, conversation_id: ConversationId) -> StoreResult<Vec<ChatMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, conversation_id, sender_id, content, created_at
            FROM chat_messages
            WHERE conversation_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(conversation_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("messages", e))?;
        decode_all(&rows, chat_message_from_row)
    }

    #[instrument(skip(self, message), fields(conversation_id = %message.conversation_id), err)]
    async fn insert_message(&self, message: &ChatMessage) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO chat_messages (id, conversation_id, sender_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.conversation_id.as_uuid())
        .bind(message.sender_id.as_uuid())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_message", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn tickets(&self, user_id: UserId, status: Option<TicketStatus>) -> StoreResult<Vec<SupportTicket>> {
        let rows = sqlx::query(&format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets \
             WHERE user_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY updated_at DESC, id DESC"
        ))
        .bind(user_id.as_uuid())
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("tickets", e))?;
        decode_all(&rows, ticket_from_row)
    }

    #[instrument(skip(self), err)]
    async fn ticket(&self, user_id: UserId, id: TicketId) -> StoreResult<Option<SupportTicket>> {
        let row = sqlx::query(&format!("SELECT {TICKET_COLUMNS} FROM support_tickets WHERE id = $1 AND user_id = $2"))
            .bind(id.as_uuid())
            .bind(user_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ticket", e))?;
        decode_opt(row, ticket_from_row)
    }

    #[instrument(skip(self, ticket), fields(ticket_id = %ticket.id), err)]
    async fn insert_ticket(&self, ticket: &SupportTicket) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO support_tickets ({TICKET_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(ticket.id.as_uuid())
        .bind(ticket.user_id.as_uuid())
        .bind(&ticket.subject)
        .bind(&ticket.category)
        .bind(ticket.priority.as_str())
        .bind(ticket.status.as_str())
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_ticket", e))?;
        Ok(())
    }

    #[instrument(skip(self, ticket), fields(ticket_id = %ticket.id), err)]
    async fn update_ticket(&self, ticket: &SupportTicket) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE support_tickets
            SET subject = $3, category = $4, priority = $5, status = $6, updated_at = $7
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(ticket.id.as_uuid())
        .bind(ticket.user_id.as_uuid())
        .bind(&ticket.subject)
        .bind(&ticket.category)
        .bind(ticket.priority.as_str())
        .bind(ticket.status.as_str())
        .bind(ticket.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_ticket", e))?;
        expect_row("update_ticket", result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn ticket_messages(&self, ticket_id: TicketId) -> StoreResult<Vec<TicketMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, ticket_id, sender_id, message, is_staff, created_at
            FROM support_messages
            WHERE ticket_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(ticket_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ticket_messages", e))?;
        decode_all(&rows, ticket_message_from_row)
    }

    #[instrument(skip(self, message), fields(ticket_id = %message.ticket_id), err)]
    async fn insert_ticket_message(&self, message: &TicketMessage) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO support_messages (id, ticket_id, sender_id, message, is_staff, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.ticket_id.as_uuid())
        .bind(message.sender_id.as_uuid())
        .bind(&message.message)
        .bind(message.is_staff)
        .bind(message.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_ticket_message", e))?;
        Ok(())
    }
}

const TRANSACTION_COLUMNS: &str =
    "id, seller_id, buyer_id, product_id, amount, seller_payout, platform_fee, status, created_at";
const EXPENSE_COLUMNS: &str =
    "id, seller_id, amount, category, description, expense_date, status, created_at, updated_at";
const EXPENSE_FILTER: &str = "seller_id = $1 AND status = 'active' \
     AND ($2::text IS NULL OR category = lower(btrim($2))) \
     AND ($3::date IS NULL OR expense_date >= $3) \
     AND ($4::date IS NULL OR expense_date <= $4)";

#[async_trait]
impl FinanceRepository for PostgresResourceStore {
    #[instrument(skip(self), err)]
    async fn transactions(&self, seller_id: UserId) -> StoreResult<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE seller_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(seller_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("transactions", e))?;
        decode_all(&rows, transaction_from_row)
    }

    #[instrument(skip(self), err)]
    async fn transactions_in_range(&self, seller_id: UserId, range: DateRange) -> StoreResult<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE seller_id = $1 AND created_at >= $2 AND created_at < $3"
        ))
        .bind(seller_id.as_uuid())
        .bind(range.start_instant())
        .bind(range.end_instant_exclusive())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("transactions_in_range", e))?;
        decode_all(&rows, transaction_from_row)
    }

    #[instrument(skip(self, transaction), fields(transaction_id = %transaction.id), err)]
    async fn insert_transaction(&self, transaction: &Transaction) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO transactions ({TRANSACTION_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(transaction.id.as_uuid())
        .bind(transaction.seller_id.as_uuid())
        .bind(transaction.buyer_id.as_uuid())
        .bind(transaction.product_id.map(Uuid::from))
        .bind(transaction.amount)
        .bind(transaction.seller_payout)
        .bind(transaction.platform_fee)
        .bind(transaction.status.as_str())
        .bind(transaction.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn active_expenses_in_range(&self, seller_id: UserId, range: DateRange) -> StoreResult<Vec<Expense>> {
        let rows = sqlx::query(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM seller_expenses \
             WHERE seller_id = $1 AND status = 'active' AND expense_date BETWEEN $2 AND $3"
        ))
        .bind(seller_id.as_uuid())
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("active_expenses_in_range", e))?;
        decode_all(&rows, expense_from_row)
    }

    #[instrument(skip(self, filter), err)]
    async fn list_expenses(
        &self,
        seller_id: UserId,
        filter: &ExpenseFilter,
        page: PageRequest,
    ) -> StoreResult<Page<Expense>> {
        let category = filter.category.as_deref();
        let start = filter.range.map(|r| r.start);
        let end = filter.range.map(|r| r.end);

        let total_row = sqlx::query(&format!("SELECT COUNT(*) AS total FROM seller_expenses WHERE {EXPENSE_FILTER}"))
            .bind(seller_id.as_uuid())
            .bind(category)
            .bind(start)
            .bind(end)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_expenses", e))?;

        let (limit, offset) = limit_offset(page);
        let rows = sqlx::query(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM seller_expenses WHERE {EXPENSE_FILTER} \
             ORDER BY expense_date DESC, created_at DESC, id DESC LIMIT $5 OFFSET $6"
        ))
        .bind(seller_id.as_uuid())
        .bind(category)
        .bind(start)
        .bind(end)
        .bind(limit)
        .bind(offset)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_expenses", e))?;

        Ok(Page::new(decode_all(&rows, expense_from_row)?, count(&total_row)?, page))
    }

    #[instrument(skip(self), err)]
    async fn expense(&self, seller_id: UserId, id: ExpenseId) -> StoreResult<Option<Expense>> {
        let row = sqlx::query(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM seller_expenses WHERE id = $1 AND seller_id = $2 AND status = 'active'"
        ))
        .bind(id.as_uuid())
        .bind(seller_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("expense", e))?;
        decode_opt(row, expense_from_row)
    }

    #[instrument(skip(self, expense), fields(expense_id = %expense.id), err)]
    async fn insert_expense(&self, expense: &Expense) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO seller_expenses ({EXPENSE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(expense.id.as_uuid())
        .bind(expense.seller_id.as_uuid())
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(&expense.description)
        .bind(expense.expense_date)
        .bind(expense.status.as_str())
        .bind(expense.created_at)
        .bind(expense.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_expense", e))?;
        Ok(())
    }

    #[instrument(skip(self, expense), fields(expense_id = %expense.id), err)]
    async fn update_expense(&self, expense: &Expense) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE seller_expenses
            SET amount = $3, category = $4, description = $5, expense_date = $6, status = $7, updated_at = $8
            WHERE id = $1 AND seller_id = $2
            "#,
        )
        .bind(expense.id.as_uuid())
        .bind(expense.seller_id.as_uuid())
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(&expense.description)
        .bind(expense.expense_date)
        .bind(expense.status.as_str())
        .bind(expense.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_expense", e))?;
        expect_row("update_expense", result.rows_affected())
    }
}
