//! In-memory resource store for tests and local development.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use storefront_catalog::{Product, SocialAccount, Store};
use storefront_core::{
    ConversationId, ExpenseId, MessageId, Page, PageRequest, ProductId, QuestionId, ReviewId, ReviewRequestId,
    SocialAccountId, StoreId, TicketId, TransactionId, UserId,
};
use storefront_finance::{DateRange, Expense, ExpenseFilter, Transaction};
use storefront_messaging::{ChatMessage, Conversation, SupportTicket, TicketMessage, TicketStatus};
use storefront_reviews::{AutoRequestConfig, Question, Review, ReviewFilter, ReviewRequest, ReviewStatus};

use super::{
    CatalogRepository, FinanceRepository, MessagingRepository, ReviewRepository, StoreError, StoreRepository,
    StoreResult,
};

type Table<K, V> = RwLock<HashMap<K, V>>;

/// `RwLock<HashMap>` per table. Rows are cloned in and out.
#[derive(Debug, Default)]
pub struct InMemoryResourceStore {
    stores: Table<StoreId, Store>,
    products: Table<ProductId, Product>,
    social_accounts: Table<SocialAccountId, SocialAccount>,
    reviews: Table<ReviewId, Review>,
    questions: Table<QuestionId, Question>,
    review_requests: Table<ReviewRequestId, ReviewRequest>,
    auto_request_configs: Table<UserId, AutoRequestConfig>,
    conversations: Table<ConversationId, Conversation>,
    chat_messages: Table<MessageId, ChatMessage>,
    tickets: Table<TicketId, SupportTicket>,
    ticket_messages: Table<MessageId, TicketMessage>,
    transactions: Table<TransactionId, Transaction>,
    expenses: Table<ExpenseId, Expense>,
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Physical expense rows for a seller, soft-deleted ones included.
    pub fn expense_row_count(&self, seller_id: UserId) -> StoreResult<usize> {
        Ok(read(&self.expenses)?.values().filter(|e| e.seller_id == seller_id).count())
    }
}

fn poisoned() -> StoreError {
    StoreError::Storage("in-memory table lock poisoned".to_string())
}

fn read<K, V>(table: &Table<K, V>) -> StoreResult<RwLockReadGuard<'_, HashMap<K, V>>> {
    table.read().map_err(|_| poisoned())
}

fn write<K, V>(table: &Table<K, V>) -> StoreResult<RwLockWriteGuard<'_, HashMap<K, V>>> {
    table.write().map_err(|_| poisoned())
}

fn insert_new<K: Eq + Hash, V>(table: &Table<K, V>, key: K, value: V) -> StoreResult<()> {
    let mut rows = write(table)?;
    if rows.contains_key(&key) {
        return Err(StoreError::Storage("duplicate primary key".to_string()));
    }
    rows.insert(key, value);
    Ok(())
}

fn replace<K: Eq + Hash, V>(table: &Table<K, V>, key: K, value: V) -> StoreResult<()> {
    let mut rows = write(table)?;
    match rows.get_mut(&key) {
        Some(row) => {
            *row = value;
            Ok(())
        }
        None => Err(StoreError::NotFound),
    }
}

fn select<K, V: Clone>(table: &Table<K, V>, mut keep: impl FnMut(&V) -> bool) -> StoreResult<Vec<V>> {
    Ok(read(table)?.values().filter(|v| keep(*v)).cloned().collect())
}

#[async_trait]
impl StoreRepository for InMemoryResourceStore {
    async fn store_by_seller(&self, seller_id: UserId) -> StoreResult<Option<Store>> {
        Ok(read(&self.stores)?.values().find(|s| s.seller_id == seller_id).cloned())
    }

    async fn store_by_slug(&self, slug: &str) -> StoreResult<Option<Store>> {
        Ok(read(&self.stores)?.values().find(|s| s.slug == slug).cloned())
    }

    async fn store_by_id(&self, id: StoreId) -> StoreResult<Option<Store>> {
        Ok(read(&self.stores)?.get(&id).cloned())
    }

    async fn insert_store(&self, store: &Store) -> StoreResult<()> {
        let mut rows = write(&self.stores)?;
        if rows.values().any(|s| s.slug == store.slug || s.seller_id == store.seller_id) {
            return Err(StoreError::Storage("duplicate key value violates unique constraint".to_string()));
        }
        rows.insert(store.id, store.clone());
        Ok(())
    }

    async fn update_store(&self, store: &Store) -> StoreResult<()> {
        replace(&self.stores, store.id, store.clone())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryResourceStore {
    async fn list_products(&self, store_id: StoreId) -> StoreResult<Vec<Product>> {
        let mut out = select(&self.products, |p| p.store_id == store_id)?;
        out.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(out)
    }

    async fn product(&self, store_id: StoreId, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(read(&self.products)?.get(&id).filter(|p| p.store_id == store_id).cloned())
    }

    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        insert_new(&self.products, product.id, product.clone())
    }

    async fn update_product(&self, product: &Product) -> StoreResult<()> {
        replace(&self.products, product.id, product.clone())
    }

    async fn delete_product(&self, store_id: StoreId, id: ProductId) -> StoreResult<bool> {
        let mut rows = write(&self.products)?;
        if rows.get(&id).is_some_and(|p| p.store_id == store_id) {
            rows.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn list_social_accounts(&self, store_id: StoreId) -> StoreResult<Vec<SocialAccount>> {
        let mut out = select(&self.social_accounts, |a| a.store_id == store_id)?;
        out.sort_by(|a, b| (a.connected_at, a.id).cmp(&(b.connected_at, b.id)));
        Ok(out)
    }

    async fn insert_social_account(&self, account: &SocialAccount) -> StoreResult<()> {
        insert_new(&self.social_accounts, account.id, account.clone())
    }

    async fn delete_social_account(&self, store_id: StoreId, id: SocialAccountId) -> StoreResult<bool> {
        let mut rows = write(&self.social_accounts)?;
        if rows.get(&id).is_some_and(|a| a.store_id == store_id) {
            rows.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

fn newest_reviews_first(reviews: &mut [Review]) {
    reviews.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
}

#[async_trait]
impl ReviewRepository for InMemoryResourceStore {
    async fn list_reviews(
        &self,
        seller_id: UserId,
        filter: ReviewFilter,
        page: PageRequest,
    ) -> StoreResult<Page<Review>> {
        let mut all = select(&self.reviews, |r| r.seller_id == seller_id && filter.matches(r))?;
        newest_reviews_first(&mut all);
        Ok(page.slice(all))
    }

    async fn all_reviews(&self, seller_id: UserId) -> StoreResult<Vec<Review>> {
        let mut all = select(&self.reviews, |r| r.seller_id == seller_id)?;
        newest_reviews_first(&mut all);
        Ok(all)
    }

    async fn review(&self, seller_id: UserId, id: ReviewId) -> StoreResult<Option<Review>> {
        Ok(read(&self.reviews)?.get(&id).filter(|r| r.seller_id == seller_id).cloned())
    }

    async fn insert_review(&self, review: &Review) -> StoreResult<()> {
        insert_new(&self.reviews, review.id, review.clone())
    }

    async fn update_review(&self, review: &Review) -> StoreResult<()> {
        replace(&self.reviews, review.id, review.clone())
    }

    async fn bulk_set_review_status(
        &self,
        seller_id: UserId,
        ids: &[ReviewId],
        status: ReviewStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let mut rows = write(&self.reviews)?;
        let mut updated = 0;
        let unique: HashSet<&ReviewId> = ids.iter().collect();
        for id in unique {
            if let Some(review) = rows.get_mut(id).filter(|r| r.seller_id == seller_id) {
                review.status = status;
                review.updated_at = now;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn unanswered_questions(&self, store_id: StoreId) -> StoreResult<Vec<Question>> {
        let products = read(&self.products)?;
        let mut out = select(&self.questions, |q| {
            !q.is_answered() && products.get(&q.product_id).is_some_and(|p| p.store_id == store_id)
        })?;
        out.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(out)
    }

    async fn question(&self, id: QuestionId) -> StoreResult<Option<(Question, StoreId)>> {
        let Some(question) = read(&self.questions)?.get(&id).cloned() else {
            return Ok(None);
        };
        let store_id = read(&self.products)?.get(&question.product_id).map(|p| p.store_id);
        Ok(store_id.map(|store_id| (question, store_id)))
    }

    async fn insert_question(&self, question: &Question) -> StoreResult<()> {
        insert_new(&self.questions, question.id, question.clone())
    }

    async fn update_question(&self, question: &Question) -> StoreResult<()> {
        replace(&self.questions, question.id, question.clone())
    }

    async fn review_requests(&self, seller_id: UserId) -> StoreResult<Vec<ReviewRequest>> {
        select(&self.review_requests, |r| r.seller_id == seller_id)
    }

    async fn insert_review_requests(&self, requests: &[ReviewRequest]) -> StoreResult<()> {
        let mut rows = write(&self.review_requests)?;
        for request in requests {
            rows.insert(request.id, request.clone());
        }
        Ok(())
    }

    async fn auto_request_config(&self, seller_id: UserId) -> StoreResult<Option<AutoRequestConfig>> {
        Ok(read(&self.auto_request_configs)?.get(&seller_id).cloned())
    }

    async fn save_auto_request_config(&self, config: &AutoRequestConfig) -> StoreResult<()> {
        write(&self.auto_request_configs)?.insert(config.seller_id, config.clone());
        Ok(())
    }
}

#[async_trait]
impl MessagingRepository for InMemoryResourceStore {
    async fn conversations(&self, seller_id: UserId) -> StoreResult<Vec<Conversation>> {
        let mut out = select(&self.conversations, |c| c.seller_id == seller_id)?;
        out.sort_by(|a, b| (b.activity_at(), b.id).cmp(&(a.activity_at(), a.id)));
        Ok(out)
    }

    async fn conversation(&self, seller_id: UserId, id: ConversationId) -> StoreResult<Option<Conversation>> {
        Ok(read(&self.conversations)?.get(&id).filter(|c| c.seller_id == seller_id).cloned())
    }

    async fn conversation_with(&self, seller_id: UserId, customer_id: UserId) -> StoreResult<Option<Conversation>> {
        Ok(read(&self.conversations)?
            .values()
            .find(|c| c.seller_id == seller_id && c.customer_id == customer_id)
            .cloned())
    }

    async fn insert_conversation(&self, conversation: &Conversation) -> StoreResult<()> {
        insert_new(&self.conversations, conversation.id, conversation.clone())
    }

    async fn update_conversation(&self, conversation: &Conversation) -> StoreResult<()> {
        replace(&self.conversations, conversation.id, conversation.clone())
    }

    async fn messages(&self, conversation_id: ConversationId) -> StoreResult<Vec<ChatMessage>> {
        let mut out = select(&self.chat_messages, |m| m.conversation_id == conversation_id)?;
        out.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(out)
    }

    async fn insert_message(&self, message: &ChatMessage) -> StoreResult<()> {
        insert_new(&self.chat_messages, message.id, message.clone())
    }

    async fn tickets(&self, user_id: UserId, status: Option<TicketStatus>) -> StoreResult<Vec<SupportTicket>> {
        let mut out = select(&self.tickets, |t| {
            t.user_id == user_id && status.is_none_or(|s| t.status == s)
        })?;
        out.sort_by(|a, b| (b.updated_at, b.id).cmp(&(a.updated_at, a.id)));
        Ok(out)
    }

    async fn ticket(&self, user_id: UserId, id: TicketId) -> StoreResult<Option<SupportTicket>> {
        Ok(read(&self.tickets)?.get(&id).filter(|t| t.user_id == user_id).cloned())
    }

    async fn insert_ticket(&self, ticket: &SupportTicket) -> StoreResult<()> {
        insert_new(&self.tickets, ticket.id, ticket.clone())
    }

    async fn update_ticket(&self, ticket: &SupportTicket) -> StoreResult<()> {
        replace(&self.tickets, ticket.id, ticket.clone())
    }

    async fn ticket_messages(&self, ticket_id: TicketId) -> StoreResult<Vec<TicketMessage>> {
        let mut out = select(&self.ticket_messages, |m| m.ticket_id == ticket_id)?;
        out.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(out)
    }

    async fn insert_ticket_message(&self, message: &TicketMessage) -> StoreResult<()> {
        insert_new(&self.ticket_messages, message.id, message.clone())
    }
}

#[async_trait]
impl FinanceRepository for InMemoryResourceStore {
    async fn transactions(&self, seller_id: UserId) -> StoreResult<Vec<Transaction>> {
        let mut out = select(&self.transactions, |t| t.seller_id == seller_id)?;
        out.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(out)
    }

    async fn transactions_in_range(&self, seller_id: UserId, range: DateRange) -> StoreResult<Vec<Transaction>> {
        select(&self.transactions, |t| t.seller_id == seller_id && range.contains(t.created_at))
    }

    async fn insert_transaction(&self, transaction: &Transaction) -> StoreResult<()> {
        insert_new(&self.transactions, transaction.id, transaction.clone())
    }

    async fn active_expenses_in_range(&self, seller_id: UserId, range: DateRange) -> StoreResult<Vec<Expense>> {
        select(&self.expenses, |e| {
            e.seller_id == seller_id && e.is_active() && range.contains_date(e.expense_date)
        })
    }

    async fn list_expenses(
        &self,
        seller_id: UserId,
        filter: &ExpenseFilter,
        page: PageRequest,
    ) -> StoreResult<Page<Expense>> {
        let mut all = select(&self.expenses, |e| e.seller_id == seller_id && filter.matches(e))?;
        all.sort_by(|a, b| (b.expense_date, b.created_at, b.id).cmp(&(a.expense_date, a.created_at, a.id)));
        Ok(page.slice(all))
    }

    async fn expense(&self, seller_id: UserId, id: ExpenseId) -> StoreResult<Option<Expense>> {
        Ok(read(&self.expenses)?
            .get(&id)
            .filter(|e| e.seller_id == seller_id && e.is_active())
            .cloned())
    }

    async fn insert_expense(&self, expense: &Expense) -> StoreResult<()> {
        insert_new(&self.expenses, expense.id, expense.clone())
    }

    async fn update_expense(&self, expense: &Expense) -> StoreResult<()> {
        replace(&self.expenses, expense.id, expense.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use storefront_catalog::{NewProduct, NewStore};
    use storefront_finance::NewExpense;

    use super::*;

    fn expense(seller: UserId, amount: f64, category: &str, day: u32) -> Expense {
        Expense::record(
            seller,
            NewExpense {
                amount,
                category: category.to_string(),
                description: None,
                expense_date: NaiveDate::from_ymd_opt(2024, 3, day),
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn review(seller: UserId) -> Review {
        Review::submit(ProductId::new(), seller, UserId::new(), 4, None, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn bulk_status_update_only_touches_own_reviews() {
        let store = InMemoryResourceStore::new();
        let me = UserId::new();
        let other = UserId::new();
        let mine = review(me);
        let theirs = review(other);
        store.insert_review(&mine).await.unwrap();
        store.insert_review(&theirs).await.unwrap();

        let updated = store
            .bulk_set_review_status(me, &[mine.id, theirs.id, ReviewId::new()], ReviewStatus::Approved, Utc::now())
            .await
            .unwrap();

        assert_eq!(updated, 1);
        assert_eq!(store.review(me, mine.id).await.unwrap().unwrap().status, ReviewStatus::Approved);
        assert_eq!(store.review(other, theirs.id).await.unwrap().unwrap().status, ReviewStatus::Pending);
    }

    #[tokio::test]
    async fn repeated_ids_count_each_review_once() {
        let store = InMemoryResourceStore::new();
        let me = UserId::new();
        let mine = review(me);
        store.insert_review(&mine).await.unwrap();

        let updated = store
            .bulk_set_review_status(me, &[mine.id, mine.id, mine.id], ReviewStatus::Rejected, Utc::now())
            .await
            .unwrap();

        assert_eq!(updated, 1);
        assert_eq!(store.review(me, mine.id).await.unwrap().unwrap().status, ReviewStatus::Rejected);
    }

    #[tokio::test]
    async fn soft_deleted_expense_disappears_but_row_remains() {
        let store = InMemoryResourceStore::new();
        let me = UserId::new();
        let mut e = expense(me, 25.0, "shipping", 5);
        store.insert_expense(&e).await.unwrap();

        e.soft_delete(Utc::now()).unwrap();
        store.update_expense(&e).await.unwrap();

        assert_eq!(store.expense(me, e.id).await.unwrap(), None);
        let page = store
            .list_expenses(me, &ExpenseFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert!(page.items.is_empty());
        let march = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();
        assert!(store.active_expenses_in_range(me, march).await.unwrap().is_empty());
        assert_eq!(store.expense_row_count(me).unwrap(), 1);
    }

    #[tokio::test]
    async fn expenses_paginate_latest_first() {
        let store = InMemoryResourceStore::new();
        let me = UserId::new();
        for day in 1..=5 {
            store.insert_expense(&expense(me, 10.0, "ads", day)).await.unwrap();
        }
        store.insert_expense(&expense(UserId::new(), 10.0, "ads", 9)).await.unwrap();

        let page = store
            .list_expenses(me, &ExpenseFilter::default(), PageRequest::new(Some(2), Some(2)))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.pages, 3);
        let days: Vec<_> = page.items.iter().map(|e| e.expense_date.format("%d").to_string()).collect();
        assert_eq!(days, vec!["03", "02"]);
    }

    #[tokio::test]
    async fn questions_resolve_through_products() {
        let store = InMemoryResourceStore::new();
        let me = UserId::new();
        let shop = Store::create(me, NewStore { name: "Clay Works".into(), ..Default::default() }, Utc::now()).unwrap();
        store.insert_store(&shop).await.unwrap();
        let mug = Product::create(shop.id, NewProduct { name: "Mug".into(), price: 12.0, ..Default::default() }, Utc::now())
            .unwrap();
        store.insert_product(&mug).await.unwrap();

        let q = Question::ask(mug.id, UserId::new(), "Dishwasher safe?", Utc::now()).unwrap();
        store.insert_question(&q).await.unwrap();
        let orphan = Question::ask(ProductId::new(), UserId::new(), "Hello?", Utc::now()).unwrap();
        store.insert_question(&orphan).await.unwrap();

        let open = store.unanswered_questions(shop.id).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(store.question(q.id).await.unwrap().map(|(_, s)| s), Some(shop.id));
        assert_eq!(store.question(orphan.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn products_are_scoped_to_their_store() {
        let store = InMemoryResourceStore::new();
        let mine = StoreId::new();
        let p = Product::create(mine, NewProduct { name: "Bowl".into(), price: 20.0, ..Default::default() }, Utc::now())
            .unwrap();
        store.insert_product(&p).await.unwrap();

        assert!(store.product(StoreId::new(), p.id).await.unwrap().is_none());
        assert!(!store.delete_product(StoreId::new(), p.id).await.unwrap());
        assert!(store.delete_product(mine, p.id).await.unwrap());
        assert!(store.list_products(mine).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let store = InMemoryResourceStore::new();
        let e = expense(UserId::new(), 1.0, "misc", 1);
        assert!(matches!(store.update_expense(&e).await, Err(StoreError::NotFound)));
    }
}
