//! Owner scoping for every handler.
//!
//! `OwnerScope` is the only place that turns "the caller" into "the caller's
//! store / review / conversation / ticket / expense". Rows that are absent or
//! owned by someone else are both reported as 404, except for question
//! answering, where a question on another seller's product is a 403.

use storefront_auth::authorize_owner;
use storefront_catalog::{Product, Store};
use storefront_core::{ConversationId, ExpenseId, ProductId, QuestionId, ReviewId, TicketId, UserId};
use storefront_finance::Expense;
use storefront_infra::ResourceStore;
use storefront_messaging::{Conversation, SupportTicket};
use storefront_reviews::{Question, Review};

use crate::app::errors::ApiError;

#[derive(Clone, Copy)]
pub struct OwnerScope<'a> {
    caller: UserId,
    resources: &'a dyn ResourceStore,
}

impl<'a> OwnerScope<'a> {
    pub fn new(caller: UserId, resources: &'a dyn ResourceStore) -> Self {
        Self { caller, resources }
    }

    pub fn caller(&self) -> UserId {
        self.caller
    }

    /// The underlying store, for queries that are already keyed by the caller.
    pub fn resources(&self) -> &'a dyn ResourceStore {
        self.resources
    }

    pub async fn optional_store(&self) -> Result<Option<Store>, ApiError> {
        Ok(self.resources.store_by_seller(self.caller).await?)
    }

    pub async fn store(&self) -> Result<Store, ApiError> {
        self.optional_store().await?.ok_or_else(|| ApiError::not_found("Store"))
    }

    pub async fn product(&self, id: ProductId) -> Result<(Store, Product), ApiError> {
        let store = self.store().await?;
        let product = self
            .resources
            .product(store.id, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product"))?;
        Ok((store, product))
    }

    pub async fn review(&self, id: ReviewId) -> Result<Review, ApiError> {
        self.resources
            .review(self.caller, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Review"))
    }

    /// A question the caller may answer: it must be about a product in the
    /// caller's store.
    pub async fn answerable_question(&self, id: QuestionId) -> Result<Question, ApiError> {
        let (question, store_id) = self
            .resources
            .question(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Question"))?;
        let store = self
            .resources
            .store_by_id(store_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Question"))?;
        authorize_owner(self.caller, store.seller_id)?;
        Ok(question)
    }

    pub async fn conversation(&self, id: ConversationId) -> Result<Conversation, ApiError> {
        self.resources
            .conversation(self.caller, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Conversation"))
    }

    pub async fn ticket(&self, id: TicketId) -> Result<SupportTicket, ApiError> {
        self.resources
            .ticket(self.caller, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Ticket"))
    }

    /// An active expense of the caller. Soft-deleted expenses are not found.
    pub async fn expense(&self, id: ExpenseId) -> Result<Expense, ApiError> {
        self.resources
            .expense(self.caller, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Expense"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use storefront_catalog::{NewProduct, NewStore};
    use storefront_infra::{CatalogRepository, InMemoryResourceStore, ReviewRepository, StoreRepository};

    use super::*;

    async fn seller_with_question(resources: &InMemoryResourceStore) -> (UserId, QuestionId) {
        let seller = UserId::new();
        let store = Store::create(seller, NewStore { name: "Kiln & Co".into(), ..Default::default() }, Utc::now())
            .unwrap();
        resources.insert_store(&store).await.unwrap();
        let product = Product::create(
            store.id,
            NewProduct { name: "Vase".into(), price: 40.0, ..Default::default() },
            Utc::now(),
        )
        .unwrap();
        resources.insert_product(&product).await.unwrap();
        let q = Question::ask(product.id, UserId::new(), "Is it glazed inside?", Utc::now()).unwrap();
        resources.insert_question(&q).await.unwrap();
        (seller, q.id)
    }

    #[tokio::test]
    async fn owner_may_answer() {
        let resources = InMemoryResourceStore::new();
        let (seller, qid) = seller_with_question(&resources).await;
        let scope = OwnerScope::new(seller, &resources);
        assert_eq!(scope.answerable_question(qid).await.unwrap().id, qid);
    }

    #[tokio::test]
    async fn other_seller_is_forbidden() {
        let resources = InMemoryResourceStore::new();
        let (_, qid) = seller_with_question(&resources).await;
        let scope = OwnerScope::new(UserId::new(), &resources);
        assert!(matches!(scope.answerable_question(qid).await, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn missing_store_is_not_found() {
        let resources = InMemoryResourceStore::new();
        let scope = OwnerScope::new(UserId::new(), &resources);
        assert_eq!(scope.store().await.unwrap_err(), ApiError::NotFound("Store not found".into()));
        assert_eq!(scope.optional_store().await.unwrap(), None);
    }
}
