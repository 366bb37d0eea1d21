//! The dispatcher: one axum handler that resolves `(method, path)` against
//! the route table and runs the matching operation.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Query},
    http::{Method, Uri},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use storefront_core::DomainError;

use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::authz::OwnerScope;
use crate::context::CallerContext;

pub mod chat;
pub mod financial;
pub mod products;
pub mod questions;
pub mod reviews;
pub mod social;
pub mod store;
pub mod support;
pub mod table;

use table::{Operation, PathParams};

/// Everything a handler may read from the request besides the caller.
#[derive(Debug, Default)]
pub struct ApiRequest {
    params: PathParams,
    query: HashMap<String, String>,
    body: Bytes,
}

impl ApiRequest {
    pub fn new(params: PathParams, query: HashMap<String, String>, body: Bytes) -> Self {
        Self { params, query, body }
    }

    /// A typed path parameter. Malformed ids are a 400.
    pub fn param<T>(&self, name: &str) -> Result<T, ApiError>
    where
        T: FromStr<Err = DomainError>,
    {
        let raw = self
            .params
            .get(name)
            .ok_or_else(|| ApiError::validation(format!("Missing path parameter: {name}")))?;
        raw.parse().map_err(|_| ApiError::validation(format!("Invalid {name}: {raw}")))
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// A query-string value; blank values count as absent.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// The JSON body. An empty body reads as `{}` so required-field checks
    /// report what is missing.
    pub fn json<T>(&self) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_json::from_slice(&self.body).map_err(|e| match e.classify() {
            serde_json::error::Category::Data => ApiError::validation(format!("Invalid request body: {e}")),
            _ => ApiError::validation("Invalid JSON body"),
        })
    }
}

/// Registered for every path and method; auth has already run.
pub async fn dispatch(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let path = table::normalize_path(uri.path(), &services.function_prefix);
    let Some((operation, params)) = table::resolve(&method, &path) else {
        tracing::debug!(%method, %path, "no route");
        return ApiError::NotFound("Route not found".to_string()).into_response();
    };
    tracing::debug!(?operation, %method, %path, caller = %caller.user_id(), "dispatching");

    let query = Query::<HashMap<String, String>>::try_from_uri(&uri)
        .map(|Query(q)| q)
        .unwrap_or_default();
    let req = ApiRequest::new(params, query, body);
    let scope = OwnerScope::new(caller.user_id(), services.resources.as_ref());

    match run(operation, &scope, &req).await {
        Ok(response) => response.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn run(operation: Operation, scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    match operation {
        Operation::GetStore => store::get_store(scope).await,
        Operation::CreateStore => store::create_store(scope, req).await,
        Operation::UpdateStore => store::update_store(scope, req).await,

        Operation::ListProducts => products::list_products(scope).await,
        Operation::CreateProduct => products::create_product(scope, req).await,
        Operation::UpdateProduct => products::update_product(scope, req).await,
        Operation::DeleteProduct => products::delete_product(scope, req).await,

        Operation::ListSocialAccounts => social::list_accounts(scope).await,
        Operation::ConnectSocialAccount => social::connect_account(scope, req).await,
        Operation::DisconnectSocialAccount => social::disconnect_account(scope, req).await,

        Operation::ListReviews => reviews::list_reviews(scope, req).await,
        Operation::ReviewAnalytics => reviews::analytics(scope).await,
        Operation::RequestableOrders => reviews::requestable_orders(scope).await,
        Operation::RequestReviews => reviews::request_reviews(scope, req).await,
        Operation::GetAutoRequestConfig => reviews::get_auto_request_config(scope).await,
        Operation::SaveAutoRequestConfig => reviews::save_auto_request_config(scope, req).await,
        Operation::BulkUpdateReviews => reviews::bulk_update(scope, req).await,
        Operation::RespondToReview => reviews::respond(scope, req).await,
        Operation::SetReviewStatus => reviews::set_status(scope, req).await,
        Operation::UnansweredQuestions => questions::unanswered(scope).await,
        Operation::AnswerQuestion => questions::answer(scope, req).await,

        Operation::FinancialDashboard => financial::dashboard(scope, req).await,
        Operation::ProfitLossReport => financial::profit_loss(scope, req).await,
        Operation::TaxReport => financial::tax_report(scope, req).await,
        Operation::ListExpenses => financial::list_expenses(scope, req).await,
        Operation::CreateExpense => financial::create_expense(scope, req).await,
        Operation::UpdateExpense => financial::update_expense(scope, req).await,
        Operation::DeleteExpense => financial::delete_expense(scope, req).await,
        Operation::InstantPayout => financial::instant_payout().await,
        Operation::ListIntegrations => financial::list_integrations().await,
        Operation::ConnectIntegration => financial::connect_integration(req).await,

        Operation::ListConversations => chat::list_conversations(scope).await,
        Operation::StartConversation => chat::start_conversation(scope, req).await,
        Operation::GetConversation => chat::get_conversation(scope, req).await,
        Operation::ListChatMessages => chat::list_messages(scope, req).await,
        Operation::SendChatMessage => chat::send_message(scope, req).await,

        Operation::ListTickets => support::list_tickets(scope, req).await,
        Operation::CreateTicket => support::create_ticket(scope, req).await,
        Operation::GetTicket => support::get_ticket(scope, req).await,
        Operation::ListTicketMessages => support::list_messages(scope, req).await,
        Operation::ReplyToTicket => support::reply(scope, req).await,
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Body {
        name: Option<String>,
    }

    fn with_body(body: &str) -> ApiRequest {
        ApiRequest::new(PathParams::default(), HashMap::new(), Bytes::from(body.to_string()))
    }

    #[test]
    fn empty_body_reads_as_empty_object() {
        let b: Body = with_body("  ").json().unwrap();
        assert_eq!(b.name, None);
    }

    #[test]
    fn malformed_json_is_a_validation_error() {
        let err = with_body("{\"name\": ").json::<Body>().unwrap_err();
        assert_eq!(err, ApiError::Validation("Invalid JSON body".into()));
    }

    #[test]
    fn wrong_types_name_the_problem() {
        let err = with_body("{\"name\": 5}").json::<Body>().unwrap_err();
        assert!(err.to_string().starts_with("Invalid request body"));
    }

    #[test]
    fn blank_query_values_are_absent() {
        let query = HashMap::from([("status".to_string(), " ".to_string()), ("page".to_string(), "2".to_string())]);
        let req = ApiRequest::new(PathParams::default(), query, Bytes::new());
        assert_eq!(req.query("status"), None);
        assert_eq!(req.query("page"), Some("2"));
    }
}
