//! The ordered route table.
//!
//! Each entry is `(method, pattern, operation)`. Patterns are `/`-separated
//! segments where `:name` captures one segment. Resolution walks the table in
//! order and the first entry whose method and segments match wins; segment
//! counts must match exactly. Static routes are listed before parameterized
//! siblings (`/reviews/analytics` before `/reviews/:id/...`).

use axum::http::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetStore,
    CreateStore,
    UpdateStore,

    ListProducts,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,

    ListSocialAccounts,
    ConnectSocialAccount,
    DisconnectSocialAccount,

    ListReviews,
    ReviewAnalytics,
    RequestableOrders,
    RequestReviews,
    GetAutoRequestConfig,
    SaveAutoRequestConfig,
    UnansweredQuestions,
    BulkUpdateReviews,
    RespondToReview,
    SetReviewStatus,
    AnswerQuestion,

    FinancialDashboard,
    ProfitLossReport,
    TaxReport,
    ListExpenses,
    CreateExpense,
    UpdateExpense,
    DeleteExpense,
    InstantPayout,
    ListIntegrations,
    ConnectIntegration,

    ListConversations,
    StartConversation,
    GetConversation,
    ListChatMessages,
    SendChatMessage,

    ListTickets,
    CreateTicket,
    GetTicket,
    ListTicketMessages,
    ReplyToTicket,
}

#[derive(Debug)]
pub struct Route {
    pub method: Method,
    pub pattern: &'static str,
    pub operation: Operation,
}

const fn route(method: Method, pattern: &'static str, operation: Operation) -> Route {
    Route { method, pattern, operation }
}

pub static ROUTES: &[Route] = &[
    route(Method::GET, "/", Operation::GetStore),
    route(Method::POST, "/", Operation::CreateStore),
    route(Method::PUT, "/", Operation::UpdateStore),
    // catalog
    route(Method::GET, "/products", Operation::ListProducts),
    route(Method::POST, "/products", Operation::CreateProduct),
    route(Method::PUT, "/products/:id", Operation::UpdateProduct),
    route(Method::DELETE, "/products/:id", Operation::DeleteProduct),
    route(Method::GET, "/social", Operation::ListSocialAccounts),
    route(Method::POST, "/social", Operation::ConnectSocialAccount),
    route(Method::DELETE, "/social/:id", Operation::DisconnectSocialAccount),
    // reviews
    route(Method::GET, "/reviews", Operation::ListReviews),
    route(Method::GET, "/reviews/analytics", Operation::ReviewAnalytics),
    route(Method::GET, "/reviews/requestable-orders", Operation::RequestableOrders),
    route(Method::POST, "/reviews/request", Operation::RequestReviews),
    route(Method::GET, "/reviews/auto-request/config", Operation::GetAutoRequestConfig),
    route(Method::POST, "/reviews/auto-request/config", Operation::SaveAutoRequestConfig),
    route(Method::GET, "/reviews/questions", Operation::UnansweredQuestions),
    route(Method::POST, "/reviews/bulk-update", Operation::BulkUpdateReviews),
    route(Method::POST, "/reviews/:id/respond", Operation::RespondToReview),
    route(Method::PATCH, "/reviews/:id/status", Operation::SetReviewStatus),
    route(Method::POST, "/questions/:id/answer", Operation::AnswerQuestion),
    // financial
    route(Method::GET, "/financial/dashboard", Operation::FinancialDashboard),
    route(Method::GET, "/financial/reports/profit-loss", Operation::ProfitLossReport),
    route(Method::GET, "/financial/reports/tax", Operation::TaxReport),
    route(Method::GET, "/financial/expenses", Operation::ListExpenses),
    route(Method::POST, "/financial/expenses", Operation::CreateExpense),
    route(Method::PATCH, "/financial/expenses/:id", Operation::UpdateExpense),
    route(Method::DELETE, "/financial/expenses/:id", Operation::DeleteExpense),
    route(Method::POST, "/financial/payouts/instant", Operation::InstantPayout),
    route(Method::GET, "/financial/integrations", Operation::ListIntegrations),
    route(Method::POST, "/financial/integrations/:id/connect", Operation::ConnectIntegration),
    // chat
    route(Method::GET, "/chat/conversations", Operation::ListConversations),
    route(Method::POST, "/chat/conversations", Operation::StartConversation),
    route(Method::GET, "/chat/conversations/:id", Operation::GetConversation),
    route(Method::GET, "/chat/conversations/:id/messages", Operation::ListChatMessages),
    route(Method::POST, "/chat/conversations/:id/messages", Operation::SendChatMessage),
    // support
    route(Method::GET, "/support/tickets", Operation::ListTickets),
    route(Method::POST, "/support/tickets", Operation::CreateTicket),
    route(Method::GET, "/support/tickets/:id", Operation::GetTicket),
    route(Method::GET, "/support/tickets/:id/messages", Operation::ListTicketMessages),
    route(Method::POST, "/support/tickets/:id/messages", Operation::ReplyToTicket),
];

/// Named segments captured while matching a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(&'static str, String)>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }
}

/// Reduce a raw request path to the resource path the table is written
/// against.
///
/// The gateway head (`/functions/v1/store-api`) is dropped: everything up to
/// and including the first `prefix` segment, as long as no segment before it
/// starts a resource path. A `prefix` segment inside a resource path is kept.
/// Empty segments are ignored and an empty remainder is the root resource `/`.
pub fn normalize_path(raw: &str, prefix: &str) -> String {
    let segments: Vec<&str> = segments(raw).collect();
    let head = segments
        .iter()
        .take_while(|s| !is_resource_root(**s))
        .position(|s| *s == prefix);
    let rest = match head {
        Some(at) => &segments[at + 1..],
        None => &segments[..],
    };
    format!("/{}", rest.join("/"))
}

fn is_resource_root(segment: &str) -> bool {
    ROUTES.iter().any(|r| segments(r.pattern).next() == Some(segment))
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn match_pattern(pattern: &'static str, path: &str) -> Option<PathParams> {
    let mut params = Vec::new();
    let mut wanted = segments(pattern);
    let mut actual = segments(path);
    loop {
        match (wanted.next(), actual.next()) {
            (None, None) => return Some(PathParams(params)),
            (Some(w), Some(a)) => match w.strip_prefix(':') {
                Some(name) => params.push((name, a.to_string())),
                None if w == a => {}
                None => return None,
            },
            _ => return None,
        }
    }
}

/// First route whose method and pattern match a normalized path.
pub fn resolve(method: &Method, path: &str) -> Option<(Operation, PathParams)> {
    ROUTES
        .iter()
        .filter(|r| r.method == *method)
        .find_map(|r| match_pattern(r.pattern, path).map(|p| (r.operation, p)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_function_prefix_and_slashes() {
        assert_eq!(normalize_path("/functions/v1/store-api/products/", "store-api"), "/products");
        assert_eq!(normalize_path("/store-api", "store-api"), "/");
        assert_eq!(normalize_path("/store-api/", "store-api"), "/");
        assert_eq!(normalize_path("", "store-api"), "/");
        assert_eq!(normalize_path("//reviews//analytics", "store-api"), "/reviews/analytics");
        assert_eq!(normalize_path("/social/store-api", "store-api"), "/social/store-api");
        assert_eq!(
            normalize_path("/functions/v1/store-api/social/store-api", "store-api"),
            "/social/store-api"
        );
    }

    #[test]
    fn root_resource_matches_by_method() {
        assert_eq!(resolve(&Method::GET, "/").map(|r| r.0), Some(Operation::GetStore));
        assert_eq!(resolve(&Method::PUT, "/").map(|r| r.0), Some(Operation::UpdateStore));
        assert!(resolve(&Method::DELETE, "/").is_none());
    }

    #[test]
    fn captures_named_segments() {
        let (op, params) = resolve(&Method::PATCH, "/reviews/abc/status").unwrap();
        assert_eq!(op, Operation::SetReviewStatus);
        assert_eq!(params.get("id"), Some("abc"));
        assert_eq!(params.get("other"), None);
    }

    #[test]
    fn segment_counts_must_match_exactly() {
        assert!(resolve(&Method::PUT, "/products").is_none());
        assert!(resolve(&Method::PUT, "/products/1/extra").is_none());
        assert!(resolve(&Method::GET, "/chat/conversations/1/messages/2").is_none());
    }

    #[test]
    fn static_routes_win_over_parameterized_siblings() {
        assert_eq!(resolve(&Method::GET, "/reviews/questions").map(|r| r.0), Some(Operation::UnansweredQuestions));
        assert_eq!(resolve(&Method::POST, "/reviews/bulk-update").map(|r| r.0), Some(Operation::BulkUpdateReviews));
        assert_eq!(
            resolve(&Method::GET, "/chat/conversations/42").map(|r| r.0),
            Some(Operation::GetConversation)
        );
    }

    #[test]
    fn unknown_paths_do_not_resolve() {
        assert!(resolve(&Method::GET, "/nope").is_none());
        assert!(resolve(&Method::GET, "/financial").is_none());
    }

    #[test]
    fn every_pattern_resolves_to_itself() {
        for r in ROUTES {
            let (op, _) = resolve(&r.method, r.pattern).unwrap();
            assert_eq!(op, r.operation, "{} {}", r.method, r.pattern);
        }
    }
}
