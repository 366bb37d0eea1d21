use storefront_core::UserId;

/// Caller context for a request.
///
/// Derived from the verified bearer token and present for every routed
/// request; handlers never see an unauthenticated call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CallerContext {
    user_id: UserId,
}

impl CallerContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
