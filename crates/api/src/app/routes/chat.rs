use chrono::Utc;
use serde_json::json;

use storefront_core::{ConversationId, UserId};
use storefront_messaging::Conversation;

use super::ApiRequest;
use crate::app::dto::{ChatMessageRequest, StartConversationRequest, require};
use crate::app::errors::{ApiError, ApiResponse, ApiResult};
use crate::authz::OwnerScope;

pub async fn list_conversations(scope: &OwnerScope<'_>) -> ApiResult {
    ApiResponse::ok(scope.resources().conversations(scope.caller()).await?)
}

/// Returns the existing conversation with the customer if there is one.
pub async fn start_conversation(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let body: StartConversationRequest = req.json()?;
    require(&[("customer_id", &body.customer_id)])?;
    let customer: UserId = body
        .customer_id
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| ApiError::validation("Invalid customer_id"))?;

    let resources = scope.resources();
    if let Some(existing) = resources.conversation_with(scope.caller(), customer).await? {
        return ApiResponse::ok(existing);
    }

    let conversation = Conversation::open(scope.caller(), customer, body.subject.as_deref(), Utc::now())?;
    resources.insert_conversation(&conversation).await?;

    Ok(ApiResponse::created(conversation)?.message("Conversation started"))
}

pub async fn get_conversation(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let id: ConversationId = req.param("id")?;
    let conversation = scope.conversation(id).await?;
    let messages = scope.resources().messages(id).await?;
    ApiResponse::ok(json!({ "conversation": conversation, "messages": messages }))
}

pub async fn list_messages(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let id: ConversationId = req.param("id")?;
    let conversation = scope.conversation(id).await?;
    ApiResponse::ok(scope.resources().messages(conversation.id).await?)
}

pub async fn send_message(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let id: ConversationId = req.param("id")?;
    let body: ChatMessageRequest = req.json()?;
    require(&[("content", &body.content)])?;

    let mut conversation = scope.conversation(id).await?;
    let message = conversation.post(scope.caller(), body.content.as_deref().unwrap_or_default(), Utc::now())?;

    let resources = scope.resources();
    resources.insert_message(&message).await?;
    resources.update_conversation(&conversation).await?;

    Ok(ApiResponse::created(message)?.message("Message sent"))
}
