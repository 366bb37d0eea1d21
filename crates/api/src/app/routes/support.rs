use chrono::Utc;
use serde_json::json;

use storefront_core::TicketId;
use storefront_messaging::SupportTicket;

use super::ApiRequest;
use crate::app::dto::{CreateTicketRequest, TicketReplyRequest, parse_label, require};
use crate::app::errors::{ApiResponse, ApiResult};
use crate::authz::OwnerScope;

pub async fn list_tickets(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let status = parse_label(req.query("status"))?;
    ApiResponse::ok(scope.resources().tickets(scope.caller(), status).await?)
}

pub async fn create_ticket(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let body: CreateTicketRequest = req.json()?;
    require(&[("subject", &body.subject), ("message", &body.message)])?;

    let (ticket, first) = SupportTicket::open(
        scope.caller(),
        body.subject.as_deref().unwrap_or_default(),
        body.message.as_deref().unwrap_or_default(),
        body.category.as_deref(),
        parse_label(body.priority.as_deref())?,
        Utc::now(),
    )?;

    let resources = scope.resources();
    resources.insert_ticket(&ticket).await?;
    resources.insert_ticket_message(&first).await?;
    tracing::info!(ticket_id = %ticket.id, priority = %ticket.priority, "support ticket opened");

    Ok(ApiResponse::created(json!({ "ticket": ticket, "messages": [first] }))?.message("Ticket created"))
}

pub async fn get_ticket(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let id: TicketId = req.param("id")?;
    let ticket = scope.ticket(id).await?;
    let messages = scope.resources().ticket_messages(id).await?;
    ApiResponse::ok(json!({ "ticket": ticket, "messages": messages }))
}

pub async fn list_messages(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let id: TicketId = req.param("id")?;
    let ticket = scope.ticket(id).await?;
    ApiResponse::ok(scope.resources().ticket_messages(ticket.id).await?)
}

pub async fn reply(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let id: TicketId = req.param("id")?;
    let body: TicketReplyRequest = req.json()?;
    require(&[("message", &body.message)])?;

    let mut ticket = scope.ticket(id).await?;
    let message = ticket.reply(scope.caller(), body.message.as_deref().unwrap_or_default(), Utc::now())?;

    let resources = scope.resources();
    resources.insert_ticket_message(&message).await?;
    resources.update_ticket(&ticket).await?;

    Ok(ApiResponse::created(message)?.message("Reply sent"))
}
