//! Review listing, moderation, seller responses and review-request campaigns.

use chrono::Utc;
use serde_json::json;

use storefront_core::{PageRequest, ReviewId, TransactionId};
use storefront_reviews::{
    AutoRequestConfig, AutoRequestPatch, ReviewAnalytics, ReviewFilter, ReviewRequest, ReviewStatus,
    requestable_orders as requestable,
};

use super::ApiRequest;
use crate::app::dto::{
    AutoRequestConfigRequest, BulkUpdateReviewsRequest, RequestReviewsRequest, RespondRequest, StatusRequest,
    parse_ids, parse_label, require,
};
use crate::app::errors::{ApiError, ApiResponse, ApiResult};
use crate::authz::OwnerScope;

pub async fn list_reviews(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let rating = match req.query("rating") {
        None => None,
        Some(raw) => match raw.parse::<u8>() {
            Ok(r) if (1..=5).contains(&r) => Some(r),
            _ => return Err(ApiError::validation("rating must be between 1 and 5")),
        },
    };
    let filter = ReviewFilter {
        status: parse_label(req.query("status"))?,
        rating,
    };
    let page = PageRequest::from_query(req.query("page"), req.query("limit"));

    ApiResponse::ok(scope.resources().list_reviews(scope.caller(), filter, page).await?)
}

pub async fn analytics(scope: &OwnerScope<'_>) -> ApiResult {
    let reviews = scope.resources().all_reviews(scope.caller()).await?;
    ApiResponse::ok(ReviewAnalytics::compute(&reviews))
}

pub async fn requestable_orders(scope: &OwnerScope<'_>) -> ApiResult {
    let seller = scope.caller();
    let resources = scope.resources();
    let transactions = resources.transactions(seller).await?;
    let reviews = resources.all_reviews(seller).await?;
    let requests = resources.review_requests(seller).await?;

    ApiResponse::ok(requestable(seller, &transactions, &reviews, &requests))
}

pub async fn request_reviews(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let body: RequestReviewsRequest = req.json()?;
    require(&[("transaction_ids", &body.transaction_ids)])?;
    let wanted: Vec<TransactionId> = parse_ids("transaction_ids", body.transaction_ids.as_deref().unwrap_or_default())?;

    let seller = scope.caller();
    let resources = scope.resources();
    let transactions = resources.transactions(seller).await?;
    let reviews = resources.all_reviews(seller).await?;
    let existing = resources.review_requests(seller).await?;

    let now = Utc::now();
    let created: Vec<ReviewRequest> = requestable(seller, &transactions, &reviews, &existing)
        .iter()
        .filter(|order| wanted.contains(&order.transaction_id))
        .map(|order| ReviewRequest::for_order(seller, order, now))
        .collect();
    resources.insert_review_requests(&created).await?;

    let requested = created.len();
    let skipped = wanted.len().saturating_sub(requested);
    tracing::info!(%seller, requested, skipped, "review requests created");

    Ok(ApiResponse::ok(json!({ "requested": requested, "skipped": skipped }))?
        .message(format!("Requested {requested} review(s)")))
}

pub async fn get_auto_request_config(scope: &OwnerScope<'_>) -> ApiResult {
    let seller = scope.caller();
    let config = scope
        .resources()
        .auto_request_config(seller)
        .await?
        .unwrap_or_else(|| AutoRequestConfig::default_for(seller));
    ApiResponse::ok(config)
}

pub async fn save_auto_request_config(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let body: AutoRequestConfigRequest = req.json()?;
    let delay_days = body
        .delay_days
        .map(|d| u32::try_from(d).map_err(|_| ApiError::validation("delay_days must be between 0 and 90")))
        .transpose()?;

    let seller = scope.caller();
    let resources = scope.resources();
    let mut config = resources
        .auto_request_config(seller)
        .await?
        .unwrap_or_else(|| AutoRequestConfig::default_for(seller));

    AutoRequestPatch {
        enabled: body.enabled,
        delay_days,
        message: body.message,
    }
    .apply(&mut config, Utc::now())?;
    resources.save_auto_request_config(&config).await?;

    Ok(ApiResponse::ok(config)?.message("Settings saved"))
}

pub async fn bulk_update(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let body: BulkUpdateReviewsRequest = req.json()?;
    require(&[("review_ids", &body.review_ids), ("status", &body.status)])?;
    let status = ReviewStatus::parse_decision(body.status.as_deref().unwrap_or_default())?;
    let mut ids: Vec<ReviewId> = parse_ids("review_ids", body.review_ids.as_deref().unwrap_or_default())?;
    ids.sort();
    ids.dedup();

    let updated = scope
        .resources()
        .bulk_set_review_status(scope.caller(), &ids, status, Utc::now())
        .await?;
    tracing::info!(requested = ids.len(), updated, %status, "bulk review update");

    Ok(ApiResponse::ok(json!({ "updated": updated }))?.message(format!("Updated {updated} review(s)")))
}

pub async fn respond(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let id: ReviewId = req.param("id")?;
    let body: RespondRequest = req.json()?;
    require(&[("response", &body.response)])?;

    let mut review = scope.review(id).await?;
    review.respond(body.response.as_deref().unwrap_or_default(), Utc::now())?;
    scope.resources().update_review(&review).await?;

    Ok(ApiResponse::ok(review)?.message("Response saved"))
}

pub async fn set_status(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let id: ReviewId = req.param("id")?;
    let body: StatusRequest = req.json()?;
    require(&[("status", &body.status)])?;
    let status = ReviewStatus::parse_decision(body.status.as_deref().unwrap_or_default())?;

    let mut review = scope.review(id).await?;
    review.moderate(status, Utc::now())?;
    scope.resources().update_review(&review).await?;

    Ok(ApiResponse::ok(review)?.message(format!("Review {status}")))
}
