use chrono::Utc;
use serde_json::json;

use storefront_catalog::{SocialAccount, SocialPlatform};
use storefront_core::SocialAccountId;

use super::ApiRequest;
use crate::app::dto::{ConnectSocialRequest, require};
use crate::app::errors::{ApiError, ApiResponse, ApiResult};
use crate::authz::OwnerScope;

pub async fn list_accounts(scope: &OwnerScope<'_>) -> ApiResult {
    let store = scope.store().await?;
    ApiResponse::ok(scope.resources().list_social_accounts(store.id).await?)
}

pub async fn connect_account(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let body: ConnectSocialRequest = req.json()?;
    require(&[("platform", &body.platform), ("account_name", &body.account_name)])?;
    let platform: SocialPlatform = body.platform.as_deref().unwrap_or_default().parse()?;
    let store = scope.store().await?;

    let resources = scope.resources();
    let existing = resources.list_social_accounts(store.id).await?;
    if existing.iter().any(|a| a.platform == platform) {
        return Err(ApiError::validation(format!("{platform} is already connected")));
    }

    let account = SocialAccount::connect(
        store.id,
        platform,
        body.account_name.as_deref().unwrap_or_default(),
        body.profile_url.as_deref(),
        Utc::now(),
    )?;
    resources.insert_social_account(&account).await?;

    Ok(ApiResponse::created(account)?.message("Account connected"))
}

pub async fn disconnect_account(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let id: SocialAccountId = req.param("id")?;
    let store = scope.store().await?;
    if !scope.resources().delete_social_account(store.id, id).await? {
        return Err(ApiError::not_found("Social account"));
    }
    Ok(ApiResponse::ok(json!({ "id": id }))?.message("Account disconnected"))
}
