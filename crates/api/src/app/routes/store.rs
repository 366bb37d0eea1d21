use chrono::Utc;

use storefront_catalog::{NewStore, Store, StorePatch};

use super::ApiRequest;
use crate::app::dto::{CreateStoreRequest, UpdateStoreRequest, parse_label, require};
use crate::app::errors::{ApiError, ApiResponse, ApiResult};
use crate::authz::OwnerScope;

pub async fn get_store(scope: &OwnerScope<'_>) -> ApiResult {
    ApiResponse::ok(scope.optional_store().await?)
}

pub async fn create_store(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let body: CreateStoreRequest = req.json()?;
    require(&[("name", &body.name)])?;

    if scope.optional_store().await?.is_some() {
        return Err(ApiError::validation("User already has a store"));
    }

    let store = Store::create(
        scope.caller(),
        NewStore {
            name: body.name.unwrap_or_default(),
            slug: body.slug,
            description: body.description,
            logo_url: body.logo_url,
            banner_url: body.banner_url,
            visibility: parse_label(body.visibility.as_deref())?,
        },
        Utc::now(),
    )?;

    let resources = scope.resources();
    if resources.store_by_slug(&store.slug).await?.is_some() {
        return Err(ApiError::validation("Slug already taken"));
    }
    resources.insert_store(&store).await?;
    tracing::info!(store_id = %store.id, slug = %store.slug, "store created");

    Ok(ApiResponse::created(store)?.message("Store created"))
}

pub async fn update_store(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let body: UpdateStoreRequest = req.json()?;
    let mut store = scope.store().await?;

    let patch = StorePatch {
        name: body.name,
        slug: body.slug,
        description: body.description,
        logo_url: body.logo_url,
        banner_url: body.banner_url,
        visibility: parse_label(body.visibility.as_deref())?,
        status: parse_label(body.status.as_deref())?,
    };

    let resources = scope.resources();
    if let Some(slug) = patch.normalized_slug()? {
        let taken = resources.store_by_slug(&slug).await?;
        if taken.is_some_and(|other| other.id != store.id) {
            return Err(ApiError::validation("Slug already taken"));
        }
    }

    patch.apply(&mut store, Utc::now())?;
    resources.update_store(&store).await?;

    Ok(ApiResponse::ok(store)?.message("Store updated"))
}
