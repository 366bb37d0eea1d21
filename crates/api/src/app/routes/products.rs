use chrono::Utc;
use serde_json::json;

use storefront_catalog::{NewProduct, Product, ProductPatch};
use storefront_core::ProductId;

use super::ApiRequest;
use crate::app::dto::{ProductRequest, parse_label, require};
use crate::app::errors::{ApiError, ApiResponse, ApiResult};
use crate::authz::OwnerScope;

pub async fn list_products(scope: &OwnerScope<'_>) -> ApiResult {
    let store = scope.store().await?;
    ApiResponse::ok(scope.resources().list_products(store.id).await?)
}

pub async fn create_product(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let body: ProductRequest = req.json()?;
    require(&[("name", &body.name), ("price", &body.price)])?;
    let store = scope.store().await?;

    let product = Product::create(
        store.id,
        NewProduct {
            name: body.name.unwrap_or_default(),
            price: body.price.unwrap_or_default(),
            description: body.description,
            images: body.images.unwrap_or_default(),
            status: parse_label(body.status.as_deref())?,
        },
        Utc::now(),
    )?;
    scope.resources().insert_product(&product).await?;

    Ok(ApiResponse::created(product)?.message("Product created"))
}

pub async fn update_product(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let id: ProductId = req.param("id")?;
    let body: ProductRequest = req.json()?;
    let (_, mut product) = scope.product(id).await?;

    ProductPatch {
        name: body.name,
        description: body.description,
        price: body.price,
        images: body.images,
        status: parse_label(body.status.as_deref())?,
    }
    .apply(&mut product, Utc::now())?;
    scope.resources().update_product(&product).await?;

    Ok(ApiResponse::ok(product)?.message("Product updated"))
}

pub async fn delete_product(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let id: ProductId = req.param("id")?;
    let store = scope.store().await?;
    if !scope.resources().delete_product(store.id, id).await? {
        return Err(ApiError::not_found("Product"));
    }
    Ok(ApiResponse::ok(json!({ "id": id }))?.message("Product deleted"))
}
