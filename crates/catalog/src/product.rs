use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::text::{non_negative_amount, optional_text, required_text};
use storefront_core::{DomainError, DomainResult, ProductId, StoreId, string_enum};

const NAME_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 5_000;
const IMAGE_URL_MAX: usize = 2_048;
const MAX_IMAGES: usize = 10;

string_enum! {
    pub enum ProductStatus("product status") {
        Draft => "draft",
        Active => "active",
        Inactive => "inactive",
    }
}

/// A product listed in exactly one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub images: Vec<String>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub status: Option<ProductStatus>,
}

impl Product {
    pub fn create(store_id: StoreId, input: NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: ProductId::new(),
            store_id,
            name: required_text("name", &input.name, NAME_MAX)?,
            description: optional_text("description", input.description.as_deref(), DESCRIPTION_MAX)?,
            price: non_negative_amount("price", input.price)?,
            images: validate_images(input.images)?,
            status: input.status.unwrap_or(ProductStatus::Active),
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub images: Option<Vec<String>>,
    pub status: Option<ProductStatus>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.images.is_none()
            && self.status.is_none()
    }

    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::validation("No fields to update"));
        }
        let name = self.name.as_deref().map(|n| required_text("name", n, NAME_MAX)).transpose()?;
        let description = self
            .description
            .as_deref()
            .map(|d| optional_text("description", Some(d), DESCRIPTION_MAX))
            .transpose()?;
        let price = self.price.map(|p| non_negative_amount("price", p)).transpose()?;
        let images = self.images.map(validate_images).transpose()?;

        if let Some(name) = name {
            product.name = name;
        }
        if let Some(description) = description {
            product.description = description;
        }
        if let Some(price) = price {
            product.price = price;
        }
        if let Some(images) = images {
            product.images = images;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        product.updated_at = now;
        Ok(())
    }
}

fn validate_images(images: Vec<String>) -> DomainResult<Vec<String>> {
    if images.len() > MAX_IMAGES {
        return Err(DomainError::validation(format!(
            "A product can have at most {MAX_IMAGES} images"
        )));
    }
    images
        .iter()
        .map(|url| required_text("image url", url, IMAGE_URL_MAX))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mug() -> NewProduct {
        NewProduct {
            name: "Mug".to_string(),
            price: 12.5,
            images: vec!["https://cdn.example.com/mug.png".to_string()],
            ..NewProduct::default()
        }
    }

    #[test]
    fn create_defaults_to_active() {
        let p = Product::create(StoreId::new(), mug(), Utc::now()).unwrap();
        assert_eq!(p.status, ProductStatus::Active);
        assert_eq!(p.price, 12.5);
    }

    #[test]
    fn negative_price_is_rejected() {
        let input = NewProduct { price: -1.0, ..mug() };
        assert!(Product::create(StoreId::new(), input, Utc::now()).is_err());
    }

    #[test]
    fn too_many_images_are_rejected() {
        let input = NewProduct {
            images: vec!["https://x/y.png".to_string(); MAX_IMAGES + 1],
            ..mug()
        };
        assert!(Product::create(StoreId::new(), input, Utc::now()).is_err());
    }

    #[test]
    fn patch_changes_only_given_fields() {
        let mut p = Product::create(StoreId::new(), mug(), Utc::now()).unwrap();
        ProductPatch {
            price: Some(15.0),
            status: Some(ProductStatus::Inactive),
            ..ProductPatch::default()
        }
        .apply(&mut p, Utc::now())
        .unwrap();
        assert_eq!(p.name, "Mug");
        assert_eq!(p.price, 15.0);
        assert_eq!(p.status, ProductStatus::Inactive);
        assert_eq!(p.images.len(), 1);
    }

    #[test]
    fn status_labels_round_trip_through_json() {
        let v = serde_json::to_value(ProductStatus::Draft).unwrap();
        assert_eq!(v, "draft");
    }
}
