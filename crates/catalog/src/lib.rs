//! `storefront-catalog`: a seller's store, its products and its connected
//! social accounts.

pub mod product;
pub mod social;
pub mod store;

pub use product::{NewProduct, Product, ProductPatch, ProductStatus};
pub use social::{SocialAccount, SocialPlatform};
pub use store::{NewStore, Store, StorePatch, StoreStatus, StoreVisibility, normalize_slug, slugify};
