//! Infrastructure layer: resource-store traits and their adapters.

pub mod resource_store;

pub use resource_store::{
    CatalogRepository, FinanceRepository, InMemoryResourceStore, MessagingRepository, PostgresResourceStore,
    ResourceStore, ReviewRepository, StoreError, StoreRepository, StoreResult,
};
