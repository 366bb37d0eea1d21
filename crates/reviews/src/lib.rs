//! `storefront-reviews`: buyer reviews and their moderation, product
//! questions, and review-request campaigns.

pub mod analytics;
pub mod campaign;
pub mod question;
pub mod review;

pub use analytics::ReviewAnalytics;
pub use campaign::{AutoRequestConfig, AutoRequestPatch, RequestableOrder, ReviewRequest, requestable_orders};
pub use question::Question;
pub use review::{Review, ReviewFilter, ReviewStatus};
