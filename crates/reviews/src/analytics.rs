use std::collections::BTreeMap;

use serde::Serialize;

use crate::review::{Review, ReviewStatus};

/// Aggregate view over all of a seller's reviews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewAnalytics {
    pub total: usize,
    pub average_rating: f64,
    /// Counts for ratings 1 through 5, keyed by rating.
    pub rating_distribution: BTreeMap<u8, usize>,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub responded: usize,
    pub response_rate: f64,
}

impl ReviewAnalytics {
    pub fn compute(reviews: &[Review]) -> Self {
        let mut distribution: BTreeMap<u8, usize> = (1..=5).map(|r| (r, 0)).collect();
        let (mut pending, mut approved, mut rejected, mut responded) = (0, 0, 0, 0);
        let mut rating_sum: u64 = 0;

        for r in reviews {
            if let Some(count) = distribution.get_mut(&r.rating) {
                *count += 1;
            }
            rating_sum += r.rating as u64;
            match r.status {
                ReviewStatus::Pending => pending += 1,
                ReviewStatus::Approved => approved += 1,
                ReviewStatus::Rejected => rejected += 1,
            }
            if r.seller_response.is_some() {
                responded += 1;
            }
        }

        let total = reviews.len();
        let ratio = |n: f64, d: usize| if d == 0 { 0.0 } else { (n / d as f64 * 100.0).round() / 100.0 };

        Self {
            total,
            average_rating: ratio(rating_sum as f64, total),
            rating_distribution: distribution,
            pending,
            approved,
            rejected,
            responded,
            response_rate: ratio(responded as f64 * 100.0, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use storefront_core::{ProductId, UserId};

    fn review(rating: u8) -> Review {
        Review::submit(ProductId::new(), UserId::new(), UserId::new(), rating, None, Utc::now()).unwrap()
    }

    #[test]
    fn empty_is_all_zero() {
        let a = ReviewAnalytics::compute(&[]);
        assert_eq!(a.total, 0);
        assert_eq!(a.average_rating, 0.0);
        assert_eq!(a.response_rate, 0.0);
    }

    #[test]
    fn counts_and_averages() {
        let mut answered = review(5);
        answered.respond("Thanks", Utc::now()).unwrap();
        let mut approved = review(4);
        approved.moderate(ReviewStatus::Approved, Utc::now()).unwrap();

        let a = ReviewAnalytics::compute(&[answered, approved, review(1)]);
        assert_eq!(a.total, 3);
        assert_eq!(a.average_rating, 3.33);
        assert_eq!(a.rating_distribution[&5], 1);
        assert_eq!(a.rating_distribution[&2], 0);
        assert_eq!(serde_json::to_value(&a).unwrap()["rating_distribution"]["1"], 1);
        assert_eq!(a.pending, 2);
        assert_eq!(a.approved, 1);
        assert_eq!(a.responded, 1);
        assert_eq!(a.response_rate, 33.33);
    }
}
