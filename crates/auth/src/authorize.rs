//! Owner-based authorization.
//!
//! Every row in the platform carries an owner (`seller_id` or `user_id`). The
//! only policy is: the authenticated caller must be that owner.

use thiserror::Error;

use storefront_core::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("caller {caller} does not own this resource")]
    NotOwner { caller: UserId },
}

/// Allow `caller` to act on a row owned by `owner`.
///
/// - No IO
/// - No panics
pub fn authorize_owner(caller: UserId, owner: UserId) -> Result<(), AuthzError> {
    if caller == owner {
        Ok(())
    } else {
        tracing::debug!(%caller, %owner, "ownership check failed");
        Err(AuthzError::NotOwner { caller })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_allowed() {
        let u = UserId::new();
        assert_eq!(authorize_owner(u, u), Ok(()));
    }

    #[test]
    fn stranger_is_denied() {
        let caller = UserId::new();
        assert_eq!(
            authorize_owner(caller, UserId::new()),
            Err(AuthzError::NotOwner { caller })
        );
    }
}
