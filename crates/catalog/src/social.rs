use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::text::{optional_text, required_text};
use storefront_core::{DomainResult, SocialAccountId, StoreId, string_enum};

string_enum! {
    pub enum SocialPlatform("platform") {
        Instagram => "instagram",
        Facebook => "facebook",
        Twitter => "twitter",
        Tiktok => "tiktok",
        Youtube => "youtube",
        Pinterest => "pinterest",
    }
}

/// A social media account linked to a store (one per platform).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialAccount {
    pub id: SocialAccountId,
    pub store_id: StoreId,
    pub platform: SocialPlatform,
    pub account_name: String,
    pub profile_url: Option<String>,
    pub connected_at: DateTime<Utc>,
}

impl SocialAccount {
    pub fn connect(
        store_id: StoreId,
        platform: SocialPlatform,
        account_name: &str,
        profile_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let handle = required_text("account_name", account_name, 100)?;
        Ok(Self {
            id: SocialAccountId::new(),
            store_id,
            platform,
            account_name: handle.trim_start_matches('@').to_string(),
            profile_url: optional_text("profile_url", profile_url, 2_048)?,
            connected_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_at_sign_from_handle() {
        let acct = SocialAccount::connect(StoreId::new(), SocialPlatform::Instagram, "@mugshop", None, Utc::now())
            .unwrap();
        assert_eq!(acct.account_name, "mugshop");
    }

    #[test]
    fn unknown_platform_is_a_validation_error() {
        let err = "myspace".parse::<SocialPlatform>().unwrap_err();
        assert!(err.to_string().contains("instagram"));
    }
}
