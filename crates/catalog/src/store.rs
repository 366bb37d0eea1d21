use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::text::{optional_text, required_text};
use storefront_core::{DomainError, DomainResult, StoreId, UserId, string_enum};

const NAME_MAX: usize = 120;
const DESCRIPTION_MAX: usize = 2_000;
const URL_MAX: usize = 2_048;
const SLUG_MIN: usize = 3;
const SLUG_MAX: usize = 60;

string_enum! {
    /// Whether buyers can find the store.
    pub enum StoreVisibility("visibility") {
        Public => "public",
        Private => "private",
    }
}

string_enum! {
    pub enum StoreStatus("status") {
        Active => "active",
        Inactive => "inactive",
    }
}

/// A seller's store. Each seller owns at most one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub seller_id: UserId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub visibility: StoreVisibility,
    pub status: StoreStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a store. A missing slug is derived from the name.
#[derive(Debug, Clone, Default)]
pub struct NewStore {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub visibility: Option<StoreVisibility>,
}

impl Store {
    pub fn create(seller_id: UserId, input: NewStore, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = required_text("name", &input.name, NAME_MAX)?;
        let slug = match input.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => normalize_slug(s)?,
            _ => normalize_slug(&slugify(&name))?,
        };

        Ok(Self {
            id: StoreId::new(),
            seller_id,
            name,
            slug,
            description: optional_text("description", input.description.as_deref(), DESCRIPTION_MAX)?,
            logo_url: optional_text("logo_url", input.logo_url.as_deref(), URL_MAX)?,
            banner_url: optional_text("banner_url", input.banner_url.as_deref(), URL_MAX)?,
            visibility: input.visibility.unwrap_or(StoreVisibility::Public),
            status: StoreStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update: only `Some` fields change.
#[derive(Debug, Clone, Default)]
pub struct StorePatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub visibility: Option<StoreVisibility>,
    pub status: Option<StoreStatus>,
}

impl StorePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.logo_url.is_none()
            && self.banner_url.is_none()
            && self.visibility.is_none()
            && self.status.is_none()
    }

    /// The slug this patch would set, normalized, if it sets one.
    pub fn normalized_slug(&self) -> DomainResult<Option<String>> {
        self.slug.as_deref().map(normalize_slug).transpose()
    }

    pub fn apply(self, store: &mut Store, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::validation("No fields to update"));
        }
        // Validate everything before touching `store` so a bad field leaves it unchanged.
        let name = self.name.as_deref().map(|n| required_text("name", n, NAME_MAX)).transpose()?;
        let slug = self.normalized_slug()?;
        let description = self
            .description
            .as_deref()
            .map(|d| optional_text("description", Some(d), DESCRIPTION_MAX))
            .transpose()?;
        let logo_url = self
            .logo_url
            .as_deref()
            .map(|u| optional_text("logo_url", Some(u), URL_MAX))
            .transpose()?;
        let banner_url = self
            .banner_url
            .as_deref()
            .map(|u| optional_text("banner_url", Some(u), URL_MAX))
            .transpose()?;

        if let Some(name) = name {
            store.name = name;
        }
        if let Some(slug) = slug {
            store.slug = slug;
        }
        if let Some(description) = description {
            store.description = description;
        }
        if let Some(logo_url) = logo_url {
            store.logo_url = logo_url;
        }
        if let Some(banner_url) = banner_url {
            store.banner_url = banner_url;
        }
        if let Some(visibility) = self.visibility {
            store.visibility = visibility;
        }
        if let Some(status) = self.status {
            store.status = status;
        }
        store.updated_at = now;
        Ok(())
    }
}

/// Validate and canonicalize a store slug: lowercase ASCII letters, digits and
/// single hyphens, 3 to 60 characters, no leading or trailing hyphen.
pub fn normalize_slug(raw: &str) -> DomainResult<String> {
    let slug = raw.trim().to_ascii_lowercase();
    let len = slug.chars().count();
    if !(SLUG_MIN..=SLUG_MAX).contains(&len) {
        return Err(DomainError::validation(format!(
            "Slug must be between {SLUG_MIN} and {SLUG_MAX} characters"
        )));
    }
    let well_formed = slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--");
    if !well_formed {
        return Err(DomainError::validation(
            "Slug may only contain lowercase letters, numbers and single hyphens",
        ));
    }
    Ok(slug)
}

/// Derive a slug candidate from a display name ("Joe's Coffee Co." -> "joe-s-coffee-co").
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out.truncate(SLUG_MAX);
    out.trim_end_matches('-').to_string()
}
