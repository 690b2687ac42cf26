//! Domain records for the property back office.
//!
//! DESIGN
//! ======
//! `Property` mirrors the backend `properties` row one-to-one. Prices are
//! integer minor-unit amounts; rendering happens only at the presentation
//! boundary via [`format_price`]. Update inputs use [`PropertyPatch`],
//! where a field is part of the patch iff it is `Some` — setting a field
//! to zero or an empty string is a real update, not an omission.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Currency prefix used for displayed prices.
pub const CURRENCY_PREFIX: &str = "NGN";

/// Authenticated admin identity as returned by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
}

/// Listing category. Stored as plain text by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    Residential,
    Commercial,
    Industrial,
    Land,
}

/// A property listing. Mirrors the backend `properties` row.
///
/// `id`, `created_at`, and `updated_at` are assigned and refreshed by the
/// backend; the client never fabricates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Minor-unit currency amount.
    pub price: i64,
    pub location: String,
    /// Free-text size ("12,000 sq ft", "5 acres").
    pub size: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub featured: bool,
    /// Hero image URL.
    pub image: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Create input: every [`Property`] field except the backend-assigned id
/// and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub location: String,
    pub size: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub featured: bool,
    pub image: String,
}

/// Sparse update. `None` means "leave unchanged"; `Some` is sent verbatim,
/// so `Some(0)`, `Some(String::new())`, and `Some(false)` are all real
/// updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PropertyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl PropertyPatch {
    /// True when no field is present. An empty patch never reaches the
    /// network.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.location.is_none()
            && self.size.is_none()
            && self.kind.is_none()
            && self.featured.is_none()
            && self.image.is_none()
    }

    /// Apply the present fields to a row in place. Timestamps are the
    /// caller's responsibility.
    pub(crate) fn apply(&self, row: &mut Property) {
        if let Some(title) = &self.title {
            row.title = title.clone();
        }
        if let Some(description) = &self.description {
            row.description = description.clone();
        }
        if let Some(price) = self.price {
            row.price = price;
        }
        if let Some(location) = &self.location {
            row.location = location.clone();
        }
        if let Some(size) = &self.size {
            row.size = size.clone();
        }
        if let Some(kind) = self.kind {
            row.kind = kind;
        }
        if let Some(featured) = self.featured {
            row.featured = featured;
        }
        if let Some(image) = &self.image {
            row.image = image.clone();
        }
    }
}

/// Format a minor-unit amount for display: `format_price(350_000_000)`
/// yields `"NGN 350,000,000"`.
#[must_use]
pub fn format_price(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{CURRENCY_PREFIX} {sign}{grouped}")
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;

    /// Create a listing row with a fresh id and current timestamps.
    #[must_use]
    pub fn sample_property(title: &str, price: i64) -> Property {
        let now = OffsetDateTime::now_utc();
        Property {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            description: "Strategically located with excellent road access.".to_owned(),
            price,
            location: "Lagos, Nigeria".to_owned(),
            size: "12,000 sq ft".to_owned(),
            kind: PropertyKind::Commercial,
            featured: false,
            image: "https://images.example.com/listing.jpg".to_owned(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a draft matching [`sample_property`]'s fixed fields.
    #[must_use]
    pub fn sample_draft(title: &str, price: i64) -> PropertyDraft {
        PropertyDraft {
            title: title.to_owned(),
            description: "Strategically located with excellent road access.".to_owned(),
            price,
            location: "Lagos, Nigeria".to_owned(),
            size: "12,000 sq ft".to_owned(),
            kind: PropertyKind::Commercial,
            featured: false,
            image: "https://images.example.com/listing.jpg".to_owned(),
        }
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
