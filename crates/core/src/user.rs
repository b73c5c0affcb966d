//! Users, their saved addresses and locale-aware naming.

use serde::{Deserialize, Serialize};

use crate::types::{CityId, RoleId, UserId};

/// Display locale. Only affects name ordering and nothing else here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Vietnamese: family name first.
    #[default]
    Vi,
    /// English: given name first.
    En,
}

impl Locale {
    /// Pick a locale from an `Accept-Language`-style tag list.
    ///
    /// Returns `None` when no listed language is supported.
    #[must_use]
    pub fn from_accept_language(header: &str) -> Option<Self> {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .map(|tag| tag.trim().to_ascii_lowercase())
            .find_map(|tag| match tag.split('-').next() {
                Some("vi") => Some(Self::Vi),
                Some("en") => Some(Self::En),
                _ => None,
            })
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vi" => Ok(Self::Vi),
            "en" => Ok(Self::En),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

/// Join name parts in the order the locale expects.
///
/// Empty parts are skipped so a missing middle name leaves no double space.
#[must_use]
pub fn full_name(last: &str, middle: &str, first: &str, locale: Locale) -> String {
    let parts = match locale {
        Locale::Vi => [last, middle, first],
        Locale::En => [first, middle, last],
    };
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    /// Street line.
    pub address: String,
    pub city: Option<CityId>,
    pub phone_number: String,
    pub is_default: bool,
}

impl Address {
    #[must_use]
    pub fn full_name(&self, locale: Locale) -> String {
        full_name(&self.last_name, &self.middle_name, &self.first_name, locale)
    }
}

/// The role embedded in a user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRole {
    #[serde(rename = "_id")]
    pub id: Option<RoleId>,
    pub name: String,
    pub permissions: Vec<String>,
}

/// A user profile as returned by `/auth/me` and `/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl UserProfile {
    /// The address flagged as default, if any.
    ///
    /// If the backend ever flags more than one, the first wins.
    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_default)
    }

    #[must_use]
    pub fn display_name(&self, locale: Locale) -> String {
        let name = full_name(&self.last_name, &self.middle_name, &self.first_name, locale);
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }

    #[must_use]
    pub fn permissions(&self) -> &[String] {
        &self.role.permissions
    }
}
