use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

// --- Validation ---

/// ValidationError
///
/// Returned by the validating factories below instead of throwing from setters.
/// `field` is the form field id, so callers can address `<field>_error` directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: the field is required")]
    Required { field: &'static str },

    #[error("{field}: {message}")]
    Format {
        field: &'static str,
        message: &'static str,
    },

    #[error("malformed record: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// The form field the error belongs to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::Required { field } | ValidationError::Format { field, .. } => {
                Some(field)
            }
            ValidationError::Malformed(_) => None,
        }
    }

    /// Text shown next to the offending field.
    pub fn message(&self) -> String {
        match self {
            ValidationError::Required { .. } => "The field is required".to_string(),
            ValidationError::Format { message, .. } => message.to_string(),
            ValidationError::Malformed(detail) => detail.clone(),
        }
    }
}

static FULL_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("full name pattern compiles"));
static CONTACT_NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3}-\d{3}-\d{4}$").expect("contact number pattern compiles"));
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

fn require(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_string())
}

fn require_pattern(
    field: &'static str,
    value: &str,
    pattern: &Regex,
    message: &'static str,
) -> Result<String, ValidationError> {
    let value = require(field, value)?;
    if !pattern.is_match(&value) {
        return Err(ValidationError::Format { field, message });
    }
    Ok(value)
}

// --- Session & Identity ---

/// SessionRecord
///
/// The tab-scoped record of who is logged in. It is the single source of truth for
/// authenticated UI state and deliberately carries no password.
/// Serialized with the PascalCase keys the page scripts read from tab storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionRecord {
    #[serde(rename = "DisplayName")]
    pub display_name: String,
    #[serde(rename = "EmailAddress")]
    pub email_address: String,
    #[serde(rename = "Username")]
    pub user_name: String,
}

impl SessionRecord {
    /// new
    ///
    /// Validating factory: every field must be non-empty after trimming.
    pub fn new(
        display_name: &str,
        email_address: &str,
        user_name: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            display_name: require("displayName", display_name)?,
            email_address: require("emailAddress", email_address)?,
            user_name: require("userName", user_name)?,
        })
    }
}

impl From<&UserRecord> for SessionRecord {
    fn from(user: &UserRecord) -> Self {
        Self {
            display_name: user.display_name.clone(),
            email_address: user.email_address.clone(),
            user_name: user.user_name.clone(),
        }
    }
}

impl fmt::Display for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Display Name: {}\nEmail Address: {}\nUser Name: {}",
            self.display_name, self.email_address, self.user_name
        )
    }
}

/// UserRecord
///
/// One entry of the static credential document. Only ever read, never stored in the session.
#[derive(Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "DisplayName")]
    pub display_name: String,
    #[serde(rename = "EmailAddress")]
    pub email_address: String,
    #[serde(rename = "Username")]
    pub user_name: String,
    #[serde(rename = "Password")]
    pub password: String,
}

// Password stays out of log lines.
impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("display_name", &self.display_name)
            .field("email_address", &self.email_address)
            .field("user_name", &self.user_name)
            .finish_non_exhaustive()
    }
}

/// UserDirectory
///
/// The `data/users.json` document: `{ "users": [ ... ] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDirectory {
    pub users: Vec<UserRecord>,
}

impl UserDirectory {
    /// Linear scan for an exact username and password match.
    pub fn find(&self, user_name: &str, password: &str) -> Option<&UserRecord> {
        self.users
            .iter()
            .find(|user| user.user_name == user_name && user.password == password)
    }
}

// --- Contact ---

/// Contact
///
/// A validated contact-form submission. Construct with [`Contact::new`]; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    full_name: String,
    contact_number: String,
    email_address: String,
}

impl Contact {
    pub fn new(
        full_name: &str,
        contact_number: &str,
        email_address: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            full_name: require_pattern(
                "fullName",
                full_name,
                &FULL_NAME_PATTERN,
                "Full name must contain only letters and spaces",
            )?,
            contact_number: require_pattern(
                "contactNumber",
                contact_number,
                &CONTACT_NUMBER_PATTERN,
                "Contact Number must be in format ###-###-####",
            )?,
            email_address: require_pattern(
                "emailAddress",
                email_address,
                &EMAIL_PATTERN,
                "Invalid Email address format",
            )?,
        })
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn contact_number(&self) -> &str {
        &self.contact_number
    }

    pub fn email_address(&self) -> &str {
        &self.email_address
    }

    /// Comma-separated storage form: `name,number,email`.
    pub fn serialize(&self) -> String {
        format!(
            "{},{},{}",
            self.full_name, self.contact_number, self.email_address
        )
    }

    /// Parses the storage form back, re-running validation.
    pub fn deserialize(data: &str) -> Result<Self, ValidationError> {
        let parts: Vec<&str> = data.split(',').collect();
        match parts.as_slice() {
            [name, number, email] => Self::new(name, number, email),
            _ => Err(ValidationError::Malformed(format!(
                "expected 3 comma-separated fields, found {}",
                parts.len()
            ))),
        }
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Full Name: {}\nContact Number: {}\nEmail Address: {}",
            self.full_name, self.contact_number, self.email_address
        )
    }
}

// --- Page Content ---

/// EventItem
///
/// An entry of `data/events.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EventItem {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub category: String,
}

impl EventItem {
    /// Validating factory used by the event-planning form.
    pub fn new(
        title: &str,
        description: &str,
        date: &str,
        category: &str,
    ) -> Result<Self, ValidationError> {
        let date = require("date", date)?;
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| {
            ValidationError::Format {
                field: "date",
                message: "Date must be in format YYYY-MM-DD",
            }
        })?;
        Ok(Self {
            title: require("title", title)?,
            description: require("description", description)?,
            date,
            category: require("category", category)?,
        })
    }
}

/// Opportunity
///
/// A volunteer opportunity card. The list is static.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub title: String,
    pub description: String,
    pub date_time: String,
}

impl Opportunity {
    fn new(title: &str, description: &str, date_time: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            date_time: date_time.to_string(),
        }
    }
}

pub fn default_opportunities() -> Vec<Opportunity> {
    vec![
        Opportunity::new(
            "Beach Cleanup",
            "Help clean up the local beach and protect marine life.",
            "02/05/2025 09:00",
        ),
        Opportunity::new(
            "Food Bank Donation",
            "Assist in organizing and packing food donations for families in need.",
            "02/06/2025 10:00",
        ),
        Opportunity::new(
            "Tree Planting",
            "Join us to plant trees and contribute to environmental conservation.",
            "02/07/2025 08:30",
        ),
    ]
}

/// GalleryImage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GalleryImage {
    pub src: String,
    pub thumbnail: String,
    pub title: String,
}

/// The `data/gallery.json` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GalleryDocument {
    pub images: Vec<GalleryImage>,
}

/// NewsArticle
///
/// Shape of one article as returned by the news proxy (upstream field names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewsArticle {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(rename = "publishedAt")]
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsFeed {
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
}

/// StatisticsData
///
/// `data/statistics.json`: monthly visitor counts plus engagement split
/// (events, opportunities, news).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatisticsData {
    pub months: Vec<String>,
    pub visitors: Vec<u64>,
    pub engagement: Vec<u64>,
}
