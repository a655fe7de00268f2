//! Request body validation for book payloads.
//!
//! Validation works on the raw JSON so that type mismatches are reported per
//! field instead of failing deserialization as a whole.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::models::{BookPatch, NewBook};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    Genre,
    PublicationDate,
    Edition,
    Summary,
    Available,
}

impl BookField {
    /// JSON key of the field
    pub const fn key(self) -> &'static str {
        match self {
            BookField::Title => "title",
            BookField::Author => "author",
            BookField::Genre => "genre",
            BookField::PublicationDate => "publicationDate",
            BookField::Edition => "edition",
            BookField::Summary => "summary",
            BookField::Available => "available",
        }
    }

    /// Human label used in messages
    pub const fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Genre => "Genre",
            BookField::PublicationDate => "Publication date",
            BookField::Edition => "Edition",
            BookField::Summary => "Summary",
            BookField::Available => "Available",
        }
    }

    pub fn required_message(self) -> String {
        format!("{} is required", self.label())
    }
}

/// Which fields an operation insists on.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRules {
    pub required: &'static [BookField],
}

impl ValidationRules {
    pub const CREATE: ValidationRules = ValidationRules {
        required: &[
            BookField::Title,
            BookField::Author,
            BookField::Genre,
            BookField::PublicationDate,
        ],
    };

    pub const UPDATE: ValidationRules = ValidationRules { required: &[] };

    fn requires(&self, field: BookField) -> bool {
        self.required.contains(&field)
    }
}

/// Field name to message, serialized as a flat JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.insert(key.into(), message.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(value)` when nothing was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (key, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{key}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Type-checked fields pulled out of a request body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub edition: Option<Option<String>>,
    pub summary: Option<Option<String>>,
    pub available: Option<bool>,
}

impl BookInput {
    /// Assemble a creation request; reports any mandatory field still missing.
    pub fn into_new_book(self) -> Result<NewBook, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut take = |field: BookField, value: Option<String>| {
            value.unwrap_or_else(|| {
                errors.insert(field.key(), field.required_message());
                String::new()
            })
        };
        let title = take(BookField::Title, self.title);
        let author = take(BookField::Author, self.author);
        let genre = take(BookField::Genre, self.genre);

        let Some(publication_date) = self.publication_date else {
            errors.insert(
                BookField::PublicationDate.key(),
                BookField::PublicationDate.required_message(),
            );
            return Err(errors);
        };

        errors.into_result(NewBook {
            title,
            author,
            genre,
            publication_date,
            edition: self.edition.flatten(),
            summary: self.summary.flatten(),
            available: self.available,
        })
    }

    pub fn into_patch(self) -> BookPatch {
        BookPatch {
            title: self.title,
            author: self.author,
            genre: self.genre,
            publication_date: self.publication_date,
            edition: self.edition,
            summary: self.summary,
            available: self.available,
        }
    }
}

/// Validate a book body against `rules`.
///
/// Every field is checked independently and all problems are reported
/// together.
pub fn validate(input: &Value, rules: &ValidationRules) -> Result<BookInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let Some(body) = input.as_object() else {
        errors.insert("body", "Request body must be a JSON object");
        return Err(errors);
    };

    let parsed = BookInput {
        title: required_text(body, BookField::Title, rules, &mut errors),
        author: required_text(body, BookField::Author, rules, &mut errors),
        genre: required_text(body, BookField::Genre, rules, &mut errors),
        publication_date: publication_date(body, rules, &mut errors),
        edition: optional_text(body, BookField::Edition, &mut errors),
        summary: optional_text(body, BookField::Summary, &mut errors),
        available: boolean(body, BookField::Available, &mut errors),
    };

    errors.into_result(parsed)
}

/// Absent, null and empty all count as missing for a required field.
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn required_text(
    body: &Map<String, Value>,
    field: BookField,
    rules: &ValidationRules,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = body.get(field.key());
    if rules.requires(field) && is_missing(value) {
        errors.insert(field.key(), field.required_message());
        return None;
    }

    match value? {
        Value::String(s) => Some(s.clone()),
        _ => {
            errors.insert(field.key(), format!("{} must be a string", field.label()));
            None
        }
    }
}

fn optional_text(
    body: &Map<String, Value>,
    field: BookField,
    errors: &mut FieldErrors,
) -> Option<Option<String>> {
    match body.get(field.key())? {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s.clone())),
        _ => {
            errors.insert(field.key(), format!("{} must be a string", field.label()));
            None
        }
    }
}

fn boolean(body: &Map<String, Value>, field: BookField, errors: &mut FieldErrors) -> Option<bool> {
    match body.get(field.key())? {
        Value::Bool(b) => Some(*b),
        _ => {
            errors.insert(field.key(), format!("{} must be a boolean", field.label()));
            None
        }
    }
}

fn publication_date(
    body: &Map<String, Value>,
    rules: &ValidationRules,
    errors: &mut FieldErrors,
) -> Option<NaiveDate> {
    let field = BookField::PublicationDate;
    let value = body.get(field.key());
    if rules.requires(field) && is_missing(value) {
        errors.insert(field.key(), field.required_message());
        return None;
    }

    let parsed = match value? {
        Value::String(s) => parse_date(s),
        // Epoch milliseconds
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => None,
    };

    if parsed.is_none() {
        errors.insert(field.key(), "Invalid publication date format");
    }
    parsed
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (reduced to its UTC date).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}
