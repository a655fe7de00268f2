use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A catalog entry as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier, never changes
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub publication_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub publication_date: NaiveDate,
    pub edition: Option<String>,
    pub summary: Option<String>,
    /// Defaults to `true` when absent
    pub available: Option<bool>,
}

/// Partial update. `None` leaves the stored value untouched; for the
/// optional text fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub edition: Option<Option<String>>,
    pub summary: Option<Option<String>>,
    pub available: Option<bool>,
}

impl BookPatch {
    pub fn availability(available: bool) -> Self {
        Self {
            available: Some(available),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the supplied fields into `book`.
    pub fn apply(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(genre) = &self.genre {
            book.genre = genre.clone();
        }
        if let Some(date) = self.publication_date {
            book.publication_date = date;
        }
        if let Some(edition) = &self.edition {
            book.edition = edition.clone();
        }
        if let Some(summary) = &self.summary {
            book.summary = summary.clone();
        }
        if let Some(available) = self.available {
            book.available = available;
        }
    }
}

/// `data` payload for single-book responses
#[derive(Debug, Serialize)]
pub struct BookPayload {
    pub book: Book,
}

/// `data` payload for the list endpoint
#[derive(Debug, Serialize)]
pub struct BookListPayload {
    pub books: Vec<Book>,
    pub pagination: PaginationBlock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationBlock {
    pub current_page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub total_books: u64,
}
