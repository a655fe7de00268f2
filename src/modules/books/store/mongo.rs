use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime, Document};
use chrono::{NaiveDate, NaiveTime};
use futures::TryStreamExt;
use mongodb::{options::ReturnDocument, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, BookPatch, NewBook};
use crate::utils::pagination::PageRequest;

/// Collection holding the book records
pub const COLLECTION: &str = "books";

/// Book record as stored in MongoDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub publication_date: DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn default_available() -> bool {
    true
}

impl From<BookDocument> for Book {
    fn from(doc: BookDocument) -> Self {
        Book {
            id: doc.id.to_hex(),
            title: doc.title,
            author: doc.author,
            genre: doc.genre,
            publication_date: doc.publication_date.to_chrono().date_naive(),
            edition: doc.edition,
            summary: doc.summary,
            available: doc.available,
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
        }
    }
}

impl BookDocument {
    fn from_new(book: NewBook, now: DateTime) -> Self {
        Self {
            id: ObjectId::new(),
            title: book.title,
            author: book.author,
            genre: book.genre,
            publication_date: date_to_bson(book.publication_date),
            edition: book.edition,
            summary: book.summary,
            available: book.available.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Calendar dates are stored as midnight UTC
fn date_to_bson(date: NaiveDate) -> DateTime {
    DateTime::from_chrono(date.and_time(NaiveTime::MIN).and_utc())
}

/// Malformed identifiers cannot match any record
fn parse_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

/// Skip and limit as the driver accepts them; both go out as signed 64-bit
fn driver_window(page: PageRequest) -> (u64, i64) {
    let skip = page.skip().min(i64::MAX as u64);
    let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);
    (skip, limit)
}

/// `$set`/`$unset` update for a non-empty patch
fn update_document(patch: &BookPatch, now: DateTime) -> Document {
    let mut set = doc! { "updatedAt": now };
    let mut unset = Document::new();

    if let Some(title) = &patch.title {
        set.insert("title", title.as_str());
    }
    if let Some(author) = &patch.author {
        set.insert("author", author.as_str());
    }
    if let Some(genre) = &patch.genre {
        set.insert("genre", genre.as_str());
    }
    if let Some(date) = patch.publication_date {
        set.insert("publicationDate", date_to_bson(date));
    }
    for (key, value) in [("edition", &patch.edition), ("summary", &patch.summary)] {
        match value {
            Some(Some(text)) => {
                set.insert(key, text.as_str());
            }
            Some(None) => {
                unset.insert(key, "");
            }
            None => {}
        }
    }
    if let Some(available) = patch.available {
        set.insert("available", available);
    }

    let mut update = doc! { "$set": set };
    // MongoDB rejects an empty $unset
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    update
}

/// Book store backed by a single MongoDB collection
#[derive(Debug, Clone)]
pub struct MongoBookStore {
    collection: Collection<BookDocument>,
}

impl MongoBookStore {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(COLLECTION),
        }
    }
}

#[async_trait]
impl BookStore for MongoBookStore {
    async fn prepare(&self) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { "createdAt": -1, "_id": -1 })
            .build();
        self.collection.create_index(index).await?;
        tracing::debug!(collection = COLLECTION, "createdAt index ensured");
        Ok(())
    }

    async fn list_page(&self, page: PageRequest) -> Result<(Vec<Book>, u64), StoreError> {
        let (skip, limit) = driver_window(page);
        let find = async {
            let cursor = self
                .collection
                .find(doc! {})
                .sort(doc! { "createdAt": -1, "_id": -1 })
                .skip(skip)
                .limit(limit)
                .await?;
            cursor.try_collect::<Vec<_>>().await
        };
        let count = async { self.collection.count_documents(doc! {}).await };

        let (documents, total) = tokio::try_join!(find, count)?;
        Ok((documents.into_iter().map(Book::from).collect(), total))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        let found = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(found.map(Book::from))
    }

    async fn create(&self, book: NewBook) -> Result<Book, StoreError> {
        let document = BookDocument::from_new(book.normalized()?, DateTime::now());
        self.collection.insert_one(&document).await?;
        tracing::debug!(book_id = %document.id, "book inserted");
        Ok(document.into())
    }

    async fn update(&self, id: &str, patch: BookPatch) -> Result<Option<Book>, StoreError> {
        let patch = patch.normalized()?;
        if patch.is_empty() {
            return self.get_by_id(id).await;
        }
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, update_document(&patch, DateTime::now()))
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated.map(Book::from))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let Some(oid) = parse_id(id) else {
            return Ok(false);
        };
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }
}
