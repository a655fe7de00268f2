use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, BookPatch, NewBook};
use crate::utils::pagination::PageRequest;

/// Process-local store. Records are kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    books: RwLock<Vec<Book>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn list_page(&self, page: PageRequest) -> Result<(Vec<Book>, u64), StoreError> {
        let books = self.books.read().await;
        let total = books.len() as u64;

        // Reverse first so that equal timestamps still list the latest insert first
        let mut newest_first: Vec<&Book> = books.iter().rev().collect();
        newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        let items = newest_first
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let books = self.books.read().await;
        Ok(books.iter().find(|book| book.id == id).cloned())
    }

    async fn create(&self, book: NewBook) -> Result<Book, StoreError> {
        let book = book.normalized()?;
        let now = Utc::now();
        let record = Book {
            id: ObjectId::new().to_hex(),
            title: book.title,
            author: book.author,
            genre: book.genre,
            publication_date: book.publication_date,
            edition: book.edition,
            summary: book.summary,
            available: book.available.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        self.books.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, patch: BookPatch) -> Result<Option<Book>, StoreError> {
        let patch = patch.normalized()?;
        let mut books = self.books.write().await;
        let Some(book) = books.iter_mut().find(|book| book.id == id) else {
            return Ok(None);
        };

        if !patch.is_empty() {
            patch.apply(book);
            book.updated_at = Utc::now();
        }
        Ok(Some(book.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut books = self.books.write().await;
        let before = books.len();
        books.retain(|book| book.id != id);
        Ok(books.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_book(title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Author".to_string(),
            genre: "Genre".to_string(),
            publication_date: NaiveDate::from_ymd_opt(2001, 2, 3).unwrap(),
            edition: None,
            summary: None,
            available: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_defaults() {
        let store = InMemoryBookStore::new();
        let book = store.create(new_book("One")).await.unwrap();

        assert_eq!(book.id.len(), 24);
        assert!(book.available);
        assert_eq!(book.created_at, book.updated_at);
        assert_eq!(store.get_by_id(&book.id).await.unwrap(), Some(book));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_paged() {
        let store = InMemoryBookStore::new();
        for i in 1..=12 {
            store.create(new_book(&format!("Book {i}"))).await.unwrap();
        }

        let (page, total) = store
            .list_page(PageRequest { page: 2, limit: 5 })
            .await
            .unwrap();
        assert_eq!(total, 12);
        let titles: Vec<_> = page.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["Book 7", "Book 6", "Book 5", "Book 4", "Book 3"]);

        let (last, _) = store
            .list_page(PageRequest { page: 3, limit: 5 })
            .await
            .unwrap();
        assert_eq!(last.len(), 2);
    }

    #[tokio::test]
    async fn update_merges_and_touches_timestamp() {
        let store = InMemoryBookStore::new();
        let book = store.create(new_book("Old")).await.unwrap();

        let patch = BookPatch {
            title: Some(" New ".to_string()),
            ..BookPatch::default()
        };
        let updated = store.update(&book.id, patch).await.unwrap().unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.author, book.author);
        assert_eq!(updated.created_at, book.created_at);
        assert!(updated.updated_at >= book.updated_at);
    }

    #[tokio::test]
    async fn update_rejects_blank_mandatory_field_without_mutating() {
        let store = InMemoryBookStore::new();
        let book = store.create(new_book("Keep")).await.unwrap();

        let patch = BookPatch {
            genre: Some("  ".to_string()),
            ..BookPatch::default()
        };
        assert!(store.update(&book.id, patch).await.is_err());
        assert_eq!(store.get_by_id(&book.id).await.unwrap(), Some(book));
    }

    #[tokio::test]
    async fn availability_and_delete() {
        let store = InMemoryBookStore::new();
        let book = store.create(new_book("Lend")).await.unwrap();

        let lent = store.set_availability(&book.id, false).await.unwrap().unwrap();
        assert!(!lent.available);

        assert!(store.delete(&book.id).await.unwrap());
        assert!(!store.delete(&book.id).await.unwrap());
        assert_eq!(store.get_by_id(&book.id).await.unwrap(), None);
        assert_eq!(store.set_availability(&book.id, true).await.unwrap(), None);
    }
}
