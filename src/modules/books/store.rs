//! In-memory book store shared by the books handlers.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::models::{Book, BookFilter, BookSummary};

/// Append-ordered collection of books guarded by a reader/writer lock.
///
/// Each method takes the lock exactly once, so lookups followed by a
/// mutation never interleave with another request.
#[derive(Debug, Default)]
pub struct BookStore {
    books: RwLock<Vec<Book>>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Book>> {
        self.books.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Book>> {
        self.books.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a record at the end of the list
    pub fn push(&self, book: Book) {
        self.write().push(book);
    }

    /// Clone of the first record with the given id
    pub fn find(&self, id: &str) -> Option<Book> {
        self.read().iter().find(|book| book.id == id).cloned()
    }

    /// Summaries of every record accepted by `filter`, in insertion order
    pub fn list(&self, filter: &BookFilter) -> Vec<BookSummary> {
        self.read()
            .iter()
            .filter(|book| filter.matches(book))
            .map(Book::summary)
            .collect()
    }

    /// Run `f` against the record with the given id while holding the write
    /// lock. Returns `None` when no record has that id.
    pub fn modify<T, E>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Book) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        let mut books = self.write();
        let index = index_of(&books, id)?;
        Some(f(&mut books[index]))
    }

    /// Find and remove the record with the given id in one step
    pub fn remove(&self, id: &str) -> Option<Book> {
        let mut books = self.write();
        let index = index_of(&books, id)?;
        Some(books.remove(index))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

fn index_of(books: &[Book], id: &str) -> Option<usize> {
    books.iter().position(|book| book.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::models::{BookPayload, ListQuery, Violation};
    use time::OffsetDateTime;

    fn book(id: &str, name: &str, publisher: &str) -> Book {
        let fields = BookPayload {
            name: Some(name.to_string()),
            publisher: publisher.to_string(),
            page_count: 10,
            read_page: 3,
            ..Default::default()
        }
        .validate()
        .unwrap();
        Book::new(id.to_string(), fields, OffsetDateTime::UNIX_EPOCH)
    }

    fn seeded() -> BookStore {
        let store = BookStore::new();
        store.push(book("a", "Alpha", "Pub A"));
        store.push(book("b", "Beta", "Pub B"));
        store.push(book("c", "Gamma", "Pub C"));
        store
    }

    #[test]
    fn list_preserves_insertion_order() {
        let ids: Vec<String> = seeded()
            .list(&BookFilter::default())
            .into_iter()
            .map(|summary| summary.id)
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn list_projects_summary_fields() {
        let store = seeded();
        let filter = BookFilter::try_from(ListQuery {
            name: Some("bet".to_string()),
            ..Default::default()
        })
        .unwrap();

        let summaries = store.list(&filter);
        assert_eq!(
            summaries,
            vec![BookSummary {
                id: "b".to_string(),
                name: "Beta".to_string(),
                publisher: "Pub B".to_string(),
            }]
        );
    }

    #[test]
    fn find_returns_matching_record() {
        let store = seeded();
        assert_eq!(store.find("b").map(|b| b.name), Some("Beta".to_string()));
        assert!(store.find("zzz").is_none());
    }

    #[test]
    fn modify_missing_id_returns_none() {
        let store = seeded();
        let outcome = store.modify("zzz", |_| Ok::<_, Violation>(()));
        assert!(outcome.is_none());
    }

    #[test]
    fn modify_failure_leaves_record_untouched() {
        let store = seeded();
        let before = store.find("a").unwrap();

        let outcome = store.modify("a", |_| Err::<(), _>(Violation::MissingName));

        assert_eq!(outcome, Some(Err(Violation::MissingName)));
        assert_eq!(store.find("a").unwrap(), before);
    }

    #[test]
    fn remove_takes_exactly_one_record() {
        let store = seeded();
        assert_eq!(store.remove("b").map(|b| b.id), Some("b".to_string()));
        assert_eq!(store.len(), 2);
        assert!(store.remove("b").is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_keeps_order_of_the_rest() {
        let store = seeded();
        store.remove("a");
        let ids: Vec<String> = store
            .list(&BookFilter::default())
            .into_iter()
            .map(|summary| summary.id)
            .collect();
        assert_eq!(ids, ["b", "c"]);
    }

    #[test]
    fn concurrent_pushes_and_removes_lose_nothing() {
        const WRITERS: usize = 8;
        const PER_WRITER: usize = 50;

        let store = seeded();
        std::thread::scope(|scope| {
            for writer in 0..WRITERS {
                let store = &store;
                scope.spawn(move || {
                    for n in 0..PER_WRITER {
                        store.push(book(&format!("w{writer}-{n}"), "Book", "Pub"));
                    }
                });
            }
            for id in ["a", "b", "c"] {
                let store = &store;
                scope.spawn(move || assert!(store.remove(id).is_some()));
            }
        });

        let ids: std::collections::HashSet<String> = store
            .list(&BookFilter::default())
            .into_iter()
            .map(|summary| summary.id)
            .collect();
        assert_eq!(store.len(), WRITERS * PER_WRITER);
        assert_eq!(ids.len(), WRITERS * PER_WRITER);
        assert!(!ids.contains("a") && !ids.contains("b") && !ids.contains("c"));
    }

    #[test]
    fn new_store_is_empty() {
        let store = BookStore::new();
        assert!(store.is_empty());
        assert!(store.list(&BookFilter::default()).is_empty());
    }
}
