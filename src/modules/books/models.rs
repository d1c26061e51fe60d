use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// A book record held by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier for the book, assigned on creation
    pub id: String,
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    /// Always `read_page == page_count`
    pub finished: bool,
    pub reading: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub inserted_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Book {
    /// Build a fresh record from validated fields.
    pub fn new(id: String, fields: BookFields, now: OffsetDateTime) -> Self {
        let finished = fields.is_finished();
        Self {
            id,
            name: fields.name,
            year: fields.year,
            author: fields.author,
            summary: fields.summary,
            publisher: fields.publisher,
            page_count: fields.page_count,
            read_page: fields.read_page,
            finished,
            reading: fields.reading,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Replace every user-editable field. `id` and `inserted_at` are kept.
    pub fn apply(&mut self, fields: BookFields, now: OffsetDateTime) {
        self.finished = fields.is_finished();
        self.name = fields.name;
        self.year = fields.year;
        self.author = fields.author;
        self.summary = fields.summary;
        self.publisher = fields.publisher;
        self.page_count = fields.page_count;
        self.read_page = fields.read_page;
        self.reading = fields.reading;
        self.updated_at = now;
    }

    pub fn summary(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

/// Projection returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: String,
}

/// Request body for creating or replacing a book.
///
/// Only `name` is optional on the wire so that its absence can be reported;
/// the remaining fields fall back to their zero values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookPayload {
    pub name: Option<String>,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
}

/// Reasons a payload cannot become a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    MissingName,
    ReadPageExceedsPageCount,
}

/// Payload fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
}

impl BookFields {
    fn is_finished(&self) -> bool {
        self.read_page == self.page_count
    }
}

impl BookPayload {
    /// Check the payload: name first, then page bounds.
    pub fn validate(self) -> Result<BookFields, Violation> {
        let name = self.name.ok_or(Violation::MissingName)?;
        if self.read_page > self.page_count {
            return Err(Violation::ReadPageExceedsPageCount);
        }

        Ok(BookFields {
            name,
            year: self.year,
            author: self.author,
            summary: self.summary,
            publisher: self.publisher,
            page_count: self.page_count,
            read_page: self.read_page,
            reading: self.reading,
        })
    }
}

/// Raw query string of the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
    pub reading: Option<String>,
    pub finished: Option<String>,
}

/// A query flag that is neither `0` nor `1`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value for query parameter '{param}'. Expected 0 or 1")]
pub struct InvalidFlag {
    pub param: &'static str,
}

/// Conjunctive filter over books. `None` means "do not filter on this".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    name: Option<String>,
    reading: Option<bool>,
    finished: Option<bool>,
}

impl TryFrom<ListQuery> for BookFilter {
    type Error = InvalidFlag;

    fn try_from(query: ListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            name: query
                .name
                .filter(|name| !name.is_empty())
                .map(|name| name.to_lowercase()),
            reading: parse_flag("reading", query.reading.as_deref())?,
            finished: parse_flag("finished", query.finished.as_deref())?,
        })
    }
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(needle) = &self.name {
            if !book.name.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        if self.reading.is_some_and(|reading| book.reading != reading) {
            return false;
        }
        if self.finished.is_some_and(|finished| book.finished != finished) {
            return false;
        }
        true
    }
}

/// `"1"` is true, `"0"` is false, absent or empty means no filter.
fn parse_flag(param: &'static str, raw: Option<&str>) -> Result<Option<bool>, InvalidFlag> {
    match raw {
        None | Some("") => Ok(None),
        Some("1") => Ok(Some(true)),
        Some("0") => Ok(Some(false)),
        Some(_) => Err(InvalidFlag { param }),
    }
}
