//! In-memory book catalog.
//!
//! Books are keyed by ISBN and fixed at startup; only their reviews change.
//! All access goes through a single `RwLock` that is never held across an
//! await point.

use std::{collections::BTreeMap, path::Path};

use anyhow::Context;
use bookstore_http::error::AppError;
use parking_lot::RwLock;
use thiserror::Error;

use super::models::{Book, FixtureEntry, ReviewWrite, Reviews};

const BUNDLED_FIXTURE: &str = include_str!("fixtures/books.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no book with ISBN '{isbn}'")]
    BookNotFound { isbn: String },

    #[error("no review by '{username}' for ISBN '{isbn}'")]
    ReviewNotFound { isbn: String, username: String },

    #[error("malformed catalog fixture")]
    Fixture(#[from] serde_json::Error),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::BookNotFound { .. } => {
                AppError::not_found("Book not found").with_code("book_not_found")
            }
            CatalogError::ReviewNotFound { .. } => {
                AppError::not_found("Review not found").with_code("review_not_found")
            }
            err @ CatalogError::Fixture(_) => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    books: RwLock<BTreeMap<String, Book>>,
}

impl Catalog {
    pub fn new(books: impl IntoIterator<Item = Book>) -> Self {
        let books = books
            .into_iter()
            .map(|book| (book.isbn.clone(), book))
            .collect();
        Self {
            books: RwLock::new(books),
        }
    }

    /// Parse a fixture: a JSON object keyed by ISBN whose entries carry
    /// `title`, `author`, and optionally `reviews`.
    pub fn from_fixture_json(json: &str) -> Result<Self, CatalogError> {
        let entries: BTreeMap<String, FixtureEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries.into_iter().map(|(isbn, entry)| Book {
            isbn,
            title: entry.title,
            author: entry.author,
            reviews: entry.reviews,
        })))
    }

    /// Catalog shipped with the binary.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_fixture_json(BUNDLED_FIXTURE)
    }

    /// Load from `fixture_path`, or the bundled fixture when none is given.
    pub fn load(fixture_path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = fixture_path else {
            return Self::bundled().context("bundled catalog fixture is invalid");
        };

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog fixture {}", path.display()))?;
        Self::from_fixture_json(&json)
            .with_context(|| format!("failed to parse catalog fixture {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.books.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.read().is_empty()
    }

    /// Snapshot of the whole catalog keyed by ISBN.
    pub fn get_all(&self) -> BTreeMap<String, Book> {
        self.books.read().clone()
    }

    pub fn get_by_isbn(&self, isbn: &str) -> Result<Book, CatalogError> {
        self.books
            .read()
            .get(isbn)
            .cloned()
            .ok_or_else(|| CatalogError::BookNotFound {
                isbn: isbn.to_string(),
            })
    }

    /// Books whose author matches exactly (case-sensitive).
    pub fn get_by_author(&self, author: &str) -> Vec<Book> {
        self.filter(|book| book.author == author)
    }

    /// Books whose title matches exactly (case-sensitive).
    pub fn get_by_title(&self, title: &str) -> Vec<Book> {
        self.filter(|book| book.title == title)
    }

    /// Reviews of a book; empty when the book has none.
    pub fn get_reviews(&self, isbn: &str) -> Result<Reviews, CatalogError> {
        self.get_by_isbn(isbn).map(|book| book.reviews)
    }

    /// Insert or overwrite the review `username` left on `isbn`.
    pub fn put_review(
        &self,
        isbn: &str,
        username: &str,
        text: &str,
    ) -> Result<ReviewWrite, CatalogError> {
        let mut books = self.books.write();
        let book = books
            .get_mut(isbn)
            .ok_or_else(|| CatalogError::BookNotFound {
                isbn: isbn.to_string(),
            })?;

        let outcome = match book.reviews.insert(username.to_string(), text.to_string()) {
            Some(_) => ReviewWrite::Modified,
            None => ReviewWrite::Added,
        };
        Ok(outcome)
    }

    /// Remove the review `username` left on `isbn`, returning its text.
    pub fn delete_review(&self, isbn: &str, username: &str) -> Result<String, CatalogError> {
        let mut books = self.books.write();
        let book = books
            .get_mut(isbn)
            .ok_or_else(|| CatalogError::BookNotFound {
                isbn: isbn.to_string(),
            })?;

        book.reviews
            .remove(username)
            .ok_or_else(|| CatalogError::ReviewNotFound {
                isbn: isbn.to_string(),
                username: username.to_string(),
            })
    }

    fn filter(&self, predicate: impl Fn(&Book) -> bool) -> Vec<Book> {
        self.books
            .read()
            .values()
            .filter(|book| predicate(book))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn catalog() -> Catalog {
        Catalog::new([
            Book::new("123", "Dune", "Frank Herbert"),
            Book::new("456", "Children of Dune", "Frank Herbert"),
            Book::new("789", "Emma", "Jane Austen"),
        ])
    }

    #[test]
    fn bundled_fixture_has_ten_books() {
        let catalog = Catalog::bundled().unwrap();
        assert_eq!(catalog.len(), 10);

        let book = catalog.get_by_isbn("8").unwrap();
        assert_eq!(book.title, "Pride and Prejudice");
        assert_eq!(book.author, "Jane Austen");
        assert!(book.reviews.is_empty());
    }

    #[test]
    fn get_all_is_keyed_by_isbn() {
        let all = catalog().get_all();
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["123", "456", "789"]);
        assert_eq!(all["789"].title, "Emma");
    }

    #[test]
    fn unknown_isbn_is_not_found() {
        for isbn in ["", "999", "12", "1234", "DUNE"] {
            assert!(matches!(
                catalog().get_by_isbn(isbn),
                Err(CatalogError::BookNotFound { .. })
            ));
        }
    }

    #[test]
    fn author_lookup_is_exact_and_case_sensitive() {
        let catalog = catalog();
        assert_eq!(catalog.get_by_author("Frank Herbert").len(), 2);
        assert!(catalog.get_by_author("frank herbert").is_empty());
        assert!(catalog.get_by_author("Frank").is_empty());
    }

    #[test]
    fn title_lookup_returns_empty_when_nothing_matches() {
        let catalog = catalog();
        let found = catalog.get_by_title("Emma");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].isbn, "789");
        assert!(catalog.get_by_title("Persuasion").is_empty());
    }

    #[test]
    fn reviews_of_existing_book_start_empty() {
        assert!(catalog().get_reviews("123").unwrap().is_empty());
        assert!(matches!(
            catalog().get_reviews("000"),
            Err(CatalogError::BookNotFound { .. })
        ));
    }

    #[test]
    fn put_review_reads_back_and_overwrites() {
        let catalog = catalog();
        assert_eq!(
            catalog.put_review("123", "bob", "great").unwrap(),
            ReviewWrite::Added
        );
        assert_eq!(catalog.get_reviews("123").unwrap()["bob"], "great");

        assert_eq!(
            catalog.put_review("123", "bob", "even better").unwrap(),
            ReviewWrite::Modified
        );
        let reviews = catalog.get_reviews("123").unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews["bob"], "even better");
    }

    #[test]
    fn put_review_on_missing_book_fails() {
        let catalog = catalog();
        assert!(matches!(
            catalog.put_review("000", "bob", "great"),
            Err(CatalogError::BookNotFound { .. })
        ));
    }

    #[test]
    fn delete_review_removes_only_that_user() {
        let catalog = catalog();
        catalog.put_review("123", "bob", "great").unwrap();
        catalog.put_review("123", "carol", "meh").unwrap();

        assert_eq!(catalog.delete_review("123", "bob").unwrap(), "great");

        let reviews = catalog.get_reviews("123").unwrap();
        assert!(!reviews.contains_key("bob"));
        assert_eq!(reviews["carol"], "meh");
    }

    #[test]
    fn delete_review_distinguishes_missing_book_and_missing_review() {
        let catalog = catalog();
        assert!(matches!(
            catalog.delete_review("000", "bob"),
            Err(CatalogError::BookNotFound { .. })
        ));
        assert!(matches!(
            catalog.delete_review("123", "bob"),
            Err(CatalogError::ReviewNotFound { .. })
        ));
    }

    #[test]
    fn fixture_reviews_are_preserved() {
        let catalog = Catalog::from_fixture_json(
            r#"{"42": {"author": "A", "title": "T", "reviews": {"zed": "fine"}}}"#,
        )
        .unwrap();
        let book = catalog.get_by_isbn("42").unwrap();
        assert_eq!(book.isbn, "42");
        assert_eq!(book.reviews["zed"], "fine");
    }

    #[test]
    fn malformed_fixture_is_rejected() {
        assert!(matches!(
            Catalog::from_fixture_json(r#"{"42": {"title": "no author"}}"#),
            Err(CatalogError::Fixture(_))
        ));
        assert!(Catalog::load(Some(Path::new("/nonexistent/books.json"))).is_err());
    }

    #[test]
    fn errors_map_to_404() {
        let err = AppError::from(CatalogError::BookNotFound { isbn: "1".into() });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let err = AppError::from(CatalogError::ReviewNotFound {
            isbn: "1".into(),
            username: "bob".into(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
