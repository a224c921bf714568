use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reviews of a single book keyed by the reviewing username.
pub type Reviews = BTreeMap<String, String>;

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    /// ISBN, unique within the catalog
    pub isbn: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub reviews: Reviews,
}

impl Book {
    pub fn new(isbn: impl Into<String>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            reviews: Reviews::new(),
        }
    }
}

/// Fixture entry; the ISBN is the key of the enclosing object.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FixtureEntry {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub reviews: Reviews,
}

/// Body of `PUT /auth/review/{isbn}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub review: String,
}

/// Body of `DELETE /auth/review/{isbn}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteReviewRequest {
    #[serde(default)]
    pub username: String,
}

/// Outcome of writing a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewWrite {
    Added,
    Modified,
}
