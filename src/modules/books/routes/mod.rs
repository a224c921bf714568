//! HTTP handlers for catalog queries and review mutations.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use anyhow::anyhow;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    routing::{get, put},
    Json, Router,
};
use bookstore_authz::BearerGuard;
use bookstore_http::error::AppError;
use tokio::sync::oneshot;

use super::{
    catalog::Catalog,
    models::{Book, DeleteReviewRequest, ReviewRequest, ReviewWrite, Reviews},
};
use crate::utils::{json_body, require_fields};

/// Shared state for the books routes
#[derive(Debug, Clone)]
pub struct BooksState {
    pub catalog: Arc<Catalog>,
    pub guard: BearerGuard,
    /// Simulated latency of the deferred listing endpoints
    pub deferred_delay: Duration,
}

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/books", get(list_books))
        .route("/books/isbn/{isbn}", get(book_by_isbn))
        .route("/books/author/{author}", get(books_by_author))
        .route("/books/title/{title}", get(books_by_title))
        .route("/books/review/{isbn}", get(book_reviews))
        .route("/auth/review/{isbn}", put(put_review).delete(delete_review))
        .route("/async/books", get(list_books_deferred))
        .route("/callback/books", get(list_books_callback))
        .with_state(state)
}

async fn list_books(State(state): State<BooksState>) -> Json<BTreeMap<String, Book>> {
    Json(state.catalog.get_all())
}

async fn book_by_isbn(
    State(state): State<BooksState>,
    Path(isbn): Path<String>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(state.catalog.get_by_isbn(&isbn)?))
}

async fn books_by_author(
    State(state): State<BooksState>,
    Path(author): Path<String>,
) -> Json<Vec<Book>> {
    Json(state.catalog.get_by_author(&author))
}

async fn books_by_title(
    State(state): State<BooksState>,
    Path(title): Path<String>,
) -> Json<Vec<Book>> {
    Json(state.catalog.get_by_title(&title))
}

async fn book_reviews(
    State(state): State<BooksState>,
    Path(isbn): Path<String>,
) -> Result<Json<Reviews>, AppError> {
    Ok(Json(state.catalog.get_reviews(&isbn)?))
}

async fn put_review(
    State(state): State<BooksState>,
    Path(isbn): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<&'static str, AppError> {
    let request = json_body(payload)?;
    require_fields(&[
        ("username", request.username.as_str()),
        ("review", request.review.as_str()),
    ])?;
    state.guard.authorize(&headers, &request.username)?;

    let outcome = state
        .catalog
        .put_review(&isbn, &request.username, &request.review)?;

    tracing::info!(
        isbn = %isbn,
        username = %request.username,
        replaced = (outcome == ReviewWrite::Modified),
        "review stored"
    );
    Ok("Review added/modified successfully")
}

async fn delete_review(
    State(state): State<BooksState>,
    Path(isbn): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<DeleteReviewRequest>, JsonRejection>,
) -> Result<&'static str, AppError> {
    let request = json_body(payload)?;
    require_fields(&[("username", request.username.as_str())])?;
    state.guard.authorize(&headers, &request.username)?;

    state.catalog.delete_review(&isbn, &request.username)?;

    tracing::info!(isbn = %isbn, username = %request.username, "review deleted");
    Ok("Review deleted successfully")
}

/// Resolve to a catalog snapshot after `delay`.
async fn fetch_books(catalog: &Catalog, delay: Duration) -> BTreeMap<String, Book> {
    tokio::time::sleep(delay).await;
    catalog.get_all()
}

/// Hand a catalog snapshot to `callback` once `delay` has passed.
fn fetch_books_with_callback<F>(catalog: Arc<Catalog>, delay: Duration, callback: F)
where
    F: FnOnce(BTreeMap<String, Book>) + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        callback(catalog.get_all());
    });
}

async fn list_books_deferred(State(state): State<BooksState>) -> Json<BTreeMap<String, Book>> {
    Json(fetch_books(&state.catalog, state.deferred_delay).await)
}

async fn list_books_callback(
    State(state): State<BooksState>,
) -> Result<Json<BTreeMap<String, Book>>, AppError> {
    let (tx, rx) = oneshot::channel();
    fetch_books_with_callback(state.catalog.clone(), state.deferred_delay, move |books| {
        // The receiver is gone if the client hung up; nothing to deliver then
        let _ = tx.send(books);
    });

    let books = rx
        .await
        .map_err(|_| anyhow!("deferred catalog fetch ended without a result"))?;
    Ok(Json(books))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::new([
            Book::new("123", "Dune", "Frank Herbert"),
            Book::new("456", "Emma", "Jane Austen"),
        ]))
    }

    #[tokio::test]
    async fn fetch_books_waits_for_the_delay() {
        let catalog = catalog();
        let started = Instant::now();

        let books = fetch_books(&catalog, Duration::from_millis(50)).await;

        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(books.len(), 2);
    }

    #[tokio::test]
    async fn callback_receives_snapshot() {
        let (tx, rx) = oneshot::channel();
        fetch_books_with_callback(catalog(), Duration::from_millis(10), move |books| {
            tx.send(books).unwrap();
        });

        let books = rx.await.unwrap();
        assert!(books.contains_key("123"));
        assert!(books.contains_key("456"));
    }

    #[tokio::test]
    async fn deferred_fetches_do_not_serialize() {
        let catalog = catalog();
        let delay = Duration::from_millis(100);
        let started = Instant::now();

        let (a, b, c) = tokio::join!(
            fetch_books(&catalog, delay),
            fetch_books(&catalog, delay),
            fetch_books(&catalog, delay),
        );

        assert_eq!(a.len() + b.len() + c.len(), 6);
        // Three sequential waits would take 300ms
        assert!(started.elapsed() < Duration::from_millis(250));
    }
}
