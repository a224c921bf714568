//! Registered users, held in memory for the life of the process.

use bookstore_http::error::AppError;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user '{0}' already exists")]
    AlreadyExists(String),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::AlreadyExists(_) => {
                AppError::bad_request("User already exists").with_code("user_exists")
            }
        }
    }
}

#[derive(Debug)]
struct UserRecord {
    username: String,
    password_digest: [u8; 32],
}

/// Append-only list of users.
///
/// Passwords are kept as SHA-256 digests. Registration checks for an
/// existing username and appends under one write lock.
#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<Vec<UserRecord>>,
}

fn digest(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, username: &str) -> bool {
        self.users
            .read()
            .iter()
            .any(|user| user.username == username)
    }

    pub fn register(&self, username: &str, password: &str) -> Result<(), UserError> {
        let mut users = self.users.write();
        if users.iter().any(|user| user.username == username) {
            return Err(UserError::AlreadyExists(username.to_string()));
        }

        users.push(UserRecord {
            username: username.to_string(),
            password_digest: digest(password),
        });
        Ok(())
    }

    /// True when a stored user matches both `username` and `password`.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let candidate = digest(password);
        self.users
            .read()
            .iter()
            .any(|user| user.username == username && user.password_digest == candidate)
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn register_then_exists() {
        let store = UserStore::new();
        assert!(!store.exists("alice"));

        store.register("alice", "pw1").unwrap();
        assert!(store.exists("alice"));
        assert!(!store.exists("Alice"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_registration_leaves_store_unchanged() {
        let store = UserStore::new();
        store.register("alice", "pw1").unwrap();

        assert!(matches!(
            store.register("alice", "other"),
            Err(UserError::AlreadyExists(name)) if name == "alice"
        ));
        assert_eq!(store.len(), 1);
        // The first password still applies
        assert!(store.authenticate("alice", "pw1"));
        assert!(!store.authenticate("alice", "other"));
    }

    #[test]
    fn authenticate_requires_both_fields() {
        let store = UserStore::new();
        store.register("alice", "pw1").unwrap();
        store.register("bob", "pw2").unwrap();

        assert!(store.authenticate("alice", "pw1"));
        assert!(store.authenticate("bob", "pw2"));
        assert!(!store.authenticate("alice", "pw2"));
        assert!(!store.authenticate("alice", "wrong"));
        assert!(!store.authenticate("carol", "pw1"));
        assert!(!store.authenticate("", ""));
    }

    #[test]
    fn plaintext_is_not_retained() {
        let store = UserStore::new();
        store.register("alice", "hunter2").unwrap();
        assert!(!format!("{:?}", store).contains("hunter2"));
    }

    #[test]
    fn concurrent_registration_admits_one_winner() {
        let store = Arc::new(UserStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.register("racer", &format!("pw{}", i)).is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
    }
}
