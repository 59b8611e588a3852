//! In-process repositories
//!
//! Behave like the PostgreSQL implementations (same errors, same paging and
//! id tie-breaker) without a database. Text columns sort by byte order
//! (`String::cmp`), whereas PostgreSQL sorts them by the database collation,
//! so mixed-case or non-ASCII titles may order differently. Used by unit and
//! router tests.

use std::collections::{BTreeMap, HashSet};

use acme_common::{AcmeError, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::books::{book_not_found, BookSortColumn};
use super::management::{migration_name, pending_migrations, resolve_target, MigrationTarget};
use super::users::{creation_failed, run_blocking};
use super::{BooksRepository, DatabaseManagement, UsersRepository, MIGRATOR};
use crate::auth::password;
use crate::features::shared::pagination::PagedRequest;
use crate::models::{normalize_identity, ApplicationUser, ApplicationUserCreate, Book, BookCreate, BookUpdate};

// ============================================================================
// Books
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryBooksRepository {
    books: RwLock<BTreeMap<String, Book>>,
}

impl InMemoryBooksRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `books` already stored under their own identifiers
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        Self {
            books: RwLock::new(books.into_iter().map(|b| (b.id.clone(), b)).collect()),
        }
    }

    pub async fn book_count(&self) -> usize {
        self.books.read().await.len()
    }
}

#[async_trait]
impl BooksRepository for InMemoryBooksRepository {
    async fn find_page(&self, request: &PagedRequest) -> Result<Vec<Book>> {
        let offset = usize::try_from(request.offset()?).unwrap_or(usize::MAX);
        let take = usize::try_from(request.page_size).unwrap_or(usize::MAX);
        let column = BookSortColumn::resolve(&request.sort_column);

        let mut books: Vec<Book> = self.books.read().await.values().cloned().collect();
        books.sort_by(|a, b| column.compare(a, b, request.sort_direction));

        Ok(books.into_iter().skip(offset).take(take).collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.books.read().await.len() as i64)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>> {
        Ok(self.books.read().await.get(id).cloned())
    }

    async fn create(&self, book: BookCreate) -> Result<Book> {
        let book = book.into_book(Uuid::new_v4().to_string());
        self.books.write().await.insert(book.id.clone(), book.clone());
        tracing::info!(book_id = %book.id, "Book {} created successfully", book.name);
        Ok(book)
    }

    async fn update(&self, book: BookUpdate) -> Result<Book> {
        let mut books = self.books.write().await;
        let slot = books.get_mut(&book.id).ok_or_else(|| book_not_found(&book.id))?;
        *slot = book.into();
        Ok(slot.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.books
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| book_not_found(id))
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone)]
struct StoredUser {
    user: ApplicationUser,
    password_hash: String,
}

#[derive(Debug, Default)]
pub struct InMemoryUsersRepository {
    users: RwLock<Vec<StoredUser>>,
    /// Make `find_by_id` miss for freshly created accounts
    lose_created: bool,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose lookups by id never see accounts it created
    pub fn forgetful() -> Self {
        Self {
            lose_created: true,
            ..Self::default()
        }
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn find_by_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<ApplicationUser>> {
        let wanted = normalize_identity(email);
        let stored = self
            .users
            .read()
            .await
            .iter()
            .find(|s| normalize_identity(&s.user.email) == wanted)
            .cloned();

        let Some(stored) = stored else {
            return Ok(None);
        };

        let candidate = password.to_string();
        let hash = stored.password_hash;
        let matches = run_blocking(move || password::verify_password(&candidate, &hash)).await?;
        Ok(matches.then_some(stored.user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<ApplicationUser>> {
        let wanted = normalize_identity(email);
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|s| normalize_identity(&s.user.email) == wanted)
            .map(|s| s.user.clone()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ApplicationUser>> {
        if self.lose_created {
            return Ok(None);
        }
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|s| s.user.id == id)
            .map(|s| s.user.clone()))
    }

    async fn create(&self, user: ApplicationUserCreate) -> Result<String> {
        let violations = password::check_password_policy(&user.password);
        if !violations.is_empty() {
            let codes: Vec<_> = violations.iter().map(|v| v.code()).collect();
            return Err(creation_failed(&codes));
        }

        let plain = user.password.clone();
        let password_hash = run_blocking(move || password::hash_password(&plain)).await?;

        let mut users = self.users.write().await;
        let email = normalize_identity(&user.email);
        let username = normalize_identity(&user.username);
        let mut codes = Vec::new();
        if users.iter().any(|s| normalize_identity(&s.user.email) == email) {
            codes.push("DuplicateEmail");
        }
        if users.iter().any(|s| normalize_identity(&s.user.username) == username) {
            codes.push("DuplicateUserName");
        }
        if !codes.is_empty() {
            return Err(creation_failed(&codes));
        }

        let id = Uuid::new_v4().to_string();
        users.push(StoredUser {
            user: ApplicationUser {
                id: id.clone(),
                username: user.username,
                email: user.email,
            },
            password_hash,
        });

        Ok(id)
    }
}

// ============================================================================
// Management
// ============================================================================

/// Tracks applied versions of the embedded migrations without touching a database
#[derive(Debug, Default)]
pub struct InMemoryDatabaseManagement {
    applied: RwLock<HashSet<i64>>,
    unreachable: bool,
}

impl InMemoryDatabaseManagement {
    /// Nothing applied yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Every embedded migration already applied
    pub fn up_to_date() -> Self {
        let applied = MIGRATOR
            .iter()
            .filter(|m| !m.migration_type.is_down_migration())
            .map(|m| m.version)
            .collect();
        Self {
            applied: RwLock::new(applied),
            unreachable: false,
        }
    }

    /// Every call fails as if the database were down
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub async fn applied_versions(&self) -> Vec<i64> {
        let mut versions: Vec<_> = self.applied.read().await.iter().copied().collect();
        versions.sort_unstable();
        versions
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            return Err(AcmeError::generic("Database is unreachable."));
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseManagement for InMemoryDatabaseManagement {
    async fn assert_migrations(&self) -> Result<()> {
        self.check_reachable()?;
        let applied = self.applied.read().await;
        let pending: Vec<_> = pending_migrations(&MIGRATOR, &applied)
            .into_iter()
            .map(migration_name)
            .collect();

        if pending.is_empty() {
            Ok(())
        } else {
            Err(AcmeError::generic(format!(
                "Following migrations are waiting to be applied: {}",
                pending.join(", ")
            )))
        }
    }

    async fn migrate(&self, target: &MigrationTarget) -> Result<Option<String>> {
        self.check_reachable()?;
        let ups = MIGRATOR
            .iter()
            .filter(|m| !m.migration_type.is_down_migration());
        let mut applied = self.applied.write().await;

        match target {
            MigrationTarget::Latest => {
                applied.extend(ups.clone().map(|m| m.version));
                Ok(ups.last().map(migration_name))
            },
            MigrationTarget::RevertAll => {
                applied.clear();
                Ok(None)
            },
            MigrationTarget::Named(name) => {
                let target = resolve_target(&MIGRATOR, name)?;
                *applied = ups
                    .filter(|m| m.version <= target.version)
                    .map(|m| m.version)
                    .collect();
                Ok(Some(migration_name(target)))
            },
        }
    }

    async fn ping(&self) -> Result<()> {
        self.check_reachable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::pagination::SortDirection;
    use acme_common::ErrorKind;
    use rust_decimal::Decimal;

    fn book(id: &str, name: &str, price: i64) -> Book {
        Book {
            id: id.to_string(),
            name: name.to_string(),
            price: Decimal::from(price),
            category: "Fiction".to_string(),
            author: "Author".to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_page_sorts_and_slices() {
        let repo = InMemoryBooksRepository::with_books([
            book("1", "Dune", 30),
            book("2", "Alpha", 10),
            book("3", "Contact", 20),
        ]);

        let page = repo
            .find_page(&PagedRequest::new(0, 2, "price", SortDirection::Descending))
            .await
            .unwrap();
        let names: Vec<_> = page.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Dune", "Contact"]);

        let page = repo
            .find_page(&PagedRequest::new(1, 2, "price", SortDirection::Descending))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Alpha");
    }

    #[tokio::test]
    async fn test_unknown_column_sorts_by_id() {
        let repo = InMemoryBooksRepository::with_books([
            book("b", "Zed", 1),
            book("a", "Yak", 2),
            book("c", "Xi", 3),
        ]);

        let page = repo
            .find_page(&PagedRequest::new(0, 10, "isbn", SortDirection::Ascending))
            .await
            .unwrap();
        let ids: Vec<_> = page.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_text_sort_is_byte_order() {
        let repo = InMemoryBooksRepository::with_books([
            book("1", "apple", 1),
            book("2", "Zebra", 2),
            book("3", "Mango", 3),
        ]);

        let page = repo
            .find_page(&PagedRequest::new(0, 10, "name", SortDirection::Ascending))
            .await
            .unwrap();
        let names: Vec<_> = page.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Mango", "Zebra", "apple"]);
    }

    #[tokio::test]
    async fn test_find_page_rejects_bad_paging() {
        let repo = InMemoryBooksRepository::new();
        let err = repo
            .find_page(&PagedRequest::new(-1, 10, "Id", SortDirection::Ascending))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_book() {
        let repo = InMemoryBooksRepository::with_books([book("1", "Dune", 30)]);

        let err = repo
            .update(BookUpdate {
                id: "404".to_string(),
                name: "Ghost".to_string(),
                price: Decimal::ONE,
                category: "None".to_string(),
                author: "Nobody".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EntityNotFound);

        let err = repo.delete("404").await.unwrap_err();
        assert_eq!(err.message(), "No book was found with Id 404");
        assert_eq!(repo.book_count().await, 1);
    }

    #[tokio::test]
    async fn test_users_lookup_is_case_insensitive() {
        let repo = InMemoryUsersRepository::new();
        let id = repo
            .create(ApplicationUserCreate {
                email: "Admin@Acme.com".to_string(),
                username: "admin".to_string(),
                password: "pa$$w0rd".to_string(),
            })
            .await
            .unwrap();

        let found = repo
            .find_by_email_and_password("admin@ACME.com", "pa$$w0rd")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);

        assert!(repo
            .find_by_email_and_password("admin@acme.com", "wrong1")
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .find_by_email_and_password("nobody@acme.com", "pa$$w0rd")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_users_reject_duplicates_and_weak_passwords() {
        let repo = InMemoryUsersRepository::new();
        let admin = ApplicationUserCreate {
            email: "admin@acme.com".to_string(),
            username: "admin".to_string(),
            password: "pa$$w0rd".to_string(),
        };
        repo.create(admin.clone()).await.unwrap();

        let err = repo
            .create(ApplicationUserCreate {
                username: "someone-else".to_string(),
                email: "ADMIN@acme.com".to_string(),
                ..admin.clone()
            })
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Failed to create the application user.");

        let err = repo
            .create(ApplicationUserCreate {
                email: "new@acme.com".to_string(),
                username: "new".to_string(),
                password: "short".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_management_tracks_versions() {
        let management = InMemoryDatabaseManagement::new();
        assert!(management.assert_migrations().await.is_err());

        let head = management
            .migrate(&MigrationTarget::Named("InitialSchema".to_string()))
            .await
            .unwrap();
        assert_eq!(head.as_deref(), Some("20240101000000_initial_schema"));
        assert_eq!(management.applied_versions().await, vec![20240101000000]);

        let err = management.assert_migrations().await.unwrap_err();
        assert_eq!(
            err.message(),
            "Following migrations are waiting to be applied: 20240115000000_book_sort_indexes"
        );

        management.migrate(&MigrationTarget::Latest).await.unwrap();
        assert!(management.assert_migrations().await.is_ok());

        assert_eq!(management.migrate(&MigrationTarget::RevertAll).await.unwrap(), None);
        assert!(management.applied_versions().await.is_empty());
    }
}
