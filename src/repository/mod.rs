//! Data access layer

pub mod documents;
pub mod libraries;
pub mod loans;
pub mod users;

use sqlx::{Pool, Postgres};

use documents::DocumentsRepository;
use libraries::LibrariesRepository;
use loans::LoansRepository;
use users::UsersRepository;

/// Container for all repositories sharing one connection pool
#[derive(Clone)]
pub struct Repository {
    pub documents: DocumentsRepository,
    pub users: UsersRepository,
    pub libraries: LibrariesRepository,
    pub loans: LoansRepository,
}

impl Repository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            documents: DocumentsRepository::new(pool.clone()),
            users: UsersRepository::new(pool.clone()),
            libraries: LibrariesRepository::new(pool.clone()),
            loans: LoansRepository::new(pool),
        }
    }
}

/// OFFSET for a 1-based page. Saturates instead of overflowing on
/// absurd client-supplied page numbers.
pub(crate) fn page_offset(page: i64, size: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset_is_zero_based_and_clamped() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(page_offset(0, 10), 0);
        assert_eq!(page_offset(-5, 10), 0);
    }

    #[test]
    fn page_offset_saturates_on_huge_pages() {
        assert_eq!(page_offset(i64::MAX, 200), i64::MAX);
        assert!(page_offset(i64::MAX - 1, 100) > 0);
    }
}
