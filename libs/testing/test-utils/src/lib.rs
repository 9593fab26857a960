//! Shared test utilities
//!
//! - `TestDatabase`: PostgreSQL container with automatic cleanup (feature: "postgres")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! # async fn example() {
//! let db = TestDatabase::new().await;
//! let builder = TestDataBuilder::from_test_name("my_test");
//!
//! let title = builder.title("groceries");
//! let conn = db.connection();
//! # }
//! ```
//!
//! Tests that start containers need Docker and are marked `#[ignore]`;
//! run them with `cargo test -- --ignored`.

use uuid::Uuid;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Builder for test data with deterministic randomization
///
/// The same test name always yields the same ids and titles.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from a hash of the test name
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_task");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Deterministic task id; `n` distinguishes several ids within one test
    pub fn task_id(&self, n: u64) -> String {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.seed.to_le_bytes());
        bytes[8..].copy_from_slice(&n.to_le_bytes());
        Uuid::from_bytes(bytes).to_string()
    }

    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let title = TestDataBuilder::new(7).title("main");
    /// assert_eq!(title, "test-task-7-main");
    /// ```
    pub fn title(&self, suffix: &str) -> String {
        format!("test-task-{}-{}", self.seed, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.task_id(1), builder2.task_id(1));
        assert_eq!(builder1.title("x"), builder2.title("x"));
    }

    #[test]
    fn test_task_ids_differ_by_index() {
        let builder = TestDataBuilder::from_test_name("my_test");
        assert_ne!(builder.task_id(1), builder.task_id(2));
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        assert_ne!(builder1.task_id(0), builder2.task_id(0));
    }
}
