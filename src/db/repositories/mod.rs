//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod category;
pub mod entry;
pub mod user;
pub mod weblog;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use entry::{EntryRepository, SqlxEntryRepository};
pub use user::{SqlxUserRepository, UserRepository};
pub use weblog::{SqlxWeblogRepository, WeblogRepository};
