//! Services layer - Business logic
//!
//! This module contains all business logic services for the Folio weblog
//! system. Services are responsible for:
//! - Implementing business rules
//! - Coordinating between repositories, cache and the search index
//! - Handling validation and error cases

pub mod entry;
pub mod indexing;
pub mod markdown;
pub mod password;
pub mod user;
pub mod weblog;

pub use entry::{generate_anchor, EntryService, EntryServiceError};
pub use indexing::{entry_document, RepositoryDocumentSource};
pub use markdown::MarkdownRenderer;
pub use password::{hash_password, verify_password};
pub use user::{UserService, UserServiceError};
pub use weblog::{WeblogService, WeblogServiceError};
