//! Data models
//!
//! This module contains all data structures used throughout the Folio weblog
//! system. Models represent:
//! - Database entities (User, Weblog, WeblogCategory, WeblogEntry)
//! - Input types for create/update operations
//! - Pagination helpers shared by list queries

mod category;
mod entry;
mod user;
mod weblog;

pub use category::{CreateCategoryInput, WeblogCategory};
pub use entry::{
    CreateEntryInput, EntryStatus, ListParams, PagedResult, UpdateEntryInput, WeblogEntry,
};
pub use user::{CreateUserInput, User, UserRole};
pub use weblog::{is_valid_handle, CreateWeblogInput, Weblog};
