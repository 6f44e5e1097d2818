//! Tantivy schema for the entry index.
//!
//! One document is indexed per published weblog entry. The weblog handle,
//! category name and author username are denormalized into the document so
//! that searches can be scoped without touching the content store.

use tantivy::schema::{Field, Schema, INDEXED, STORED, STRING, TEXT};
use tantivy::{doc, TantivyDocument};

use super::{Result, SearchError};

/// Current schema version.
/// Version 1: Initial schema (entry_id, weblog, anchor, title, text,
/// category, tags, username, pub_time)
pub const SCHEMA_VERSION: u32 = 1;

/// Create the Tantivy schema for entry indexing
///
/// Fields:
/// - entry_id: Store identifier, used for targeted deletes (i64 | INDEXED | STORED)
/// - weblog: Weblog handle scoping the entry (STRING | STORED)
/// - anchor: URL anchor within the weblog (STRING | STORED)
/// - title: Entry title (TEXT | STORED)
/// - text: Entry markdown text (TEXT)
/// - category: Category name (STRING | STORED)
/// - tags: Space-joined tag list (TEXT)
/// - username: Author username (STRING | STORED)
/// - pub_time: Publication timestamp (Date | STORED)
pub fn entry_schema() -> Schema {
    let mut builder = Schema::builder();

    builder.add_i64_field("entry_id", INDEXED | STORED);
    builder.add_text_field("weblog", STRING | STORED);
    builder.add_text_field("anchor", STRING | STORED);

    // Searchable content
    builder.add_text_field("title", TEXT | STORED);
    builder.add_text_field("text", TEXT);
    builder.add_text_field("tags", TEXT);

    builder.add_text_field("category", STRING | STORED);
    builder.add_text_field("username", STRING | STORED);
    builder.add_date_field("pub_time", STORED);

    builder.build()
}

/// Resolved handles to every schema field
#[derive(Debug, Clone, Copy)]
pub(crate) struct EntryFields {
    pub entry_id: Field,
    pub weblog: Field,
    pub anchor: Field,
    pub title: Field,
    pub text: Field,
    pub tags: Field,
    pub category: Field,
    pub username: Field,
    pub pub_time: Field,
}

impl EntryFields {
    /// Resolve all fields from a schema
    pub fn for_schema(schema: &Schema) -> Result<Self> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| SearchError::Storage(format!("Missing {name} field: {e}")))
        };

        Ok(Self {
            entry_id: field("entry_id")?,
            weblog: field("weblog")?,
            anchor: field("anchor")?,
            title: field("title")?,
            text: field("text")?,
            tags: field("tags")?,
            category: field("category")?,
            username: field("username")?,
            pub_time: field("pub_time")?,
        })
    }
}

/// A denormalized view of a published entry, ready for indexing.
///
/// Built by the services layer from the entry plus its weblog, category and
/// author, so the index layer never has to reach back into the store for a
/// single add.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDocument {
    /// Store identifier of the entry
    pub entry_id: i64,
    /// Handle of the owning weblog
    pub weblog_handle: String,
    /// URL anchor within the weblog
    pub anchor: String,
    /// Entry title
    pub title: String,
    /// Entry markdown text
    pub text: String,
    /// Category name
    pub category: String,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Author username
    pub username: String,
    /// Publication timestamp (seconds since the epoch)
    pub pub_time: i64,
}

/// Convert an `EntryDocument` into a Tantivy document
pub(crate) fn to_document(fields: &EntryFields, entry: &EntryDocument) -> TantivyDocument {
    doc!(
        fields.entry_id => entry.entry_id,
        fields.weblog => entry.weblog_handle.as_str(),
        fields.anchor => entry.anchor.as_str(),
        fields.title => entry.title.as_str(),
        fields.text => entry.text.as_str(),
        fields.tags => entry.tags.join(" "),
        fields.category => entry.category.as_str(),
        fields.username => entry.username.as_str(),
        fields.pub_time => tantivy::DateTime::from_timestamp_secs(entry.pub_time),
    )
}
