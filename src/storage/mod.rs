pub mod document;
pub mod json_backend;
pub mod resolvers;

use std::path::Path;

use crate::{errors::LedgerError, ledger::LedgerBook};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Abstraction over persistence backends capable of storing ledger books and their backups.
///
/// A successful save commits every draft reconciliation in the book.
pub trait StorageBackend: Send + Sync {
    fn save(&self, book: &mut LedgerBook, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<LedgerBook>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn backup(&self, book: &LedgerBook, name: &str, note: Option<&str>) -> Result<String>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<LedgerBook>;

    fn save_to_path(&self, book: &mut LedgerBook, path: &Path) -> Result<()> {
        json_backend::save_book_to_path(book, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<LedgerBook> {
        json_backend::load_book_from_path(path)
    }
}

pub use document::{DocumentMapper, LedgerBookDocument, SCHEMA_VERSION};
pub use json_backend::JsonStorage;
pub use resolvers::{AccountCatalog, AccountResolver, BucketCatalog, BucketResolver};
