//! Traits (ports) implemented by the infrastructure crates

mod collaborators;
mod repositories;

pub use collaborators::{FileStore, NotificationDispatcher, StoredFile};
pub use repositories::{AccountRepository, RepoResult};
