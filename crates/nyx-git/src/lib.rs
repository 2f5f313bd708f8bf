mod error;
mod repository;
mod types;

pub use error::GitError;
pub use repository::Repository;
pub use types::{Action, Commit, Identity, Tag, TimeStamp};

pub type Result<T> = std::result::Result<T, GitError>;
