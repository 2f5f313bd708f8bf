mod commands;
mod error;
mod matcher;
mod nyx;
mod selector;
mod services;
mod state;

pub use commands::{Command, CommandKind};
pub use error::NyxError;
pub use nyx::Nyx;
pub use services::{
    AssetService, PublishService, ReleaseHandle, ServiceRegistry, ServiceResult,
};
pub use state::{ReleaseScope, ResolvedAsset, State};

pub type Result<T> = std::result::Result<T, NyxError>;
