mod defaults;
mod entities;
mod error;
pub mod file_mapper;
mod layer;
mod presets;
mod resolver;

pub use defaults::standard_defaults;
pub use entities::{
    Asset, CommitMessageConvention, ItemsBlock, Provider, ReleaseType, ServiceConfig,
};
pub use error::ConfigError;
pub use file_mapper::FileError;
pub use layer::ConfigurationLayer;
pub use presets::preset_by_name;
pub use resolver::{Configuration, LayerPriority};

pub type Result<T> = std::result::Result<T, ConfigError>;
