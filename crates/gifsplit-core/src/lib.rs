pub mod config;
pub mod discovery;
pub mod error;
pub mod frames;
pub mod materialize;
pub mod pipeline;

pub use config::ExtractConfig;
pub use error::GifsplitError;
