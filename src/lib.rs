pub mod bridge;
pub mod config;
pub mod context;
pub mod error;
pub mod overview;
pub mod query;

pub use config::{BridgeConfig, ConfigError, Settings, load_settings};
pub use context::{
    CONTEXT_FILE_NAME, ContextArtifact, ContextComposer, ContextStatus, PrMetadata,
    prepare_context,
};
pub use error::{BridgeError, BridgeResult};
pub use query::{
    NextActionsAnswer, QueryStatus, StatusAnswer, query_next_actions, query_status,
};
