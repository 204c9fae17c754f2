mod schema;
mod settings;
mod storage;

pub use schema::SchemaManager;
pub use settings::{Database, Gateway, GatewayTopic, Logger, Registry, Retention, Server, Settings};
pub use storage::Storage;
