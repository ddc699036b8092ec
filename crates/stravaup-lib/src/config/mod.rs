pub mod connector;
pub mod manager;
pub mod settings;

pub use connector::ConnectorConfig;
pub use manager::ConfigManager;
pub use settings::SettingsStore;
