pub mod settings;

pub use settings::{
    ClickHouseSettings, ConfigError, ServerSettings, Settings, TlsMaterial, TlsSettings,
    Transport, mask_password, parse_bool,
};
