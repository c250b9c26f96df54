//! Configuration Management

mod settings;

pub use settings::{
    CorsSettings, DatabaseSettings, JwtSettings, ServerSettings, Settings, StorageSettings,
    MIN_JWT_SECRET_LENGTH,
};
