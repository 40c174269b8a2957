//! On-disk state.

mod settings_repository;

pub use settings_repository::{
    ENV_API_KEY, ENV_BASE_URL, ENV_ORGANIZATION, ENV_TIMEOUT_MS, SettingsError, SettingsRepository,
    apply_env_overrides,
};
