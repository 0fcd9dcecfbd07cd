//! Config file loading.
//!
//! The TOML file is the base layer. Variables prefixed `LIONZ_` override it,
//! with `__` between nested keys, e.g. `LIONZ_XTREAM__PASSWORD`.

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

use super::{types::Config, ConfigError};

const ENV_PREFIX: &str = "LIONZ_";

/// Read `path`, then apply `LIONZ_*` environment overrides.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(
        Figment::from(Toml::file(path)).merge(Env::prefixed(ENV_PREFIX).split("__")),
    )
}

/// Parse an inline TOML document. The environment is not consulted.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    extract(Figment::from(Toml::string(toml_str)))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}
