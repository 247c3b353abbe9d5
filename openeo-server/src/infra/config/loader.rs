use std::{
    fs,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use thiserror::Error;
use url::Url;

use super::{
    models::{
        AuthConfig, CatalogConfig, Config, ConfigMetadata, DatabaseConfig,
        ServerConfig,
    },
    sources::{EnvConfig, FileConfig},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("openeo.toml"),
        PathBuf::from("config/openeo.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    /// Non-fatal findings worth surfacing at startup.
    pub warnings: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid URL in {field}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Loads `.env`, then resolves configuration against the process environment.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
        };

        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Resolves configuration against an explicit set of environment overrides.
    pub fn load_with_env(&self, env: EnvConfig) -> Result<ConfigLoad, ConfigLoadError> {
        let (file, config_path) = self.load_file_config(&env)?;
        compose_config(file, env, config_path)
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(found) => found.clone(),
                None => return Ok((None, None)),
            },
        };

        let file = read_file_config(&path)?;
        Ok((Some(file), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;
    toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source: err,
    })
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigLoadError> {
    Url::parse(raw.trim()).map_err(|source| ConfigLoadError::InvalidUrl { field, source })
}

fn compose_config(
    file: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
) -> Result<ConfigLoad, ConfigLoadError> {
    let mut warnings = Vec::new();
    if config_path.is_none() {
        warnings.push(
            "No openeo.toml detected; using defaults and environment variables".to_string(),
        );
    }

    let FileConfig {
        server: file_server,
        api: mut api,
        database: file_database,
        catalog: file_catalog,
        auth: file_auth,
    } = file.unwrap_or_default();

    let defaults = ServerConfig::default();
    let server = ServerConfig {
        host: env.server_host.or(file_server.host).unwrap_or(defaults.host),
        port: env.server_port.or(file_server.port).unwrap_or(defaults.port),
    };

    if let Some(version) = env.api_version {
        api.version = version;
    }
    if let Some(public_url) = env.public_url {
        api.public_url = Some(parse_url("OPENEO_PUBLIC_URL", &public_url)?);
    }
    if api.public_url.is_none() {
        let severity = if api.production { "production backend" } else { "backend" };
        warnings.push(format!(
            "api.public_url is not set; the {severity} advertises relative discovery URLs, set it (or OPENEO_PUBLIC_URL) so clients get absolute ones"
        ));
    }
    if api.version.trim().is_empty() {
        return Err(ConfigLoadError::Invalid("api.version must not be empty".into()));
    }

    let database = env
        .database_url
        .or(file_database.url)
        .map(|url| DatabaseConfig {
            url,
            run_migrations: file_database.run_migrations,
            pool: file_database.pool,
        });
    if database.is_none() {
        warnings.push("No database configured; state is kept in memory only".to_string());
    }

    let stac_api_url = match env.stac_api_url.or(file_catalog.stac_api_url) {
        Some(raw) => Some(parse_url("catalog.stac_api_url", &raw)?),
        None => None,
    };
    let catalog = CatalogConfig {
        stac_api_url,
        collections_path: file_catalog.collections_path,
        processes_path: file_catalog.processes_path,
    };

    if file_auth.tokens.is_empty() {
        warnings.push("No auth tokens configured; authenticated endpoints will reject every request".to_string());
    }
    if let Some(empty) = file_auth
        .tokens
        .iter()
        .find(|grant| grant.token.is_empty() || grant.subject.is_empty())
    {
        return Err(ConfigLoadError::Invalid(format!(
            "auth token for subject '{}' has an empty token or subject",
            empty.subject
        )));
    }

    Ok(ConfigLoad {
        config: Config {
            server,
            api,
            database,
            catalog,
            auth: AuthConfig {
                tokens: file_auth.tokens,
            },
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded: false,
            },
        },
        warnings,
    })
}
