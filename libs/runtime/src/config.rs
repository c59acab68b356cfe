use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::paths::home_dir::resolve_home_dir;

/// Directory created under the user's home when `server.home_dir` is blank.
const HOME_SUBDIR: &str = ".jobboard";

/// Environment overrides, e.g. `APP__SERVER__PORT=8080`.
const ENV_PREFIX: &str = "APP__";

/// Server process configuration. Module sections are kept as raw values and
/// typed on demand through [`AppConfig::module_config`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// `None` until a file or the CLI provides it.
    pub logging: Option<LoggingConfig>,
    /// Extra `<module>.yaml` files merged into `modules`.
    #[serde(default)]
    pub modules_dir: Option<String>,
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Absolute after loading. Blank means `~/.jobboard`.
    pub home_dir: String,
    pub host: String,
    pub port: u16,
    /// Per-request timeout; 0 keeps the HTTP layer's own default.
    #[serde(default)]
    pub timeout_sec: u64,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve `home_dir` to an absolute path, creating the directory.
    fn resolve_home(&mut self) -> Result<()> {
        let configured = Some(self.home_dir.trim())
            .filter(|dir| !dir.is_empty())
            .map(str::to_owned);
        let resolved = resolve_home_dir(configured, HOME_SUBDIR, true)
            .context("Failed to resolve server.home_dir")?;
        self.home_dir = resolved.to_string_lossy().into_owned();
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            timeout_sec: 0,
        }
    }
}

/// Log sinks keyed by target prefix; `default` catches everything else.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    /// `trace` through `error`, or `off`
    pub console_level: String,
    /// Relative paths land under `server.home_dir`
    pub file: String,
    #[serde(default)]
    pub file_level: String,
    pub max_age_days: Option<u32>,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

pub fn default_logging_config() -> LoggingConfig {
    let section = Section {
        console_level: "info".to_string(),
        file: "logs/jobboard.log".to_string(),
        file_level: "debug".to_string(),
        max_age_days: Some(7),
        max_backups: Some(3),
        max_size_mb: Some(100),
    };
    HashMap::from([("default".to_string(), section)])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: Some(default_logging_config()),
            modules_dir: None,
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Built-in defaults, then the YAML file, then `APP__` environment
    /// variables. The file must exist.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref();
        if !path.is_file() {
            bail!("config file not found: {}", path.display());
        }

        let base = AppConfig {
            logging: None,
            ..Default::default()
        };
        let mut config: AppConfig = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.server.resolve_home()?;
        if let Some(dir) = &config.modules_dir {
            let files = read_module_files(Path::new(dir))?;
            config.modules.extend(files);
        }
        Ok(config)
    }

    /// [`load_layered`](Self::load_layered) when a path is given, built-in
    /// defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_layered(path);
        }
        let mut config = Self::default();
        config.server.resolve_home()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// `--port` replaces the server port; each `-v` raises console verbosity.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        let logging = self.logging.get_or_insert_with(default_logging_config);
        let level = match args.verbose {
            0 => return,
            1 => "debug",
            _ => "trace",
        };
        if let Some(section) = logging.get_mut("default") {
            section.console_level = level.to_string();
        }
    }

    /// Typed view of one module's section. A missing section yields
    /// `T::default()`; a present but malformed one is an error.
    pub fn module_config<T: DeserializeOwned + Default>(&self, module_name: &str) -> Result<T> {
        match self.modules.get(module_name) {
            None => Ok(T::default()),
            Some(raw) => serde_json::from_value(raw.clone())
                .with_context(|| format!("invalid {module_name} config")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
}

/// `*.yaml`/`*.yml` files in `dir`, keyed by file stem. A missing directory
/// contributes nothing.
fn read_module_files(dir: &Path) -> Result<Vec<(String, serde_json::Value)>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut sections = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "yaml" | "yml"));
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if !path.is_file() || !is_yaml {
            continue;
        }

        let raw = fs::read_to_string(&path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&raw)
            .with_context(|| format!("invalid module file {}", path.display()))?;
        sections.push((name.to_string(), serde_json::to_value(value)?));
    }
    Ok(sections)
}
