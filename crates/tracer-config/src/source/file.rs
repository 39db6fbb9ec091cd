use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{ConfigOrigin, PropertySource};
use crate::error::{ConfigError, ConfigResult};

/// Maximum allowed config file size (1 MB).
pub const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Settings read from a TOML file.
///
/// Nested tables flatten to dotted keys, so `[trace.agent] port = 8126`
/// and `"trace.agent.port" = 8126` are equivalent. Scalars are stored in
/// their TOML rendering; arrays join their scalar elements with `,`.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: Option<PathBuf>,
    values: HashMap<String, String>,
}

impl FileSource {
    /// Read and parse a config file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, is larger than
    /// [`MAX_CONFIG_FILE_SIZE`], or is not valid TOML.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        match Self::try_load(path)? {
            Some(source) => Ok(source),
            None => Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }

    /// Like [`FileSource::load`], but a missing file is `Ok(None)`.
    ///
    /// Uses a single read operation to avoid TOCTOU races (no separate
    /// exists/metadata checks before reading).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file exists but cannot be read, is
    /// oversized, or fails to parse.
    pub fn try_load(path: &Path) -> ConfigResult<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, skipping");
                return Ok(None);
            },
            Err(e) => {
                return Err(ConfigError::ReadError {
                    path: path.display().to_string(),
                    source: e,
                });
            },
        };

        if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::FileTooLarge {
                path: path.display().to_string(),
                size: content.len() as u64,
                limit: MAX_CONFIG_FILE_SIZE,
            });
        }

        let mut source = Self::parse(&content, &path.display().to_string())?;
        source.path = Some(path.to_path_buf());
        Ok(Some(source))
    }

    /// Parse TOML text directly.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if `content` is not valid TOML.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Self::parse(content, "<inline>")
    }

    /// The file this source was read from, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn parse(content: &str, label: &str) -> ConfigResult<Self> {
        let root: toml::Value = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: label.to_owned(),
            source: e,
        })?;
        let mut values = HashMap::new();
        flatten(&root, "", &mut values);
        Ok(Self { path: None, values })
    }
}

impl PropertySource for FileSource {
    fn origin(&self) -> ConfigOrigin {
        ConfigOrigin::File
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn location(&self) -> Option<&Path> {
        self.path()
    }
}

/// Record every leaf of `val` under its dotted path.
fn flatten(val: &toml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match val {
        toml::Value::Table(table) => {
            for (key, child) in table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(child, &path, out);
            }
        },
        toml::Value::Array(items) => {
            let joined: Vec<String> = items.iter().filter_map(render_scalar).collect();
            out.insert(prefix.to_owned(), joined.join(","));
        },
        scalar => {
            if let Some(rendered) = render_scalar(scalar) {
                out.insert(prefix.to_owned(), rendered);
            }
        },
    }
}

fn render_scalar(val: &toml::Value) -> Option<String> {
    match val {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}
