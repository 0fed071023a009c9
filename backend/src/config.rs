use lira_config::{ConfigBackend, ConfigError, LiraPaths};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const STORE_SECTION: &str = "store";
const LOGGING_SECTION: &str = "logging";

/// Sección `[store]`: dónde vive el documento de la biblioteca.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
  /// Raíz del almacén en disco. Si falta se usa `<data_dir>/libraries`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub root: Option<PathBuf>,

  #[serde(default = "default_file_name")]
  pub file_name: String,

  #[serde(default = "default_folder_path")]
  pub folder_path: String,

  /// Abrir (o crear) el fichero al arrancar. Si es `false`, o si la
  /// apertura falla, la sesión empieza en modo local.
  #[serde(default = "default_open_on_start")]
  pub open_on_start: bool,
}

fn default_file_name() -> String {
  "library.json".to_string()
}

fn default_folder_path() -> String {
  "Lira".to_string()
}

fn default_open_on_start() -> bool {
  true
}

impl Default for StoreConfig {
  fn default() -> Self {
    StoreConfig {
      root: None,
      file_name: default_file_name(),
      folder_path: default_folder_path(),
      open_on_start: default_open_on_start(),
    }
  }
}

impl StoreConfig {
  /// Carga la sección (o sus valores por defecto) y la escribe de vuelta
  /// para que el usuario vea todas las claves en `lira.toml`.
  pub fn load_from(backend: &impl ConfigBackend) -> Result<Self, ConfigError> {
    let cfg: Self = backend.load_section(STORE_SECTION)?;
    backend.save_section(STORE_SECTION, &cfg)?;
    Ok(cfg)
  }

  pub fn save_to(&self, backend: &impl ConfigBackend) -> Result<(), ConfigError> {
    backend.save_section(STORE_SECTION, self)
  }

  pub fn root_dir(&self, paths: &LiraPaths) -> PathBuf {
    self.root.clone().unwrap_or_else(|| paths.libraries_dir())
  }
}

/// Sección `[logging]`. `RUST_LOG` tiene prioridad sobre `filter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
  #[serde(default = "default_filter")]
  pub filter: String,
}

fn default_filter() -> String {
  "info".to_string()
}

impl Default for LoggingConfig {
  fn default() -> Self {
    LoggingConfig { filter: default_filter() }
  }
}

impl LoggingConfig {
  pub fn load_from(backend: &impl ConfigBackend) -> Result<Self, ConfigError> {
    backend.load_section(LOGGING_SECTION)
  }
}

/// DTO de `[store]` para la capa de UI (rutas como texto).
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreConfigDto {
  pub root: Option<String>,
  pub file_name: String,
  pub folder_path: String,
  pub open_on_start: bool,
}

impl From<StoreConfig> for StoreConfigDto {
  fn from(cfg: StoreConfig) -> Self {
    StoreConfigDto {
      root: cfg.root.map(|p| p.to_string_lossy().to_string()),
      file_name: cfg.file_name,
      folder_path: cfg.folder_path,
      open_on_start: cfg.open_on_start,
    }
  }
}

impl From<StoreConfigDto> for StoreConfig {
  fn from(dto: StoreConfigDto) -> Self {
    StoreConfig {
      root: dto.root.filter(|r| !r.trim().is_empty()).map(PathBuf::from),
      file_name: dto.file_name,
      folder_path: dto.folder_path,
      open_on_start: dto.open_on_start,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use lira_config::TomlConfigBackend;
  use tempfile::tempdir;

  #[test]
  fn store_defaults_are_written_back() {
    let tmp = tempdir().unwrap();
    let backend = TomlConfigBackend::new(LiraPaths::from_base(tmp.path()).unwrap());

    let cfg = StoreConfig::load_from(&backend).unwrap();

    assert_eq!(cfg, StoreConfig::default());
    let written = std::fs::read_to_string(backend.config_file()).unwrap();
    assert!(written.contains("[store]"));
    assert!(written.contains("file_name = \"library.json\""));
    assert_eq!(cfg.root_dir(backend.paths()), tmp.path().join("data").join("libraries"));
  }

  #[test]
  fn partial_sections_fill_in_defaults() {
    let tmp = tempdir().unwrap();
    let backend = TomlConfigBackend::new(LiraPaths::from_base(tmp.path()).unwrap());
    std::fs::write(backend.config_file(), "[store]\nfolder_path = \"Songs\"\n[logging]\nfilter = \"lira=debug\"\n")
      .unwrap();

    let store = StoreConfig::load_from(&backend).unwrap();
    let logging = LoggingConfig::load_from(&backend).unwrap();

    assert_eq!(store.folder_path, "Songs");
    assert_eq!(store.file_name, "library.json");
    assert_eq!(logging.filter, "lira=debug");
  }

  #[test]
  fn dto_treats_blank_root_as_default() {
    let dto = StoreConfigDto {
      root: Some("  ".into()),
      file_name: "a.json".into(),
      folder_path: "".into(),
      open_on_start: false,
    };

    let cfg = StoreConfig::from(dto);

    assert_eq!(cfg.root, None);
    assert!(!cfg.open_on_start);
  }
}
