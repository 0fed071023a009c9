use crate::paths::{ConfigError, LiraPaths};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use toml_edit::{DocumentMut, Item};

/// Acceso por secciones a la configuración. Una sección ausente (o un
/// fichero ausente) se lee como `T::default()`.
pub trait ConfigBackend {
  fn load_section<T: DeserializeOwned + Default>(&self, section: &str) -> Result<T, ConfigError>;
  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError>;
}

/// Backend sobre `lira.toml`.
///
/// Cada componente lee y escribe solo su propia sección (`[store]`,
/// `[logging]`, ...). La escritura conserva comentarios y el resto de secciones.
pub struct TomlConfigBackend {
  paths: LiraPaths,
}

impl TomlConfigBackend {
  pub fn new(paths: LiraPaths) -> Self {
    Self { paths }
  }

  pub fn paths(&self) -> &LiraPaths {
    &self.paths
  }

  pub fn config_file(&self) -> PathBuf {
    self.paths.config_file()
  }
}

impl ConfigBackend for TomlConfigBackend {
  fn load_section<T: DeserializeOwned + Default>(&self, section: &str) -> Result<T, ConfigError> {
    let path = self.paths.config_file();
    let content = match fs::read_to_string(&path) {
      Ok(c) => c,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        tracing::debug!(?path, section, "config file missing, using defaults");
        return Ok(T::default());
      }
      Err(e) => return Err(e.into()),
    };

    let root: toml::Table = toml::from_str(&content)?;

    let Some(table) = root.get(section) else {
      return Ok(T::default());
    };

    decode_section(section, table.clone())
  }

  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError> {
    let path = self.paths.config_file();

    let mut doc: DocumentMut = match fs::read_to_string(&path) {
      Ok(content) => content.parse::<DocumentMut>()?,
      Err(e) if e.kind() == ErrorKind::NotFound => DocumentMut::new(),
      Err(e) => return Err(e.into()),
    };

    // `toml` serializa la sección sin cabecera ("a = 1\nb = 2\n");
    // se re-parsea como documento para obtener la tabla editable.
    let section_str = toml::to_string(value)
      .map_err(|e| ConfigError::Other(format!("encode section [{section}]: {e}")))?;
    let section_doc = section_str.parse::<DocumentMut>()?;

    doc[section] = Item::Table(section_doc.as_table().clone());

    lira_fs::atomic_write_str(&path, &doc.to_string())?;
    tracing::debug!(?path, section, "config section saved");

    Ok(())
  }
}

fn decode_section<T: DeserializeOwned>(section: &str, value: toml::Value) -> Result<T, ConfigError> {
  value.try_into().map_err(|e| ConfigError::Other(format!("decode section [{section}]: {e}")))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;
  use tempfile::tempdir;

  #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
  struct Sample {
    name: String,
    retries: u32,
  }

  fn backend(base: &std::path::Path) -> TomlConfigBackend {
    TomlConfigBackend::new(LiraPaths::from_base(base).unwrap())
  }

  #[test]
  fn missing_file_yields_default() {
    let tmp = tempdir().unwrap();
    let backend = backend(tmp.path());

    let loaded: Sample = backend.load_section("sample").unwrap();
    assert_eq!(loaded, Sample::default());
  }

  #[test]
  fn missing_section_yields_default() {
    let tmp = tempdir().unwrap();
    let backend = backend(tmp.path());
    std::fs::write(backend.config_file(), "[other]\nx = 1\n").unwrap();

    let loaded: Sample = backend.load_section("sample").unwrap();
    assert_eq!(loaded, Sample::default());
  }

  #[test]
  fn malformed_section_is_an_error() {
    let tmp = tempdir().unwrap();
    let backend = backend(tmp.path());
    std::fs::write(backend.config_file(), "[sample]\nretries = \"many\"\n").unwrap();

    let err = backend.load_section::<Sample>("sample").unwrap_err();
    assert!(matches!(err, ConfigError::Other(_)));
  }

  #[test]
  fn save_then_load_round_trip() {
    let tmp = tempdir().unwrap();
    let backend = backend(tmp.path());
    let value = Sample { name: "lira".into(), retries: 3 };

    backend.save_section("sample", &value).unwrap();

    let loaded: Sample = backend.load_section("sample").unwrap();
    assert_eq!(loaded, value);
  }

  #[test]
  fn save_preserves_comments_and_other_sections() {
    let tmp = tempdir().unwrap();
    let backend = backend(tmp.path());
    std::fs::write(backend.config_file(), "# mantener\n[logging]\nfilter = \"debug\"\n").unwrap();

    backend.save_section("sample", &Sample { name: "x".into(), retries: 1 }).unwrap();

    let content = std::fs::read_to_string(backend.config_file()).unwrap();
    assert!(content.contains("# mantener"));
    assert!(content.contains("filter = \"debug\""));
    assert!(content.contains("[sample]"));
  }
}
