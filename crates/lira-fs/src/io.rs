use std::fs;
use std::io::{self, Write};
use std::path::Path;

use uuid::Uuid;

/// Escribe `contents` en `path` de forma atómica: fichero temporal en el
/// mismo directorio, `fsync` y `rename` encima del destino.
///
/// Quien lea `path` ve el contenido anterior o el nuevo, nunca uno a medias.
pub fn atomic_write_str(path: &Path, contents: &str) -> io::Result<()> {
  let file_name = path
    .file_name()
    .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("not a file path: {}", path.display())))?;
  let tmp_path = path.with_file_name(format!(".{}.{}.tmp", file_name.to_string_lossy(), Uuid::new_v4().simple()));

  if let Err(e) = write_synced(&tmp_path, contents).and_then(|_| fs::rename(&tmp_path, path)) {
    let _ = fs::remove_file(&tmp_path);
    return Err(e);
  }
  Ok(())
}

fn write_synced(path: &Path, contents: &str) -> io::Result<()> {
  let mut file = fs::File::create(path)?;
  file.write_all(contents.as_bytes())?;
  file.sync_all()
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn replaces_existing_content() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("library.json");
    std::fs::write(&path, "old").unwrap();

    atomic_write_str(&path, "new").unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    let leftovers: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1);
  }

  #[test]
  fn missing_directory_fails_without_leftovers() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("nope").join("library.json");

    assert!(atomic_write_str(&path, "x").is_err());
    assert!(!path.exists());
  }
}
