mod config;
mod infrastructure;

use anyhow::Context;
use lira_config::{LiraPaths, TomlConfigBackend};
use lira_core::domain::{LibraryDocument, SelectedSong, SongLocation};
use lira_core::engine::Mutation;
use lira_core::ports::FileLookup;
use lira_core::services::{LibraryService, MutationReport};
use lira_fs::FsLibraryStore;

pub use crate::config::{LoggingConfig, StoreConfig, StoreConfigDto};

/// Servicio concreto: la biblioteca persistida en el almacén de ficheros.
type ConcreteLibraryService = LibraryService<FsLibraryStore>;

/// Estado global de la aplicación.
pub struct AppState {
  library: ConcreteLibraryService,
  config: TomlConfigBackend,
}

impl AppState {
  pub fn library(&self) -> &ConcreteLibraryService {
    &self.library
  }
}

/// Arranque con la configuración del usuario (`LIRA_BASE_DIR` o los
/// directorios del sistema).
pub async fn bootstrap() -> anyhow::Result<AppState> {
  let paths = LiraPaths::detect().context("resolving lira directories")?;
  bootstrap_with(TomlConfigBackend::new(paths)).await
}

/// Cableado de dependencias sobre un backend de configuración concreto.
pub async fn bootstrap_with(config: TomlConfigBackend) -> anyhow::Result<AppState> {
  // 1. Logging. Va primero para que el resto del arranque quede trazado.
  let logging = LoggingConfig::load_from(&config).context("loading [logging] config")?;
  infrastructure::logging::init(&logging);

  // 2. Almacén de ficheros.
  let store_cfg = StoreConfig::load_from(&config).context("loading [store] config")?;
  let root = store_cfg.root_dir(config.paths());
  std::fs::create_dir_all(&root).with_context(|| format!("creating store root {}", root.display()))?;

  // 3. Servicio. Sin fichero abierto la sesión trabaja en local.
  let library = LibraryService::new(FsLibraryStore::new(root));
  tracing::info!(root = %library.store().root().display(), "library store ready");
  if store_cfg.open_on_start {
    match library.open_library(&store_cfg.file_name, &store_cfg.folder_path).await {
      Ok(lookup) => tracing::info!(file_id = ?lookup.file_id, "library opened"),
      Err(e) => tracing::warn!(error = %e, "could not open library, continuing in local mode"),
    }
  }

  Ok(AppState { library, config })
}

/// Command: abre (o crea) el fichero configurado en `[store]`.
pub async fn library_open(state: &AppState) -> Result<FileLookup, String> {
  let cfg = StoreConfig::load_from(&state.config).map_err(|e| e.to_string())?;
  state.library.open_library(&cfg.file_name, &cfg.folder_path).await.map_err(|e| e.to_string())
}

/// Command: relee el fichero abierto.
pub async fn library_reload(state: &AppState) -> Result<(), String> {
  state.library.reload().await.map_err(|e| e.to_string())
}

/// Command: pasa la sesión a modo local.
pub fn library_disconnect(state: &AppState) {
  state.library.disconnect();
}

/// Command: copia del documento actual.
pub fn library_snapshot(state: &AppState) -> LibraryDocument {
  state.library.document()
}

/// Command: aplica una mutación. En modo conectado la promesa se resuelve
/// cuando el documento ya está guardado.
pub async fn library_perform(state: &AppState, mutation: Mutation) -> Result<MutationReport, String> {
  tracing::debug!(op = mutation.kind(), "library_perform");
  state.library.perform(mutation).await.map_err(|e| e.to_string())
}

/// Command: igual que `library_perform` pero con la mutación como JSON
/// (`{"op": "createSong", ...}`), tal como llega de la UI.
pub async fn library_perform_json(state: &AppState, payload: serde_json::Value) -> Result<MutationReport, String> {
  let mutation: Mutation = serde_json::from_value(payload).map_err(|e| format!("invalid mutation: {e}"))?;
  library_perform(state, mutation).await
}

pub fn library_select_song(state: &AppState, location: SongLocation) -> Result<SelectedSong, String> {
  state.library.select_song(&location).map_err(|e| e.to_string())
}

pub fn library_selected(state: &AppState) -> Option<SelectedSong> {
  state.library.selected()
}

pub fn library_clear_selection(state: &AppState) {
  state.library.clear_selection();
}

/// Command: lee la sección `[store]`.
pub fn store_get_config(state: &AppState) -> Result<StoreConfigDto, String> {
  let cfg = StoreConfig::load_from(&state.config).map_err(|e| e.to_string())?;
  Ok(StoreConfigDto::from(cfg))
}

/// Command: guarda la sección `[store]`. Se aplica en el próximo
/// `library_open`; la raíz del almacén solo cambia al reiniciar.
pub fn store_save_config(state: &AppState, input: StoreConfigDto) -> Result<(), String> {
  StoreConfig::from(input).save_to(&state.config).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use lira_core::services::MutationPhase;
  use serde_json::json;
  use tempfile::{TempDir, tempdir};

  async fn boot() -> (TempDir, AppState) {
    let tmp = tempdir().unwrap();
    let backend = TomlConfigBackend::new(LiraPaths::from_base(tmp.path()).unwrap());
    let state = bootstrap_with(backend).await.unwrap();
    (tmp, state)
  }

  fn library_file(tmp: &TempDir) -> std::path::PathBuf {
    tmp.path().join("data").join("libraries").join("Lira").join("library.json")
  }

  #[tokio::test]
  async fn bootstrap_opens_the_configured_file() {
    let (tmp, state) = boot().await;

    assert!(state.library().is_connected());
    assert_eq!(state.library().store().root(), tmp.path().join("data").join("libraries"));
    assert!(library_file(&tmp).exists());
    assert!(tmp.path().join("config").join("lira.toml").exists());
  }

  #[tokio::test]
  async fn json_mutations_reach_the_file() {
    let (tmp, state) = boot().await;

    let report = library_perform_json(
      &state,
      json!({ "op": "createSong", "artist": "Nina Simone", "album": "Pastel Blues", "song": { "title": "Sinnerman" } }),
    )
    .await
    .unwrap();

    assert_eq!(report.phase, MutationPhase::Succeeded);
    let content = std::fs::read_to_string(library_file(&tmp)).unwrap();
    let written: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(written["artists"][0]["albums"][0]["songs"][0]["title"], "Sinnerman");
    assert_eq!(library_snapshot(&state).library.song_count(), 1);
  }

  #[tokio::test]
  async fn invalid_payload_is_rejected() {
    let (_tmp, state) = boot().await;

    let err = library_perform_json(&state, json!({ "op": "explode" })).await.unwrap_err();

    assert!(err.starts_with("invalid mutation"));
  }

  #[tokio::test]
  async fn disabled_open_on_start_begins_local() {
    let tmp = tempdir().unwrap();
    let backend = TomlConfigBackend::new(LiraPaths::from_base(tmp.path()).unwrap());
    StoreConfig { open_on_start: false, ..StoreConfig::default() }.save_to(&backend).unwrap();

    let state = bootstrap_with(backend).await.unwrap();
    let report = library_perform(&state, Mutation::CreateArtist { artist: "Offline".into() }).await.unwrap();

    assert_eq!(report.phase, MutationPhase::LocalApplied);
    assert!(!library_file(&tmp).exists());
  }

  #[tokio::test]
  async fn selection_commands_follow_the_service() {
    let (_tmp, state) = boot().await;
    library_perform(&state, Mutation::CreateArtist { artist: "A".into() }).await.unwrap();

    let missing = library_select_song(&state, SongLocation::new("A", "X", "S"));
    assert!(missing.is_err());

    let create = json!({ "op": "createSong", "artist": "A", "album": "X", "song": { "title": "S", "lyrics": "la" } });
    library_perform_json(&state, create).await.unwrap();
    let selected = library_select_song(&state, SongLocation::new("A", "X", "S")).unwrap();
    assert_eq!(selected.song.lyrics, "la");
    assert_eq!(library_selected(&state), Some(selected));

    library_clear_selection(&state);
    assert_eq!(library_selected(&state), None);
  }

  #[tokio::test]
  async fn store_config_round_trips_through_commands() {
    let (_tmp, state) = boot().await;

    let mut dto = store_get_config(&state).unwrap();
    dto.folder_path = "Other".into();
    store_save_config(&state, dto).unwrap();

    assert_eq!(store_get_config(&state).unwrap().folder_path, "Other");
    let lookup = library_open(&state).await.unwrap();
    assert_eq!(lookup.file_id.as_deref(), Some("Other/library.json"));
  }
}
