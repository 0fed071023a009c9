use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use futures::lock::Mutex as AsyncMutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{Library, LibraryDocument, SelectedSong, SongLocation};
use crate::engine::{self, Mutation, MutationEffect, find_location, normalize_document, reconcile};
use crate::errors::{CoreError, NotFound};
use crate::ports::{FileLookup, RemoteStore, StoreError};

/// Fases de una mutación vista desde el coordinador.
///
/// `Pending → (LocalApplied | RemotePersisting) → (Succeeded | Failed)`.
/// `LocalApplied` ya es un éxito terminal: no hay ida y vuelta remota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationPhase {
  Pending,
  LocalApplied,
  RemotePersisting,
  Succeeded,
  Failed,
}

impl MutationPhase {
  pub fn is_terminal(self) -> bool {
    matches!(self, MutationPhase::LocalApplied | MutationPhase::Succeeded | MutationPhase::Failed)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationReport {
  pub phase: MutationPhase,
  pub effect: MutationEffect,
}

/// Estado confirmado de la sesión. Solo el coordinador lo reemplaza.
#[derive(Debug, Default)]
struct Session {
  document: LibraryDocument,
  selected: Option<SelectedSong>,
  file_id: Option<String>,
  connected: bool,
}

/// Coordinador de persistencia: único escritor de la biblioteca en memoria.
///
/// - Sin conexión remota, cada mutación se aplica en sitio y termina en
///   [`MutationPhase::LocalApplied`] sin tocar el almacén.
/// - Con conexión, la mutación se aplica sobre un clon, se guarda el
///   documento completo y, si el guardado va bien, se adopta la respuesta
///   del almacén (re-normalizada). Si falla, el estado no cambia.
///
/// Las mutaciones se serializan con un cerrojo asíncrono que se mantiene
/// durante todo el guardado remoto, así que dos llamadas seguidas desde el
/// mismo cliente no pierden cambios. Entre clientes distintos el almacén
/// sigue siendo "gana el último en escribir".
pub struct LibraryService<R>
where
  R: RemoteStore,
{
  store: R,
  session: Mutex<Session>,
  writer: AsyncMutex<()>,
}

impl<R> LibraryService<R>
where
  R: RemoteStore,
{
  /// Servicio con biblioteca vacía en modo local.
  pub fn new(store: R) -> Self {
    Self::with_document(store, LibraryDocument::default())
  }

  pub fn with_document(store: R, document: LibraryDocument) -> Self {
    let session = Session { document, ..Session::default() };
    Self { store, session: Mutex::new(session), writer: AsyncMutex::new(()) }
  }

  pub fn store(&self) -> &R {
    &self.store
  }

  // -------- QUERY (read) --------

  pub fn is_connected(&self) -> bool {
    self.session().connected
  }

  pub fn library(&self) -> Library {
    self.session().document.library.clone()
  }

  pub fn document(&self) -> LibraryDocument {
    self.session().document.clone()
  }

  pub fn selected(&self) -> Option<SelectedSong> {
    self.session().selected.clone()
  }

  pub fn file_id(&self) -> Option<String> {
    self.session().file_id.clone()
  }

  // -------- SELECTION --------

  pub fn select_song(&self, location: &SongLocation) -> Result<SelectedSong, CoreError> {
    let mut session = self.session();
    let found = find_location(&session.document.library, location)
      .ok_or_else(|| NotFound::song(&location.artist, &location.album, &location.title))?;
    session.selected = Some(found.clone());
    Ok(found)
  }

  pub fn clear_selection(&self) {
    self.session().selected = None;
  }

  // -------- CONNECTION --------

  /// Busca el fichero (y lo crea si no existe), lo carga y pasa a modo remoto.
  pub async fn open_library(&self, file_name: &str, folder_path: &str) -> Result<FileLookup, CoreError> {
    let _gate = self.writer.lock().await;

    let mut lookup = self.store.find_file(file_name, folder_path).await.map_err(CoreError::RemoteRead)?;
    if !lookup.found {
      info!(file_name, folder_path, "library file not found, creating a new one");
      self.store.create_new_library(file_name, folder_path).await.map_err(CoreError::RemoteRead)?;
      lookup = self.store.find_file(file_name, folder_path).await.map_err(CoreError::RemoteRead)?;
    }

    let file_id = lookup
      .file_id
      .clone()
      .filter(|_| lookup.found)
      .ok_or_else(|| CoreError::RemoteRead(StoreError::NotFound(format!("{folder_path}/{file_name}"))))?;

    let raw = self.store.load_library_by_id(&file_id).await.map_err(CoreError::RemoteRead)?;
    let document = normalize_document(&raw);

    info!(%file_id, artists = document.library.artists.len(), songs = document.library.song_count(), "library opened");

    let mut session = self.session();
    session.document = document;
    session.selected = None;
    session.file_id = Some(file_id);
    session.connected = true;

    Ok(lookup)
  }

  /// Vuelve a cargar el fichero abierto y reactiva el modo remoto.
  ///
  /// La selección se conserva si su canción sigue existiendo.
  pub async fn reload(&self) -> Result<(), CoreError> {
    let _gate = self.writer.lock().await;

    let file_id = self.session().file_id.clone().ok_or(CoreError::NotConnected)?;
    let raw = self.store.load_library_by_id(&file_id).await.map_err(CoreError::RemoteRead)?;
    let document = normalize_document(&raw);

    let mut session = self.session();
    session.selected = session.selected.take().and_then(|s| find_location(&document.library, &s.location()));
    session.document = document;
    session.connected = true;
    debug!(%file_id, "library reloaded");

    Ok(())
  }

  /// Pasa a modo local conservando el estado actual.
  pub fn disconnect(&self) {
    let mut session = self.session();
    if session.connected {
      info!("switching to local-only mode");
    }
    session.connected = false;
  }

  // -------- COMMAND (write) --------

  pub async fn perform(&self, mutation: Mutation) -> Result<MutationReport, CoreError> {
    let _gate = self.writer.lock().await;
    let now = Utc::now();
    let op = mutation.kind();
    trace_phase(op, MutationPhase::Pending);

    let base = {
      let session = self.session();
      if !session.connected {
        drop(session);
        return self.apply_locally(&mutation, now);
      }
      session.document.clone()
    };

    self.persist_remotely(&mutation, base, now).await
  }

  fn apply_locally(&self, mutation: &Mutation, now: DateTime<Utc>) -> Result<MutationReport, CoreError> {
    let op = mutation.kind();
    let mut session = self.session();

    let effect = engine::apply(&mut session.document.library, mutation, now).inspect_err(|e| {
      debug!(op, error = %e, "mutation rejected");
      trace_phase(op, MutationPhase::Failed);
    })?;

    let selected = session.selected.take();
    session.selected = reconcile(selected, &session.document.library, &effect);

    trace_phase(op, MutationPhase::LocalApplied);
    Ok(MutationReport { phase: MutationPhase::LocalApplied, effect })
  }

  async fn persist_remotely(
    &self,
    mutation: &Mutation,
    mut draft: LibraryDocument,
    now: DateTime<Utc>,
  ) -> Result<MutationReport, CoreError> {
    let op = mutation.kind();

    let effect = engine::apply(&mut draft.library, mutation, now).inspect_err(|e| {
      debug!(op, error = %e, "mutation rejected");
      trace_phase(op, MutationPhase::Failed);
    })?;
    draft.last_updated = Some(now);

    trace_phase(op, MutationPhase::RemotePersisting);
    let saved = self.store.save_library(&draft).await.map_err(|e| {
      warn!(op, error = %e, "remote save failed, keeping previous state");
      trace_phase(op, MutationPhase::Failed);
      CoreError::RemoteWrite(e)
    })?;

    let adopted = normalize_document(&saved);
    let mut session = self.session();
    session.document = adopted;
    let selected = session.selected.take();
    session.selected = reconcile(selected, &session.document.library, &effect);

    trace_phase(op, MutationPhase::Succeeded);
    Ok(MutationReport { phase: MutationPhase::Succeeded, effect })
  }

  fn session(&self) -> MutexGuard<'_, Session> {
    // Las secciones críticas no pueden dejar el estado a medias, así que un
    // cerrojo envenenado se puede seguir usando.
    self.session.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

fn trace_phase(op: &str, phase: MutationPhase) {
  debug!(op, ?phase, "mutation phase");
}
