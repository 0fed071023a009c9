use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
  #[error("request failed: {0}")]
  Request(String),

  #[error("invalid response: {0}")]
  Decode(String),
}

/// Port del servicio externo de metadatos musicales.
///
/// Solo lo usa la capa de UI para autocompletar formularios; el núcleo
/// nunca deja que un fallo aquí toque el documento.
#[async_trait]
pub trait MetadataSearch: Send + Sync {
  async fn albums_for_artist(&self, artist: &str) -> Result<Vec<String>, SearchError>;
  async fn tracks_for_album(&self, artist: &str, album: &str) -> Result<Vec<String>, SearchError>;
  async fn search_artists(&self, term: &str) -> Result<Vec<String>, SearchError>;
}

/// Envoltorio que convierte cualquier [`MetadataSearch`] en sugerencias
/// listas para mostrar: sin duplicados, ordenadas, y `[]` si algo falla.
pub struct SearchSuggestions<S> {
  inner: S,
}

impl<S: MetadataSearch> SearchSuggestions<S> {
  pub fn new(inner: S) -> Self {
    Self { inner }
  }

  pub async fn albums(&self, artist: &str) -> Vec<String> {
    settle("albums", self.inner.albums_for_artist(artist).await)
  }

  pub async fn tracks(&self, artist: &str, album: &str) -> Vec<String> {
    settle("tracks", self.inner.tracks_for_album(artist, album).await)
  }

  pub async fn artists(&self, term: &str) -> Vec<String> {
    if term.trim().is_empty() {
      return Vec::new();
    }
    settle("artists", self.inner.search_artists(term).await)
  }
}

fn settle(kind: &str, result: Result<Vec<String>, SearchError>) -> Vec<String> {
  match result {
    Ok(values) => dedup_sorted(values),
    Err(e) => {
      tracing::warn!(kind, error = %e, "metadata search failed");
      Vec::new()
    }
  }
}

/// Recorta espacios, descarta vacíos, ordena y elimina duplicados exactos.
pub fn dedup_sorted(values: Vec<String>) -> Vec<String> {
  let mut out: Vec<String> =
    values.into_iter().map(|v| v.trim().to_string()).filter(|v| !v.is_empty()).collect();
  out.sort();
  out.dedup();
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  struct FakeSearch {
    fail: bool,
  }

  #[async_trait]
  impl MetadataSearch for FakeSearch {
    async fn albums_for_artist(&self, _artist: &str) -> Result<Vec<String>, SearchError> {
      if self.fail {
        return Err(SearchError::Request("timeout".into()));
      }
      Ok(vec!["Kid A".into(), "Amnesiac".into(), "Kid A".into(), " ".into()])
    }

    async fn tracks_for_album(&self, _artist: &str, _album: &str) -> Result<Vec<String>, SearchError> {
      Err(SearchError::Decode("unexpected payload".into()))
    }

    async fn search_artists(&self, term: &str) -> Result<Vec<String>, SearchError> {
      Ok(vec![format!("{term} "), term.to_string()])
    }
  }

  #[tokio::test]
  async fn results_are_deduplicated_and_sorted() {
    let search = SearchSuggestions::new(FakeSearch { fail: false });

    assert_eq!(search.albums("Radiohead").await, vec!["Amnesiac".to_string(), "Kid A".to_string()]);
    assert_eq!(search.artists("Blur").await, vec!["Blur".to_string()]);
  }

  #[tokio::test]
  async fn failures_degrade_to_empty() {
    let search = SearchSuggestions::new(FakeSearch { fail: true });

    assert!(search.albums("Radiohead").await.is_empty());
    assert!(search.tracks("Radiohead", "Kid A").await.is_empty());
  }

  #[tokio::test]
  async fn blank_term_skips_the_request() {
    let search = SearchSuggestions::new(FakeSearch { fail: false });
    assert!(search.artists("   ").await.is_empty());
  }
}
