use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Instala el subscriber global de `tracing`.
///
/// `RUST_LOG` manda sobre `[logging].filter`. Un filtro inválido en el
/// fichero cae a `info`. Llamarlo dos veces no es un error: el segundo
/// intento se ignora.
pub fn init(config: &LoggingConfig) {
  let filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(&config.filter))
    .unwrap_or_else(|_| EnvFilter::new("info"));

  if tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init().is_err() {
    tracing::debug!("tracing subscriber already installed");
  }
}
