use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Noisy HTTP and SQL
/// targets are capped either way. Calling this twice is harmless; the
/// second install is ignored.
pub fn init(default_filter: &str) {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(default_filter))
    .add_directive(
      "hyper=warn"
        .parse()
        .unwrap_or_else(|_| tracing::Level::WARN.into()),
    )
    .add_directive(
      "reqwest=warn"
        .parse()
        .unwrap_or_else(|_| tracing::Level::WARN.into()),
    )
    .add_directive(
      "sqlx::query=warn"
        .parse()
        .unwrap_or_else(|_| tracing::Level::WARN.into()),
    );

  if tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(true)
    .try_init()
    .is_err()
  {
    tracing::debug!("Tracing subscriber already installed");
  }
}
