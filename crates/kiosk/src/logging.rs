use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Install the global subscriber. `RUST_LOG` is honoured if set; otherwise
/// logging starts at `info` until [`apply_level`] swaps in the configured
/// level.
pub fn init() -> FilterHandle {
    let initial = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(initial);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(true))
        .init();

    handle
}

/// Switch to the configured level unless `RUST_LOG` already chose one.
pub fn apply_level(handle: &FilterHandle, level: &str) {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }
    match EnvFilter::try_new(level) {
        Ok(filter) => {
            if let Err(e) = handle.modify(|current| *current = filter) {
                tracing::warn!(error = %e, "failed to update log filter from config");
            }
        }
        Err(_) => tracing::warn!(level, "invalid log level in config, keeping info"),
    }
}
