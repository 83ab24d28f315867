use tracing::{subscriber::set_global_default, Subscriber};
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};

// env_filter = trace|debug|info|warn|error|off, RUST_LOG takes precedence
pub fn get_subscriber<Sink>(env_filter: &str, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter)))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(sink))
}

pub fn init_subscriber(
    subscriber: impl Subscriber + Send + Sync,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    set_global_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_scopes_events() {
        let subscriber = get_subscriber("debug", std::io::sink);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(fps = 30, "frame rate");
            if std::env::var("RUST_LOG").is_err() {
                assert!(tracing::enabled!(tracing::Level::DEBUG));
                assert!(!tracing::enabled!(tracing::Level::TRACE));
            }
        });
    }
}
