//! Telemetry helpers for hosts embedding `chart-lifecycle`.
//!
//! Lifecycle events (chart creation, pane resolution, primitive attach/detach,
//! tooltip transitions) are emitted through `tracing`. Nothing is installed
//! implicitly: call `init_default_tracing` or wire your own subscriber.

/// Installs a compact `tracing` subscriber when the `telemetry` feature is enabled.
///
/// The filter is read from `RUST_LOG` and falls back to `default_directive`
/// (for example `"chart_lifecycle=debug"`).
/// Returns `false` when the feature is disabled or a global subscriber was
/// already set by the host application.
#[must_use]
pub fn init_tracing_with(default_directive: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive)),
            )
            .with_target(true)
            .compact();

        return builder.try_init().is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = default_directive;
        false
    }
}

/// Same as [`init_tracing_with`] using the `info` level.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with("info")
}
