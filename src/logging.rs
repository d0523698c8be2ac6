use env_logger::{Builder, Env, Target};

/// Log to stderr so stdout carries only the event stream.
/// Filter comes from `HANDCTL_LOG` (e.g. `HANDCTL_LOG=debug`), default `info`.
pub fn init() {
    Builder::from_env(Env::new().filter_or("HANDCTL_LOG", "info"))
        .target(Target::Stderr)
        .format_timestamp_millis()
        .init();
}
