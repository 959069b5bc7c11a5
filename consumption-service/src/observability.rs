use tracing_subscriber::EnvFilter;

/// Baseline log filter, applied in addition to `RUST_LOG`.
const DEFAULT_DIRECTIVES: &[&str] = &["consumption_service=info", "tower_http=info"];

pub fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    for directive in DEFAULT_DIRECTIVES {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
