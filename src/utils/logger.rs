use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` 優先，否則只顯示本 crate 的日誌 (verbose 時含 debug)
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "leaf_diagnosis=debug,info"
    } else {
        "leaf_diagnosis=info"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Compact terminal output. Verbose runs also show the emitting module.
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(verbose)
                .compact(),
        )
        .init();
}

fn json_subscriber<W>(verbose: bool, writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry().with(env_filter(verbose)).with(
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(false)
            .with_writer(writer),
    )
}

/// 結構化輸出，方便送進日誌收集系統
pub fn init_json_logger(verbose: bool) {
    json_subscriber(verbose, std::io::stdout).init();
}
