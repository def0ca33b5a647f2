use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("food_order_stats=debug,info")
        } else {
            EnvFilter::new("food_order_stats=info")
        }
    })
}

/// Terminal logger. `RUST_LOG` wins over the verbosity flag.
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

fn json_subscriber(verbose: bool) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(default_filter(verbose)).with(
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .json()
            .with_current_span(false),
    )
}

/// Line-delimited JSON logs for log shippers.
pub fn init_json_logger(verbose: bool) {
    json_subscriber(verbose).init();
}

pub fn init_logger(verbose: bool, json: bool) {
    if json {
        init_json_logger(verbose);
    } else {
        init_cli_logger(verbose);
    }
}
