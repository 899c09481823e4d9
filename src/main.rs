use json_shape_guard::config::CheckerConfig;
use json_shape_guard::server::CheckServer;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // stdout carries the response stream; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = match CheckerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("json-shape-guard: configuration error: {e}");
            std::process::exit(1);
        }
    };

    let server = match CheckServer::new(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("json-shape-guard: configuration error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        eprintln!("json-shape-guard: fatal error: {e}");
        std::process::exit(1);
    }
}
