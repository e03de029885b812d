use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Terminal client for a REST to-do collection.
#[derive(Parser, Debug, Clone)]
#[command(name = "todo", version)]
pub struct Args {
    /// URL of the task collection.
    #[arg(long, env = "TODO_API_URL", default_value = "http://localhost:5000/todos")]
    pub base_url: String,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Logs go to stderr so they never interleave with the rendered list.
pub fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(level)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let args = Args::try_parse_from(["todo"]).unwrap();
        if std::env::var("TODO_API_URL").is_err() {
            assert_eq!(args.base_url, "http://localhost:5000/todos");
        }
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn base_url_flag_overrides_default() {
        let args = Args::try_parse_from(["todo", "--base-url", "http://example.test/api/todos"]).unwrap();
        assert_eq!(args.base_url, "http://example.test/api/todos");
    }
}
