// ============================================================================
// Runtime Configuration
// ============================================================================
//
// Everything comes from the environment, like the log filter does:
// - DATABASE_URL: use the Postgres storage backend when set; the seeded
//   in-memory backend otherwise
// - METRICS_PORT: where /metrics and /health are served (default 9090)
//
// ============================================================================

const DEFAULT_METRICS_PORT: u16 = 9090;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub metrics_port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            metrics_port: parse_port(std::env::var("METRICS_PORT").ok()),
        }
    }
}

fn parse_port(raw: Option<String>) -> u16 {
    raw.and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_METRICS_PORT)
}
