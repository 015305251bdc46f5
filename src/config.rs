use clap::Parser;

/// Plotly's copy of the UCI automobile ("imports-85") dataset.
pub const DEFAULT_SOURCE: &str =
    "https://raw.githubusercontent.com/plotly/datasets/master/imports-85.csv";

// ---------------------------------------------------------------------------
// Command line / environment configuration
// ---------------------------------------------------------------------------

/// Startup configuration. Every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "rusty-parcats", version, about = "Linked scatter / parallel-categories dashboard")]
pub struct DashboardConfig {
    /// Dataset location: local path or http(s) URL.
    #[arg(long, env = "PARCATS_SOURCE", default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// Interface to listen on.
    #[arg(long, env = "PARCATS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PARCATS_PORT", default_value_t = 80)]
    pub port: u16,

    /// Log at debug level regardless of RUST_LOG.
    #[arg(long, env = "PARCATS_DEBUG")]
    pub debug: bool,

    /// Upper bound on live browser sessions; the oldest is evicted first.
    #[arg(long, env = "PARCATS_MAX_SESSIONS", default_value_t = 64)]
    pub max_sessions: usize,

    /// Open the desktop viewer instead of serving HTTP.
    #[arg(long)]
    pub native: bool,
}

impl DashboardConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Which table columns feed which chart channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub x: String,
    pub y: String,
    /// Parallel-categories dimensions, left to right.
    pub dimensions: Vec<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            x: "horsepower".into(),
            y: "highway-mpg".into(),
            dimensions: vec!["body-style".into(), "drive-wheels".into(), "fuel-type".into()],
        }
    }
}

impl ColumnMapping {
    /// All columns the dashboard cannot work without.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut cols = vec![self.x.as_str(), self.y.as_str()];
        cols.extend(self.dimensions.iter().map(String::as_str));
        cols
    }
}
