use std::env;
use std::time::Duration;

const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:5173"];
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Service configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Spreadsheet web app endpoint, `GOOGLE_SCRIPT_URL`. Requests fail with a
    /// configuration error while this is unset.
    pub script_url: Option<String>,
    /// `UPSTREAM_TIMEOUT_SECS`; `0` disables the timeout.
    pub upstream_timeout: Option<Duration>,
    /// Origins the service expects. Others are logged, never blocked.
    pub allowed_origins: Vec<String>,
    pub host: String,
    pub port: u16,
    /// Route prefix, e.g. `/Prod` behind an API gateway stage.
    pub prefix: String,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let script_url = lookup("GOOGLE_SCRIPT_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let timeout_secs = lookup("UPSTREAM_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);
        let upstream_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let mut allowed_origins: Vec<String> = DEFAULT_ALLOWED_ORIGINS
            .iter()
            .map(|origin| origin.to_string())
            .collect();
        let extra = lookup("ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .chain(lookup("ALLOWED_ORIGIN").as_deref().into_iter())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        for origin in extra {
            if !allowed_origins.contains(&origin) {
                allowed_origins.push(origin);
            }
        }

        let remove_base_path = lookup("REMOVE_BASE_PATH")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);
        let prefix = if remove_base_path {
            String::new()
        } else {
            lookup("API_PREFIX")
                .map(|p| normalize_prefix(&p))
                .unwrap_or_default()
        };

        Self {
            script_url,
            upstream_timeout,
            allowed_origins,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            prefix,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Route prefixes must start with `/` and carry no trailing slash; an empty
/// prefix means routes sit at the root.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
