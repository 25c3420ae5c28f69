use anyhow::{Context, Result, anyhow};

pub(crate) const DEVELOPMENT: &str = "development";
const DEFAULT_DEV_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone)]
pub struct Settings {
    pub http_addr: String,
    pub environment: String,
    pub admin_password: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let environment = get("APP_ENV")
            .or_else(|| get("NODE_ENV"))
            .unwrap_or_else(|| DEVELOPMENT.to_string());

        let http_addr = match get("HTTP_ADDR") {
            Some(addr) => addr,
            None => {
                let port: u16 = get("PORT")
                    .unwrap_or_else(|| "3000".to_string())
                    .parse()
                    .context("Failed to parse PORT, expecting a port number")?;
                format!("0.0.0.0:{port}")
            }
        };

        let admin_password = match get("ADMIN_PASSWORD") {
            Some(secret) => secret,
            None if environment == DEVELOPMENT => DEFAULT_DEV_ADMIN_PASSWORD.to_string(),
            None => {
                return Err(anyhow!(
                    "ADMIN_PASSWORD is required outside the {DEVELOPMENT} environment"
                ));
            }
        };

        let cors_origins =
            parse_cors_origins(&get("CORS_ORIGINS").unwrap_or_else(|| "*".to_string()));
        let log_level = get("LOG_LEVEL")
            .or_else(|| get("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());
        let http_request_body_limit_bytes = parse_positive(
            get("HTTP_REQUEST_BODY_LIMIT_BYTES"),
            "HTTP_REQUEST_BODY_LIMIT_BYTES",
            1024 * 1024,
        )?;
        let http_concurrency_limit =
            parse_positive(get("HTTP_CONCURRENCY_LIMIT"), "HTTP_CONCURRENCY_LIMIT", 256)?;
        let http_request_timeout_secs = parse_positive(
            get("HTTP_REQUEST_TIMEOUT_SECS"),
            "HTTP_REQUEST_TIMEOUT_SECS",
            10,
        )?;

        Ok(Self {
            http_addr,
            environment,
            admin_password,
            cors_origins,
            log_level,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == DEVELOPMENT
    }
}

fn parse_cors_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_positive<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value = raw
        .parse::<T>()
        .map_err(|_| anyhow!("Failed to parse {key}, expecting positive integer"))?;

    if value == T::default() {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::Settings;

    fn settings_from(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_in_development() {
        let settings = settings_from(&[]).expect("defaults must be valid");

        assert_eq!(settings.http_addr, "0.0.0.0:3000");
        assert_eq!(settings.environment, "development");
        assert!(settings.is_development());
        assert_eq!(settings.admin_password, "admin123");
        assert_eq!(settings.cors_origins, vec!["*".to_string()]);
        assert_eq!(settings.http_concurrency_limit, 256);
        assert_eq!(settings.http_request_timeout_secs, 10);
    }

    #[test]
    fn port_and_http_addr() {
        let settings = settings_from(&[("PORT", "8081")]).expect("valid");
        assert_eq!(settings.http_addr, "0.0.0.0:8081");

        let settings =
            settings_from(&[("PORT", "8081"), ("HTTP_ADDR", "127.0.0.1:9000")]).expect("valid");
        assert_eq!(settings.http_addr, "127.0.0.1:9000");

        assert!(settings_from(&[("PORT", "not-a-port")]).is_err());
    }

    #[test]
    fn production_requires_admin_password() {
        assert!(settings_from(&[("APP_ENV", "production")]).is_err());

        let settings = settings_from(&[("NODE_ENV", "production"), ("ADMIN_PASSWORD", "s3cret")])
            .expect("valid");
        assert!(!settings.is_development());
        assert_eq!(settings.admin_password, "s3cret");
    }

    #[test]
    fn zero_limits_are_rejected() {
        assert!(settings_from(&[("HTTP_CONCURRENCY_LIMIT", "0")]).is_err());
        assert!(settings_from(&[("HTTP_REQUEST_TIMEOUT_SECS", "abc")]).is_err());
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let settings =
            settings_from(&[("CORS_ORIGINS", " http://a.test , ,http://b.test")]).expect("valid");
        assert_eq!(settings.cors_origins, vec!["http://a.test", "http://b.test"]);
    }
}
