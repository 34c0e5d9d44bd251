use std::{env, fmt::Display, str::FromStr};

use tracing::info;

/// Runtime configuration, collected once at startup so handlers never
/// touch the environment directly.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub upload_dir: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: load_or("PORT", "3000"),
            database_url: require("DATABASE_URL"),
            max_connections: load_or("DATABASE_MAX_CONNECTIONS", "5"),
            jwt_secret: require("JWT_SECRET"),
            token_ttl_hours: load_or("TOKEN_TTL_HOURS", "24"),
            upload_dir: load_or("UPLOAD_DIR", "uploads"),
        }
    }
}

fn require(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} must be set"))
}

fn load_or<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .unwrap_or_else(|e| panic!("invalid {key} value {raw:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_or_falls_back_to_default() {
        let port: u16 = load_or("BLOGD_TEST_UNSET_PORT", "3000");
        assert_eq!(port, 3000);
    }

    #[test]
    fn load_or_reads_env() {
        env::set_var("BLOGD_TEST_SET_PORT", "8080");
        let port: u16 = load_or("BLOGD_TEST_SET_PORT", "3000");
        assert_eq!(port, 8080);
    }
}
