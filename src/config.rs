use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "medintake";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address when `MEDINTAKE_BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8460";

/// Get the application data directory.
/// `MEDINTAKE_DATA_DIR` if set, otherwise `~/.medintake/`.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MEDINTAKE_DATA_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(".medintake")
}

/// Get the SQLite database path
pub fn database_path() -> PathBuf {
    data_dir().join("medintake.db")
}

/// Listen address for the HTTP server
pub fn bind_addr() -> Result<SocketAddr, std::net::AddrParseError> {
    std::env::var("MEDINTAKE_BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
}

/// Default tracing filter when `RUST_LOG` is unset
pub fn default_log_filter() -> String {
    format!("info,{APP_NAME}=debug")
}

/// Token-signing secret. `MEDINTAKE_TOKEN_SECRET` if set, otherwise a
/// random secret generated once and persisted under the data directory so
/// restarts do not invalidate issued tokens.
pub fn token_secret() -> std::io::Result<Vec<u8>> {
    if let Ok(secret) = std::env::var("MEDINTAKE_TOKEN_SECRET") {
        if !secret.is_empty() {
            return Ok(secret.into_bytes());
        }
    }

    let path = data_dir().join("token.secret");
    match std::fs::read(&path) {
        Ok(existing) if !existing.is_empty() => return Ok(existing),
        _ => {}
    }

    let fresh: [u8; 32] = rand::random();
    std::fs::create_dir_all(data_dir())?;
    std::fs::write(&path, fresh)?;
    Ok(fresh.to_vec())
}

/// Admin bootstrap credentials, when both env vars are set and non-empty.
pub fn admin_seed() -> Option<(String, String)> {
    let email = std::env::var("MEDINTAKE_ADMIN_EMAIL").ok()?;
    let password = std::env::var("MEDINTAKE_ADMIN_PASSWORD").ok()?;
    if email.trim().is_empty() || password.is_empty() {
        return None;
    }
    Some((email, password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_path_under_data_dir() {
        let db = database_path();
        assert!(db.starts_with(data_dir()));
        assert!(db.ends_with("medintake.db"));
    }

    #[test]
    fn default_bind_addr_parses() {
        let addr: SocketAddr = DEFAULT_BIND_ADDR.parse().unwrap();
        assert_eq!(addr.port(), 8460);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }
}
