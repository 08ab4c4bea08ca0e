use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub map: MapConfig,
    pub sessions: SessionConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// Configuration for the tile-based map surface and its access token.
///
/// The portal both issues the token (`GET /api/map/token`, backed by
/// `access_token`) and consumes it through `token_url`, which may point at
/// this service or at a separate token-issuing endpoint.
#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Token served by the issuing endpoint. `None` makes the endpoint answer 503.
    pub access_token: Option<String>,
    /// Endpoint the tile surface fetches its token from
    pub token_url: String,
    /// Tile image URL template with `{z}`, `{x}`, `{y}` and `{token}` placeholders
    pub tile_url_template: String,
    pub token_timeout: Duration,
    pub default_zoom: u8,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub idle_timeout: Duration,
    pub sweep_interval: Duration,
    pub max_sessions: usize,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let app = AppConfig::from_env()?;
        let map = MapConfig::from_env(&app)?;

        Ok(Config {
            app,
            map,
            sessions: SessionConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl MapConfig {
    const DEFAULT_TILE_URL_TEMPLATE: &'static str =
        "https://api.mapbox.com/styles/v1/mapbox/light-v11/tiles/256/{z}/{x}/{y}?access_token={token}";
    const DEFAULT_TOKEN_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_ZOOM: u8 = 6;

    pub fn from_env(app: &AppConfig) -> Result<Self, String> {
        let access_token = env::var("MAP_ACCESS_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty());

        // Defaults to the issuing endpoint served by this process
        let token_url = env::var("MAP_TOKEN_URL")
            .unwrap_or_else(|_| format!("http://{}/api/map/token", app.server_address()));

        let tile_url_template = env::var("MAP_TILE_URL_TEMPLATE")
            .unwrap_or_else(|_| Self::DEFAULT_TILE_URL_TEMPLATE.to_string());
        if !tile_url_template.contains("{token}") {
            return Err("MAP_TILE_URL_TEMPLATE must contain a {token} placeholder".to_string());
        }

        let token_timeout_secs = env::var("MAP_TOKEN_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TOKEN_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "MAP_TOKEN_TIMEOUT_SECS must be a valid number".to_string())?;

        let default_zoom = env::var("MAP_DEFAULT_ZOOM")
            .unwrap_or_else(|_| Self::DEFAULT_ZOOM.to_string())
            .parse::<u8>()
            .map_err(|_| "MAP_DEFAULT_ZOOM must be a valid number".to_string())?;
        if default_zoom > 22 {
            return Err("MAP_DEFAULT_ZOOM must be between 0 and 22".to_string());
        }

        Ok(Self {
            access_token,
            token_url,
            tile_url_template,
            token_timeout: Duration::from_secs(token_timeout_secs),
            default_zoom,
        })
    }
}

impl SessionConfig {
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 1800; // 30 minutes
    const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
    const DEFAULT_MAX_SESSIONS: usize = 10_000;

    pub fn from_env() -> Result<Self, String> {
        let idle_timeout_secs = env::var("SESSION_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SESSION_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let sweep_interval_secs = env::var("SESSION_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_SWEEP_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SESSION_SWEEP_INTERVAL_SECS must be a valid number".to_string())?;
        if sweep_interval_secs == 0 {
            return Err("SESSION_SWEEP_INTERVAL_SECS must be greater than zero".to_string());
        }

        let max_sessions = env::var("MAX_SESSIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_SESSIONS.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_SESSIONS must be a valid number".to_string())?;

        Ok(Self {
            idle_timeout: Duration::from_secs(idle_timeout_secs),
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            max_sessions,
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(Self::DEFAULT_IDLE_TIMEOUT_SECS),
            sweep_interval: Duration::from_secs(Self::DEFAULT_SWEEP_INTERVAL_SECS),
            max_sessions: Self::DEFAULT_MAX_SESSIONS,
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Portail des Territoires API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Provinces, departments and synchronized map view sessions".to_string()
        });

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swagger_credentials_require_both_parts() {
        let mut swagger = SwaggerConfig {
            username: Some("admin".to_string()),
            password: None,
            title: "t".to_string(),
            version: "v".to_string(),
            description: "d".to_string(),
        };
        assert_eq!(swagger.credentials(), None);

        swagger.password = Some("secret".to_string());
        assert_eq!(swagger.credentials(), Some("admin:secret".to_string()));
    }

    #[test]
    fn test_server_address() {
        let app = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_allowed_origins: vec!["*".to_string()],
        };
        assert_eq!(app.server_address(), "0.0.0.0:8080");
    }
}
