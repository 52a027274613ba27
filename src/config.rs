use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_url_development: String,
    pub backend_url_production: String,
    pub environment: String,
    pub enable_logging: bool,
    /// Intervalo de polling del contador de notificaciones no leídas
    pub notification_poll_ms: u32,
    /// Origen público usado para armar links de invitación
    pub public_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url_development: "http://localhost:8001".to_string(),
            backend_url_production: "https://reclamos.uta.org.ar".to_string(),
            environment: "development".to_string(),
            enable_logging: true,
            notification_poll_ms: 30_000,
            public_origin: "http://localhost:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend_url_development: option_env!("BACKEND_URL_DEVELOPMENT")
                .map(|s| s.to_string())
                .unwrap_or(defaults.backend_url_development),
            backend_url_production: option_env!("BACKEND_URL_PRODUCTION")
                .map(|s| s.to_string())
                .unwrap_or(defaults.backend_url_production),
            environment: option_env!("ENVIRONMENT")
                .map(|s| s.to_string())
                .unwrap_or(defaults.environment),
            enable_logging: option_env!("ENABLE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enable_logging),
            notification_poll_ms: option_env!("NOTIFICATION_POLL_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.notification_poll_ms),
            public_origin: option_env!("PUBLIC_ORIGIN")
                .map(|s| s.to_string())
                .unwrap_or(defaults.public_origin),
        }
    }

    /// Obtiene la URL del backend según el entorno actual
    pub fn backend_url(&self) -> &str {
        match self.environment.as_str() {
            "production" => &self.backend_url_production,
            _ => &self.backend_url_development,
        }
    }

    /// Base de la API REST (`{backend}/api`)
    pub fn api_url(&self) -> String {
        format!("{}/api", self.backend_url().trim_end_matches('/'))
    }

    /// Verifica si el modo de logging está habilitado
    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }
}

// Configuración global estática
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}
