use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Linea;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "EMISOR_RECLAMO")]
    EmisorReclamo,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::EmisorReclamo => "EMISOR_RECLAMO",
        }
    }

    pub fn etiqueta(&self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::EmisorReclamo => "Emisor de reclamos",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Role> {
        match value.trim() {
            "ADMIN" => Some(Role::Admin),
            "EMISOR_RECLAMO" => Some(Role::EmisorReclamo),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usuario tal como lo devuelve el backend (`/users`, `/auth/*`)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Usuario {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub linea_asignada: Option<Linea>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}
