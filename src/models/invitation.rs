use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Linea;

/// Vigencia de una invitación desde su emisión
pub const INVITATION_TTL_DAYS: i64 = 7;

/// Invitación de un solo uso que pre-aprovisiona una cuenta
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub token: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub linea_asignada: Option<Linea>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub used: bool,
}

impl Invitation {
    /// Vencimiento efectivo: `expires_at`, o emisión + 7 días si el backend no lo envía
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .or_else(|| self.created_at.map(|issued| issued + Duration::days(INVITATION_TTL_DAYS)))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry().map(|expiry| now >= expiry).unwrap_or(false)
    }

    /// Consumida o vencida: no se puede aceptar
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired(now)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateInvitationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linea_asignada: Option<Linea>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct InvitationCreated {
    #[serde(default)]
    pub token: Option<String>,
    pub invitation_link: String,
}
