use serde::{Deserialize, Serialize};

use super::{Linea, Role, Usuario};

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Respuesta de `/auth/login` y `/auth/register`
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: Usuario,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Identidad autenticada que guarda la sesión
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub assigned_line: Option<Linea>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&Usuario> for Identity {
    fn from(usuario: &Usuario) -> Self {
        Self {
            id: usuario.id.clone(),
            username: usuario.username.clone(),
            role: usuario.role,
            assigned_line: usuario.linea_asignada,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_builds_identity() {
        let json = r#"{
            "access_token": "tok-123",
            "token_type": "bearer",
            "user": {"id": "u1", "username": "mgomez", "role": "EMISOR_RECLAMO", "linea_asignada": "D"}
        }"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        let identity = Identity::from(&response.user);
        assert_eq!(identity.role, Role::EmisorReclamo);
        assert_eq!(identity.assigned_line, Some(Linea::D));
        assert!(!identity.is_admin());
    }

    #[test]
    fn null_line_means_unassigned() {
        let json = r#"{"id": "u2", "username": "nuevo", "role": "EMISOR_RECLAMO", "linea_asignada": null}"#;
        let usuario: Usuario = serde_json::from_str(json).unwrap();
        assert_eq!(Identity::from(&usuario).assigned_line, None);
    }
}
