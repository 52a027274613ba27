// ============================================================================
// SESSION VIEWMODEL - LÓGICA DE SESIÓN
// ============================================================================
// Login, registro, logout y cambio de contraseña.
// Validación local siempre antes de tocar la red.
// ============================================================================

use crate::error::{AppError, AppResult};
use crate::models::{ChangePasswordRequest, Identity, RegisterRequest, TokenResponse};
use crate::services::ApiClient;
use crate::state::Session;
use crate::utils::validation::{
    require_non_blank, validate_new_account, validate_password, validate_password_confirmation,
};

/// ViewModel de sesión
#[derive(Clone)]
pub struct SessionViewModel {
    api: ApiClient,
}

impl SessionViewModel {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn establish(&self, response: TokenResponse) -> Identity {
        let identity = Identity::from(&response.user);
        self.api.session().establish(Session {
            identity: identity.clone(),
            token: response.access_token,
        });
        identity
    }

    pub async fn login(&self, username: &str, password: &str) -> AppResult<Identity> {
        require_non_blank(username, "usuario")?;
        require_non_blank(password, "contraseña")?;

        let response = self.api.login(username.trim(), password).await.map_err(|e| match e {
            AppError::Auth(detail) if detail.is_empty() => {
                AppError::Auth("Usuario o contraseña incorrectos".to_string())
            }
            other => other,
        })?;
        let identity = self.establish(response);
        log::info!("✅ [LOGIN] Bienvenido {}", identity.username);
        Ok(identity)
    }

    /// Registro: la cuenta nace como EMISOR_RECLAMO sin línea
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirmation: &str,
    ) -> AppResult<Identity> {
        validate_password_confirmation(password, confirmation)?;
        validate_new_account(username, email, password)?;

        let body = RegisterRequest {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = self.api.register(&body).await?;
        let identity = self.establish(response);
        log::info!("✅ [REGISTER] Cuenta creada: {}", identity.username);
        Ok(identity)
    }

    pub fn logout(&self) {
        self.api.session().logout();
    }

    pub async fn change_password(&self, current: &str, new: &str, confirmation: &str) -> AppResult<()> {
        require_non_blank(current, "contraseña actual")?;
        validate_password(new)?;
        validate_password_confirmation(new, confirmation)?;
        if new == current {
            return Err(AppError::Validation(
                "La nueva contraseña debe ser diferente a la actual".to_string(),
            ));
        }

        let body = ChangePasswordRequest {
            current_password: current.to_string(),
            new_password: new.to_string(),
        };
        self.api.change_password(&body).await?;
        log::info!("🔑 [SESSION] Contraseña actualizada");
        Ok(())
    }
}
