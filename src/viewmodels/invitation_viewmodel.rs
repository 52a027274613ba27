// ============================================================================
// INVITATION VIEWMODEL - Flujo de aceptación de invitaciones
// ============================================================================
// LoadingInvitation → (Invalid | ValidPending) → Accepting → Accepted
// Un error al aceptar vuelve a ValidPending con el mensaje (reintentable).
// ============================================================================

use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::models::{Identity, Invitation};
use crate::services::ApiClient;
use crate::state::{ReactiveState, Session};

const INVITACION_INVALIDA: &str = "Invitación no válida o expirada";

#[derive(Clone, Debug, PartialEq)]
pub enum InvitationState {
    LoadingInvitation,
    /// Terminal: token inexistente, vencido o ya usado
    Invalid { reason: String },
    ValidPending {
        invitation: Invitation,
        error: Option<String>,
    },
    Accepting { invitation: Invitation },
    Accepted { invitation: Invitation },
}

#[derive(Clone)]
pub struct InvitationViewModel {
    api: ApiClient,
    token: String,
    state: ReactiveState<InvitationState>,
}

impl InvitationViewModel {
    pub fn new(api: ApiClient, token: &str) -> Self {
        Self {
            api,
            token: token.trim().to_string(),
            state: ReactiveState::new(InvitationState::LoadingInvitation),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn state(&self) -> InvitationState {
        self.state.get()
    }

    pub fn subscribe<F: Fn() + 'static>(&self, callback: F) {
        self.state.subscribe(callback);
    }

    pub async fn load(&self) -> InvitationState {
        self.state.set(InvitationState::LoadingInvitation);

        let next = if self.token.is_empty() {
            InvitationState::Invalid {
                reason: INVITACION_INVALIDA.to_string(),
            }
        } else {
            match self.api.get_invitation(&self.token).await {
                Ok(invitation) if invitation.is_usable(Utc::now()) => {
                    log::info!("✉️ [INVITACION] Invitación válida para {}", invitation.username);
                    InvitationState::ValidPending {
                        invitation,
                        error: None,
                    }
                }
                Ok(_) => {
                    log::warn!("⚠️ [INVITACION] Invitación vencida o usada");
                    InvitationState::Invalid {
                        reason: INVITACION_INVALIDA.to_string(),
                    }
                }
                Err(e) => {
                    log::warn!("⚠️ [INVITACION] No se pudo cargar: {}", e);
                    let reason = match e {
                        AppError::NotFound(detail) | AppError::Validation(detail) if !detail.is_empty() => detail,
                        _ => INVITACION_INVALIDA.to_string(),
                    };
                    InvitationState::Invalid { reason }
                }
            }
        };

        self.state.set(next.clone());
        next
    }

    /// Aceptar; fuera de ValidPending no hace nada y devuelve el estado actual
    pub async fn accept(&self) -> AppResult<InvitationState> {
        let invitation = match self.state.get() {
            InvitationState::ValidPending { invitation, .. } => invitation,
            other => return Ok(other),
        };

        self.state.set(InvitationState::Accepting {
            invitation: invitation.clone(),
        });

        match self.api.accept_invitation(&self.token).await {
            Ok(token_response) => {
                if let Some(response) = token_response {
                    self.api.session().establish(Session {
                        identity: Identity::from(&response.user),
                        token: response.access_token,
                    });
                }
                log::info!("🎉 [INVITACION] Cuenta activada: {}", invitation.username);
                let accepted = InvitationState::Accepted { invitation };
                self.state.set(accepted.clone());
                Ok(accepted)
            }
            Err(e) => {
                let message = match &e {
                    AppError::Network(_) => e.user_message(),
                    AppError::Validation(detail)
                    | AppError::NotFound(detail)
                    | AppError::Permission(detail)
                    | AppError::Auth(detail)
                        if !detail.is_empty() =>
                    {
                        detail.clone()
                    }
                    _ => "Error al activar la cuenta".to_string(),
                };
                log::error!("❌ [INVITACION] Error aceptando: {}", e);
                self.state.set(InvitationState::ValidPending {
                    invitation,
                    error: Some(message.clone()),
                });
                Err(AppError::Acceptance(message))
            }
        }
    }
}
