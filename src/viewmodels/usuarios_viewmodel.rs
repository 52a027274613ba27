// ============================================================================
// USUARIOS VIEWMODEL - Administración de usuarios e invitaciones (ADMIN)
// ============================================================================
// Mutaciones serializadas por usuario: mientras hay un request de rol/línea/
// borrado en vuelo para U, cualquier otra mutación de U devuelve Busy.
// Las contraseñas nunca se guardan en el estado de éxito.
// ============================================================================

use crate::config::CONFIG;
use crate::error::{AppError, AppResult};
use crate::models::{CreateInvitationRequest, CreateUserRequest, Linea, Role, Usuario};
use crate::services::ApiClient;
use crate::state::{InFlight, ReactiveState};
use crate::utils::validation::validate_new_account;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NuevoUsuarioForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InvitacionForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub linea: Option<Linea>,
}

#[derive(Clone)]
pub struct UsuariosViewModel {
    api: ApiClient,
    users: ReactiveState<Vec<Usuario>>,
    in_flight: InFlight,
}

impl UsuariosViewModel {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            users: ReactiveState::new(Vec::new()),
            in_flight: InFlight::new(),
        }
    }

    pub fn users(&self) -> Vec<Usuario> {
        self.users.get()
    }

    pub fn subscribe<F: Fn() + 'static>(&self, callback: F) {
        self.users.subscribe(callback);
    }

    /// ¿Hay una mutación en curso para este usuario? (deshabilita controles)
    pub fn is_busy(&self, user_id: &str) -> bool {
        self.in_flight.contains(user_id)
    }

    fn require_admin(&self) -> AppResult<()> {
        if !self.api.session().permissions().can_manage_users {
            return Err(AppError::Permission("Solo un administrador puede gestionar usuarios".to_string()));
        }
        Ok(())
    }

    fn replace_row(&self, usuario: Usuario) {
        self.users.update(|users| {
            if let Some(row) = users.iter_mut().find(|u| u.id == usuario.id) {
                *row = usuario;
            }
        });
    }

    fn row(&self, user_id: &str) -> Option<Usuario> {
        self.users.with(|users| users.iter().find(|u| u.id == user_id).cloned())
    }

    pub async fn load(&self) -> AppResult<Vec<Usuario>> {
        self.require_admin()?;
        let users = self.api.list_users().await?;
        log::info!("👥 [USUARIOS] {} usuarios", users.len());
        self.users.set(users.clone());
        Ok(users)
    }

    /// Alta directa; devuelve solo el nombre de usuario creado
    pub async fn create_user(&self, form: NuevoUsuarioForm) -> AppResult<String> {
        self.require_admin()?;
        validate_new_account(&form.username, &form.email, &form.password)?;

        let body = CreateUserRequest {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password,
        };
        let created = self.api.create_user(&body).await?;
        log::info!("✅ [USUARIOS] Usuario {} creado", body.username);
        match created {
            Some(usuario) => self.users.update(|users| users.push(usuario)),
            None => {
                self.load().await?;
            }
        }
        Ok(body.username)
    }

    pub async fn change_role(&self, user_id: &str, role: Role) -> AppResult<Usuario> {
        self.require_admin()?;
        let _guard = self.in_flight.acquire(user_id)?;
        self.users.notify();

        let updated = self.api.change_role(user_id, role).await;
        let result = updated.map(|returned| {
            returned.or_else(|| {
                self.row(user_id).map(|mut u| {
                    u.role = role;
                    u
                })
            })
        });
        self.finish_mutation(user_id, result)
    }

    pub async fn assign_line(&self, user_id: &str, linea: Linea) -> AppResult<Usuario> {
        self.require_admin()?;
        let _guard = self.in_flight.acquire(user_id)?;
        self.users.notify();

        let updated = self.api.assign_line(user_id, linea).await;
        let result = updated.map(|returned| {
            returned.or_else(|| {
                self.row(user_id).map(|mut u| {
                    u.linea_asignada = Some(linea);
                    u
                })
            })
        });
        self.finish_mutation(user_id, result)
    }

    fn finish_mutation(&self, user_id: &str, result: AppResult<Option<Usuario>>) -> AppResult<Usuario> {
        match result {
            Ok(Some(usuario)) => {
                self.replace_row(usuario.clone());
                Ok(usuario)
            }
            Ok(None) => {
                self.users.notify();
                Err(AppError::NotFound(format!("usuario {}", user_id)))
            }
            Err(e) => {
                log::error!("❌ [USUARIOS] Error actualizando {}: {}", user_id, e);
                self.users.notify();
                Err(e)
            }
        }
    }

    pub async fn delete_user(&self, user_id: &str) -> AppResult<()> {
        self.require_admin()?;
        if self.api.session().identity().map(|i| i.id) == Some(user_id.to_string()) {
            return Err(AppError::Validation("No podés eliminar tu propio usuario".to_string()));
        }
        let _guard = self.in_flight.acquire(user_id)?;
        self.users.notify();

        match self.api.delete_user(user_id).await {
            Ok(()) => {
                log::info!("🗑️ [USUARIOS] Usuario {} eliminado", user_id);
                self.users.update(|users| users.retain(|u| u.id != user_id));
                Ok(())
            }
            Err(e) => {
                self.users.notify();
                Err(e)
            }
        }
    }

    /// Genera una invitación y devuelve el link absoluto para compartir
    pub async fn generate_invitation(&self, form: InvitacionForm) -> AppResult<String> {
        if !self.api.session().permissions().can_generate_invitations {
            return Err(AppError::Permission("Solo un administrador puede invitar".to_string()));
        }
        validate_new_account(&form.username, &form.email, &form.password)?;

        let body = CreateInvitationRequest {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password,
            linea_asignada: form.linea,
        };
        let created = self.api.create_invitation(&body).await?;
        log::info!("✉️ [USUARIOS] Invitación generada para {}", body.username);
        Ok(absolute_link(&created.invitation_link, &CONFIG.public_origin))
    }
}

/// Links relativos (`/invitacion/tok`) se completan con el origen público
pub fn absolute_link(link: &str, origin: &str) -> String {
    if link.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), link)
    } else {
        link.to_string()
    }
}
