// ============================================================================
// SESSION STATE - Identidad + token, única fuente de verdad de la sesión
// ============================================================================

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::access::Permissions;
use crate::models::Identity;
use crate::state::reactivity::ReactiveState;
use crate::utils::constants::SESSION_STORAGE_KEY;
use crate::utils::storage::{load_json, save_json, KeyValueStore};

/// Sesión autenticada (lo que se persiste en localStorage)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub identity: Identity,
    pub token: String,
}

// El token nunca aparece en logs
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("token", &"***")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session: Option<Session>,
    /// `true` hasta que se leyó la sesión persistida
    pub loading: bool,
    /// Se incrementa en cada cambio de sesión (login, logout, restore)
    pub epoch: u64,
}

/// Estado de sesión compartido (handles `Rc`, clonar es barato)
#[derive(Clone)]
pub struct SessionState {
    inner: ReactiveState<SessionSnapshot>,
    storage: Rc<dyn KeyValueStore>,
}

impl SessionState {
    /// Crear estado de sesión en `loading`, sin sesión
    pub fn new(storage: Rc<dyn KeyValueStore>) -> Self {
        Self {
            inner: ReactiveState::new(SessionSnapshot {
                session: None,
                loading: true,
                epoch: 0,
            }),
            storage,
        }
    }

    /// Rehidratar desde storage; registros corruptos se descartan
    pub fn restore(&self) {
        let restored = match load_json::<Session>(self.storage.as_ref(), SESSION_STORAGE_KEY) {
            Ok(Some(session)) => {
                log::info!("💾 [SESSION] Sesión restaurada para {}", session.identity.username);
                Some(session)
            }
            Ok(None) => {
                log::info!("ℹ️ [SESSION] No hay sesión guardada");
                None
            }
            Err(e) => {
                log::warn!("⚠️ [SESSION] Sesión guardada corrupta, descartando: {}", e);
                self.storage.remove(SESSION_STORAGE_KEY);
                None
            }
        };

        self.inner.update(|snapshot| {
            if restored.is_some() || snapshot.session.is_some() {
                snapshot.epoch += 1;
            }
            snapshot.session = restored;
            snapshot.loading = false;
        });
    }

    /// Establecer sesión (login, registro, aceptación de invitación)
    pub fn establish(&self, session: Session) {
        if let Err(e) = save_json(self.storage.as_ref(), SESSION_STORAGE_KEY, &session) {
            // La sesión sigue válida en memoria, solo no sobrevive un reload
            log::error!("❌ [SESSION] Error guardando sesión: {}", e);
        }
        log::info!(
            "🔐 [SESSION] Sesión iniciada: {} ({})",
            session.identity.username,
            session.identity.role
        );
        self.inner.update(|snapshot| {
            snapshot.session = Some(session);
            snapshot.loading = false;
            snapshot.epoch += 1;
        });
    }

    /// Cerrar sesión (idempotente)
    pub fn logout(&self) {
        self.storage.remove(SESSION_STORAGE_KEY);
        let had_session = self.inner.with(|snapshot| snapshot.session.is_some());
        if !had_session {
            return;
        }
        log::info!("👋 [SESSION] Logout");
        self.inner.update(|snapshot| {
            snapshot.session = None;
            snapshot.loading = false;
            snapshot.epoch += 1;
        });
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.get()
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.with(|snapshot| snapshot.session.clone())
    }

    pub fn identity(&self) -> Option<Identity> {
        self.inner
            .with(|snapshot| snapshot.session.as_ref().map(|s| s.identity.clone()))
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .with(|snapshot| snapshot.session.as_ref().map(|s| s.token.clone()))
    }

    pub fn is_loading(&self) -> bool {
        self.inner.with(|snapshot| snapshot.loading)
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.with(|snapshot| snapshot.session.is_some())
    }

    pub fn epoch(&self) -> u64 {
        self.inner.with(|snapshot| snapshot.epoch)
    }

    /// Headers de autorización; vacío sin sesión (anónimo, no es error)
    pub fn auth_headers(&self) -> Vec<(String, String)> {
        match self.token() {
            Some(token) => vec![("Authorization".to_string(), format!("Bearer {}", token))],
            None => Vec::new(),
        }
    }

    /// Permisos derivados de la sesión actual (se recalculan en cada lectura)
    pub fn permissions(&self) -> Permissions {
        Permissions::for_identity(self.identity().as_ref())
    }

    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.inner.subscribe(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Linea, Role};
    use crate::utils::storage::MemoryStorage;
    use std::cell::Cell;

    fn emisor_session() -> Session {
        Session {
            identity: Identity {
                id: "u1".to_string(),
                username: "mgomez".to_string(),
                role: Role::EmisorReclamo,
                assigned_line: Some(Linea::B),
            },
            token: "tok-abc".to_string(),
        }
    }

    #[test]
    fn starts_loading_until_restored() {
        let state = SessionState::new(Rc::new(MemoryStorage::new()));
        assert!(state.is_loading());
        state.restore();
        assert!(!state.is_loading());
        assert!(!state.is_authenticated());
    }

    #[test]
    fn session_survives_reload_through_storage() {
        let storage = Rc::new(MemoryStorage::new());
        SessionState::new(storage.clone()).establish(emisor_session());

        let reloaded = SessionState::new(storage);
        reloaded.restore();
        assert_eq!(reloaded.session(), Some(emisor_session()));
    }

    #[test]
    fn corrupt_record_is_discarded_on_restore() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set(SESSION_STORAGE_KEY, "{\"identity\":").unwrap();
        let state = SessionState::new(storage.clone());
        state.restore();
        assert!(!state.is_authenticated());
        assert!(!storage.contains(SESSION_STORAGE_KEY));
    }

    #[test]
    fn logout_is_idempotent_and_evicts_token() {
        let storage = Rc::new(MemoryStorage::new());
        let state = SessionState::new(storage.clone());
        state.establish(emisor_session());
        let notifications = Rc::new(Cell::new(0));
        let counter = notifications.clone();
        state.subscribe(move || counter.set(counter.get() + 1));

        state.logout();
        state.logout();

        assert_eq!(notifications.get(), 1);
        assert!(!storage.contains(SESSION_STORAGE_KEY));
        assert!(state.auth_headers().is_empty());
    }

    #[test]
    fn auth_headers_carry_bearer_token() {
        let state = SessionState::new(Rc::new(MemoryStorage::new()));
        state.establish(emisor_session());
        assert_eq!(
            state.auth_headers(),
            vec![("Authorization".to_string(), "Bearer tok-abc".to_string())]
        );
    }

    #[test]
    fn every_session_change_bumps_epoch() {
        let state = SessionState::new(Rc::new(MemoryStorage::new()));
        let start = state.epoch();
        state.establish(emisor_session());
        let after_login = state.epoch();
        state.logout();
        assert!(after_login > start);
        assert!(state.epoch() > after_login);
    }

    #[test]
    fn subscribers_see_new_session_synchronously() {
        let state = SessionState::new(Rc::new(MemoryStorage::new()));
        let seen_admin = Rc::new(Cell::new(false));
        let (reader, flag) = (state.clone(), seen_admin.clone());
        state.subscribe(move || flag.set(reader.permissions().can_manage_users));

        let mut admin = emisor_session();
        admin.identity.role = Role::Admin;
        state.establish(admin);

        assert!(seen_admin.get());
    }

    #[test]
    fn debug_output_hides_token() {
        let rendered = format!("{:?}", emisor_session());
        assert!(!rendered.contains("tok-abc"));
    }
}
