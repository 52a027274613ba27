// ============================================================================
// API CLIENT - SOLO COMUNICACIÓN HTTP
// ============================================================================
// NO tiene lógica de negocio: arma requests, adjunta el token de la sesión
// (leído al momento de enviar) y mapea status HTTP a AppError.
// ============================================================================

use std::rc::Rc;

use serde::de::DeserializeOwned;

use crate::config::CONFIG;
use crate::error::{AppError, AppResult};
use crate::models::{
    ArchivoSubido, ChangePasswordRequest, ComentarioAgregado, ComentarioCreate, CreateInvitationRequest,
    CreateUserRequest, Estadisticas, Invitation, InvitationCreated, Linea, LoginRequest,
    Notification, Reclamo, ReclamoCreate, ReclamoFilters, ReclamoUpdate, RegisterRequest, Role,
    TokenResponse, UnreadCount, Usuario,
};
use crate::services::http::{
    GlooTransport, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MultipartFile,
};
use crate::state::SessionState;

/// Cliente API
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Rc<dyn HttpTransport>,
    session: SessionState,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, transport: Rc<dyn HttpTransport>, session: SessionState) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            session,
        }
    }

    /// Cliente del navegador contra `CONFIG.api_url()`
    pub fn browser(session: SessionState) -> Self {
        Self::new(CONFIG.api_url(), Rc::new(GlooTransport), session)
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}{}", self.base_url, path))
            .headers(self.session.auth_headers())
    }

    async fn execute(&self, request: HttpRequest) -> AppResult<HttpResponse> {
        let carried_token = request.carries_token();
        let epoch = self.session.epoch();
        let method = request.method;
        let url = request.url.clone();

        let response = self.transport.send(request).await.map_err(|e| {
            log::error!("❌ [API] {:?} {} falló: {}", method, url, e);
            e
        })?;

        if response.is_success() {
            return Ok(response);
        }

        let detail = response.detail();
        log::warn!("⚠️ [API] {:?} {} → HTTP {}", method, url, response.status);
        let error = match response.status {
            401 => {
                // Solo invalida la sesión con la que se hizo el request
                if carried_token && self.session.epoch() == epoch {
                    log::warn!("🔒 [API] Token rechazado, cerrando sesión");
                    self.session.logout();
                }
                AppError::Auth(detail.unwrap_or_default())
            }
            403 => AppError::Permission(detail.unwrap_or_else(|| "Acceso denegado".to_string())),
            404 => AppError::NotFound(detail.unwrap_or_else(|| "Recurso no encontrado".to_string())),
            400 | 409 | 422 => {
                AppError::Validation(detail.unwrap_or_else(|| "Datos inválidos".to_string()))
            }
            status => AppError::Server {
                status,
                message: detail.unwrap_or_else(|| "Error inesperado".to_string()),
            },
        };
        Err(error)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: HttpRequest) -> AppResult<T> {
        self.execute(request).await?.json()
    }

    /// Listados: un registro que no decodifica se descarta sin perder el resto
    async fn fetch_list<T: DeserializeOwned>(&self, request: HttpRequest) -> AppResult<Vec<T>> {
        let rows: Vec<serde_json::Value> = self.fetch(request).await?;
        let total = rows.len();
        let items: Vec<T> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(item) => Some(item),
                Err(e) => {
                    log::warn!("⚠️ [API] Registro descartado: {}", e);
                    None
                }
            })
            .collect();
        if items.len() < total {
            log::warn!("⚠️ [API] {} de {} registros no se pudieron leer", total - items.len(), total);
        }
        Ok(items)
    }

    // ------------------------------------------------------------------------
    // AUTH
    // ------------------------------------------------------------------------

    pub async fn login(&self, username: &str, password: &str) -> AppResult<TokenResponse> {
        log::info!("🔐 [API] Login para usuario: {}", username);
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request = HttpRequest::new(HttpMethod::Post, format!("{}/auth/login", self.base_url)).json(&body)?;
        self.fetch(request).await
    }

    pub async fn register(&self, body: &RegisterRequest) -> AppResult<TokenResponse> {
        log::info!("📝 [API] Registro de usuario: {}", body.username);
        let request = HttpRequest::new(HttpMethod::Post, format!("{}/auth/register", self.base_url)).json(body)?;
        self.fetch(request).await
    }

    pub async fn change_password(&self, body: &ChangePasswordRequest) -> AppResult<()> {
        let request = self.request(HttpMethod::Patch, "/users/me/password").json(body)?;
        self.execute(request).await.map(|_| ())
    }

    // ------------------------------------------------------------------------
    // RECLAMOS
    // ------------------------------------------------------------------------

    pub async fn list_reclamos(&self, filters: &ReclamoFilters) -> AppResult<Vec<Reclamo>> {
        let request = self.request(HttpMethod::Get, "/reclamos").query(filters.to_query());
        let reclamos: Vec<Reclamo> = self.fetch_list(request).await?;
        log::info!("📋 [API] {} reclamos obtenidos", reclamos.len());
        Ok(reclamos)
    }

    pub async fn get_reclamo(&self, id: &str) -> AppResult<Reclamo> {
        self.fetch(self.request(HttpMethod::Get, &format!("/reclamos/{}", id))).await
    }

    pub async fn create_reclamo(&self, body: &ReclamoCreate) -> AppResult<Reclamo> {
        let request = self.request(HttpMethod::Post, "/reclamos").json(body)?;
        self.fetch(request).await
    }

    pub async fn update_reclamo(&self, id: &str, body: &ReclamoUpdate) -> AppResult<Reclamo> {
        let request = self.request(HttpMethod::Patch, &format!("/reclamos/{}", id)).json(body)?;
        self.fetch(request).await
    }

    pub async fn add_comentario(&self, id: &str, body: &ComentarioCreate) -> AppResult<ComentarioAgregado> {
        let request = self
            .request(HttpMethod::Post, &format!("/reclamos/{}/comentarios", id))
            .json(body)?;
        self.fetch(request).await
    }

    pub async fn upload_archivo(&self, id: &str, file: MultipartFile) -> AppResult<ArchivoSubido> {
        log::info!("📎 [API] Subiendo {} ({} bytes)", file.file_name, file.bytes.len());
        let request = self
            .request(HttpMethod::Post, &format!("/reclamos/{}/archivos", id))
            .multipart("file", file);
        self.fetch(request).await
    }

    pub async fn estadisticas(&self) -> AppResult<Estadisticas> {
        self.fetch(self.request(HttpMethod::Get, "/estadisticas")).await
    }

    // ------------------------------------------------------------------------
    // USUARIOS
    // ------------------------------------------------------------------------

    pub async fn list_users(&self) -> AppResult<Vec<Usuario>> {
        self.fetch_list(self.request(HttpMethod::Get, "/users")).await
    }

    pub async fn create_user(&self, body: &CreateUserRequest) -> AppResult<Option<Usuario>> {
        let request = self.request(HttpMethod::Post, "/users/create").json(body)?;
        Ok(self.execute(request).await?.json().ok())
    }

    /// Devuelve el usuario actualizado si el backend lo incluye en la respuesta
    pub async fn change_role(&self, user_id: &str, role: Role) -> AppResult<Option<Usuario>> {
        let request = self
            .request(HttpMethod::Patch, &format!("/users/{}/role", user_id))
            .query(vec![("role".to_string(), role.as_str().to_string())]);
        Ok(self.execute(request).await?.json().ok())
    }

    pub async fn assign_line(&self, user_id: &str, linea: Linea) -> AppResult<Option<Usuario>> {
        let request = self
            .request(HttpMethod::Patch, &format!("/users/{}/assign-line", user_id))
            .query(vec![("linea".to_string(), linea.id().to_string())]);
        Ok(self.execute(request).await?.json().ok())
    }

    pub async fn delete_user(&self, user_id: &str) -> AppResult<()> {
        self.execute(self.request(HttpMethod::Delete, &format!("/users/{}", user_id)))
            .await
            .map(|_| ())
    }

    // ------------------------------------------------------------------------
    // INVITACIONES
    // ------------------------------------------------------------------------

    pub async fn create_invitation(&self, body: &CreateInvitationRequest) -> AppResult<InvitationCreated> {
        let request = self.request(HttpMethod::Post, "/invitations/create").json(body)?;
        self.fetch(request).await
    }

    pub async fn get_invitation(&self, token: &str) -> AppResult<Invitation> {
        let url = format!("{}/invitations/{}", self.base_url, token);
        self.fetch(HttpRequest::new(HttpMethod::Get, url)).await
    }

    /// Si el backend devuelve un token, la sesión queda iniciada
    pub async fn accept_invitation(&self, token: &str) -> AppResult<Option<TokenResponse>> {
        let url = format!("{}/invitations/{}/accept", self.base_url, token);
        let response = self.execute(HttpRequest::new(HttpMethod::Post, url)).await?;
        Ok(response.json().ok())
    }

    // ------------------------------------------------------------------------
    // NOTIFICACIONES
    // ------------------------------------------------------------------------

    pub async fn list_notifications(&self) -> AppResult<Vec<Notification>> {
        self.fetch_list(self.request(HttpMethod::Get, "/notifications")).await
    }

    pub async fn unread_count(&self) -> AppResult<u32> {
        let count: UnreadCount = self
            .fetch(self.request(HttpMethod::Get, "/notifications/unread/count"))
            .await?;
        Ok(count.count)
    }

    pub async fn mark_notification_read(&self, id: &str) -> AppResult<()> {
        self.execute(self.request(HttpMethod::Patch, &format!("/notifications/{}/read", id)))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Estado;
    use crate::test_support::{admin_session, emisor_session, json_reply, reclamo, Harness, Reply};
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn attaches_bearer_token_read_at_send_time() {
        let harness = Harness::new(|_| json_reply(200, json!([])));
        harness.session.establish(emisor_session(Some(Linea::A)));
        block_on(harness.api.list_reclamos(&ReclamoFilters::default())).unwrap();

        let sent = harness.transport.requests();
        assert!(sent[0].carries_token());
        assert!(sent[0].url.ends_with("/api/reclamos"));
    }

    #[test]
    fn logout_then_protected_fetch_uses_empty_auth_headers() {
        let harness = Harness::new(|_| json_reply(200, json!([])));
        harness.session.establish(emisor_session(Some(Linea::A)));
        harness.session.logout();
        block_on(harness.api.list_reclamos(&ReclamoFilters::default())).unwrap();

        let sent = harness.transport.requests();
        assert!(sent[0].headers.is_empty());
    }

    #[test]
    fn unauthorized_with_token_forces_logout() {
        let harness = Harness::new(|_| json_reply(401, json!({"detail": "Token inválido"})));
        harness.session.establish(emisor_session(Some(Linea::C)));

        let err = block_on(harness.api.list_reclamos(&ReclamoFilters::default())).unwrap_err();

        assert_eq!(err, AppError::Auth("Token inválido".to_string()));
        assert!(!harness.session.is_authenticated());
    }

    #[test]
    fn failed_login_does_not_touch_session() {
        let harness = Harness::new(|_| json_reply(401, json!({"detail": "Credenciales incorrectas"})));
        let epoch = harness.session.epoch();

        let err = block_on(harness.api.login("x", "y")).unwrap_err();

        assert!(err.is_auth());
        assert_eq!(harness.session.epoch(), epoch);
    }

    #[test]
    fn maps_statuses_to_error_taxonomy() {
        let cases = [
            (403, AppError::Permission("no".to_string())),
            (404, AppError::NotFound("no".to_string())),
            (400, AppError::Validation("no".to_string())),
            (500, AppError::Server { status: 500, message: "no".to_string() }),
        ];
        for (status, expected) in cases {
            let harness = Harness::new(move |_| json_reply(status, json!({"detail": "no"})));
            let err = block_on(harness.api.get_reclamo("r1")).unwrap_err();
            assert_eq!(err, expected);
        }
    }

    #[test]
    fn transport_failure_is_network_error() {
        let harness = Harness::new(|_| Reply::Now(Err(AppError::Network("offline".to_string()))));
        let err = block_on(harness.api.estadisticas()).unwrap_err();
        assert!(matches!(err, AppError::Network(_)));
    }

    #[test]
    fn role_change_goes_in_query() {
        let harness = Harness::new(|_| json_reply(200, json!({"message": "ok"})));
        let updated = block_on(harness.api.change_role("u9", Role::Admin)).unwrap();

        assert_eq!(updated, None);
        let sent = harness.transport.requests();
        assert_eq!(sent[0].method, HttpMethod::Patch);
        assert!(sent[0].url.ends_with("/users/u9/role"));
        assert_eq!(sent[0].query, vec![("role".to_string(), "ADMIN".to_string())]);
    }

    #[test]
    fn upload_uses_file_field() {
        let harness = Harness::new(|_| json_reply(200, json!({"message": "Archivo subido", "url": "/uploads/a.pdf"})));
        let file = MultipartFile {
            file_name: "acta.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: vec![1, 2, 3],
        };
        let subido = block_on(harness.api.upload_archivo("r1", file)).unwrap();

        assert_eq!(subido.url, "/uploads/a.pdf");
        let sent = harness.transport.requests();
        assert!(matches!(&sent[0].body, crate::services::http::RequestBody::Multipart { field, .. } if field == "file"));
    }

    #[test]
    fn listing_skips_records_that_do_not_decode() {
        let valido = serde_json::to_value(reclamo("r1", Linea::A, Estado::Pendiente)).unwrap();
        let mut linea_rara = serde_json::to_value(reclamo("r2", Linea::B, Estado::Pendiente)).unwrap();
        linea_rara["linea"] = json!("Z");
        let mut estado_raro = serde_json::to_value(reclamo("r3", Linea::C, Estado::Pendiente)).unwrap();
        estado_raro["estado"] = json!("Archivado");
        let body = json!([valido, linea_rara, estado_raro]);
        let harness = Harness::logged_in(admin_session(), move |_| json_reply(200, body.clone()));

        let reclamos = block_on(harness.api.list_reclamos(&ReclamoFilters::default())).unwrap();

        let ids: Vec<&str> = reclamos.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1"]);
    }

    #[test]
    fn listing_that_is_not_an_array_is_still_a_parse_error() {
        let harness = Harness::logged_in(admin_session(), |_| json_reply(200, json!({"items": []})));

        let result = block_on(harness.api.list_reclamos(&ReclamoFilters::default()));

        assert!(matches!(result, Err(AppError::Parse(_))));
    }
}
