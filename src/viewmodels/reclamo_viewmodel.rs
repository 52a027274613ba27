// ============================================================================
// RECLAMO VIEWMODEL - Listado, detalle, alta, edición, comentarios, archivos
// ============================================================================
// Todo pasa por los permisos de la sesión (recalculados en cada llamada).
// ============================================================================

use crate::access::{line_stats, visibility, LineStat, Permissions, VisibilityScope};
use crate::error::{AppError, AppResult};
use crate::models::{
    Categoria, Comentario, ComentarioCreate, Estado, Linea, Reclamo, ReclamoCreate, ReclamoFilters,
    ReclamoUpdate,
};
use crate::services::{ApiClient, MultipartFile};
use crate::utils::validation::require_non_blank;

/// Formulario de alta
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NuevoReclamoForm {
    pub linea: Option<Linea>,
    pub categoria: Option<Categoria>,
    pub sector_estacion: String,
    pub descripcion: String,
}

/// Formulario de edición (solo ADMIN)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdicionReclamoForm {
    pub estado: Estado,
    pub responsable: String,
    pub solucion: String,
    pub responsable_cierre: String,
}

impl EdicionReclamoForm {
    /// Precargado con los valores actuales del reclamo
    pub fn from_reclamo(reclamo: &Reclamo) -> Self {
        Self {
            estado: reclamo.estado,
            responsable: reclamo.responsable.clone().unwrap_or_default(),
            solucion: reclamo.solucion.clone().unwrap_or_default(),
            responsable_cierre: reclamo.responsable_cierre.clone().unwrap_or_default(),
        }
    }

    /// Pasar a Resuelto exige solución y responsable de cierre
    pub fn validate(&self) -> AppResult<()> {
        if self.estado == Estado::Resuelto
            && (self.solucion.trim().is_empty() || self.responsable_cierre.trim().is_empty())
        {
            return Err(AppError::Validation(
                "Para resolver el reclamo completá la solución y el responsable de cierre".to_string(),
            ));
        }
        Ok(())
    }

    /// Un campo en blanco que antes tenía valor se envía vacío para borrarlo
    fn to_update(&self, actual: &Reclamo) -> ReclamoUpdate {
        let campo = |value: &str, previo: &Option<String>| {
            let value = value.trim();
            let tenia_valor = previo.as_deref().map_or(false, |p| !p.trim().is_empty());
            (!value.is_empty() || tenia_valor).then(|| value.to_string())
        };
        ReclamoUpdate {
            estado: Some(self.estado),
            responsable: campo(&self.responsable, &actual.responsable),
            solucion: campo(&self.solucion, &actual.solucion),
            responsable_cierre: campo(&self.responsable_cierre, &actual.responsable_cierre),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DetalleOutcome {
    Found(Reclamo),
    /// 403 o reclamo fuera del alcance: volver al dashboard
    RedirectHome,
    NotFound,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardData {
    pub reclamos: Vec<Reclamo>,
    pub stats: Vec<LineStat>,
    pub permissions: Permissions,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreateOutcome {
    pub reclamo: Reclamo,
    /// Nombres de archivos que no se pudieron subir
    pub failed_uploads: Vec<String>,
}

#[derive(Clone)]
pub struct ReclamoViewModel {
    api: ApiClient,
}

impl ReclamoViewModel {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn permissions(&self) -> Permissions {
        self.api.session().permissions()
    }

    /// Listado filtrado; el emisor queda forzado a su línea
    pub async fn list(&self, filters: ReclamoFilters) -> AppResult<Vec<Reclamo>> {
        let mut filters = filters;
        match self.permissions().scope {
            VisibilityScope::Nothing => return Ok(Vec::new()),
            VisibilityScope::Line(linea) => filters.linea = Some(linea),
            VisibilityScope::All => {}
        }

        let reclamos = self.api.list_reclamos(&filters).await?;
        // La sesión pudo cambiar durante el request
        Ok(visibility::filter(self.permissions().scope, &reclamos))
    }

    pub async fn dashboard(&self) -> AppResult<DashboardData> {
        let reclamos = self.list(ReclamoFilters::default()).await?;
        Ok(DashboardData {
            stats: line_stats(&reclamos),
            permissions: self.permissions(),
            reclamos,
        })
    }

    pub async fn detail(&self, id: &str) -> AppResult<DetalleOutcome> {
        match self.api.get_reclamo(id).await {
            Ok(reclamo) if self.permissions().scope.allows(reclamo.linea) => Ok(DetalleOutcome::Found(reclamo)),
            Ok(reclamo) => {
                log::warn!("🚫 [RECLAMO] {} fuera de la línea de la sesión", reclamo.numero_reclamo);
                Ok(DetalleOutcome::RedirectHome)
            }
            Err(AppError::Permission(_)) => Ok(DetalleOutcome::RedirectHome),
            Err(AppError::NotFound(_)) => Ok(DetalleOutcome::NotFound),
            Err(e) => Err(e),
        }
    }

    pub async fn create(&self, form: NuevoReclamoForm, attachments: Vec<MultipartFile>) -> AppResult<CreateOutcome> {
        let permissions = self.permissions();
        if let Some(block) = permissions.creation_block {
            return Err(AppError::Permission(block.mensaje().to_string()));
        }

        let linea = permissions
            .forced_line
            .or(form.linea)
            .ok_or_else(|| AppError::Validation("Seleccioná una línea".to_string()))?;
        let categoria = form
            .categoria
            .ok_or_else(|| AppError::Validation("Seleccioná una categoría".to_string()))?;
        require_non_blank(&form.sector_estacion, "sector/estación")?;
        require_non_blank(&form.descripcion, "descripción")?;

        let body = ReclamoCreate {
            linea,
            categoria,
            sector_estacion: form.sector_estacion.trim().to_string(),
            descripcion: form.descripcion.trim().to_string(),
        };
        let mut reclamo = self.api.create_reclamo(&body).await?;
        log::info!("✅ [RECLAMO] Creado {}", reclamo.numero_reclamo);

        let mut failed_uploads = Vec::new();
        for file in attachments {
            let file_name = file.file_name.clone();
            match self.api.upload_archivo(&reclamo.id, file).await {
                Ok(subido) => reclamo.archivos.push(subido.url),
                Err(e) => {
                    log::error!("❌ [RECLAMO] Error subiendo {}: {}", file_name, e);
                    failed_uploads.push(file_name);
                }
            }
        }

        Ok(CreateOutcome {
            reclamo,
            failed_uploads,
        })
    }

    pub async fn update(&self, actual: &Reclamo, form: &EdicionReclamoForm) -> AppResult<Reclamo> {
        if !self.permissions().can_edit_state {
            return Err(AppError::Permission("Solo un administrador puede editar reclamos".to_string()));
        }
        form.validate()?;

        let reclamo = self.api.update_reclamo(&actual.id, &form.to_update(actual)).await?;
        log::info!("✏️ [RECLAMO] {} → {}", reclamo.numero_reclamo, reclamo.estado);
        Ok(reclamo)
    }

    /// Comentario; el autor es el usuario de la sesión
    pub async fn comment(&self, id: &str, text: &str) -> AppResult<Comentario> {
        if !self.permissions().can_comment {
            return Err(AppError::Permission("No podés comentar reclamos".to_string()));
        }
        require_non_blank(text, "comentario")?;
        let author = self
            .api
            .session()
            .identity()
            .map(|identity| identity.username)
            .ok_or_else(|| AppError::Auth(String::new()))?;

        let body = ComentarioCreate {
            text: text.trim().to_string(),
            author,
        };
        Ok(self.api.add_comentario(id, &body).await?.comentario)
    }

    pub async fn upload(&self, id: &str, file: MultipartFile) -> AppResult<String> {
        if !self.permissions().can_upload {
            return Err(AppError::Permission("No podés adjuntar archivos".to_string()));
        }
        Ok(self.api.upload_archivo(id, file).await?.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{HttpMethod, RequestBody};
    use crate::test_support::{admin_session, api_path, emisor_session, json_reply, reclamo, Harness};
    use futures::executor::block_on;
    use serde_json::json;

    fn reclamos_json() -> serde_json::Value {
        serde_json::to_value(vec![
            reclamo("1", Linea::A, Estado::Pendiente),
            reclamo("2", Linea::B, Estado::Resuelto),
            reclamo("3", Linea::A, Estado::EnGestion),
        ])
        .unwrap()
    }

    fn form() -> NuevoReclamoForm {
        NuevoReclamoForm {
            linea: Some(Linea::D),
            categoria: Some(Categoria::HigieneYSalubridad),
            sector_estacion: "Catedral".to_string(),
            descripcion: "Vestuario sin agua caliente".to_string(),
        }
    }

    fn attachment(name: &str) -> MultipartFile {
        MultipartFile {
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0; 4],
        }
    }

    #[test]
    fn emisor_list_is_forced_to_own_line_and_filtered() {
        // El backend ignora el filtro: el cliente igual filtra
        let harness = Harness::logged_in(emisor_session(Some(Linea::A)), |_| json_reply(200, reclamos_json()));
        let vm = ReclamoViewModel::new(harness.api.clone());

        let visibles = block_on(vm.list(ReclamoFilters::por_linea(Linea::B))).unwrap();

        assert!(visibles.iter().all(|r| r.linea == Linea::A));
        assert_eq!(visibles.len(), 2);
        let sent = harness.transport.requests();
        assert!(sent[0].query.contains(&("linea".to_string(), "A".to_string())));
    }

    #[test]
    fn emisor_without_line_gets_empty_list_without_request() {
        let harness = Harness::logged_in(emisor_session(None), |_| json_reply(200, reclamos_json()));
        let vm = ReclamoViewModel::new(harness.api.clone());

        let data = block_on(vm.dashboard()).unwrap();

        assert!(data.reclamos.is_empty());
        assert_eq!(harness.transport.request_count(), 0);
        assert!(data.stats.iter().all(|s| s.total == 0));
    }

    #[test]
    fn admin_dashboard_counts_every_line() {
        let harness = Harness::logged_in(admin_session(), |_| json_reply(200, reclamos_json()));
        let vm = ReclamoViewModel::new(harness.api.clone());

        let data = block_on(vm.dashboard()).unwrap();

        let a = data.stats.iter().find(|s| s.linea == Linea::A).unwrap();
        let b = data.stats.iter().find(|s| s.linea == Linea::B).unwrap();
        assert_eq!((a.total, a.activos), (2, 2));
        assert_eq!((b.total, b.activos), (1, 0));
    }

    #[test]
    fn forbidden_detail_redirects_home() {
        let harness = Harness::logged_in(emisor_session(Some(Linea::A)), |_| json_reply(403, json!({"detail": "No autorizado"})));
        let vm = ReclamoViewModel::new(harness.api.clone());

        assert_eq!(block_on(vm.detail("9")).unwrap(), DetalleOutcome::RedirectHome);
    }

    #[test]
    fn detail_of_other_line_redirects_home() {
        let other = serde_json::to_value(reclamo("9", Linea::E, Estado::Pendiente)).unwrap();
        let harness = Harness::logged_in(emisor_session(Some(Linea::A)), move |_| json_reply(200, other.clone()));
        let vm = ReclamoViewModel::new(harness.api.clone());

        assert_eq!(block_on(vm.detail("9")).unwrap(), DetalleOutcome::RedirectHome);
    }

    #[test]
    fn missing_detail_is_not_found() {
        let harness = Harness::logged_in(admin_session(), |_| json_reply(404, json!({"detail": "Reclamo no encontrado"})));
        let vm = ReclamoViewModel::new(harness.api.clone());

        assert_eq!(block_on(vm.detail("x")).unwrap(), DetalleOutcome::NotFound);
    }

    #[test]
    fn emisor_create_forces_line_and_uploads_attachments() {
        let created = serde_json::to_value(reclamo("10", Linea::A, Estado::Pendiente)).unwrap();
        let harness = Harness::logged_in(emisor_session(Some(Linea::A)), move |request| {
            match api_path(request) {
                "/reclamos" => json_reply(200, created.clone()),
                _ => json_reply(200, json!({"message": "Archivo subido", "url": "/uploads/f.png"})),
            }
        });
        let vm = ReclamoViewModel::new(harness.api.clone());

        let outcome = block_on(vm.create(form(), vec![attachment("a.png"), attachment("b.png")])).unwrap();

        let sent = harness.transport.requests();
        assert_eq!(sent.len(), 3);
        match &sent[0].body {
            RequestBody::Json(body) => assert!(body.contains("\"linea\":\"A\"")),
            other => panic!("body inesperado: {:?}", other),
        }
        assert!(api_path(&sent[1]).ends_with("/archivos"));
        assert_eq!(outcome.reclamo.archivos.len(), 2);
        assert!(outcome.failed_uploads.is_empty());
    }

    #[test]
    fn emisor_without_line_is_blocked_from_creating() {
        let harness = Harness::logged_in(emisor_session(None), |_| json_reply(200, json!({})));
        let vm = ReclamoViewModel::new(harness.api.clone());

        let err = block_on(vm.create(form(), Vec::new())).unwrap_err();

        assert_eq!(
            err,
            AppError::Permission("Tu cuenta no tiene una línea asignada. Contacta al administrador.".to_string())
        );
        assert_eq!(harness.transport.request_count(), 0);
    }

    #[test]
    fn create_requires_fields_before_request() {
        let harness = Harness::logged_in(admin_session(), |_| json_reply(200, json!({})));
        let vm = ReclamoViewModel::new(harness.api.clone());

        let mut sin_linea = form();
        sin_linea.linea = None;
        let mut sin_descripcion = form();
        sin_descripcion.descripcion = "   ".to_string();

        assert!(matches!(block_on(vm.create(sin_linea, Vec::new())), Err(AppError::Validation(_))));
        assert!(matches!(block_on(vm.create(sin_descripcion, Vec::new())), Err(AppError::Validation(_))));
        assert_eq!(harness.transport.request_count(), 0);
    }

    #[test]
    fn failed_upload_is_reported_not_fatal() {
        let created = serde_json::to_value(reclamo("11", Linea::D, Estado::Pendiente)).unwrap();
        let harness = Harness::logged_in(admin_session(), move |request| match api_path(request) {
            "/reclamos" => json_reply(200, created.clone()),
            _ => json_reply(500, json!({})),
        });
        let vm = ReclamoViewModel::new(harness.api.clone());

        let outcome = block_on(vm.create(form(), vec![attachment("roto.png")])).unwrap();

        assert_eq!(outcome.failed_uploads, vec!["roto.png".to_string()]);
    }

    #[test]
    fn resolving_without_solution_issues_no_request() {
        let harness = Harness::logged_in(admin_session(), |_| json_reply(200, json!({})));
        let vm = ReclamoViewModel::new(harness.api.clone());
        let edicion = EdicionReclamoForm {
            estado: Estado::Resuelto,
            responsable: "Comisión interna".to_string(),
            solucion: String::new(),
            responsable_cierre: "  ".to_string(),
        };

        let err = block_on(vm.update(&reclamo("1", Linea::A, Estado::EnGestion), &edicion)).unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(harness.transport.request_count(), 0);
    }

    #[test]
    fn resolving_with_solution_sends_patch() {
        let mut resuelto = reclamo("1", Linea::A, Estado::Resuelto);
        resuelto.solucion = Some("Se repuso el material".to_string());
        let body = serde_json::to_value(&resuelto).unwrap();
        let harness = Harness::logged_in(admin_session(), move |_| json_reply(200, body.clone()));
        let vm = ReclamoViewModel::new(harness.api.clone());

        let actual = reclamo("1", Linea::A, Estado::EnGestion);
        let mut edicion = EdicionReclamoForm::from_reclamo(&actual);
        edicion.estado = Estado::Resuelto;
        edicion.solucion = "Se repuso el material".to_string();
        edicion.responsable_cierre = "Delegado general".to_string();

        let updated = block_on(vm.update(&actual, &edicion)).unwrap();

        assert_eq!(updated.estado, Estado::Resuelto);
        let sent = harness.transport.requests();
        assert_eq!(sent[0].method, HttpMethod::Patch);
    }

    #[test]
    fn emisor_cannot_edit() {
        let harness = Harness::logged_in(emisor_session(Some(Linea::A)), |_| json_reply(200, json!({})));
        let vm = ReclamoViewModel::new(harness.api.clone());

        let actual = reclamo("1", Linea::A, Estado::Pendiente);
        let err = block_on(vm.update(&actual, &EdicionReclamoForm::default())).unwrap_err();

        assert!(err.is_permission());
        assert_eq!(harness.transport.request_count(), 0);
    }

    #[test]
    fn comment_author_comes_from_session() {
        let harness = Harness::logged_in(emisor_session(Some(Linea::A)), |_| {
            json_reply(200, json!({
                "message": "Comentario agregado",
                "comentario": {"id": "c1", "author": "delegado", "text": "Seguimos esperando", "timestamp": "2024-02-01T10:00:00Z"}
            }))
        });
        let vm = ReclamoViewModel::new(harness.api.clone());

        let comentario = block_on(vm.comment("1", " Seguimos esperando ")).unwrap();

        assert_eq!(comentario.author, "delegado");
        match &harness.transport.requests()[0].body {
            RequestBody::Json(body) => assert!(body.contains("\"author\":\"delegado\"")),
            other => panic!("body inesperado: {:?}", other),
        }
        assert!(block_on(vm.comment("1", "   ")).is_err());
        assert_eq!(harness.transport.request_count(), 1);
    }

    #[test]
    fn blanking_a_stored_field_sends_empty_value() {
        let mut actual = reclamo("1", Linea::A, Estado::EnGestion);
        actual.responsable = Some("Comisión interna".to_string());
        let body = serde_json::to_value(&reclamo("1", Linea::A, Estado::EnGestion)).unwrap();
        let harness = Harness::logged_in(admin_session(), move |_| json_reply(200, body.clone()));
        let vm = ReclamoViewModel::new(harness.api.clone());

        let mut edicion = EdicionReclamoForm::from_reclamo(&actual);
        edicion.responsable = "   ".to_string();
        block_on(vm.update(&actual, &edicion)).unwrap();

        let sent = harness.transport.requests();
        let enviado: serde_json::Value = match &sent[0].body {
            RequestBody::Json(json) => serde_json::from_str(json).unwrap(),
            other => panic!("cuerpo inesperado: {:?}", other),
        };
        assert_eq!(enviado["responsable"], json!(""));
        // Campos que ya estaban vacíos no viajan
        assert!(enviado.get("solucion").is_none());
    }
}
