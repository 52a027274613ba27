// ============================================================================
// ROUTES - Tabla de rutas de la SPA
// ============================================================================

use crate::models::Linea;

/// Nivel de acceso requerido por una ruta
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteAccess {
    /// Accesible en cualquier estado de sesión
    Public,
    /// Solo sin sesión (login, registro)
    PublicOnly,
    Protected,
    AdminOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Invitacion { token: String },
    Dashboard,
    NuevoReclamo,
    Administracion { linea: Option<Linea> },
    DetalleReclamo { id: String },
    Estadisticas,
    Usuarios,
}

impl Route {
    /// Parsear path (+ query opcional); paths desconocidos van al dashboard
    pub fn parse(url: &str) -> Route {
        let url = url.split('#').next().unwrap_or_default();
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (url, ""),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["login"] | ["emisor-login"] => Route::Login,
            ["register"] => Route::Register,
            ["invitacion", token] => Route::Invitacion {
                token: (*token).to_string(),
            },
            [] => Route::Dashboard,
            ["nuevo-reclamo"] => Route::NuevoReclamo,
            ["administracion"] => Route::Administracion {
                linea: query_param(query, "linea").and_then(Linea::from_id),
            },
            ["reclamo", id] => Route::DetalleReclamo {
                id: (*id).to_string(),
            },
            ["estadisticas"] => Route::Estadisticas,
            ["usuarios"] => Route::Usuarios,
            _ => {
                log::warn!("⚠️ [ROUTER] Ruta desconocida '{}', usando dashboard", path);
                Route::Dashboard
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Invitacion { token } => format!("/invitacion/{}", token),
            Route::Dashboard => "/".to_string(),
            Route::NuevoReclamo => "/nuevo-reclamo".to_string(),
            Route::Administracion { linea: Some(linea) } => {
                format!("/administracion?linea={}", linea.id())
            }
            Route::Administracion { linea: None } => "/administracion".to_string(),
            Route::DetalleReclamo { id } => format!("/reclamo/{}", id),
            Route::Estadisticas => "/estadisticas".to_string(),
            Route::Usuarios => "/usuarios".to_string(),
        }
    }

    pub fn access(&self) -> RouteAccess {
        match self {
            Route::Invitacion { .. } => RouteAccess::Public,
            Route::Login | Route::Register => RouteAccess::PublicOnly,
            Route::Usuarios => RouteAccess::AdminOnly,
            Route::Dashboard
            | Route::NuevoReclamo
            | Route::Administracion { .. }
            | Route::DetalleReclamo { .. }
            | Route::Estadisticas => RouteAccess::Protected,
        }
    }

    /// Vistas con header (navegación + campana de notificaciones)
    pub fn shows_header(&self) -> bool {
        matches!(self.access(), RouteAccess::Protected | RouteAccess::AdminOnly)
    }

    pub fn titulo(&self) -> &'static str {
        match self {
            Route::Login => "Iniciar sesión",
            Route::Register => "Registro",
            Route::Invitacion { .. } => "Activar cuenta",
            Route::Dashboard => "Panel de reclamos",
            Route::NuevoReclamo => "Nuevo reclamo",
            Route::Administracion { .. } => "Administración de reclamos",
            Route::DetalleReclamo { .. } => "Detalle del reclamo",
            Route::Estadisticas => "Estadísticas",
            Route::Usuarios => "Usuarios",
        }
    }
}

fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
