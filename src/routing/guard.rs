// ============================================================================
// ROUTE GUARD - Decide por navegación si la vista es alcanzable
// ============================================================================
// El path intentado no se preserva al redirigir a login.
// ============================================================================

use crate::routing::route::{Route, RouteAccess};
use crate::state::session_state::SessionSnapshot;

/// Redirecciones máximas antes de cortar (la tabla converge en 2)
const MAX_REDIRECTS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    Loading,
    Unauthenticated,
    AuthenticatedInsufficientRole,
    AuthenticatedOk,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Sesión cargando: estado neutro, sin redirección
    Wait,
    Render(Route),
    Redirect { from: Route, to: Route },
}

/// Resultado final de una navegación
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// `None` mientras la sesión carga
    pub view: Option<Route>,
    pub trail: Vec<GuardDecision>,
}

impl Resolution {
    pub fn redirected(&self) -> bool {
        self.trail
            .iter()
            .any(|d| matches!(d, GuardDecision::Redirect { .. }))
    }
}

pub fn guard_state(session: &SessionSnapshot, route: &Route) -> GuardState {
    if session.loading {
        return GuardState::Loading;
    }
    match &session.session {
        None => GuardState::Unauthenticated,
        Some(s) if route.access() == RouteAccess::AdminOnly && !s.identity.is_admin() => {
            GuardState::AuthenticatedInsufficientRole
        }
        Some(_) => GuardState::AuthenticatedOk,
    }
}

/// Un paso de decisión para `route`
pub fn decide(session: &SessionSnapshot, route: &Route) -> GuardDecision {
    let access = route.access();
    if access == RouteAccess::Public {
        return GuardDecision::Render(route.clone());
    }

    let redirect = |to: Route| GuardDecision::Redirect {
        from: route.clone(),
        to,
    };

    match (guard_state(session, route), access) {
        (GuardState::Loading, _) => GuardDecision::Wait,
        (GuardState::Unauthenticated, RouteAccess::PublicOnly) => GuardDecision::Render(route.clone()),
        (GuardState::Unauthenticated, _) => redirect(Route::Login),
        (_, RouteAccess::PublicOnly) => redirect(Route::Dashboard),
        (GuardState::AuthenticatedInsufficientRole, _) => redirect(Route::Dashboard),
        _ => GuardDecision::Render(route.clone()),
    }
}

/// Seguir redirecciones hasta un punto fijo
pub fn resolve(session: &SessionSnapshot, route: Route) -> Resolution {
    let mut trail = Vec::new();
    let mut current = route;

    for _ in 0..=MAX_REDIRECTS {
        let decision = decide(session, &current);
        trail.push(decision.clone());
        match decision {
            GuardDecision::Wait => return Resolution { view: None, trail },
            GuardDecision::Render(route) => return Resolution { view: Some(route), trail },
            GuardDecision::Redirect { to, .. } => {
                log::info!("🔀 [GUARD] {} → {}", current.path(), to.path());
                current = to;
            }
        }
    }

    log::error!("❌ [GUARD] Demasiadas redirecciones, mostrando login");
    Resolution {
        view: Some(Route::Login),
        trail,
    }
}

pub fn resolve_path(session: &SessionSnapshot, path: &str) -> Resolution {
    resolve(session, Route::parse(path))
}
