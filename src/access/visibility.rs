// ============================================================================
// VISIBILITY - Filtro de reclamos visibles y contadores del dashboard
// ============================================================================

use crate::access::permissions::{Permissions, VisibilityScope};
use crate::models::{Identity, Linea, Reclamo};

/// Reclamos visibles + permisos de la sesión que los ve
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleSet {
    pub reclamos: Vec<Reclamo>,
    pub permissions: Permissions,
}

/// Contadores por línea del dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineStat {
    pub linea: Linea,
    pub total: usize,
    pub activos: usize,
}

/// Función pura de (rol, línea asignada, reclamos)
pub fn resolve(identity: Option<&Identity>, reclamos: &[Reclamo]) -> VisibleSet {
    let permissions = Permissions::for_identity(identity);
    VisibleSet {
        reclamos: filter(permissions.scope, reclamos),
        permissions,
    }
}

pub fn filter(scope: VisibilityScope, reclamos: &[Reclamo]) -> Vec<Reclamo> {
    reclamos
        .iter()
        .filter(|r| scope.allows(r.linea))
        .cloned()
        .collect()
}

/// Total y activos (estado != Resuelto) para cada una de las 7 líneas
pub fn line_stats(reclamos: &[Reclamo]) -> Vec<LineStat> {
    Linea::ALL
        .iter()
        .map(|&linea| {
            let de_linea = reclamos.iter().filter(|r| r.linea == linea);
            let (total, activos) = de_linea.fold((0, 0), |(total, activos), r| {
                (total + 1, activos + usize::from(r.is_activo()))
            });
            LineStat { linea, total, activos }
        })
        .collect()
}
