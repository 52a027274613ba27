// ============================================================================
// PERMISSIONS - Value object con las acciones permitidas a la sesión actual
// ============================================================================
// Las vistas consumen este objeto; nunca comparan el string del rol.
// ============================================================================

use crate::models::{Identity, Linea, Role};

/// Qué reclamos puede ver la sesión
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityScope {
    All,
    Line(Linea),
    /// Sin sesión, o emisor sin línea asignada
    Nothing,
}

impl VisibilityScope {
    pub fn allows(&self, linea: Linea) -> bool {
        match self {
            VisibilityScope::All => true,
            VisibilityScope::Line(own) => *own == linea,
            VisibilityScope::Nothing => false,
        }
    }
}

/// Motivo por el cual no se puede crear un reclamo
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreationBlock {
    NoSession,
    /// Emisor sin línea asignada: se muestra el aviso de aprovisionamiento
    PendingProvisioning,
}

impl CreationBlock {
    pub fn titulo(&self) -> &'static str {
        match self {
            CreationBlock::NoSession => "Iniciá sesión para crear reclamos",
            CreationBlock::PendingProvisioning => "No puedes crear reclamos",
        }
    }

    pub fn mensaje(&self) -> &'static str {
        match self {
            CreationBlock::NoSession => "Tu sesión expiró o no iniciaste sesión.",
            CreationBlock::PendingProvisioning => {
                "Tu cuenta no tiene una línea asignada. Contacta al administrador."
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Permissions {
    pub can_view_dashboard: bool,
    pub can_create_grievance: bool,
    /// Línea impuesta al crear/filtrar (emisor con línea)
    pub forced_line: Option<Linea>,
    pub creation_block: Option<CreationBlock>,
    pub can_edit_state: bool,
    pub can_comment: bool,
    pub can_upload: bool,
    pub can_manage_users: bool,
    pub can_generate_invitations: bool,
    pub scope: VisibilityScope,
}

impl Permissions {
    /// Sin sesión: nada permitido
    pub fn anonymous() -> Self {
        Self {
            can_view_dashboard: false,
            can_create_grievance: false,
            forced_line: None,
            creation_block: Some(CreationBlock::NoSession),
            can_edit_state: false,
            can_comment: false,
            can_upload: false,
            can_manage_users: false,
            can_generate_invitations: false,
            scope: VisibilityScope::Nothing,
        }
    }

    pub fn for_identity(identity: Option<&Identity>) -> Self {
        let identity = match identity {
            Some(identity) => identity,
            None => return Self::anonymous(),
        };

        match (identity.role, identity.assigned_line) {
            (Role::Admin, _) => Self {
                can_view_dashboard: true,
                can_create_grievance: true,
                forced_line: None,
                creation_block: None,
                can_edit_state: true,
                can_comment: true,
                can_upload: true,
                can_manage_users: true,
                can_generate_invitations: true,
                scope: VisibilityScope::All,
            },
            (Role::EmisorReclamo, Some(linea)) => Self {
                can_view_dashboard: true,
                can_create_grievance: true,
                forced_line: Some(linea),
                creation_block: None,
                can_edit_state: false,
                can_comment: true,
                can_upload: true,
                can_manage_users: false,
                can_generate_invitations: false,
                scope: VisibilityScope::Line(linea),
            },
            (Role::EmisorReclamo, None) => Self {
                can_view_dashboard: true,
                can_create_grievance: false,
                forced_line: None,
                creation_block: Some(CreationBlock::PendingProvisioning),
                can_edit_state: false,
                can_comment: false,
                can_upload: false,
                can_manage_users: false,
                can_generate_invitations: false,
                scope: VisibilityScope::Nothing,
            },
        }
    }

    /// Líneas que se ofrecen en el formulario de alta
    pub fn creatable_lines(&self) -> Vec<Linea> {
        if !self.can_create_grievance {
            return Vec::new();
        }
        match self.forced_line {
            Some(linea) => vec![linea],
            None => Linea::ALL.to_vec(),
        }
    }
}
