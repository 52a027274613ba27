// ============================================================================
// ACCESS - Permisos y visibilidad derivados de la sesión
// ============================================================================

pub mod permissions;
pub mod visibility;

pub use permissions::{CreationBlock, Permissions, VisibilityScope};
pub use visibility::{line_stats, LineStat, VisibleSet};
