// ============================================================================
// ROUTING - Rutas + guard + historial
// ============================================================================

pub mod route;
pub mod guard;
pub mod history;

pub use route::{Route, RouteAccess};
pub use guard::{decide, guard_state, resolve, resolve_path, GuardDecision, GuardState, Resolution};
pub use history::{BrowserHistory, HistoryPort};
