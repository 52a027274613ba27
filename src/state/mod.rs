// ============================================================================
// STATE MODULE - State Management con Rc<RefCell> + notificaciones
// ============================================================================

pub mod reactivity;
pub mod session_state;
pub mod in_flight;
pub mod app_state;

pub use reactivity::*;
pub use session_state::*;
pub use in_flight::*;
pub use app_state::*;
