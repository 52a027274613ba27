pub mod session_viewmodel;
pub mod invitation_viewmodel;
pub mod reclamo_viewmodel;
pub mod usuarios_viewmodel;
pub mod notification_viewmodel;
pub mod estadisticas_viewmodel;

pub use session_viewmodel::SessionViewModel;
pub use invitation_viewmodel::{InvitationState, InvitationViewModel};
pub use reclamo_viewmodel::{
    CreateOutcome, DashboardData, DetalleOutcome, EdicionReclamoForm, NuevoReclamoForm, ReclamoViewModel,
};
pub use usuarios_viewmodel::{InvitacionForm, NuevoUsuarioForm, UsuariosViewModel};
pub use notification_viewmodel::{NotificationSnapshot, NotificationViewModel};
pub use estadisticas_viewmodel::{Barra, EstadisticasViewModel, Resumen};
