pub mod widgets;
pub mod app;
pub mod header;
pub mod login;
pub mod register;
pub mod dashboard;
pub mod reclamo_list;
pub mod nuevo_reclamo;
pub mod administracion;
pub mod detalle_reclamo;
pub mod estadisticas;
pub mod usuarios;
pub mod aceptar_invitacion;

pub use app::render_app;
pub use header::{render_header, update_notification_bell};
pub use login::render_login;
pub use register::render_register;
pub use dashboard::render_dashboard;
pub use nuevo_reclamo::render_nuevo_reclamo;
pub use administracion::render_administracion;
pub use detalle_reclamo::render_detalle;
pub use estadisticas::render_estadisticas;
pub use usuarios::render_usuarios;
pub use aceptar_invitacion::render_aceptar_invitacion;
