/// Clave de localStorage con la sesión persistida (identidad + token)
pub const SESSION_STORAGE_KEY: &str = "reclamos_session";

/// Largo mínimo de contraseña (registro, alta de usuarios, invitaciones, cambio)
pub const MIN_PASSWORD_LEN: usize = 6;

/// Cantidad de notificaciones mostradas en el desplegable
pub const NOTIFICATION_LIST_LIMIT: usize = 5;

/// Id del contenedor donde se monta la app
pub const APP_ROOT_ID: &str = "app";
