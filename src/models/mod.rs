pub mod linea;
pub mod reclamo;
pub mod usuario;
pub mod auth;
pub mod invitation;
pub mod notification;
pub mod estadisticas;

pub use linea::Linea;
pub use reclamo::{
    ArchivoSubido, Categoria, Comentario, ComentarioAgregado, ComentarioCreate, Estado, Reclamo, ReclamoCreate,
    ReclamoFilters, ReclamoUpdate,
};
pub use usuario::{CreateUserRequest, Role, Usuario};
pub use auth::{ChangePasswordRequest, Identity, LoginRequest, RegisterRequest, TokenResponse};
pub use invitation::{CreateInvitationRequest, Invitation, InvitationCreated};
pub use notification::{Notification, UnreadCount};
pub use estadisticas::Estadisticas;
