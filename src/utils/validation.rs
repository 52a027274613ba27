// ============================================================================
// VALIDACIÓN - Reglas locales de formularios (antes de cualquier request)
// ============================================================================

use crate::error::{AppError, AppResult};
use crate::utils::constants::MIN_PASSWORD_LEN;

pub fn require_non_blank(value: &str, campo: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("El campo {} es obligatorio", campo)));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "La contraseña debe tener al menos {} caracteres",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn validate_password_confirmation(password: &str, confirmation: &str) -> AppResult<()> {
    if password != confirmation {
        return Err(AppError::Validation("Las contraseñas no coinciden".to_string()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    let email = email.trim();
    let valido = match email.split_once('@') {
        Some((local, dominio)) => !local.is_empty() && dominio.contains('.') && !dominio.starts_with('.'),
        None => false,
    };
    if !valido {
        return Err(AppError::Validation("Email inválido".to_string()));
    }
    Ok(())
}

/// Registro / alta de usuario: usuario, email y contraseña
pub fn validate_new_account(username: &str, email: &str, password: &str) -> AppResult<()> {
    require_non_blank(username, "usuario")?;
    validate_email(email)?;
    validate_password(password)
}
