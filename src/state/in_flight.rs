// ============================================================================
// IN-FLIGHT - Serialización de mutaciones por recurso
// ============================================================================

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::error::{AppError, AppResult};

/// Conjunto de recursos con una mutación en curso
#[derive(Clone, Default)]
pub struct InFlight {
    keys: Rc<RefCell<HashSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reservar `key`; `Busy` si ya hay una mutación en curso para ese recurso
    pub fn acquire(&self, key: &str) -> AppResult<InFlightGuard> {
        if !self.keys.borrow_mut().insert(key.to_string()) {
            return Err(AppError::Busy(format!("ya hay una operación en curso para {}", key)));
        }
        Ok(InFlightGuard {
            keys: self.keys.clone(),
            key: key.to_string(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.borrow().contains(key)
    }
}

/// Libera el recurso al salir de scope (incluso si el request falla)
pub struct InFlightGuard {
    keys: Rc<RefCell<HashSet<String>>>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys.borrow_mut().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_busy_until_guard_drops() {
        let in_flight = InFlight::new();
        let guard = in_flight.acquire("u1").unwrap();
        assert!(matches!(in_flight.acquire("u1"), Err(AppError::Busy(_))));
        assert!(in_flight.acquire("u2").is_ok());
        drop(guard);
        assert!(!in_flight.contains("u1"));
        assert!(in_flight.acquire("u1").is_ok());
    }
}
