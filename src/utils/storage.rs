use std::cell::RefCell;
use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};
use web_sys::{window, Storage};

use crate::error::{AppError, AppResult};

/// Almacenamiento clave/valor de strings (localStorage en el navegador)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&self, key: &str);
}

/// localStorage del navegador; puede no existir (modo privado, iframe sandbox)
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok()?
}

fn write(storage: Option<Storage>, key: &str, value: &str) -> AppResult<()> {
    let storage = storage.ok_or_else(|| AppError::Storage("localStorage no disponible".to_string()))?;
    storage
        .set_item(key, value)
        .map_err(|_| AppError::Storage(format!("no se pudo guardar {}", key)))
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        write(local_storage(), key, value)
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = local_storage() {
            if storage.remove_item(key).is_err() {
                log::warn!("⚠️ [STORAGE] No se pudo borrar {}", key);
            }
        }
    }
}

/// Almacenamiento en memoria (tests y navegadores sin localStorage)
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

pub fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> AppResult<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// `Ok(None)` si no hay nada guardado, `Err(Parse)` si el registro está corrupto
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> AppResult<Option<T>> {
    match store.get(key) {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}
