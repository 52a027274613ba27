// ============================================================================
// HISTORY - Acceso a la barra de direcciones (pushState / replaceState)
// ============================================================================

use wasm_bindgen::JsValue;

/// Puerto hacia el historial del navegador
pub trait HistoryPort {
    /// Path + query actuales (`/administracion?linea=C`)
    fn current(&self) -> String;
    fn push(&self, path: &str);
    /// Reemplaza la entrada actual (redirecciones del guard)
    fn replace(&self, path: &str);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserHistory;

impl HistoryPort for BrowserHistory {
    fn current(&self) -> String {
        web_sys::window()
            .map(|w| w.location())
            .and_then(|l| {
                let path = l.pathname().ok()?;
                let search = l.search().unwrap_or_default();
                Some(format!("{}{}", path, search))
            })
            .unwrap_or_else(|| "/".to_string())
    }

    fn push(&self, path: &str) {
        let result = web_sys::window()
            .ok_or_else(|| JsValue::from_str("No window"))
            .and_then(|w| w.history())
            .and_then(|h| h.push_state_with_url(&JsValue::NULL, "", Some(path)));
        if let Err(e) = result {
            log::error!("❌ [HISTORY] pushState falló para {}: {:?}", path, e);
        }
    }

    fn replace(&self, path: &str) {
        let result = web_sys::window()
            .ok_or_else(|| JsValue::from_str("No window"))
            .and_then(|w| w.history())
            .and_then(|h| h.replace_state_with_url(&JsValue::NULL, "", Some(path)));
        if let Err(e) = result {
            log::error!("❌ [HISTORY] replaceState falló para {}: {:?}", path, e);
        }
    }
}
