// ============================================================================
// APP - Aplicación principal
// ============================================================================

use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::config::CONFIG;
use crate::dom::{append_child, get_element_by_id, on_window, set_inner_html};
use crate::routing::BrowserHistory;
use crate::services::{BrowserScheduler, BrowserSpawner, GlooTransport};
use crate::state::AppState;
use crate::utils::constants::APP_ROOT_ID;
use crate::utils::storage::BrowserStorage;
use crate::views::{render_app, update_notification_bell};

/// Aplicación principal
pub struct App {
    state: AppState,
    root: Element,
}

impl App {
    pub fn new() -> Result<Self, JsValue> {
        let root = get_element_by_id(APP_ROOT_ID)
            .ok_or_else(|| JsValue::from_str("No #app element found"))?;

        let state = AppState::new(
            Rc::new(BrowserStorage),
            Rc::new(GlooTransport),
            Rc::new(BrowserHistory),
            &CONFIG.api_url(),
        );

        // Rehidratar sesión antes del primer render
        state.session.restore();

        // Re-render completo batcheado en el próximo tick
        state.subscribe_to_changes(|| {
            Timeout::new(0, crate::rerender_app).forget();
        });

        // La campana se actualiza sola, sin tocar el resto de la vista
        {
            let bell_state = state.clone();
            state
                .notifications_vm
                .subscribe(move || update_notification_bell(&bell_state));
        }

        // Atrás/adelante del navegador; se registra una sola vez
        {
            let state = state.clone();
            on_window("popstate", move |_| state.sync_from_history())?;
        }

        Ok(Self { state, root })
    }

    pub fn render(&mut self) -> Result<(), JsValue> {
        set_inner_html(&self.root, "");
        let view = render_app(&self.state)?;
        append_child(&self.root, &view)?;

        self.state
            .sync_polling(&BrowserScheduler, Rc::new(BrowserSpawner));
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}
