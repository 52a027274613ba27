// ============================================================================
// LOGIN VIEW
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{on_submit, set_disabled, ElementBuilder};
use crate::routing::Route;
use crate::state::AppState;
use crate::views::widgets::{clear_status, field, input_group, nav_link, show_error, status_box, submit_button};

/// Renderizar vista de login
pub fn render_login(state: &AppState) -> Result<Element, JsValue> {
    log::info!("🎬 [LOGIN] render_login()");

    let username = field();
    let password = field();

    let status = status_box()?;
    let submit = submit_button("Iniciar sesión")?;

    let form = ElementBuilder::new("form")?
        .class("auth-form")
        .child(input_group("Usuario", "username", "text", &username)?)?
        .child(input_group("Contraseña", "password", "password", &password)?)?
        .child(status.clone())?
        .child(submit.clone())?
        .build();

    {
        let state = state.clone();
        on_submit(&form, move || {
            let (u, p) = (username.borrow().clone(), password.borrow().clone());
            let (state, status, submit) = (state.clone(), status.clone(), submit.clone());
            clear_status(&status);
            set_disabled(&submit, true);

            spawn_local(async move {
                log::info!("🔐 [LOGIN] Iniciando login...");
                // En éxito la sesión cambia y el guard lleva al dashboard
                if let Err(e) = state.session_vm.login(&u, &p).await {
                    log::error!("❌ [LOGIN] {}", e);
                    show_error(&status, &e.user_message());
                    set_disabled(&submit, false);
                }
            });
        })?;
    }

    let footer = ElementBuilder::new("p")?
        .class("auth-footer")
        .text("¿No tenés cuenta? ")
        .child(nav_link(state, "Registrate", Route::Register, "link")?)?
        .build();

    ElementBuilder::new("div")?
        .class("auth-screen")
        .child(
            ElementBuilder::new("div")?
                .class("auth-card")
                .child(ElementBuilder::new("h1")?.text("Reclamos UTA").build())?
                .child(ElementBuilder::new("p")?.class("subtitle").text("Sistema de reclamos gremiales").build())?
                .child(form)?
                .child(footer)?
                .build(),
        )
        .map(|b| b.build())
}
