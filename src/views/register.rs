// ============================================================================
// REGISTER VIEW - Alta pública (EMISOR_RECLAMO sin línea)
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{on_submit, set_disabled, ElementBuilder};
use crate::routing::Route;
use crate::state::AppState;
use crate::views::widgets::{clear_status, field, input_group, nav_link, show_error, status_box, submit_button};

pub fn render_register(state: &AppState) -> Result<Element, JsValue> {
    let username = field();
    let email = field();
    let password = field();
    let confirmation = field();

    let status = status_box()?;
    let submit = submit_button("Crear cuenta")?;

    let form = ElementBuilder::new("form")?
        .class("auth-form")
        .child(input_group("Usuario", "username", "text", &username)?)?
        .child(input_group("Email", "email", "email", &email)?)?
        .child(input_group("Contraseña", "password", "password", &password)?)?
        .child(input_group("Repetir contraseña", "confirmation", "password", &confirmation)?)?
        .child(status.clone())?
        .child(submit.clone())?
        .build();

    {
        let state = state.clone();
        on_submit(&form, move || {
            let values = (
                username.borrow().clone(),
                email.borrow().clone(),
                password.borrow().clone(),
                confirmation.borrow().clone(),
            );
            let (state, status, submit) = (state.clone(), status.clone(), submit.clone());
            clear_status(&status);
            set_disabled(&submit, true);

            spawn_local(async move {
                let (u, e, p, c) = values;
                match state.session_vm.register(&u, &e, &p, &c).await {
                    Ok(_) => state.flash_ok("Cuenta creada. Un administrador debe asignarte una línea."),
                    Err(err) => {
                        show_error(&status, &err.user_message());
                        set_disabled(&submit, false);
                    }
                }
            });
        })?;
    }

    let footer = ElementBuilder::new("p")?
        .class("auth-footer")
        .text("¿Ya tenés cuenta? ")
        .child(nav_link(state, "Iniciá sesión", Route::Login, "link")?)?
        .build();

    ElementBuilder::new("div")?
        .class("auth-screen")
        .child(
            ElementBuilder::new("div")?
                .class("auth-card")
                .child(ElementBuilder::new("h1")?.text("Crear cuenta").build())?
                .child(form)?
                .child(footer)?
                .build(),
        )
        .map(|b| b.build())
}
