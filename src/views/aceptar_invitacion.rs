// ============================================================================
// ACEPTAR INVITACION VIEW - Activación de cuenta pre-aprovisionada
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{on_click, ElementBuilder};
use crate::models::Invitation;
use crate::routing::Route;
use crate::state::AppState;
use crate::viewmodels::InvitationState;
use crate::views::widgets::{button, error_panel, loading_screen, nav_link};

pub fn render_aceptar_invitacion(state: &AppState, token: &str) -> Result<Element, JsValue> {
    let vm = state.invitation_vm(token);
    let card = ElementBuilder::new("div")?
        .class("auth-card")
        .child(ElementBuilder::new("h1")?.text("Activar cuenta").build())?
        .build();

    match vm.state() {
        InvitationState::LoadingInvitation => {
            let cargando = loading_screen("Verificando invitación...")?;
            card.append_child(&cargando)?;
        }
        InvitationState::Invalid { reason } => {
            let panel = error_panel(&reason)?;
            card.append_child(&panel)?;
            let link = nav_link(state, "Ir al inicio de sesión", Route::Login, "link")?;
            card.append_child(&link)?;
        }
        InvitationState::ValidPending { invitation, error } => {
            let datos = resumen(&invitation)?;
            card.append_child(&datos)?;
            if let Some(error) = error {
                let panel = error_panel(&error)?;
                card.append_child(&panel)?;
            }
            let aceptar = button("Aceptar invitación", "btn-primary")?;
            let vm = vm.clone();
            on_click(&aceptar, move |_| {
                let vm = vm.clone();
                spawn_local(async move {
                    // El estado (Accepted o error) llega por la suscripción
                    if let Err(e) = vm.accept().await {
                        log::warn!("⚠️ [INVITACION] {}", e);
                    }
                });
            })?;
            card.append_child(&aceptar)?;
        }
        InvitationState::Accepting { invitation } => {
            let datos = resumen(&invitation)?;
            card.append_child(&datos)?;
            let cargando = loading_screen("Activando cuenta...")?;
            card.append_child(&cargando)?;
        }
        InvitationState::Accepted { invitation } => {
            card.append_child(
                &ElementBuilder::new("p")?
                    .class("ok")
                    .text(&format!("¡Listo {}! Tu cuenta está activa.", invitation.username))
                    .build(),
            )?;
            let (text, route) = if state.session.is_authenticated() {
                ("Ir al panel", Route::Dashboard)
            } else {
                ("Iniciar sesión", Route::Login)
            };
            let link = nav_link(state, text, route, "btn-primary")?;
            card.append_child(&link)?;
        }
    }

    ElementBuilder::new("div")?
        .class("auth-screen")
        .child(card)
        .map(|b| b.build())
}

fn resumen(invitation: &Invitation) -> Result<Element, JsValue> {
    let linea = invitation
        .linea_asignada
        .map(|l| l.nombre().to_string())
        .unwrap_or_else(|| "Sin asignar".to_string());
    ElementBuilder::new("dl")?
        .class("datos")
        .child(ElementBuilder::new("dt")?.text("Usuario").build())?
        .child(ElementBuilder::new("dd")?.text(&invitation.username).build())?
        .child(ElementBuilder::new("dt")?.text("Email").build())?
        .child(ElementBuilder::new("dd")?.text(&invitation.email).build())?
        .child(ElementBuilder::new("dt")?.text("Línea").build())?
        .child(ElementBuilder::new("dd")?.text(&linea).build())
        .map(|b| b.build())
}
