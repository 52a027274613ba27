// ============================================================================
// HEADER - Navegación + campana de notificaciones + usuario
// ============================================================================
// La campana se actualiza de forma incremental (sin re-render completo)
// para no pisar formularios abiertos cada vez que llega el polling.
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{get_element_by_id, on_click, set_class_name, set_inner_html, set_text_content, ElementBuilder};
use crate::routing::Route;
use crate::state::AppState;
use crate::viewmodels::NotificationSnapshot;
use crate::views::widgets::{button, nav_link};

const BELL_COUNT_ID: &str = "notif-count";
const BELL_DROPDOWN_ID: &str = "notif-dropdown";

pub fn render_header(state: &AppState, current: &Route) -> Result<Element, JsValue> {
    let identity = match state.session.identity() {
        Some(identity) => identity,
        None => return Ok(ElementBuilder::new("header")?.class("app-header").build()),
    };
    let permissions = state.session.permissions();

    let header = ElementBuilder::new("header")?.class("app-header").build();

    let brand = ElementBuilder::new("div")?
        .class("brand")
        .child(ElementBuilder::new("h1")?.text("Reclamos UTA").build())?
        .build();
    header.append_child(&brand)?;

    let nav = ElementBuilder::new("nav")?.class("main-nav").build();
    let mut links = vec![
        ("Panel", Route::Dashboard),
        ("Reclamos", Route::Administracion { linea: None }),
        ("Estadísticas", Route::Estadisticas),
    ];
    if permissions.can_create_grievance {
        links.insert(1, ("Nuevo reclamo", Route::NuevoReclamo));
    }
    if permissions.can_manage_users {
        links.push(("Usuarios", Route::Usuarios));
    }
    for (text, route) in links {
        let class = if std::mem::discriminant(&route) == std::mem::discriminant(current) {
            "nav-link active"
        } else {
            "nav-link"
        };
        let link = nav_link(state, text, route, class)?;
        nav.append_child(&link)?;
    }
    header.append_child(&nav)?;

    let user_box = ElementBuilder::new("div")?.class("user-box").build();
    let bell = render_bell(state)?;
    user_box.append_child(&bell)?;

    let mut user_label = format!("{} · {}", identity.username, identity.role.etiqueta());
    if let Some(linea) = identity.assigned_line {
        user_label.push_str(&format!(" · {}", linea.nombre()));
    }
    user_box.append_child(&ElementBuilder::new("span")?.class("user-name").text(&user_label).build())?;

    let logout = button("Salir", "btn-logout")?;
    {
        let state = state.clone();
        on_click(&logout, move |_| {
            log::info!("👋 [HEADER] Logout");
            state.session_vm.logout();
        })?;
    }
    user_box.append_child(&logout)?;
    header.append_child(&user_box)?;

    Ok(header)
}

fn render_bell(state: &AppState) -> Result<Element, JsValue> {
    let snapshot = state.notifications_vm.snapshot();

    let bell = ElementBuilder::new("div")?.class("notif-bell").build();
    let toggle = button("🔔", "btn-bell")?;
    toggle.append_child(&ElementBuilder::new("span")?.id(BELL_COUNT_ID)?.build())?;
    bell.append_child(&toggle)?;
    bell.append_child(&ElementBuilder::new("div")?.id(BELL_DROPDOWN_ID)?.build())?;

    {
        let state = state.clone();
        on_click(&toggle, move |_| {
            state.notifications_vm.toggle_open();
            if state.notifications_vm.snapshot().open {
                let vm = state.notifications_vm.clone();
                spawn_local(async move {
                    if let Err(e) = vm.refresh_list().await {
                        log::warn!("⚠️ [NOTIF] No se pudo cargar la lista: {}", e);
                    }
                });
            }
        })?;
    }

    fill_bell(state, &snapshot, &toggle, &bell)?;
    Ok(bell)
}

/// Actualización incremental llamada desde la suscripción al viewmodel
pub fn update_notification_bell(state: &AppState) {
    let (count, dropdown) = match (get_element_by_id(BELL_COUNT_ID), get_element_by_id(BELL_DROPDOWN_ID)) {
        (Some(count), Some(dropdown)) => (count, dropdown),
        _ => return,
    };
    let snapshot = state.notifications_vm.snapshot();
    if let Err(e) = paint(state, &snapshot, &count, &dropdown) {
        log::warn!("⚠️ [NOTIF] Error actualizando campana: {:?}", e);
    }
}

fn fill_bell(state: &AppState, snapshot: &NotificationSnapshot, toggle: &Element, bell: &Element) -> Result<(), JsValue> {
    let count = toggle
        .first_element_child()
        .ok_or_else(|| JsValue::from_str("Falta contador"))?;
    let dropdown = bell
        .last_element_child()
        .ok_or_else(|| JsValue::from_str("Falta desplegable"))?;
    paint(state, snapshot, &count, &dropdown)
}

fn paint(state: &AppState, snapshot: &NotificationSnapshot, count: &Element, dropdown: &Element) -> Result<(), JsValue> {
    if snapshot.unread > 0 {
        set_class_name(count, "notif-count");
        set_text_content(count, &snapshot.unread.to_string());
    } else {
        set_class_name(count, "notif-count hidden");
        set_text_content(count, "");
    }

    set_inner_html(dropdown, "");
    set_class_name(dropdown, if snapshot.open { "notif-dropdown open" } else { "notif-dropdown" });
    if !snapshot.open {
        return Ok(());
    }

    if snapshot.items.is_empty() {
        dropdown.append_child(&ElementBuilder::new("p")?.class("notif-empty").text("Sin notificaciones").build())?;
        return Ok(());
    }

    for item in &snapshot.items {
        let row = ElementBuilder::new("div")?
            .class(if item.read { "notif-item" } else { "notif-item unread" })
            .text(&item.message)
            .build();
        let state = state.clone();
        let item = item.clone();
        on_click(&row, move |_| {
            let vm = state.notifications_vm.clone();
            if !item.read {
                let id = item.id.clone();
                spawn_local(async move {
                    if let Err(e) = vm.mark_read(&id).await {
                        log::warn!("⚠️ [NOTIF] No se pudo marcar {}: {}", id, e);
                    }
                });
            }
            if let Some(reclamo_id) = &item.reclamo_id {
                state.notifications_vm.toggle_open();
                state.navigate(Route::DetalleReclamo { id: reclamo_id.clone() });
            }
        })?;
        dropdown.append_child(&row)?;
    }
    Ok(())
}
