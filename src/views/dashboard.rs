// ============================================================================
// DASHBOARD VIEW - Contadores por línea + reclamos recientes
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::access::CreationBlock;
use crate::dom::{on_click, on_submit, set_disabled, ElementBuilder};
use crate::routing::Route;
use crate::state::AppState;
use crate::viewmodels::DashboardData;
use crate::views::reclamo_list::render_reclamo_table;
use crate::views::widgets::{
    clear_status, field, input_group, linea_badge, nav_link, show_error, show_ok, status_box, submit_button,
};

const RECIENTES: usize = 5;

pub fn render_dashboard(state: &AppState, data: &DashboardData) -> Result<Element, JsValue> {
    let page = ElementBuilder::new("section")?.class("page dashboard").build();

    let title_row = ElementBuilder::new("div")?
        .class("page-title")
        .child(ElementBuilder::new("h2")?.text("Panel de reclamos").build())?
        .build();
    if data.permissions.can_create_grievance {
        let link = nav_link(state, "+ Nuevo reclamo", Route::NuevoReclamo, "btn-primary")?;
        title_row.append_child(&link)?;
    }
    page.append_child(&title_row)?;

    if data.permissions.creation_block == Some(CreationBlock::PendingProvisioning) {
        let advisory = render_advisory(CreationBlock::PendingProvisioning)?;
        page.append_child(&advisory)?;
    }

    let grid = ElementBuilder::new("div")?.class("linea-grid").build();
    for stat in &data.stats {
        if !data.permissions.scope.allows(stat.linea) {
            continue;
        }
        let card = ElementBuilder::new("div")?
            .class("linea-card")
            .attr("style", &format!("border-top-color: {}", stat.linea.color()))?
            .child(linea_badge(stat.linea)?)?
            .child(ElementBuilder::new("h3")?.text(stat.linea.nombre()).build())?
            .child(ElementBuilder::new("p")?.class("stat-total").text(&format!("Total: {}", stat.total)).build())?
            .child(ElementBuilder::new("p")?.class("stat-activos").text(&format!("Activos: {}", stat.activos)).build())?
            .build();
        let state = state.clone();
        let linea = stat.linea;
        on_click(&card, move |_| state.navigate(Route::Administracion { linea: Some(linea) }))?;
        grid.append_child(&card)?;
    }
    page.append_child(&grid)?;

    page.append_child(&ElementBuilder::new("h3")?.text("Reclamos recientes").build())?;
    let mut recientes = data.reclamos.clone();
    recientes.sort_by(|a, b| b.fecha_creacion.cmp(&a.fecha_creacion));
    recientes.truncate(RECIENTES);
    let tabla = render_reclamo_table(state, &recientes)?;
    page.append_child(&tabla)?;

    let cuenta = render_change_password(state)?;
    page.append_child(&cuenta)?;
    Ok(page)
}

/// Aviso en lugar del botón de alta
pub fn render_advisory(block: CreationBlock) -> Result<Element, JsValue> {
    ElementBuilder::new("div")?
        .class("advisory")
        .child(ElementBuilder::new("strong")?.text(block.titulo()).build())?
        .child(ElementBuilder::new("p")?.text(block.mensaje()).build())
        .map(|b| b.build())
}

fn render_change_password(state: &AppState) -> Result<Element, JsValue> {
    let current = field();
    let new = field();
    let confirmation = field();
    let status = status_box()?;
    let submit = submit_button("Cambiar contraseña")?;

    let form = ElementBuilder::new("form")?
        .class("inline-form")
        .child(input_group("Contraseña actual", "current_password", "password", &current)?)?
        .child(input_group("Nueva contraseña", "new_password", "password", &new)?)?
        .child(input_group("Repetir nueva", "confirm_password", "password", &confirmation)?)?
        .child(status.clone())?
        .child(submit.clone())?
        .build();

    let vm = state.session_vm.clone();
    on_submit(&form, move || {
        let values = (current.borrow().clone(), new.borrow().clone(), confirmation.borrow().clone());
        let (vm, status, submit) = (vm.clone(), status.clone(), submit.clone());
        clear_status(&status);
        set_disabled(&submit, true);
        spawn_local(async move {
            let (c, n, k) = values;
            match vm.change_password(&c, &n, &k).await {
                Ok(()) => show_ok(&status, "Contraseña actualizada"),
                Err(e) => show_error(&status, &e.user_message()),
            }
            set_disabled(&submit, false);
        });
    })?;

    ElementBuilder::new("details")?
        .class("account-box")
        .child(ElementBuilder::new("summary")?.text("Mi cuenta").build())?
        .child(form)
        .map(|b| b.build())
}
