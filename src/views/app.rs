// ============================================================================
// APP VIEW - Raíz: guard → carga de datos → vista
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{document, ElementBuilder};
use crate::routing::Route;
use crate::state::{AppState, FlashKind, PageData};
use crate::views::widgets::{error_panel, loading_screen};
use crate::views::{
    render_aceptar_invitacion, render_administracion, render_dashboard, render_detalle, render_estadisticas,
    render_header, render_login, render_nuevo_reclamo, render_register, render_usuarios,
};

pub fn render_app(state: &AppState) -> Result<Element, JsValue> {
    // Sesión todavía cargando: estado neutro, sin redirecciones
    let view = match state.resolve_view() {
        Some(view) => view,
        None => return loading_screen("Cargando..."),
    };

    if let Some(doc) = document() {
        doc.set_title(&format!("{} · Reclamos UTA", view.titulo()));
    }

    if state.needs_load(&view) {
        let epoch = state.begin_load(&view);
        let (state, view) = (state.clone(), view.clone());
        spawn_local(async move {
            let data = state.load(&view).await;
            state.finish_load(&view, epoch, data);
        });
    }

    let shell = ElementBuilder::new("div")?.class("app-shell").build();
    if view.shows_header() {
        let header = render_header(state, &view)?;
        shell.append_child(&header)?;
    }

    if let Some(flash) = state.take_flash() {
        let class = match flash.kind {
            FlashKind::Exito => "flash ok",
            FlashKind::Error => "flash error",
        };
        shell.append_child(&ElementBuilder::new("div")?.class(class).text(&flash.text).build())?;
    }

    let content = render_view(state, &view)?;
    shell.append_child(&ElementBuilder::new("main")?.class("app-main").child(content)?.build())?;
    Ok(shell)
}

fn render_view(state: &AppState, view: &Route) -> Result<Element, JsValue> {
    let data = state.page.get().data;

    match (view, &data) {
        // Vistas sin datos previos
        (Route::Login, _) => render_login(state),
        (Route::Register, _) => render_register(state),
        (Route::Invitacion { token }, _) => render_aceptar_invitacion(state, token),
        (Route::NuevoReclamo, _) => render_nuevo_reclamo(state),

        (Route::Dashboard, PageData::Dashboard(dashboard)) => render_dashboard(state, dashboard),
        (Route::Administracion { linea }, PageData::Listado(reclamos)) => {
            render_administracion(state, *linea, reclamos)
        }
        (Route::DetalleReclamo { .. }, PageData::Detalle(reclamo)) => render_detalle(state, reclamo),
        (Route::Estadisticas, PageData::Estadisticas(resumen)) => render_estadisticas(resumen),
        (Route::Usuarios, PageData::Ready) => render_usuarios(state),

        (_, PageData::Error(message)) => error_panel(message),
        _ => loading_screen("Cargando..."),
    }
}
