// ============================================================================
// RECLAMO LIST - Tabla de reclamos reutilizada por dashboard y administración
// ============================================================================

use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::dom::{on_click, ElementBuilder};
use crate::models::Reclamo;
use crate::routing::Route;
use crate::state::AppState;
use crate::views::widgets::{estado_badge, format_fecha, linea_badge};

pub fn render_reclamo_table(state: &AppState, reclamos: &[Reclamo]) -> Result<Element, JsValue> {
    if reclamos.is_empty() {
        return Ok(ElementBuilder::new("p")?.class("empty").text("No hay reclamos para mostrar").build());
    }

    let head = ElementBuilder::new("tr")?.build();
    for title in ["Número", "Línea", "Categoría", "Sector / estación", "Estado", "Fecha"] {
        head.append_child(&ElementBuilder::new("th")?.text(title).build())?;
    }

    let body = ElementBuilder::new("tbody")?.build();
    for reclamo in reclamos {
        let row = ElementBuilder::new("tr")?
            .class("reclamo-row")
            .child(ElementBuilder::new("td")?.text(&reclamo.numero_reclamo).build())?
            .child(ElementBuilder::new("td")?.child(linea_badge(reclamo.linea)?)?.build())?
            .child(ElementBuilder::new("td")?.text(reclamo.categoria.nombre()).build())?
            .child(ElementBuilder::new("td")?.text(&reclamo.sector_estacion).build())?
            .child(ElementBuilder::new("td")?.child(estado_badge(reclamo.estado)?)?.build())?
            .child(ElementBuilder::new("td")?.text(&format_fecha(&reclamo.fecha_creacion)).build())?
            .build();
        let state = state.clone();
        let id = reclamo.id.clone();
        on_click(&row, move |_| state.navigate(Route::DetalleReclamo { id: id.clone() }))?;
        body.append_child(&row)?;
    }

    ElementBuilder::new("table")?
        .class("reclamo-table")
        .child(ElementBuilder::new("thead")?.child(head)?.build())?
        .child(body)
        .map(|b| b.build())
}
