// ============================================================================
// ADMINISTRACION VIEW - Listado filtrable de reclamos
// ============================================================================
// El filtro de línea vive en la URL (?linea=); el resto se aplica con un
// nuevo request y se re-pinta solo la tabla.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{on_submit, set_inner_html, ElementBuilder};
use crate::models::{Categoria, Estado, Linea, Reclamo, ReclamoFilters};
use crate::routing::Route;
use crate::state::AppState;
use crate::views::reclamo_list::render_reclamo_table;
use crate::views::widgets::{error_panel, field, input_group, linea_options, select_group, submit_button};

pub fn render_administracion(state: &AppState, linea: Option<Linea>, reclamos: &[Reclamo]) -> Result<Element, JsValue> {
    let permissions = state.session.permissions();
    let titulo = match permissions.forced_line.or(linea) {
        Some(linea) => format!("Reclamos · {}", linea.nombre()),
        None => "Reclamos · Todas las líneas".to_string(),
    };

    let page = ElementBuilder::new("section")?
        .class("page administracion")
        .child(ElementBuilder::new("h2")?.text(&titulo).build())?
        .build();

    let filters = Rc::new(RefCell::new(ReclamoFilters {
        linea,
        ..ReclamoFilters::default()
    }));
    let search = field();

    let form = ElementBuilder::new("form")?.class("filters").build();

    if permissions.forced_line.is_none() {
        let state = state.clone();
        let selected = linea.map(|l| l.id()).unwrap_or_default();
        let select = select_group(
            "Línea",
            "filtro_linea",
            &linea_options(&Linea::ALL),
            selected,
            Some("Todas"),
            move |v| state.navigate(Route::Administracion { linea: Linea::from_id(&v) }),
        )?;
        form.append_child(&select)?;
    }

    {
        let filters = filters.clone();
        let options: Vec<(String, String)> = Categoria::ALL
            .iter()
            .map(|c| (c.nombre().to_string(), c.nombre().to_string()))
            .collect();
        let select = select_group("Categoría", "filtro_categoria", &options, "", Some("Todas"), move |v| {
            filters.borrow_mut().categoria = Categoria::from_nombre(&v);
        })?;
        form.append_child(&select)?;
    }

    {
        let filters = filters.clone();
        let options: Vec<(String, String)> = Estado::ALL
            .iter()
            .map(|e| (e.nombre().to_string(), e.nombre().to_string()))
            .collect();
        let select = select_group("Estado", "filtro_estado", &options, "", Some("Todos"), move |v| {
            filters.borrow_mut().estado = Estado::from_nombre(&v);
        })?;
        form.append_child(&select)?;
    }

    let buscar = input_group("Buscar", "filtro_search", "search", &search)?;
    form.append_child(&buscar)?;
    let submit = submit_button("Filtrar")?;
    form.append_child(&submit)?;
    page.append_child(&form)?;

    let table_box = ElementBuilder::new("div")?
        .class("table-box")
        .child(render_reclamo_table(state, reclamos)?)?
        .build();
    page.append_child(&table_box)?;

    {
        let state = state.clone();
        on_submit(&form, move || {
            let mut query = filters.borrow().clone();
            let text = search.borrow().trim().to_string();
            query.search = (!text.is_empty()).then_some(text);

            let (state, table_box) = (state.clone(), table_box.clone());
            spawn_local(async move {
                let rendered = match state.reclamos_vm.list(query).await {
                    Ok(reclamos) => render_reclamo_table(&state, &reclamos),
                    Err(e) => error_panel(&e.user_message()),
                };
                match rendered {
                    Ok(table) => {
                        set_inner_html(&table_box, "");
                        if let Err(e) = table_box.append_child(&table) {
                            log::error!("❌ [ADMIN] Error pintando tabla: {:?}", e);
                        }
                    }
                    Err(e) => log::error!("❌ [ADMIN] Error armando tabla: {:?}", e),
                }
            });
        })?;
    }

    Ok(page)
}
