// ============================================================================
// NUEVO RECLAMO VIEW - Alta con adjuntos
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{on_submit, set_disabled, ElementBuilder};
use crate::models::{Categoria, Linea};
use crate::routing::Route;
use crate::state::AppState;
use crate::viewmodels::NuevoReclamoForm;
use crate::views::dashboard::render_advisory;
use crate::views::widgets::{
    clear_status, field, input_group, linea_options, read_files, select_group, show_error, status_box,
    submit_button, textarea_group,
};

pub fn render_nuevo_reclamo(state: &AppState) -> Result<Element, JsValue> {
    let permissions = state.session.permissions();
    let page = ElementBuilder::new("section")?
        .class("page nuevo-reclamo")
        .child(ElementBuilder::new("h2")?.text("Nuevo reclamo").build())?
        .build();

    if let Some(block) = permissions.creation_block {
        let advisory = render_advisory(block)?;
        page.append_child(&advisory)?;
        return Ok(page);
    }

    let linea: Rc<RefCell<Option<Linea>>> = Rc::new(RefCell::new(permissions.forced_line));
    let categoria: Rc<RefCell<Option<Categoria>>> = Rc::new(RefCell::new(None));
    let sector = field();
    let descripcion = field();

    let lineas = permissions.creatable_lines();
    let linea_group = {
        let linea = linea.clone();
        let selected = permissions.forced_line.map(|l| l.id()).unwrap_or_default();
        let placeholder = permissions.forced_line.is_none().then_some("Seleccioná una línea");
        select_group("Línea", "linea", &linea_options(&lineas), selected, placeholder, move |v| {
            *linea.borrow_mut() = Linea::from_id(&v);
        })?
    };

    let categoria_group = {
        let categoria = categoria.clone();
        let options: Vec<(String, String)> = Categoria::ALL
            .iter()
            .map(|c| (c.nombre().to_string(), c.nombre().to_string()))
            .collect();
        select_group("Categoría", "categoria", &options, "", Some("Seleccioná una categoría"), move |v| {
            *categoria.borrow_mut() = Categoria::from_nombre(&v);
        })?
    };

    let files = ElementBuilder::new("input")?
        .class("form-input")
        .attr("type", "file")?
        .id("archivos")?
        .flag("multiple", true)?
        .build();
    let files_group = ElementBuilder::new("div")?
        .class("form-group")
        .child(ElementBuilder::new("label")?.attr("for", "archivos")?.text("Adjuntos").build())?
        .child(files.clone())?
        .build();

    let status = status_box()?;
    let submit = submit_button("Enviar reclamo")?;

    let form = ElementBuilder::new("form")?
        .class("reclamo-form")
        .child(linea_group)?
        .child(categoria_group)?
        .child(input_group("Sector / estación", "sector_estacion", "text", &sector)?)?
        .child(textarea_group("Descripción", "descripcion", &descripcion)?)?
        .child(files_group)?
        .child(status.clone())?
        .child(submit.clone())?
        .build();

    {
        let state = state.clone();
        on_submit(&form, move || {
            let form = NuevoReclamoForm {
                linea: *linea.borrow(),
                categoria: *categoria.borrow(),
                sector_estacion: sector.borrow().clone(),
                descripcion: descripcion.borrow().clone(),
            };
            let (state, status, submit, files) = (state.clone(), status.clone(), submit.clone(), files.clone());
            clear_status(&status);
            set_disabled(&submit, true);

            spawn_local(async move {
                let attachments = match read_files(&files).await {
                    Ok(attachments) => attachments,
                    Err(e) => {
                        log::warn!("⚠️ [RECLAMO] No se pudieron leer los adjuntos: {:?}", e);
                        Vec::new()
                    }
                };

                match state.reclamos_vm.create(form, attachments).await {
                    Ok(outcome) => {
                        if outcome.failed_uploads.is_empty() {
                            state.flash_ok(format!("Reclamo {} creado", outcome.reclamo.numero_reclamo));
                        } else {
                            state.flash_ok(format!(
                                "Reclamo {} creado. No se pudieron subir: {}",
                                outcome.reclamo.numero_reclamo,
                                outcome.failed_uploads.join(", ")
                            ));
                        }
                        state.navigate(Route::DetalleReclamo { id: outcome.reclamo.id });
                    }
                    Err(e) => {
                        show_error(&status, &e.user_message());
                        set_disabled(&submit, false);
                    }
                }
            });
        })?;
    }

    page.append_child(&form)?;
    Ok(page)
}
