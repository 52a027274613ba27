// ============================================================================
// DETALLE RECLAMO VIEW - Datos, comentarios, adjuntos y edición (ADMIN)
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{on_submit, set_disabled, ElementBuilder};
use crate::models::{Estado, Reclamo};
use crate::state::AppState;
use crate::viewmodels::EdicionReclamoForm;
use crate::views::widgets::{
    clear_status, estado_badge, field, field_with, format_fecha, input_group, linea_badge, read_files,
    select_group, show_error, status_box, submit_button, textarea_group,
};

pub fn render_detalle(state: &AppState, reclamo: &Reclamo) -> Result<Element, JsValue> {
    let permissions = state.session.permissions();

    let page = ElementBuilder::new("section")?
        .class("page detalle")
        .child(
            ElementBuilder::new("div")?
                .class("page-title")
                .child(ElementBuilder::new("h2")?.text(&reclamo.numero_reclamo).build())?
                .child(linea_badge(reclamo.linea)?)?
                .child(estado_badge(reclamo.estado)?)?
                .build(),
        )?
        .child(render_datos(reclamo)?)?
        .build();

    if permissions.can_edit_state {
        let edicion = render_edicion(state, reclamo)?;
        page.append_child(&edicion)?;
    }

    let comentarios = render_comentarios(state, reclamo, permissions.can_comment)?;
    page.append_child(&comentarios)?;
    let archivos = render_archivos(state, reclamo, permissions.can_upload)?;
    page.append_child(&archivos)?;
    Ok(page)
}

fn dato(label: &str, value: &str) -> Result<Element, JsValue> {
    ElementBuilder::new("div")?
        .class("dato")
        .child(ElementBuilder::new("dt")?.text(label).build())?
        .child(ElementBuilder::new("dd")?.text(value).build())
        .map(|b| b.build())
}

fn render_datos(reclamo: &Reclamo) -> Result<Element, JsValue> {
    let guion = "—".to_string();
    let mut datos = vec![
        dato("Línea", reclamo.linea.nombre())?,
        dato("Categoría", reclamo.categoria.nombre())?,
        dato("Sector / estación", &reclamo.sector_estacion)?,
        dato("Descripción", &reclamo.descripcion)?,
        dato("Fecha de creación", &format_fecha(&reclamo.fecha_creacion))?,
        dato("Responsable", reclamo.responsable.as_ref().unwrap_or(&guion))?,
    ];
    if reclamo.estado == Estado::Resuelto {
        datos.push(dato("Solución", reclamo.solucion.as_ref().unwrap_or(&guion))?);
        datos.push(dato("Responsable de cierre", reclamo.responsable_cierre.as_ref().unwrap_or(&guion))?);
        if let Some(cierre) = &reclamo.fecha_cierre {
            datos.push(dato("Fecha de cierre", &format_fecha(cierre))?);
        }
    }
    ElementBuilder::new("dl")?
        .class("datos")
        .children(datos)
        .map(|b| b.build())
}

fn render_edicion(state: &AppState, reclamo: &Reclamo) -> Result<Element, JsValue> {
    let inicial = EdicionReclamoForm::from_reclamo(reclamo);
    let estado = Rc::new(RefCell::new(inicial.estado));
    let responsable = field_with(&inicial.responsable);
    let solucion = field_with(&inicial.solucion);
    let responsable_cierre = field_with(&inicial.responsable_cierre);

    let estado_group = {
        let estado = estado.clone();
        let options: Vec<(String, String)> = Estado::ALL
            .iter()
            .map(|e| (e.nombre().to_string(), e.nombre().to_string()))
            .collect();
        select_group("Estado", "estado", &options, inicial.estado.nombre(), None, move |v| {
            if let Some(nuevo) = Estado::from_nombre(&v) {
                *estado.borrow_mut() = nuevo;
            }
        })?
    };

    let status = status_box()?;
    let submit = submit_button("Guardar cambios")?;
    let form = ElementBuilder::new("form")?
        .class("edicion-form")
        .child(ElementBuilder::new("h3")?.text("Gestión").build())?
        .child(estado_group)?
        .child(input_group("Responsable", "responsable", "text", &responsable)?)?
        .child(textarea_group("Solución", "solucion", &solucion)?)?
        .child(input_group("Responsable de cierre", "responsable_cierre", "text", &responsable_cierre)?)?
        .child(status.clone())?
        .child(submit.clone())?
        .build();

    let state = state.clone();
    let actual = reclamo.clone();
    on_submit(&form, move || {
        let form = EdicionReclamoForm {
            estado: *estado.borrow(),
            responsable: responsable.borrow().clone(),
            solucion: solucion.borrow().clone(),
            responsable_cierre: responsable_cierre.borrow().clone(),
        };
        let (state, status, submit, actual) = (state.clone(), status.clone(), submit.clone(), actual.clone());
        clear_status(&status);
        set_disabled(&submit, true);
        spawn_local(async move {
            match state.reclamos_vm.update(&actual, &form).await {
                Ok(actualizado) => {
                    state.flash_ok(format!("Reclamo {} actualizado", actualizado.numero_reclamo));
                    state.invalidate_page();
                }
                Err(e) => {
                    show_error(&status, &e.user_message());
                    set_disabled(&submit, false);
                }
            }
        });
    })?;
    Ok(form)
}

fn render_comentarios(state: &AppState, reclamo: &Reclamo, can_comment: bool) -> Result<Element, JsValue> {
    let section = ElementBuilder::new("div")?
        .class("comentarios")
        .child(ElementBuilder::new("h3")?.text("Comentarios").build())?
        .build();

    if reclamo.comentarios.is_empty() {
        section.append_child(&ElementBuilder::new("p")?.class("empty").text("Sin comentarios").build())?;
    }
    for comentario in &reclamo.comentarios {
        let meta = format!("{} · {}", comentario.author, format_fecha(&comentario.timestamp));
        section.append_child(
            &ElementBuilder::new("div")?
                .class("comentario")
                .child(ElementBuilder::new("p")?.class("meta").text(&meta).build())?
                .child(ElementBuilder::new("p")?.text(&comentario.text).build())?
                .build(),
        )?;
    }

    if !can_comment {
        return Ok(section);
    }

    let texto = field();
    let status = status_box()?;
    let submit = submit_button("Comentar")?;
    let form = ElementBuilder::new("form")?
        .class("comentario-form")
        .child(textarea_group("Nuevo comentario", "comentario", &texto)?)?
        .child(status.clone())?
        .child(submit.clone())?
        .build();

    let state = state.clone();
    let id = reclamo.id.clone();
    on_submit(&form, move || {
        let text = texto.borrow().clone();
        let (state, status, submit, id) = (state.clone(), status.clone(), submit.clone(), id.clone());
        clear_status(&status);
        set_disabled(&submit, true);
        spawn_local(async move {
            match state.reclamos_vm.comment(&id, &text).await {
                Ok(_) => state.invalidate_page(),
                Err(e) => {
                    show_error(&status, &e.user_message());
                    set_disabled(&submit, false);
                }
            }
        });
    })?;
    section.append_child(&form)?;
    Ok(section)
}

fn render_archivos(state: &AppState, reclamo: &Reclamo, can_upload: bool) -> Result<Element, JsValue> {
    let section = ElementBuilder::new("div")?
        .class("archivos")
        .child(ElementBuilder::new("h3")?.text("Archivos").build())?
        .build();

    let lista = ElementBuilder::new("ul")?.build();
    for url in &reclamo.archivos {
        let nombre = url.rsplit('/').next().unwrap_or(url);
        let link = ElementBuilder::new("a")?
            .attr("href", url)?
            .attr("target", "_blank")?
            .text(nombre)
            .build();
        lista.append_child(&ElementBuilder::new("li")?.child(link)?.build())?;
    }
    section.append_child(&lista)?;

    if !can_upload {
        return Ok(section);
    }

    let input = ElementBuilder::new("input")?.attr("type", "file")?.id("archivo")?.build();
    let status = status_box()?;
    let submit = submit_button("Subir archivo")?;
    let form = ElementBuilder::new("form")?
        .class("archivo-form")
        .child(input.clone())?
        .child(status.clone())?
        .child(submit.clone())?
        .build();

    let state = state.clone();
    let id = reclamo.id.clone();
    on_submit(&form, move || {
        let (state, status, submit, id, input) =
            (state.clone(), status.clone(), submit.clone(), id.clone(), input.clone());
        clear_status(&status);
        set_disabled(&submit, true);
        spawn_local(async move {
            let file = match read_files(&input).await {
                Ok(mut files) if !files.is_empty() => files.remove(0),
                Ok(_) => {
                    show_error(&status, "Elegí un archivo");
                    set_disabled(&submit, false);
                    return;
                }
                Err(e) => {
                    log::error!("❌ [ARCHIVO] Error leyendo archivo: {:?}", e);
                    show_error(&status, "No se pudo leer el archivo");
                    set_disabled(&submit, false);
                    return;
                }
            };
            match state.reclamos_vm.upload(&id, file).await {
                Ok(_) => state.invalidate_page(),
                Err(e) => {
                    show_error(&status, &e.user_message());
                    set_disabled(&submit, false);
                }
            }
        });
    })?;
    section.append_child(&form)?;
    Ok(section)
}
