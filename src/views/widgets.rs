// ============================================================================
// WIDGETS - Piezas de UI compartidas por las vistas
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, HtmlInputElement};

use crate::dom::{on_change, on_click, on_input, set_class_name, set_text_content, ElementBuilder};
use crate::models::{Estado, Linea};
use crate::routing::Route;
use crate::services::MultipartFile;
use crate::state::AppState;

/// Valor de un campo de formulario compartido entre closures
pub type Field = Rc<RefCell<String>>;

pub fn field() -> Field {
    Rc::new(RefCell::new(String::new()))
}

pub fn field_with(value: &str) -> Field {
    Rc::new(RefCell::new(value.to_string()))
}

/// Label + input enlazado a `value`
pub fn input_group(label: &str, name: &str, kind: &str, value: &Field) -> Result<Element, JsValue> {
    let input = ElementBuilder::new("input")?
        .class("form-input")
        .attr("type", kind)?
        .id(name)?
        .attr("name", name)?
        .attr("value", &value.borrow())?
        .build();

    let value = value.clone();
    on_input(&input, move |v| *value.borrow_mut() = v)?;

    ElementBuilder::new("div")?
        .class("form-group")
        .child(ElementBuilder::new("label")?.attr("for", name)?.text(label).build())?
        .child(input)
        .map(|b| b.build())
}

pub fn textarea_group(label: &str, name: &str, value: &Field) -> Result<Element, JsValue> {
    let area = ElementBuilder::new("textarea")?
        .class("form-input")
        .id(name)?
        .attr("rows", "4")?
        .text(&value.borrow())
        .build();

    let value = value.clone();
    on_input(&area, move |v| *value.borrow_mut() = v)?;

    ElementBuilder::new("div")?
        .class("form-group")
        .child(ElementBuilder::new("label")?.attr("for", name)?.text(label).build())?
        .child(area)
        .map(|b| b.build())
}

/// Select con opciones `(valor, etiqueta)`; `placeholder` agrega una opción vacía
pub fn select_group<F>(
    label: &str,
    name: &str,
    options: &[(String, String)],
    selected: &str,
    placeholder: Option<&str>,
    on_select: F,
) -> Result<Element, JsValue>
where
    F: FnMut(String) + 'static,
{
    let select = ElementBuilder::new("select")?.class("form-input").id(name)?.build();
    if let Some(placeholder) = placeholder {
        select.append_child(&ElementBuilder::new("option")?.attr("value", "")?.text(placeholder).build())?;
    }
    for (value, text) in options {
        let option = ElementBuilder::new("option")?
            .attr("value", value)?
            .flag("selected", value == selected)?
            .text(text)
            .build();
        select.append_child(&option)?;
    }
    on_change(&select, on_select)?;

    ElementBuilder::new("div")?
        .class("form-group")
        .child(ElementBuilder::new("label")?.attr("for", name)?.text(label).build())?
        .child(select)
        .map(|b| b.build())
}

pub fn linea_options(lineas: &[Linea]) -> Vec<(String, String)> {
    lineas
        .iter()
        .map(|l| (l.id().to_string(), l.nombre().to_string()))
        .collect()
}

/// Caja de mensajes de un formulario (vacía hasta que hay algo que decir)
pub fn status_box() -> Result<Element, JsValue> {
    Ok(ElementBuilder::new("div")?.class("form-status").build())
}

pub fn show_error(status: &Element, message: &str) {
    set_class_name(status, "form-status error");
    set_text_content(status, message);
}

pub fn show_ok(status: &Element, message: &str) {
    set_class_name(status, "form-status ok");
    set_text_content(status, message);
}

pub fn clear_status(status: &Element) {
    set_class_name(status, "form-status");
    set_text_content(status, "");
}

pub fn button(text: &str, class: &str) -> Result<Element, JsValue> {
    Ok(ElementBuilder::new("button")?
        .attr("type", "button")?
        .class(class)
        .text(text)
        .build())
}

pub fn submit_button(text: &str) -> Result<Element, JsValue> {
    Ok(ElementBuilder::new("button")?
        .attr("type", "submit")?
        .class("btn-primary")
        .text(text)
        .build())
}

/// Link interno: pushState en lugar de recargar
pub fn nav_link(state: &AppState, text: &str, route: Route, class: &str) -> Result<Element, JsValue> {
    let link = ElementBuilder::new("a")?
        .class(class)
        .attr("href", &route.path())?
        .text(text)
        .build();
    let state = state.clone();
    on_click(&link, move |e| {
        e.prevent_default();
        state.navigate(route.clone());
    })?;
    Ok(link)
}

pub fn linea_badge(linea: Linea) -> Result<Element, JsValue> {
    Ok(ElementBuilder::new("span")?
        .class("linea-badge")
        .attr("style", &format!("background-color: {}", linea.color()))?
        .text(linea.id())
        .build())
}

pub fn estado_badge(estado: Estado) -> Result<Element, JsValue> {
    Ok(ElementBuilder::new("span")?
        .class(&format!("estado-badge {}", estado.css_class()))
        .text(estado.nombre())
        .build())
}

pub fn format_fecha(fecha: &DateTime<Utc>) -> String {
    fecha.format("%d/%m/%Y %H:%M").to_string()
}

pub fn loading_screen(text: &str) -> Result<Element, JsValue> {
    ElementBuilder::new("div")?
        .class("loading-screen")
        .child(ElementBuilder::new("div")?.class("spinner").build())?
        .child(ElementBuilder::new("p")?.text(text).build())
        .map(|b| b.build())
}

pub fn error_panel(message: &str) -> Result<Element, JsValue> {
    Ok(ElementBuilder::new("div")?
        .class("error-panel")
        .text(message)
        .build())
}

/// Lee los archivos elegidos en un `<input type="file">`
pub async fn read_files(input: &Element) -> Result<Vec<MultipartFile>, JsValue> {
    let input = input
        .dyn_ref::<HtmlInputElement>()
        .ok_or_else(|| JsValue::from_str("No es un input"))?;
    let files = match input.files() {
        Some(files) => files,
        None => return Ok(Vec::new()),
    };

    let mut result = Vec::new();
    for index in 0..files.length() {
        if let Some(file) = files.get(index) {
            let buffer = JsFuture::from(file.array_buffer()).await?;
            result.push(MultipartFile {
                file_name: file.name(),
                content_type: file.type_(),
                bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
            });
        }
    }
    Ok(result)
}
