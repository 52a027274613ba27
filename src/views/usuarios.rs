// ============================================================================
// USUARIOS VIEW - Administración de usuarios e invitaciones (ADMIN)
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{on_change, on_click, on_submit, set_disabled, ElementBuilder};
use crate::models::{Linea, Role, Usuario};
use crate::state::AppState;
use crate::viewmodels::{InvitacionForm, NuevoUsuarioForm};
use crate::views::widgets::{
    button, clear_status, field, input_group, linea_options, select_group, show_error, status_box, submit_button,
};

pub fn render_usuarios(state: &AppState) -> Result<Element, JsValue> {
    ElementBuilder::new("section")?
        .class("page usuarios")
        .child(ElementBuilder::new("h2")?.text("Usuarios").build())?
        .child(render_tabla(state)?)?
        .child(render_alta(state)?)?
        .child(render_invitacion(state)?)
        .map(|b| b.build())
}

fn render_tabla(state: &AppState) -> Result<Element, JsValue> {
    let head = ElementBuilder::new("tr")?.build();
    for title in ["Usuario", "Email", "Rol", "Línea", ""] {
        head.append_child(&ElementBuilder::new("th")?.text(title).build())?;
    }
    let body = ElementBuilder::new("tbody")?.build();
    for usuario in state.usuarios_vm.users() {
        let fila = render_fila(state, &usuario)?;
        body.append_child(&fila)?;
    }
    ElementBuilder::new("table")?
        .class("usuarios-table")
        .child(ElementBuilder::new("thead")?.child(head)?.build())?
        .child(body)
        .map(|b| b.build())
}

fn role_select(usuario: &Usuario, busy: bool) -> Result<Element, JsValue> {
    let select = ElementBuilder::new("select")?.class("form-input").flag("disabled", busy)?.build();
    for role in [Role::Admin, Role::EmisorReclamo] {
        select.append_child(
            &ElementBuilder::new("option")?
                .attr("value", role.as_str())?
                .flag("selected", role == usuario.role)?
                .text(role.etiqueta())
                .build(),
        )?;
    }
    Ok(select)
}

fn linea_select(usuario: &Usuario, busy: bool) -> Result<Element, JsValue> {
    let select = ElementBuilder::new("select")?.class("form-input").flag("disabled", busy)?.build();
    select.append_child(
        &ElementBuilder::new("option")?
            .attr("value", "")?
            .flag("selected", usuario.linea_asignada.is_none())?
            .text("Sin asignar")
            .build(),
    )?;
    for linea in Linea::ALL {
        select.append_child(
            &ElementBuilder::new("option")?
                .attr("value", linea.id())?
                .flag("selected", usuario.linea_asignada == Some(linea))?
                .text(linea.nombre())
                .build(),
        )?;
    }
    Ok(select)
}

fn render_fila(state: &AppState, usuario: &Usuario) -> Result<Element, JsValue> {
    let busy = state.usuarios_vm.is_busy(&usuario.id);
    let roles = role_select(usuario, busy)?;
    let lineas = linea_select(usuario, busy)?;
    let borrar = button("Eliminar", "btn-danger")?;
    set_disabled(&borrar, busy);

    {
        let (state, id) = (state.clone(), usuario.id.clone());
        on_change(&roles, move |v| {
            if let Some(role) = Role::from_str_opt(&v) {
                let (state, id) = (state.clone(), id.clone());
                spawn_local(async move {
                    match state.usuarios_vm.change_role(&id, role).await {
                        Ok(u) => state.flash_ok(format!("{} ahora es {}", u.username, u.role.etiqueta())),
                        Err(e) => state.flash_error(&e),
                    }
                });
            }
        })?;
    }

    {
        let (state, id) = (state.clone(), usuario.id.clone());
        on_change(&lineas, move |v| {
            // La API no permite quitar la línea, solo reasignar
            if let Some(linea) = Linea::from_id(&v) {
                let (state, id) = (state.clone(), id.clone());
                spawn_local(async move {
                    match state.usuarios_vm.assign_line(&id, linea).await {
                        Ok(u) => state.flash_ok(format!("{} asignado a {}", u.username, linea.nombre())),
                        Err(e) => state.flash_error(&e),
                    }
                });
            }
        })?;
    }

    {
        let (state, id, username) = (state.clone(), usuario.id.clone(), usuario.username.clone());
        on_click(&borrar, move |_| {
            let confirmed = web_sys::window()
                .and_then(|w| w.confirm_with_message(&format!("¿Eliminar a {}?", username)).ok())
                .unwrap_or(false);
            if !confirmed {
                return;
            }
            let (state, id, username) = (state.clone(), id.clone(), username.clone());
            spawn_local(async move {
                match state.usuarios_vm.delete_user(&id).await {
                    Ok(()) => state.flash_ok(format!("Usuario {} eliminado", username)),
                    Err(e) => state.flash_error(&e),
                }
            });
        })?;
    }

    let email = usuario.email.clone().unwrap_or_default();
    ElementBuilder::new("tr")?
        .class(if busy { "usuario-row busy" } else { "usuario-row" })
        .child(ElementBuilder::new("td")?.text(&usuario.username).build())?
        .child(ElementBuilder::new("td")?.text(&email).build())?
        .child(ElementBuilder::new("td")?.child(roles)?.build())?
        .child(ElementBuilder::new("td")?.child(lineas)?.build())?
        .child(ElementBuilder::new("td")?.child(borrar)?.build())
        .map(|b| b.build())
}

fn render_alta(state: &AppState) -> Result<Element, JsValue> {
    let username = field();
    let email = field();
    let password = field();
    let status = status_box()?;
    let submit = submit_button("Crear usuario")?;

    let form = ElementBuilder::new("form")?
        .class("inline-form")
        .child(ElementBuilder::new("h3")?.text("Alta de usuario").build())?
        .child(input_group("Usuario", "nuevo_username", "text", &username)?)?
        .child(input_group("Email", "nuevo_email", "email", &email)?)?
        .child(input_group("Contraseña", "nuevo_password", "password", &password)?)?
        .child(status.clone())?
        .child(submit.clone())?
        .build();

    let state = state.clone();
    on_submit(&form, move || {
        let form = NuevoUsuarioForm {
            username: username.borrow().clone(),
            email: email.borrow().clone(),
            password: password.borrow().clone(),
        };
        let (state, status, submit) = (state.clone(), status.clone(), submit.clone());
        clear_status(&status);
        set_disabled(&submit, true);
        spawn_local(async move {
            match state.usuarios_vm.create_user(form).await {
                Ok(username) => state.flash_ok(format!("Usuario {} creado", username)),
                Err(e) => {
                    show_error(&status, &e.user_message());
                    set_disabled(&submit, false);
                }
            }
        });
    })?;
    Ok(form)
}

fn render_invitacion(state: &AppState) -> Result<Element, JsValue> {
    let username = field();
    let email = field();
    let password = field();
    let linea: Rc<RefCell<Option<Linea>>> = Rc::new(RefCell::new(None));
    let status = status_box()?;
    let submit = submit_button("Generar invitación")?;

    let linea_group = {
        let linea = linea.clone();
        select_group("Línea", "invitacion_linea", &linea_options(&Linea::ALL), "", Some("Sin asignar"), move |v| {
            *linea.borrow_mut() = Linea::from_id(&v);
        })?
    };

    let form = ElementBuilder::new("form")?
        .class("inline-form")
        .child(ElementBuilder::new("h3")?.text("Invitar delegado").build())?
        .child(input_group("Usuario", "invitacion_username", "text", &username)?)?
        .child(input_group("Email", "invitacion_email", "email", &email)?)?
        .child(input_group("Contraseña inicial", "invitacion_password", "password", &password)?)?
        .child(linea_group)?
        .child(status.clone())?
        .child(submit.clone())?
        .build();

    let state = state.clone();
    on_submit(&form, move || {
        let form = InvitacionForm {
            username: username.borrow().clone(),
            email: email.borrow().clone(),
            password: password.borrow().clone(),
            linea: *linea.borrow(),
        };
        let (state, status, submit) = (state.clone(), status.clone(), submit.clone());
        clear_status(&status);
        set_disabled(&submit, true);
        spawn_local(async move {
            match state.usuarios_vm.generate_invitation(form).await {
                Ok(link) => state.flash_ok(format!("Invitación generada: {}", link)),
                Err(e) => show_error(&status, &e.user_message()),
            }
            set_disabled(&submit, false);
        });
    })?;
    Ok(form)
}
