// ============================================================================
// ESTADISTICAS VIEW - Resumen + gráficos de barras en CSS
// ============================================================================

use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::dom::ElementBuilder;
use crate::models::Linea;
use crate::viewmodels::{Barra, Resumen};

pub fn render_estadisticas(resumen: &Resumen) -> Result<Element, JsValue> {
    let promedio = resumen
        .tiempo_promedio
        .map(|dias| format!("{:.1} días", dias))
        .unwrap_or_else(|| "—".to_string());

    let tarjetas = ElementBuilder::new("div")?
        .class("stat-cards")
        .child(tarjeta("Total", &resumen.total.to_string())?)?
        .child(tarjeta("Activos", &resumen.activos.to_string())?)?
        .child(tarjeta("Resueltos", &resumen.resueltos.to_string())?)?
        .child(tarjeta("Tiempo promedio de resolución", &promedio)?)?
        .build();

    ElementBuilder::new("section")?
        .class("page estadisticas")
        .child(ElementBuilder::new("h2")?.text("Estadísticas").build())?
        .child(tarjetas)?
        .child(grafico("Por línea", &resumen.por_linea)?)?
        .child(grafico("Por categoría", &resumen.por_categoria)?)?
        .child(grafico("Por estado", &resumen.por_estado)?)?
        .child(grafico("Por mes", &resumen.por_mes)?)
        .map(|b| b.build())
}

fn tarjeta(titulo: &str, valor: &str) -> Result<Element, JsValue> {
    ElementBuilder::new("div")?
        .class("stat-card")
        .child(ElementBuilder::new("span")?.class("stat-label").text(titulo).build())?
        .child(ElementBuilder::new("strong")?.class("stat-value").text(valor).build())
        .map(|b| b.build())
}

fn grafico(titulo: &str, barras: &[Barra]) -> Result<Element, JsValue> {
    let chart = ElementBuilder::new("div")?
        .class("bar-chart")
        .child(ElementBuilder::new("h3")?.text(titulo).build())?
        .build();

    if barras.is_empty() {
        chart.append_child(&ElementBuilder::new("p")?.class("empty").text("Sin datos").build())?;
        return Ok(chart);
    }

    for barra in barras {
        // Las barras por línea usan el color de la línea
        let color = Linea::from_id(&barra.etiqueta)
            .map(|l| l.color())
            .unwrap_or("var(--accent)");
        let fill = ElementBuilder::new("div")?
            .class("bar-fill")
            .attr(
                "style",
                &format!("width: {:.0}%; background-color: {}", barra.ratio * 100.0, color),
            )?
            .build();
        let row = ElementBuilder::new("div")?
            .class("bar-row")
            .child(ElementBuilder::new("span")?.class("bar-label").text(&barra.etiqueta).build())?
            .child(ElementBuilder::new("div")?.class("bar-track").child(fill)?.build())?
            .child(ElementBuilder::new("span")?.class("bar-value").text(&barra.valor.to_string()).build())?
            .build();
        chart.append_child(&row)?;
    }
    Ok(chart)
}
