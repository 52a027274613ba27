// ============================================================================
// ESTADISTICAS VIEWMODEL - Resumen y series para gráficos de barras
// ============================================================================

use std::collections::BTreeMap;

use crate::error::AppResult;
use crate::models::{Estadisticas, Estado};
use crate::services::ApiClient;

/// Una barra del gráfico: etiqueta, valor y proporción respecto del máximo
#[derive(Clone, Debug, PartialEq)]
pub struct Barra {
    pub etiqueta: String,
    pub valor: u32,
    pub ratio: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Resumen {
    pub total: u32,
    pub activos: u32,
    pub resueltos: u32,
    pub tiempo_promedio: Option<f64>,
    pub por_linea: Vec<Barra>,
    pub por_categoria: Vec<Barra>,
    pub por_estado: Vec<Barra>,
    /// Meses `YYYY-MM` en orden ascendente
    pub por_mes: Vec<Barra>,
}

fn barras(serie: &BTreeMap<String, u32>) -> Vec<Barra> {
    let max = serie.values().copied().max().unwrap_or(0);
    serie
        .iter()
        .map(|(etiqueta, &valor)| Barra {
            etiqueta: etiqueta.clone(),
            valor,
            ratio: if max == 0 { 0.0 } else { f64::from(valor) / f64::from(max) },
        })
        .collect()
}

impl From<&Estadisticas> for Resumen {
    fn from(stats: &Estadisticas) -> Self {
        let resueltos = stats
            .reclamos_por_estado
            .get(Estado::Resuelto.nombre())
            .copied()
            .unwrap_or(0);

        Self {
            total: stats.total_reclamos,
            activos: stats.total_reclamos.saturating_sub(resueltos),
            resueltos,
            tiempo_promedio: stats.tiempo_promedio_resolucion,
            por_linea: barras(&stats.reclamos_por_linea),
            por_categoria: barras(&stats.reclamos_por_categoria),
            por_estado: barras(&stats.reclamos_por_estado),
            // BTreeMap ya ordena `YYYY-MM` lexicográficamente = cronológicamente
            por_mes: barras(&stats.reclamos_por_mes),
        }
    }
}

#[derive(Clone)]
pub struct EstadisticasViewModel {
    api: ApiClient,
}

impl EstadisticasViewModel {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn resumen(&self) -> AppResult<Resumen> {
        let stats = self.api.estadisticas().await?;
        log::info!("📊 [STATS] {} reclamos en total", stats.total_reclamos);
        Ok(Resumen::from(&stats))
    }
}
