use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Respuesta de `GET /estadisticas`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Estadisticas {
    pub total_reclamos: u32,
    #[serde(default)]
    pub reclamos_por_linea: BTreeMap<String, u32>,
    #[serde(default)]
    pub reclamos_por_categoria: BTreeMap<String, u32>,
    #[serde(default)]
    pub reclamos_por_estado: BTreeMap<String, u32>,
    /// Días promedio entre creación y cierre
    #[serde(default)]
    pub tiempo_promedio_resolucion: Option<f64>,
    /// Claves `YYYY-MM`
    #[serde(default)]
    pub reclamos_por_mes: BTreeMap<String, u32>,
}
