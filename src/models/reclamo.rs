use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Linea;

/// Categoría de reclamo gremial
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Categoria {
    CondicionesDeTrabajo,
    FaltanteDeMateriales,
    HigieneYSalubridad,
    SeguridadYPrevencion,
    PersonalYRecursosHumanos,
    ConflictosLaborales,
    Otros,
}

impl Categoria {
    pub const ALL: [Categoria; 7] = [
        Categoria::CondicionesDeTrabajo,
        Categoria::FaltanteDeMateriales,
        Categoria::HigieneYSalubridad,
        Categoria::SeguridadYPrevencion,
        Categoria::PersonalYRecursosHumanos,
        Categoria::ConflictosLaborales,
        Categoria::Otros,
    ];

    pub fn nombre(&self) -> &'static str {
        match self {
            Categoria::CondicionesDeTrabajo => "Condiciones de trabajo",
            Categoria::FaltanteDeMateriales => "Faltante de materiales o elementos de seguridad",
            Categoria::HigieneYSalubridad => "Higiene y salubridad",
            Categoria::SeguridadYPrevencion => "Seguridad y prevención",
            Categoria::PersonalYRecursosHumanos => "Personal y recursos humanos",
            Categoria::ConflictosLaborales => "Conflictos o situaciones laborales",
            Categoria::Otros => "Otros reclamos gremiales",
        }
    }

    /// Código de tres letras usado en `numero_reclamo` (LíneaA-CON-0001)
    pub fn codigo(&self) -> &'static str {
        match self {
            Categoria::CondicionesDeTrabajo => "CON",
            Categoria::FaltanteDeMateriales => "MAT",
            Categoria::HigieneYSalubridad => "HIG",
            Categoria::SeguridadYPrevencion => "SEG",
            Categoria::PersonalYRecursosHumanos => "PER",
            Categoria::ConflictosLaborales => "LAB",
            Categoria::Otros => "OTR",
        }
    }

    pub fn from_nombre(nombre: &str) -> Option<Categoria> {
        Categoria::ALL.iter().copied().find(|c| c.nombre() == nombre.trim())
    }
}

impl fmt::Display for Categoria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nombre())
    }
}

// Categorías desconocidas caen en "Otros", igual que la numeración del backend
impl From<String> for Categoria {
    fn from(value: String) -> Self {
        Categoria::from_nombre(&value).unwrap_or(Categoria::Otros)
    }
}

impl From<Categoria> for String {
    fn from(categoria: Categoria) -> Self {
        categoria.nombre().to_string()
    }
}

/// Estado de un reclamo
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Estado {
    #[serde(rename = "Pendiente")]
    Pendiente,
    #[serde(rename = "En gestión")]
    EnGestion,
    #[serde(rename = "En negociación")]
    EnNegociacion,
    #[serde(rename = "Resuelto")]
    Resuelto,
}

impl Estado {
    pub const ALL: [Estado; 4] = [
        Estado::Pendiente,
        Estado::EnGestion,
        Estado::EnNegociacion,
        Estado::Resuelto,
    ];

    pub fn nombre(&self) -> &'static str {
        match self {
            Estado::Pendiente => "Pendiente",
            Estado::EnGestion => "En gestión",
            Estado::EnNegociacion => "En negociación",
            Estado::Resuelto => "Resuelto",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Estado::Pendiente => "estado-pendiente",
            Estado::EnGestion => "estado-gestion",
            Estado::EnNegociacion => "estado-negociacion",
            Estado::Resuelto => "estado-resuelto",
        }
    }

    pub fn from_nombre(nombre: &str) -> Option<Estado> {
        Estado::ALL.iter().copied().find(|e| e.nombre() == nombre.trim())
    }

    pub fn is_activo(&self) -> bool {
        *self != Estado::Resuelto
    }
}

impl Default for Estado {
    fn default() -> Self {
        Estado::Pendiente
    }
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nombre())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comentario {
    pub id: String,
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Reclamo gremial - copia transitoria, el backend es el dueño
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reclamo {
    pub id: String,
    pub numero_reclamo: String,
    pub linea: Linea,
    pub categoria: Categoria,
    pub sector_estacion: String,
    pub descripcion: String,
    #[serde(default)]
    pub estado: Estado,
    #[serde(default)]
    pub responsable: Option<String>,
    #[serde(default)]
    pub solucion: Option<String>,
    #[serde(default)]
    pub responsable_cierre: Option<String>,
    pub fecha_creacion: DateTime<Utc>,
    #[serde(default)]
    pub fecha_cierre: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comentarios: Vec<Comentario>,
    #[serde(default)]
    pub archivos: Vec<String>,
}

impl Reclamo {
    pub fn is_activo(&self) -> bool {
        self.estado.is_activo()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReclamoCreate {
    pub linea: Linea,
    pub categoria: Categoria,
    pub sector_estacion: String,
    pub descripcion: String,
}

/// PATCH parcial: los campos `None` no se envían
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReclamoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<Estado>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solucion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsable_cierre: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComentarioCreate {
    pub text: String,
    pub author: String,
}

/// Respuesta de `POST /reclamos/{id}/comentarios`
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ComentarioAgregado {
    #[serde(default)]
    pub message: Option<String>,
    pub comentario: Comentario,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ArchivoSubido {
    #[serde(default)]
    pub message: Option<String>,
    pub url: String,
}

/// Filtros aceptados por `GET /reclamos`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReclamoFilters {
    pub linea: Option<Linea>,
    pub categoria: Option<Categoria>,
    pub estado: Option<Estado>,
    pub search: Option<String>,
}

impl ReclamoFilters {
    pub fn por_linea(linea: Linea) -> Self {
        Self {
            linea: Some(linea),
            ..Self::default()
        }
    }

    /// Parámetros de query, omitiendo filtros vacíos
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(linea) = self.linea {
            query.push(("linea".to_string(), linea.id().to_string()));
        }
        if let Some(categoria) = self.categoria {
            query.push(("categoria".to_string(), categoria.nombre().to_string()));
        }
        if let Some(estado) = self.estado {
            query.push(("estado".to_string(), estado.nombre().to_string()));
        }
        if let Some(search) = self.search.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            query.push(("search".to_string(), search.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_reclamo_with_defaults() {
        let json = r#"{
            "id": "r1",
            "numero_reclamo": "LíneaB-HIG-0003",
            "linea": "B",
            "categoria": "Higiene y salubridad",
            "sector_estacion": "Federico Lacroze",
            "descripcion": "Baños sin agua",
            "estado": "En gestión",
            "fecha_creacion": "2024-05-02T13:45:00.123456+00:00"
        }"#;
        let reclamo: Reclamo = serde_json::from_str(json).unwrap();
        assert_eq!(reclamo.linea, Linea::B);
        assert_eq!(reclamo.categoria, Categoria::HigieneYSalubridad);
        assert_eq!(reclamo.estado, Estado::EnGestion);
        assert!(reclamo.comentarios.is_empty());
        assert!(reclamo.fecha_cierre.is_none());
    }

    #[test]
    fn unknown_categoria_falls_back_to_otros() {
        let categoria: Categoria = serde_json::from_str("\"Transporte\"").unwrap();
        assert_eq!(categoria, Categoria::Otros);
        assert_eq!(categoria.codigo(), "OTR");
    }

    #[test]
    fn update_omits_unset_fields() {
        let update = ReclamoUpdate {
            estado: Some(Estado::EnNegociacion),
            ..ReclamoUpdate::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"estado":"En negociación"}"#);
    }

    #[test]
    fn filters_skip_blank_search() {
        let filters = ReclamoFilters {
            linea: Some(Linea::C),
            estado: Some(Estado::Pendiente),
            search: Some("   ".to_string()),
            ..ReclamoFilters::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("linea".to_string(), "C".to_string()),
                ("estado".to_string(), "Pendiente".to_string()),
            ]
        );
    }
}
