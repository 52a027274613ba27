use serde::{Deserialize, Serialize};
use std::fmt;

/// Línea de subte (dimensión principal de visibilidad)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Linea {
    A,
    B,
    C,
    D,
    E,
    H,
    Premetro,
}

impl Linea {
    pub const ALL: [Linea; 7] = [
        Linea::A,
        Linea::B,
        Linea::C,
        Linea::D,
        Linea::E,
        Linea::H,
        Linea::Premetro,
    ];

    /// Identificador usado por el backend ("A" ... "Premetro")
    pub fn id(&self) -> &'static str {
        match self {
            Linea::A => "A",
            Linea::B => "B",
            Linea::C => "C",
            Linea::D => "D",
            Linea::E => "E",
            Linea::H => "H",
            Linea::Premetro => "Premetro",
        }
    }

    pub fn nombre(&self) -> &'static str {
        match self {
            Linea::A => "Línea A",
            Linea::B => "Línea B",
            Linea::C => "Línea C",
            Linea::D => "Línea D",
            Linea::E => "Línea E",
            Linea::H => "Línea H",
            Linea::Premetro => "Premetro",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Linea::A => "#00A7E1",
            Linea::B => "#DC241F",
            Linea::C => "#2C3592",
            Linea::D => "#00B050",
            Linea::E => "#9D5AB7",
            Linea::H => "#FFD700",
            Linea::Premetro => "#85BC22",
        }
    }

    pub fn from_id(id: &str) -> Option<Linea> {
        Linea::ALL.iter().copied().find(|l| l.id() == id.trim())
    }
}

impl fmt::Display for Linea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl TryFrom<String> for Linea {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Linea::from_id(&value).ok_or_else(|| format!("Línea desconocida: {}", value))
    }
}

impl From<Linea> for String {
    fn from(linea: Linea) -> Self {
        linea.id().to_string()
    }
}
