//! Specialist value object representing a seat on the panel

use super::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Members of the consultation panel (Value Object)
///
/// The set is closed: configuration strings are resolved into a variant
/// once at startup and request handling only ever matches on variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Specialist {
    General,
    Retina,
    Cornea,
    Neuro,
    /// Synthesizes all specialist reports into the final diagnosis
    Director,
}

impl Specialist {
    /// Get the stable identifier for this specialist
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialist::General => "general",
            Specialist::Retina => "retina",
            Specialist::Cornea => "cornea",
            Specialist::Neuro => "neuro",
            Specialist::Director => "director",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Specialist::General => "General Ophthalmology",
            Specialist::Retina => "Retina and Vitreous",
            Specialist::Cornea => "Cornea and External Disease",
            Specialist::Neuro => "Neuro-Ophthalmology",
            Specialist::Director => "Multidisciplinary Director",
        }
    }

    /// The specialists consulted in parallel, in canonical order
    pub fn panel() -> [Specialist; 4] {
        [
            Specialist::General,
            Specialist::Retina,
            Specialist::Cornea,
            Specialist::Neuro,
        ]
    }

    pub fn is_director(&self) -> bool {
        matches!(self, Specialist::Director)
    }
}

impl std::fmt::Display for Specialist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Specialist {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Specialist::General),
            "retina" => Ok(Specialist::Retina),
            "cornea" => Ok(Specialist::Cornea),
            "neuro" => Ok(Specialist::Neuro),
            "director" => Ok(Specialist::Director),
            _ => Err(DomainError::UnknownSpecialist(s.to_string())),
        }
    }
}

impl Serialize for Specialist {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Specialist {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
