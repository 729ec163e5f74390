use std::{collections::BTreeMap, fs, path::Path};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bevy::log::debug;

use crate::{Error, GeodeticPoint, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    Border,
    Billboard,
}

impl RegistryKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            RegistryKind::Border => ".border",
            RegistryKind::Billboard => ".billboard",
        }
    }
}

/// Named data looked up case-insensitively, with or without the kind's
/// file suffix.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    kind: RegistryKind,
    entries: BTreeMap<String, T>,
}

pub type BorderRegistry = Registry<Vec<GeodeticPoint>>;
pub type BillboardRegistry = Registry<String>;

impl<T> Registry<T> {
    pub fn new(kind: RegistryKind) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    pub fn normalize_name(&self, name: &str) -> String {
        let name = name.to_lowercase();
        match name.strip_suffix(self.kind.suffix()) {
            Some(stem) => stem.to_string(),
            None => name,
        }
    }

    pub fn insert(&mut self, name: &str, value: T) -> Option<T> {
        let key = self.normalize_name(name);
        self.entries.insert(key, value)
    }

    pub fn get(&self, name: &str) -> Result<&T> {
        self.entries
            .get(&self.normalize_name(name))
            .ok_or_else(|| match self.kind {
                RegistryKind::Border => Error::BorderNotFound {
                    name: name.to_string(),
                    available: self.names(),
                },
                RegistryKind::Billboard => Error::BillboardNotFound {
                    name: name.to_string(),
                    available: self.names(),
                },
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads every file carrying the kind's suffix in `dir`.
    fn load_with(dir: &Path, kind: RegistryKind, parse: impl Fn(&str) -> Result<T>) -> Result<Self> {
        let mut registry = Self::new(kind);
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !file_name.to_lowercase().ends_with(kind.suffix()) {
                continue;
            }
            let value = parse(&fs::read_to_string(&path)?)?;
            registry.insert(file_name, value);
        }
        debug!("loaded {} entries from {}", registry.len(), dir.display());
        Ok(registry)
    }
}

impl Registry<Vec<GeodeticPoint>> {
    pub fn borders() -> Self {
        Self::new(RegistryKind::Border)
    }

    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(dir.as_ref(), RegistryKind::Border, parse_border)
    }
}

impl Registry<String> {
    pub fn billboards() -> Self {
        Self::new(RegistryKind::Billboard)
    }

    /// Billboard files hold a ready-made image data URI.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(dir.as_ref(), RegistryKind::Billboard, |text| {
            Ok(text.trim().to_string())
        })
    }
}

/// Border text is a flat list of comma-separated `longitude,latitude` pairs.
pub fn parse_border(text: &str) -> Result<Vec<GeodeticPoint>> {
    let values = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|e| Error::invalid_value("border", format!("{token:?}: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;
    if values.len() % 2 != 0 {
        return Err(Error::invalid_value(
            "border",
            format!("{} values do not form longitude,latitude pairs", values.len()),
        ));
    }
    Ok(values
        .chunks_exact(2)
        .map(|pair| GeodeticPoint::new(pair[1], pair[0], 0.0))
        .collect())
}

pub fn png_data_uri(path: impl AsRef<Path>) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
}
