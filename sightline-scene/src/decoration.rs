use serde_json::{Map, Value};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Polyline,
    Polygon,
}

impl StyleKind {
    pub fn key(&self) -> &'static str {
        match self {
            StyleKind::Polyline => "polyline",
            StyleKind::Polygon => "polygon",
        }
    }
}

/// The style fields of a polyline or polygon, used as a template for every
/// generated piece of that geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub kind: StyleKind,
    pub fields: Map<String, Value>,
}

impl Style {
    pub fn polyline() -> Self {
        Self {
            kind: StyleKind::Polyline,
            fields: Map::new(),
        }
    }

    pub fn polygon() -> Self {
        Self {
            kind: StyleKind::Polygon,
            fields: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    fn stripped(&self, reserved: &[&str]) -> Map<String, Value> {
        self.fields
            .iter()
            .filter(|(key, _)| !reserved.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Scalar(Value),
    PerEntity(Vec<Value>),
    Template(Style),
    PerEntityTemplate(Vec<Style>),
}

/// The geometry a decoration is resolved for and the style fields that the
/// generator computes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub kind: StyleKind,
    pub reserved: &'static [&'static str],
}

impl Target {
    pub const POLYLINE: Target = Target {
        kind: StyleKind::Polyline,
        reserved: &["positions"],
    };
    pub const FOV_POLYGON: Target = Target {
        kind: StyleKind::Polygon,
        reserved: &["positions", "perPositionHeight"],
    };
    pub const GRID_CELL: Target = Target {
        kind: StyleKind::Polygon,
        reserved: &["positions", "outline", "outlineColor"],
    };
    pub const COVERAGE: Target = Target {
        kind: StyleKind::Polygon,
        reserved: &["positions", "holes", "outline", "outlineColor"],
    };
}

/// Packet fields and geometry style for one entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityDecoration {
    pub properties: Map<String, Value>,
    pub style: Map<String, Value>,
}

/// Trailing parameters shared by every generator, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoration {
    params: Vec<(String, Param)>,
}

impl Decoration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, param: Param) -> Self {
        self.params.push((key.to_string(), param));
        self
    }

    pub fn scalar(self, key: &str, value: impl Into<Value>) -> Self {
        self.with(key, Param::Scalar(value.into()))
    }

    pub fn per_entity(self, key: &str, values: Vec<Value>) -> Self {
        self.with(key, Param::PerEntity(values))
    }

    pub fn template(self, style: Style) -> Self {
        let key = style.kind.key();
        self.with(key, Param::Template(style))
    }

    pub fn per_entity_template(self, styles: Vec<Style>) -> Self {
        let key = styles
            .first()
            .map(|s| s.kind.key())
            .unwrap_or(StyleKind::Polyline.key());
        self.with(key, Param::PerEntityTemplate(styles))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Resolves every parameter into one fresh record per entity. Templates
    /// lose the `target`'s reserved fields; the templates themselves are left
    /// untouched.
    pub fn resolve(&self, count: usize, target: Target) -> Result<Vec<EntityDecoration>> {
        let mut entities = vec![EntityDecoration::default(); count];
        for (key, param) in &self.params {
            match param {
                Param::Scalar(value) => {
                    check_property_key(key)?;
                    for entity in entities.iter_mut() {
                        entity.properties.insert(key.clone(), value.clone());
                    }
                }
                Param::PerEntity(values) => {
                    check_property_key(key)?;
                    check_len(key, count, values.len())?;
                    for (entity, value) in entities.iter_mut().zip(values) {
                        entity.properties.insert(key.clone(), value.clone());
                    }
                }
                Param::Template(style) => {
                    check_kind(key, style, target)?;
                    let fields = style.stripped(target.reserved);
                    for entity in entities.iter_mut() {
                        entity.style.extend(fields.clone());
                    }
                }
                Param::PerEntityTemplate(styles) => {
                    check_len(key, count, styles.len())?;
                    for (entity, style) in entities.iter_mut().zip(styles) {
                        check_kind(key, style, target)?;
                        entity.style.extend(style.stripped(target.reserved));
                    }
                }
            }
        }
        Ok(entities)
    }
}

fn check_property_key(key: &str) -> Result<()> {
    match key {
        "id" | "polyline" | "polygon" => Err(Error::invalid_value(
            key,
            "this field is generated and cannot be supplied",
        )),
        _ => Ok(()),
    }
}

fn check_len(key: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::MismatchedInputs {
            name: key.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_kind(key: &str, style: &Style, target: Target) -> Result<()> {
    if style.kind != target.kind {
        return Err(Error::InvalidParameterType {
            name: key.to_string(),
            reason: format!(
                "expected a {} style, got a {} style",
                target.kind.key(),
                style.kind.key()
            ),
        });
    }
    Ok(())
}
