use bevy::log::debug;

use crate::{
    Broadcast, BorderRegistry, Decoration, Error, GeodeticPoint, IdGenerator, Packet, Result,
    Target,
};

/// A border given by registry name or supplied directly.
#[derive(Debug, Clone, PartialEq)]
pub enum BorderSource {
    Named(String),
    Points(Vec<GeodeticPoint>),
}

impl From<&str> for BorderSource {
    fn from(name: &str) -> Self {
        BorderSource::Named(name.to_string())
    }
}

impl From<String> for BorderSource {
    fn from(name: String) -> Self {
        BorderSource::Named(name)
    }
}

impl From<Vec<GeodeticPoint>> for BorderSource {
    fn from(points: Vec<GeodeticPoint>) -> Self {
        BorderSource::Points(points)
    }
}

/// One polyline per border keeping every `step`-th point, starting with the
/// first. Names are all resolved before anything is emitted.
pub fn borders(
    sources: &[BorderSource],
    step: &Broadcast<usize>,
    registry: &BorderRegistry,
    decoration: &Decoration,
    ids: &mut dyn IdGenerator,
) -> Result<Vec<Packet>> {
    let steps = step.resolve("step", sources.len())?;
    if steps.contains(&0) {
        return Err(Error::invalid_value("step", "must be at least 1"));
    }
    let paths = sources
        .iter()
        .map(|source| match source {
            BorderSource::Named(name) => registry.get(name).map(Vec::as_slice),
            BorderSource::Points(points) => Ok(points.as_slice()),
        })
        .collect::<Result<Vec<_>>>()?;
    let decorations = decoration.resolve(sources.len(), Target::POLYLINE)?;

    let packets: Vec<Packet> = paths
        .iter()
        .zip(&steps)
        .zip(&decorations)
        .map(|((path, step), decoration)| {
            let positions = path.iter().step_by(*step).map(|p| p.wrapped()).collect();
            Packet::polyline(ids.next_id("border"), positions, decoration)
        })
        .collect();
    debug!("borders: {} polylines", packets.len());
    Ok(packets)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::SequentialIds;

    fn registry() -> BorderRegistry {
        let mut registry = BorderRegistry::borders();
        let line = (0..10)
            .map(|i| GeodeticPoint::new(31.0 + i as f64 * 0.1, 34.0, 0.0))
            .collect();
        registry.insert("israel", line);
        registry
    }

    #[test]
    fn decimates_named_and_raw() {
        let raw: Vec<_> = (0..5).map(|i| GeodeticPoint::new(0.0, i as f64, 0.0)).collect();
        let sources = vec![BorderSource::from("Israel.border"), BorderSource::from(raw)];
        let packets = borders(
            &sources,
            &Broadcast::PerEntity(vec![3, 1]),
            &registry(),
            &Decoration::new().scalar("name", "border"),
            &mut SequentialIds::new(),
        )
        .unwrap();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].positions().len(), 4);
        assert!((packets[0].positions()[1].latitude - 31.3).abs() < 1e-9);
        assert_eq!(packets[1].positions().len(), 5);
        assert_eq!(packets[1].properties["name"], json!("border"));
    }

    #[test]
    fn unknown_name_fails_before_emitting() {
        let sources = vec![BorderSource::from("israel"), BorderSource::from("narnia")];
        let mut ids = SequentialIds::new();
        let result = borders(
            &sources,
            &Broadcast::Scalar(1),
            &registry(),
            &Decoration::new(),
            &mut ids,
        );
        match result {
            Err(Error::BorderNotFound { name, available }) => {
                assert_eq!(name, "narnia");
                assert_eq!(available, vec!["israel".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ids.issued(), 0);
    }

    #[test]
    fn zero_step_is_rejected() {
        let sources = vec![BorderSource::from("israel")];
        assert!(matches!(
            borders(&sources, &Broadcast::Scalar(0), &registry(), &Decoration::new(), &mut SequentialIds::new()),
            Err(Error::InvalidValue { .. })
        ));
        assert!(matches!(
            borders(&sources, &Broadcast::PerEntity(vec![1, 2]), &registry(), &Decoration::new(), &mut SequentialIds::new()),
            Err(Error::MismatchedInputs { .. })
        ));
    }
}
