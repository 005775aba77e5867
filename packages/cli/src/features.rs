//! `GeoJSON` input and output for the `apply` subcommand.

use geojson::{Feature, GeoJson, JsonObject, JsonValue};
use search_area_transform::TransformResult;

/// Parses the reference geometry from a `GeoJSON` document.
///
/// Accepts a bare geometry, a feature, or a feature collection (whose first
/// feature is used).
pub fn read_reference(text: &str) -> Result<geo::Geometry<f64>, Box<dyn std::error::Error>> {
    let geojson: GeoJson = text.parse()?;

    let geometry = match geojson {
        GeoJson::Geometry(geometry) => geometry,
        GeoJson::Feature(feature) => feature
            .geometry
            .ok_or("reference feature has no geometry")?,
        GeoJson::FeatureCollection(collection) => {
            let count = collection.features.len();
            let first = collection
                .features
                .into_iter()
                .next()
                .ok_or("reference feature collection is empty")?;
            if count > 1 {
                log::warn!("Using the first of {count} reference features");
            }
            first.geometry.ok_or("reference feature has no geometry")?
        }
    };

    let geometry: geo::Geometry<f64> = geometry.try_into()?;
    Ok(geometry)
}

/// Wraps a transform result in a `GeoJSON` feature.
pub fn result_feature(result: &TransformResult) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert(
        "relation".to_string(),
        JsonValue::from(result.relation_applied.clone()),
    );
    if let Some(distance) = result.effective_distance_m {
        properties.insert("effective_distance_m".to_string(), JsonValue::from(distance));
    }
    if let Some(depth) = result.effective_depth_m {
        properties.insert("effective_depth_m".to_string(), JsonValue::from(depth));
    }
    properties.insert(
        "crs".to_string(),
        JsonValue::from(result.source_crs_used.clone()),
    );
    properties.insert("empty".to_string(), JsonValue::from(result.is_empty()));

    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(
            &result.geometry,
        ))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use search_area_transform::{TransformEngine, TransformRequest};

    use super::*;

    #[test]
    fn reads_bare_geometries() {
        let geometry = read_reference(r#"{"type":"Point","coordinates":[6.6323,46.5197]}"#).unwrap();
        assert_eq!(geometry, geo::Geometry::Point(geo::Point::new(6.6323, 46.5197)));
    }

    #[test]
    fn reads_the_first_feature_of_a_collection() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}},
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [3.0, 4.0]}}
            ]
        }"#;
        let geometry = read_reference(text).unwrap();
        assert_eq!(geometry, geo::Geometry::Point(geo::Point::new(1.0, 2.0)));
    }

    #[test]
    fn rejects_features_without_geometry() {
        let text = r#"{"type":"Feature","properties":{},"geometry":null}"#;
        assert!(read_reference(text).is_err());
        assert!(read_reference("not json").is_err());
    }

    #[test]
    fn result_properties_record_the_parameters() {
        let reference = read_reference(r#"{"type":"Point","coordinates":[6.6323,46.5197]}"#).unwrap();
        let result = TransformEngine::default()
            .apply(&TransformRequest::new(reference, "near"))
            .unwrap();

        let feature = result_feature(&result);
        let properties = feature.properties.unwrap();
        assert_eq!(properties["relation"], "near");
        assert_eq!(properties["effective_distance_m"], 5000.0);
        assert!(!properties.contains_key("effective_depth_m"));
        assert!(properties["crs"].as_str().unwrap().starts_with("+proj=aeqd"));
        assert!(matches!(
            feature.geometry.unwrap().value,
            geojson::Value::Polygon(_)
        ));
    }
}
