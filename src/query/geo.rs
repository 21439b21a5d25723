//! Geographical queries: `geo_shape`, `geo_bounding_box`, `geo_distance` and
//! `geo_polygon`.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{JsonCodec, KeyedReader, KeyedWriter, named, serde_via_codec, wire_enum};
use crate::error::{QueryDslError, Result};
use crate::query::builder::{Builder, decimal_setters, required, setters};
use crate::query::types::GeoPoint;
use crate::query::{QueryType, QueryVariant};

wire_enum! {
    /// Spatial relation between the query shape and indexed shapes.
    pub enum ShapeRelation("shape relation") {
        Intersects => "intersects",
        Disjoint => "disjoint",
        Within => "within",
        Contains => "contains",
    }
}

wire_enum! {
    /// How malformed coordinates are handled.
    pub enum GeoValidationMethod("validation_method") {
        Coerce => "COERCE",
        IgnoreMalformed => "IGNORE_MALFORMED",
        Strict => "STRICT",
    }
}

wire_enum! {
    /// Distance computation used by `geo_distance`.
    pub enum GeoDistanceType("distance_type") {
        Arc => "arc",
        Plane => "plane",
    }
}

/// An inline GeoJSON-style shape. Coordinates are kept as written since
/// their nesting depends on the shape type.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoShape {
    pub shape_type: String,
    pub coordinates: Value,
}

impl GeoShape {
    pub fn new<T: Into<String>>(shape_type: T, coordinates: Value) -> Self {
        GeoShape {
            shape_type: shape_type.into(),
            coordinates,
        }
    }

    /// An `envelope` from its upper-left and lower-right corners.
    pub fn envelope(top_left: GeoPoint, bottom_right: GeoPoint) -> Self {
        GeoShape::new(
            "envelope",
            Value::from(vec![
                vec![top_left.lon, top_left.lat],
                vec![bottom_right.lon, bottom_right.lat],
            ]),
        )
    }
}

impl JsonCodec for GeoShape {
    fn to_json(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put("type", self.shape_type.as_str())
            .put("coordinates", self.coordinates.clone());
        writer.finish()
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("GeoShape", value)?;
        Ok(GeoShape {
            shape_type: reader.string("type")?,
            coordinates: reader.value("coordinates")?.clone(),
        })
    }
}

/// Reference to a shape stored in another document.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedShape {
    pub index: Option<String>,
    pub doc_type: Option<String>,
    pub id: String,
    /// Field of the referenced document holding the shape.
    pub path: Option<String>,
}

impl IndexedShape {
    pub fn new<I: Into<String>>(id: I) -> Self {
        IndexedShape {
            index: None,
            doc_type: None,
            id: id.into(),
            path: None,
        }
    }
}

impl JsonCodec for IndexedShape {
    fn to_json(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put_opt("index", self.index.as_deref())
            .put_opt("type", self.doc_type.as_deref())
            .put("id", self.id.as_str())
            .put_opt("path", self.path.as_deref());
        writer.finish()
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("IndexedShape", value)?;
        Ok(IndexedShape {
            index: reader.string_opt("index")?,
            doc_type: reader.string_opt("type")?,
            id: reader.scalar("id")?,
            path: reader.string_opt("path")?,
        })
    }
}

serde_via_codec!(GeoShape, IndexedShape);

/// Matches documents whose shape relates to an inline or indexed shape.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoShapeQuery {
    pub field: String,
    pub shape: Option<GeoShape>,
    pub indexed_shape: Option<IndexedShape>,
    pub relation: Option<ShapeRelation>,
    pub ignore_unmapped: Option<bool>,
    pub boost: Option<BigDecimal>,
}

impl GeoShapeQuery {
    pub fn builder() -> GeoShapeQueryBuilder {
        GeoShapeQueryBuilder::new()
    }
}

/// Exactly one of `shape` and `indexed_shape` is set.
fn check_shape_source(shape: &Option<GeoShape>, indexed_shape: &Option<IndexedShape>) -> Result<()> {
    match (shape, indexed_shape) {
        (None, None) => Err(QueryDslError::at_least_one(["shape", "indexed_shape"])),
        (Some(_), Some(_)) => Err(QueryDslError::invalid_field(
            "shape",
            "shape and indexed_shape are mutually exclusive",
        )),
        _ => Ok(()),
    }
}

impl QueryVariant for GeoShapeQuery {
    const QUERY_TYPE: QueryType = QueryType::GeoShape;

    fn encode_body(&self) -> Value {
        let mut inner = KeyedWriter::new();
        inner
            .put_codec_opt("shape", self.shape.as_ref())
            .put_codec_opt("indexed_shape", self.indexed_shape.as_ref())
            .put_opt("relation", self.relation);
        let mut writer = KeyedWriter::new();
        writer
            .put_writer(&self.field, inner)
            .put_opt("ignore_unmapped", self.ignore_unmapped)
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("GeoShapeQuery", body)?;
        let (field, _) = reader.entry_excluding(&["ignore_unmapped", "boost"])?;
        let inner = reader.nested(field)?;
        let shape = inner.decode_opt("shape", GeoShape::from_json)?;
        let indexed_shape = inner.decode_opt("indexed_shape", IndexedShape::from_json)?;
        check_shape_source(&shape, &indexed_shape)?;
        Ok(GeoShapeQuery {
            field: field.to_string(),
            shape,
            indexed_shape,
            relation: inner.parse_opt("relation")?,
            ignore_unmapped: reader.bool_opt("ignore_unmapped")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`GeoShapeQuery`]. Requires `field`, then one shape source.
#[derive(Debug, Default)]
pub struct GeoShapeQueryBuilder {
    field: Option<String>,
    shape: Option<GeoShape>,
    indexed_shape: Option<IndexedShape>,
    relation: Option<ShapeRelation>,
    ignore_unmapped: Option<bool>,
    boost: Option<BigDecimal>,
}

impl GeoShapeQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        shape: GeoShape,
        indexed_shape: IndexedShape,
        relation: ShapeRelation,
        ignore_unmapped: bool,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for GeoShapeQueryBuilder {
    type Output = GeoShapeQuery;

    fn build(self) -> Result<GeoShapeQuery> {
        let field = required!(self.field);
        check_shape_source(&self.shape, &self.indexed_shape)?;
        Ok(GeoShapeQuery {
            field,
            shape: self.shape,
            indexed_shape: self.indexed_shape,
            relation: self.relation,
            ignore_unmapped: self.ignore_unmapped,
            boost: self.boost,
        })
    }
}

const GEO_OPTION_KEYS: [&str; 5] = [
    "validation_method",
    "distance",
    "distance_type",
    "ignore_unmapped",
    "boost",
];

/// Matches points inside a rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoBoundingBoxQuery {
    pub field: String,
    pub top_left: GeoPoint,
    pub bottom_right: GeoPoint,
    pub validation_method: Option<GeoValidationMethod>,
    pub ignore_unmapped: Option<bool>,
    pub boost: Option<BigDecimal>,
}

impl GeoBoundingBoxQuery {
    pub fn builder() -> GeoBoundingBoxQueryBuilder {
        GeoBoundingBoxQueryBuilder::new()
    }
}

impl QueryVariant for GeoBoundingBoxQuery {
    const QUERY_TYPE: QueryType = QueryType::GeoBoundingBox;

    fn encode_body(&self) -> Value {
        let mut corners = KeyedWriter::new();
        corners
            .put_codec("top_left", &self.top_left)
            .put_codec("bottom_right", &self.bottom_right);
        let mut writer = KeyedWriter::new();
        writer
            .put_writer(&self.field, corners)
            .put_opt("validation_method", self.validation_method)
            .put_opt("ignore_unmapped", self.ignore_unmapped)
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("GeoBoundingBoxQuery", body)?;
        let (field, _) = reader.entry_excluding(&GEO_OPTION_KEYS)?;
        let corners = reader.nested(field)?;
        Ok(GeoBoundingBoxQuery {
            field: field.to_string(),
            top_left: corners.decode("top_left", GeoPoint::from_json)?,
            bottom_right: corners.decode("bottom_right", GeoPoint::from_json)?,
            validation_method: reader.parse_opt("validation_method")?,
            ignore_unmapped: reader.bool_opt("ignore_unmapped")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`GeoBoundingBoxQuery`]. Requires `field`, `top_left` and
/// `bottom_right`, with the top edge not below the bottom edge.
#[derive(Debug, Default)]
pub struct GeoBoundingBoxQueryBuilder {
    field: Option<String>,
    top_left: Option<GeoPoint>,
    bottom_right: Option<GeoPoint>,
    validation_method: Option<GeoValidationMethod>,
    ignore_unmapped: Option<bool>,
    boost: Option<BigDecimal>,
}

impl GeoBoundingBoxQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        top_left: GeoPoint,
        bottom_right: GeoPoint,
        validation_method: GeoValidationMethod,
        ignore_unmapped: bool,
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for GeoBoundingBoxQueryBuilder {
    type Output = GeoBoundingBoxQuery;

    fn build(self) -> Result<GeoBoundingBoxQuery> {
        let field = required!(self.field);
        let top_left = required!(self.top_left);
        let bottom_right = required!(self.bottom_right);
        if top_left.lat < bottom_right.lat {
            return Err(QueryDslError::invalid_field(
                "top_left",
                "top-left latitude must not be below bottom-right latitude",
            ));
        }
        Ok(GeoBoundingBoxQuery {
            field,
            top_left,
            bottom_right,
            validation_method: self.validation_method,
            ignore_unmapped: self.ignore_unmapped,
            boost: self.boost,
        })
    }
}

/// Matches points within `distance` of a center point.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoDistanceQuery {
    pub field: String,
    pub point: GeoPoint,
    /// Distance with unit, e.g. `"200km"` or `"12mi"`.
    pub distance: String,
    pub distance_type: Option<GeoDistanceType>,
    pub validation_method: Option<GeoValidationMethod>,
    pub ignore_unmapped: Option<bool>,
    pub boost: Option<BigDecimal>,
}

impl GeoDistanceQuery {
    pub fn builder() -> GeoDistanceQueryBuilder {
        GeoDistanceQueryBuilder::new()
    }
}

impl QueryVariant for GeoDistanceQuery {
    const QUERY_TYPE: QueryType = QueryType::GeoDistance;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put("distance", self.distance.as_str())
            .put_codec(&self.field, &self.point)
            .put_opt("distance_type", self.distance_type)
            .put_opt("validation_method", self.validation_method)
            .put_opt("ignore_unmapped", self.ignore_unmapped)
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("GeoDistanceQuery", body)?;
        let (field, point) = reader.entry_excluding(&GEO_OPTION_KEYS)?;
        Ok(GeoDistanceQuery {
            field: field.to_string(),
            point: GeoPoint::from_json(point)?,
            distance: reader.scalar("distance")?,
            distance_type: reader.parse_opt("distance_type")?,
            validation_method: reader.parse_opt("validation_method")?,
            ignore_unmapped: reader.bool_opt("ignore_unmapped")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`GeoDistanceQuery`]. Requires `field`, `point`, then
/// `distance`.
#[derive(Debug, Default)]
pub struct GeoDistanceQueryBuilder {
    field: Option<String>,
    point: Option<GeoPoint>,
    distance: Option<String>,
    distance_type: Option<GeoDistanceType>,
    validation_method: Option<GeoValidationMethod>,
    ignore_unmapped: Option<bool>,
    boost: Option<BigDecimal>,
}

impl GeoDistanceQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        /// Set the center point.
        point: GeoPoint,
        /// Set the radius, with unit (`"12km"`).
        distance: String,
        distance_type: GeoDistanceType,
        validation_method: GeoValidationMethod,
        ignore_unmapped: bool,
    }

    /// Set the radius in kilometers.
    pub fn distance_km(self, km: f64) -> Self {
        self.distance(format!("{km}km"))
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for GeoDistanceQueryBuilder {
    type Output = GeoDistanceQuery;

    fn build(self) -> Result<GeoDistanceQuery> {
        let field = required!(self.field);
        let point = required!(self.point);
        let distance = required!(self.distance);
        Ok(GeoDistanceQuery {
            field,
            point,
            distance,
            distance_type: self.distance_type,
            validation_method: self.validation_method,
            ignore_unmapped: self.ignore_unmapped,
            boost: self.boost,
        })
    }
}

/// Minimum number of vertices of a polygon.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Matches points inside a polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPolygonQuery {
    pub field: String,
    pub points: Vec<GeoPoint>,
    pub validation_method: Option<GeoValidationMethod>,
    pub ignore_unmapped: Option<bool>,
    pub boost: Option<BigDecimal>,
}

impl GeoPolygonQuery {
    pub fn builder() -> GeoPolygonQueryBuilder {
        GeoPolygonQueryBuilder::new()
    }
}

fn check_polygon(points: &[GeoPoint]) -> Result<()> {
    if points.len() < MIN_POLYGON_POINTS {
        return Err(QueryDslError::invalid_field(
            "points",
            format!(
                "a polygon needs at least {MIN_POLYGON_POINTS} points, got {}",
                points.len()
            ),
        ));
    }
    Ok(())
}

impl QueryVariant for GeoPolygonQuery {
    const QUERY_TYPE: QueryType = QueryType::GeoPolygon;

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        writer
            .put(
                &self.field,
                named(
                    "points",
                    Value::Array(self.points.iter().map(GeoPoint::to_json).collect()),
                ),
            )
            .put_opt("validation_method", self.validation_method)
            .put_opt("ignore_unmapped", self.ignore_unmapped)
            .put_decimal_opt("boost", self.boost.as_ref());
        writer.finish()
    }

    fn decode_body(body: &Value) -> Result<Self> {
        let reader = KeyedReader::new("GeoPolygonQuery", body)?;
        let (field, _) = reader.entry_excluding(&GEO_OPTION_KEYS)?;
        let inner = reader.nested(field)?;
        let points = match inner.value("points")? {
            Value::Array(items) => items
                .iter()
                .map(GeoPoint::from_json)
                .collect::<Result<Vec<_>>>()?,
            _ => return Err(QueryDslError::type_mismatch("GeoPolygonQuery", "points", "a list")),
        };
        check_polygon(&points)?;
        Ok(GeoPolygonQuery {
            field: field.to_string(),
            points,
            validation_method: reader.parse_opt("validation_method")?,
            ignore_unmapped: reader.bool_opt("ignore_unmapped")?,
            boost: reader.decimal_opt("boost")?,
        })
    }
}

/// Builder for [`GeoPolygonQuery`]. Requires `field` and at least three
/// points.
#[derive(Debug, Default)]
pub struct GeoPolygonQueryBuilder {
    field: Option<String>,
    points: Vec<GeoPoint>,
    validation_method: Option<GeoValidationMethod>,
    ignore_unmapped: Option<bool>,
    boost: Option<BigDecimal>,
}

impl GeoPolygonQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        field: String,
        validation_method: GeoValidationMethod,
        ignore_unmapped: bool,
    }

    /// Append a vertex.
    pub fn point(mut self, point: GeoPoint) -> Self {
        self.points.push(point);
        self
    }

    pub fn points<I: IntoIterator<Item = GeoPoint>>(mut self, points: I) -> Self {
        self.points = points.into_iter().collect();
        self
    }

    decimal_setters! {
        boost,
    }
}

impl Builder for GeoPolygonQueryBuilder {
    type Output = GeoPolygonQuery;

    fn build(self) -> Result<GeoPolygonQuery> {
        let field = required!(self.field);
        check_polygon(&self.points)?;
        Ok(GeoPolygonQuery {
            field,
            points: self.points,
            validation_method: self.validation_method,
            ignore_unmapped: self.ignore_unmapped,
            boost: self.boost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn test_geo_shape_query_inline() {
        let query = GeoShapeQuery::builder()
            .field("location")
            .shape(GeoShape::envelope(point(53.0, 13.0), point(52.0, 14.0)))
            .relation(ShapeRelation::Within)
            .build()
            .unwrap();

        let expected = json!({
            "geo_shape": {
                "location": {
                    "shape": {"type": "envelope", "coordinates": [[13.0, 53.0], [14.0, 52.0]]},
                    "relation": "within"
                }
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(GeoShapeQuery::from_json(&expected).unwrap(), query);
    }

    #[test]
    fn test_geo_shape_query_indexed() {
        let doc = json!({
            "geo_shape": {
                "location": {
                    "indexed_shape": {"index": "shapes", "id": "deu", "path": "location"}
                },
                "ignore_unmapped": true
            }
        });
        let query = GeoShapeQuery::from_json(&doc).unwrap();
        assert_eq!(query.indexed_shape.as_ref().map(|s| s.id.as_str()), Some("deu"));
        assert_eq!(query.ignore_unmapped, Some(true));
        assert_eq!(query.to_json(), doc);
    }

    #[test]
    fn test_geo_shape_query_needs_one_source() {
        let err = GeoShapeQuery::builder().field("location").build().unwrap_err();
        assert!(matches!(err, QueryDslError::AtLeastOneRequired(_)));

        let err = GeoShapeQuery::builder()
            .field("location")
            .shape(GeoShape::new("point", json!([13.0, 53.0])))
            .indexed_shape(IndexedShape::new("deu"))
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryDslError::InvalidField { .. }));
    }

    #[test]
    fn test_geo_bounding_box_query() {
        let query = GeoBoundingBoxQuery::builder()
            .field("pin.location")
            .top_left(point(40.73, -74.1))
            .bottom_right(point(40.01, -71.12))
            .validation_method(GeoValidationMethod::Strict)
            .build()
            .unwrap();

        let expected = json!({
            "geo_bounding_box": {
                "pin.location": {
                    "top_left": {"lat": 40.73, "lon": -74.1},
                    "bottom_right": {"lat": 40.01, "lon": -71.12}
                },
                "validation_method": "STRICT"
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(GeoBoundingBoxQuery::from_json(&expected).unwrap(), query);
    }

    #[test]
    fn test_geo_bounding_box_inverted() {
        let err = GeoBoundingBoxQuery::builder()
            .field("pin.location")
            .top_left(point(40.01, -74.1))
            .bottom_right(point(40.73, -71.12))
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryDslError::InvalidField { ref field, .. } if field == "top_left"));
    }

    #[test]
    fn test_geo_distance_query() {
        let query = GeoDistanceQuery::builder()
            .field("pin.location")
            .point(point(40.0, -70.0))
            .distance_km(200.0)
            .build()
            .unwrap();

        let expected = json!({
            "geo_distance": {
                "distance": "200km",
                "pin.location": {"lat": 40.0, "lon": -70.0}
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(GeoDistanceQuery::from_json(&expected).unwrap(), query);

        let short = json!({"geo_distance": {"distance": "12km", "pin.location": "40,-70"}});
        assert_eq!(GeoDistanceQuery::from_json(&short).unwrap().point, point(40.0, -70.0));
    }

    #[test]
    fn test_geo_distance_requires_distance() {
        let err = GeoDistanceQuery::builder()
            .field("pin.location")
            .point(point(40.0, -70.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryDslError::MissingRequiredField(ref f) if f == "distance"));
    }

    #[test]
    fn test_geo_polygon_query() {
        let query = GeoPolygonQuery::builder()
            .field("person.location")
            .point(point(40.0, -70.0))
            .point(point(30.0, -80.0))
            .point(point(20.0, -90.0))
            .build()
            .unwrap();

        let expected = json!({
            "geo_polygon": {
                "person.location": {
                    "points": [
                        {"lat": 40.0, "lon": -70.0},
                        {"lat": 30.0, "lon": -80.0},
                        {"lat": 20.0, "lon": -90.0}
                    ]
                }
            }
        });
        assert_eq!(query.to_json(), expected);
        assert_eq!(GeoPolygonQuery::from_json(&expected).unwrap(), query);
    }

    #[test]
    fn test_geo_polygon_needs_three_points() {
        let err = GeoPolygonQuery::builder()
            .field("person.location")
            .points([point(40.0, -70.0), point(30.0, -80.0)])
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryDslError::InvalidField { ref field, .. } if field == "points"));
    }
}
