//! Incremental scene construction and internal id assignment.
//!
//! Every insertion path (parsed triangles, tessellated shapes, the soil
//! quad) appends to three parallel sequences: the can text, one label per
//! triangle and one [`InternalId`] per triangle. Ids come from a single
//! counter that only moves forward until [`SceneBuilder::reset`].

use std::collections::BTreeMap;

use canopy_formats::{parse_can, write_can_line};
use canopy_math::Point3;
use canopy_mesh::Tessellate;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Result;
use crate::label::{InternalId, Label};
use crate::pattern::Pattern;

/// Immutable snapshot of a scene: can text plus per-triangle labels and ids.
///
/// `labels` and `ids` always have one entry per triangle, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    text: String,
    labels: Vec<Label>,
    ids: Vec<InternalId>,
}

impl Scene {
    /// Can text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Label of each triangle.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Internal id of each triangle.
    pub fn ids(&self) -> &[InternalId] {
        &self.ids
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the scene has no triangles.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Growing scene with its id counter.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    next_id: InternalId,
    text: String,
    labels: Vec<Label>,
    ids: Vec<InternalId>,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBuilder {
    /// Create an empty builder; the first id handed out is 1.
    pub fn new() -> Self {
        Self {
            next_id: InternalId::FIRST,
            text: String::new(),
            labels: Vec::new(),
            ids: Vec::new(),
        }
    }

    /// The id the next primitive will receive.
    pub fn next_id(&self) -> InternalId {
        self.next_id
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no triangle was added.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Can text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Label of each triangle.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Internal id of each triangle.
    pub fn ids(&self) -> &[InternalId] {
        &self.ids
    }

    /// Copy the current state into an immutable [`Scene`].
    pub fn snapshot(&self) -> Scene {
        Scene {
            text: self.text.clone(),
            labels: self.labels.clone(),
            ids: self.ids.clone(),
        }
    }

    /// Add a batch of labelled triangles.
    ///
    /// Each distinct canonical label of the batch gets one new id, in order
    /// of first appearance; triangles keep their batch order. Returns the
    /// label to id map of this batch.
    pub fn add_parsed_triangles<S: AsRef<str>>(
        &mut self,
        batch: &[(S, [Point3; 3])],
    ) -> BTreeMap<Label, InternalId> {
        let labels: Vec<Label> = batch
            .iter()
            .map(|(raw, _)| Label::canonicalize(raw.as_ref()))
            .collect();
        for (label, (_, triangle)) in labels.iter().zip(batch) {
            self.text.push_str(&write_can_line(label.as_str(), triangle));
        }
        self.assign_batch(labels)
    }

    /// Add can text.
    ///
    /// The text is validated as a whole before anything is appended and is
    /// then kept verbatim; ids follow the same rule as
    /// [`add_parsed_triangles`](Self::add_parsed_triangles).
    pub fn add_can(&mut self, text: &str) -> Result<BTreeMap<Label, InternalId>> {
        let records = parse_can(text)?;
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push_str(text);
        let labels = records
            .iter()
            .map(|rec| Label::canonicalize(&rec.label))
            .collect();
        Ok(self.assign_batch(labels))
    }

    /// Add shapes, one primitive per shape.
    ///
    /// Every triangle of the `i`-th shape carries `label_for(i)` and the
    /// shape's single new id. A shape that tessellates to nothing still
    /// consumes an id. Returns the shape key to id map.
    pub fn add_shapes<K, S, I, F>(&mut self, shapes: I, label_for: F) -> BTreeMap<K, InternalId>
    where
        K: Ord,
        S: Tessellate,
        I: IntoIterator<Item = (K, S)>,
        F: Fn(usize) -> Label,
    {
        let mut id_map = BTreeMap::new();
        for (index, (key, shape)) in shapes.into_iter().enumerate() {
            let id = self.next_id;
            let label = label_for(index);
            let mesh = shape.tessellate();
            for triangle in mesh.triangles() {
                self.text.push_str(&write_can_line(label.as_str(), &triangle));
                self.labels.push(label.clone());
                self.ids.push(id);
            }
            log::debug!("shape {index} -> id {id} ({} triangles)", mesh.num_triangles());
            id_map.insert(key, id);
            self.next_id = id.next();
        }
        id_map
    }

    /// Add a flat soil at height `zsoil` covering `pattern`.
    ///
    /// Without a pattern nothing is added, a [`Diagnostic::MissingPattern`]
    /// is emitted and the returned map is empty. Otherwise the domain is
    /// split along its diagonal into two triangles carrying the soil
    /// sentinel labels and two new ids.
    pub fn add_soil(
        &mut self,
        pattern: Option<&Pattern>,
        zsoil: f64,
        diagnostics: &mut Diagnostics,
    ) -> BTreeMap<Label, InternalId> {
        let Some(pattern) = pattern else {
            diagnostics.emit(Diagnostic::MissingPattern {
                operation: "add_soil",
            });
            return BTreeMap::new();
        };

        let (lo, hi) = (pattern.min(), pattern.max());
        let a = Point3::new(lo.x, lo.y, zsoil);
        let b = Point3::new(lo.x, hi.y, zsoil);
        let c = Point3::new(hi.x, hi.y, zsoil);
        let d = Point3::new(hi.x, lo.y, zsoil);

        let mut id_map = BTreeMap::new();
        for (k, triangle) in [[a, b, c], [c, d, a]].iter().enumerate() {
            let label = Label::soil(k);
            let id = self.next_id;
            self.text.push_str(&write_can_line(label.as_str(), triangle));
            self.labels.push(label.clone());
            self.ids.push(id);
            id_map.insert(label, id);
            self.next_id = id.next();
        }
        id_map
    }

    /// Drop all triangles and restart ids at 1.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Replace the can text without touching labels or ids.
    ///
    /// Used after periodisation, which moves triangles but keeps their
    /// number and order.
    pub(crate) fn replace_text(&mut self, text: String) {
        self.text = text;
    }

    fn assign_batch(&mut self, labels: Vec<Label>) -> BTreeMap<Label, InternalId> {
        let first = self.next_id;
        let mut id_map: BTreeMap<Label, InternalId> = BTreeMap::new();
        for label in &labels {
            let id = match id_map.get(label) {
                Some(&id) => id,
                None => {
                    let id = self.next_id;
                    id_map.insert(label.clone(), id);
                    self.next_id = id.next();
                    id
                }
            };
            self.ids.push(id);
        }
        log::debug!(
            "assigned ids {}..{} to {} triangles",
            first,
            self.next_id,
            labels.len()
        );
        self.labels.extend(labels);
        id_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_mesh::{Cuboid, Quad};
    use canopy_math::Vec3;

    const BATCH: &str = "\
p 1 5 3 0 0 0 1 0 0 0 1 0
p 1 3 3 0 0 1 1 0 1 0 1 1
p 1 5 3 0 0 2 1 0 2 0 1 2
";

    fn tri(z: f64) -> [Point3; 3] {
        [
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.0, 1.0, z),
        ]
    }

    fn ids(values: &[u32]) -> Vec<InternalId> {
        values.iter().map(|&v| InternalId::new(v)).collect()
    }

    #[test]
    fn test_one_id_per_distinct_label_in_first_seen_order() {
        let mut builder = SceneBuilder::new();
        let map = builder.add_can(BATCH).unwrap();
        assert_eq!(builder.ids(), ids(&[1, 2, 1]).as_slice());
        assert_eq!(map[&Label::canonicalize("5")], InternalId::new(1));
        assert_eq!(map[&Label::canonicalize("3")], InternalId::new(2));
        assert_eq!(builder.labels()[1].as_str(), "000000000003");
        assert_eq!(builder.next_id(), InternalId::new(3));
        assert_eq!(builder.text(), BATCH);
    }

    #[test]
    fn test_repeated_batch_gets_fresh_ids() {
        let mut builder = SceneBuilder::new();
        let first = builder.add_can(BATCH).unwrap();
        let second = builder.add_can(BATCH).unwrap();
        assert_eq!(builder.len(), 6);
        let max_first = first.values().max().unwrap();
        assert!(second.values().all(|id| id > max_first));
        assert_eq!(builder.ids(), ids(&[1, 2, 1, 3, 4, 3]).as_slice());
        assert_eq!(builder.text().lines().count(), 6);
    }

    #[test]
    fn test_malformed_can_is_rejected_without_mutation() {
        let mut builder = SceneBuilder::new();
        builder.add_can(BATCH).unwrap();
        let bad = "p 1 9 3 0 0 0 1 0 0 0 1 0\np 1 9 3 0 0 0 1 0 oops 0 1 0\n";
        assert!(builder.add_can(bad).is_err());
        assert_eq!(builder.len(), 3);
        assert_eq!(builder.next_id(), InternalId::new(3));
        assert_eq!(builder.text(), BATCH);
    }

    #[test]
    fn test_can_without_trailing_newline_stays_line_separated() {
        let mut builder = SceneBuilder::new();
        builder.add_can("p 1 1 3 0 0 0 1 0 0 0 1 0").unwrap();
        builder.add_can("p 1 2 3 0 0 0 1 0 0 0 1 0").unwrap();
        assert_eq!(parse_can(builder.text()).unwrap().len(), 2);
    }

    #[test]
    fn test_parsed_triangles_emit_canonical_lines() {
        let mut builder = SceneBuilder::new();
        let batch = vec![("8", tri(0.0)), ("9", tri(1.0)), ("8", tri(2.0))];
        let map = builder.add_parsed_triangles(&batch);
        assert_eq!(map.len(), 2);
        assert_eq!(builder.ids(), ids(&[1, 2, 1]).as_slice());
        let parsed = parse_can(builder.text()).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1].label, "000000000009");
        assert_eq!(parsed[2].triangle, tri(2.0));
    }

    #[test]
    fn test_shapes_get_one_id_each() {
        let mut builder = SceneBuilder::new();
        builder.add_can(BATCH).unwrap();
        let cube = Cuboid {
            origin: Point3::origin(),
            size: Vec3::new(1.0, 1.0, 1.0),
        };
        let leaf = Quad::horizontal(Point3::new(0.0, 0.0, 2.0), 1.0, 1.0);
        let shapes: Vec<(u64, Box<dyn Tessellate>)> = vec![(42, Box::new(cube)), (7, Box::new(leaf))];
        let map = builder.add_shapes(shapes, Label::for_shape);

        assert_eq!(map[&42], InternalId::new(3));
        assert_eq!(map[&7], InternalId::new(4));
        assert_eq!(builder.len(), 3 + 12 + 2);
        assert!(builder.ids()[3..15].iter().all(|&id| id == InternalId::new(3)));
        assert_eq!(builder.labels()[15].as_str(), "100001000002");
        assert_eq!(builder.next_id(), InternalId::new(5));
    }

    #[test]
    fn test_empty_shape_still_consumes_id() {
        let mut builder = SceneBuilder::new();
        let empty = canopy_mesh::TriangleMesh::new();
        let leaf = Quad::horizontal(Point3::origin(), 1.0, 1.0).tessellate();
        let map = builder.add_shapes([("a", empty), ("b", leaf)], Label::for_shape);
        assert_eq!(map["a"], InternalId::new(1));
        assert_eq!(map["b"], InternalId::new(2));
        assert_eq!(builder.ids(), ids(&[2, 2]).as_slice());
    }

    #[test]
    fn test_soil_covers_pattern() {
        let mut builder = SceneBuilder::new();
        let mut diags = Diagnostics::new();
        builder.add_can(BATCH).unwrap();
        let pattern = Pattern::from_corners((2.0, -1.0), (-2.0, 1.0));
        let map = builder.add_soil(Some(&pattern), -0.5, &mut diags);

        assert!(diags.is_empty());
        assert_eq!(map[&Label::soil(0)], InternalId::new(3));
        assert_eq!(map[&Label::soil(1)], InternalId::new(4));
        assert_eq!(builder.len(), 5);

        let soil = &parse_can(builder.text()).unwrap()[3..];
        assert_eq!(soil[0].label, "000000000000");
        assert_eq!(soil[0].triangle[0], Point3::new(-2.0, -1.0, -0.5));
        assert_eq!(soil[0].triangle[1], Point3::new(-2.0, 1.0, -0.5));
        assert_eq!(soil[0].triangle[2], Point3::new(2.0, 1.0, -0.5));
        assert_eq!(soil[1].triangle[1], Point3::new(2.0, -1.0, -0.5));
        let area: f64 = soil
            .iter()
            .map(|r| canopy_math::triangle_area(&r.triangle[0], &r.triangle[1], &r.triangle[2]))
            .sum();
        assert!((area - pattern.area()).abs() < 1e-9);
    }

    #[test]
    fn test_soil_without_pattern_is_a_noop() {
        let mut builder = SceneBuilder::new();
        let mut diags = Diagnostics::new();
        builder.add_can(BATCH).unwrap();
        let map = builder.add_soil(None, 0.0, &mut diags);
        assert!(map.is_empty());
        assert_eq!(builder.len(), 3);
        assert_eq!(builder.labels().len(), 3);
        assert_eq!(builder.next_id(), InternalId::new(3));
        assert_eq!(
            diags.as_slice(),
            &[Diagnostic::MissingPattern { operation: "add_soil" }]
        );
    }

    #[test]
    fn test_reset_restarts_ids() {
        let mut builder = SceneBuilder::new();
        builder.add_can(BATCH).unwrap();
        builder.reset();
        assert!(builder.is_empty());
        assert_eq!(builder.text(), "");
        let map = builder.add_can(BATCH).unwrap();
        assert_eq!(map.values().min(), Some(&InternalId::FIRST));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut builder = SceneBuilder::new();
        builder.add_can(BATCH).unwrap();
        let scene = builder.snapshot();
        builder.add_can(BATCH).unwrap();
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.labels().len(), scene.ids().len());
        assert_eq!(builder.len(), 6);
    }
}
