//! Per-triangle simulation outputs and their aggregation by primitive.
//!
//! The engine reports one row per triangle, in scene order. Rows are
//! sanitized and converted to area-integrated quantities
//! ([`TriangleOutput::from_raw`]), then grouped by [`InternalId`]
//! ([`aggregate`], [`group`]) and optionally re-keyed by caller ids
//! ([`PrimitiveTable::remap`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SceneError};
use crate::label::{InternalId, Label};

/// Raw per-triangle result of one simulated band.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Absorbed flux density.
    #[serde(rename = "Eabs", deserialize_with = "nullable_floats")]
    pub eabs: Vec<f64>,
    /// Incident flux density on the lower face.
    #[serde(rename = "Ei_inf", deserialize_with = "nullable_floats")]
    pub ei_inf: Vec<f64>,
    /// Incident flux density on the upper face.
    #[serde(rename = "Ei_sup", deserialize_with = "nullable_floats")]
    pub ei_sup: Vec<f64>,
    /// Triangle area.
    pub area: Vec<f64>,
    /// Triangle label as reported by the engine.
    pub label: Vec<String>,
}

/// JSON has no NaN; engines write `null` instead.
fn nullable_floats<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<f64>, D::Error> {
    let values: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

impl RawTable {
    /// Number of rows, after checking that every column has it.
    pub fn len(&self) -> Result<usize> {
        let expected = self.eabs.len();
        let columns = [
            ("Ei_inf", self.ei_inf.len()),
            ("Ei_sup", self.ei_sup.len()),
            ("area", self.area.len()),
            ("label", self.label.len()),
        ];
        for (column, actual) in columns {
            if actual != expected {
                return Err(SceneError::ColumnLength {
                    column,
                    expected,
                    actual,
                });
            }
        }
        Ok(expected)
    }
}

/// Output variables carried per triangle and per primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Variable {
    /// Absorbed energy (flux density times area).
    Eabs,
    /// Incident energy on both faces.
    Einc,
    /// Incident energy on the upper face.
    EincSup,
    /// Incident energy on the lower face.
    EincInf,
    /// Surface area.
    Area,
    /// Absorbed flux density.
    Eabsm2,
    /// Incident flux density on the lower face.
    EiInf,
    /// Incident flux density on the upper face.
    EiSup,
}

impl Variable {
    /// Every variable, in declaration order.
    pub const ALL: [Variable; 8] = [
        Variable::Eabs,
        Variable::Einc,
        Variable::EincSup,
        Variable::EincInf,
        Variable::Area,
        Variable::Eabsm2,
        Variable::EiInf,
        Variable::EiSup,
    ];

    /// Area-integrated variables, summed when aggregating.
    pub const INTEGRATED: [Variable; 5] = [
        Variable::Eabs,
        Variable::Einc,
        Variable::EincSup,
        Variable::EincInf,
        Variable::Area,
    ];

    /// Flux densities recomputed from integrated sums: (density, numerator).
    const DENSITIES: [(Variable, Variable); 3] = [
        (Variable::Eabsm2, Variable::Eabs),
        (Variable::EiInf, Variable::EincInf),
        (Variable::EiSup, Variable::EincSup),
    ];
}

/// Per-triangle outputs after sanitation, in scene order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TriangleOutput {
    columns: BTreeMap<Variable, Vec<f64>>,
    label: Vec<Label>,
}

/// NaN becomes 0, then negatives are clamped to 0.
fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

impl TriangleOutput {
    /// Sanitize a raw table and derive the area-integrated quantities.
    pub fn from_raw(raw: &RawTable) -> Result<Self> {
        raw.len()?;
        let eabs: Vec<f64> = raw.eabs.iter().copied().map(sanitize).collect();
        let ei_inf: Vec<f64> = raw.ei_inf.iter().copied().map(sanitize).collect();
        let ei_sup: Vec<f64> = raw.ei_sup.iter().copied().map(sanitize).collect();
        let area = &raw.area;

        let times_area = |values: &[f64]| -> Vec<f64> {
            values.iter().zip(area).map(|(v, a)| v * a).collect()
        };
        let einc = ei_sup
            .iter()
            .zip(&ei_inf)
            .zip(area)
            .map(|((sup, inf), a)| (sup + inf) * a)
            .collect();

        let mut columns = BTreeMap::new();
        columns.insert(Variable::Eabs, times_area(&eabs));
        columns.insert(Variable::Einc, einc);
        columns.insert(Variable::EincSup, times_area(&ei_sup));
        columns.insert(Variable::EincInf, times_area(&ei_inf));
        columns.insert(Variable::Area, area.clone());
        columns.insert(Variable::Eabsm2, eabs);
        columns.insert(Variable::EiInf, ei_inf);
        columns.insert(Variable::EiSup, ei_sup);

        Ok(Self {
            columns,
            label: raw.label.iter().map(|l| Label::canonicalize(l)).collect(),
        })
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.label.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }

    /// Values of one variable, one per triangle.
    pub fn column(&self, variable: Variable) -> &[f64] {
        self.columns.get(&variable).map_or(&[], Vec::as_slice)
    }

    /// Label of each triangle.
    pub fn labels(&self) -> &[Label] {
        &self.label
    }
}

/// Outputs keyed by primitive: one map per variable plus the label map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimitiveTable<K, V, L> {
    /// Values of each variable by primitive key.
    #[serde(flatten)]
    pub values: BTreeMap<Variable, BTreeMap<K, V>>,
    /// Label(s) by primitive key.
    pub label: BTreeMap<K, L>,
}

/// One value per primitive: sums, densities and a representative label.
pub type Aggregated<K> = PrimitiveTable<K, f64, Label>;

/// Every triangle value of each primitive, in scene order.
pub type PerTriangle<K> = PrimitiveTable<K, Vec<f64>, Vec<Label>>;

impl<K, V, L> Default for PrimitiveTable<K, V, L> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
            label: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V, L> PrimitiveTable<K, V, L> {
    /// Whether the table holds no primitive.
    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }

    /// Keys present in the table, in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.label.keys()
    }

    /// Value of `variable` for `key`.
    pub fn get(&self, variable: Variable, key: &K) -> Option<&V> {
        self.values.get(&variable)?.get(key)
    }

    /// Re-key through a caller map of external key to table key.
    ///
    /// Entries whose target key is not in the table are skipped. When none
    /// resolves the result is empty, so callers can tell "no matching
    /// output" apart from zero-valued output.
    pub fn remap<E>(&self, map: &BTreeMap<E, K>) -> PrimitiveTable<E, V, L>
    where
        E: Ord + Clone,
        V: Clone,
        L: Clone,
    {
        let label = resolve(map, &self.label);
        if label.is_empty() {
            return PrimitiveTable::default();
        }
        PrimitiveTable {
            values: self
                .values
                .iter()
                .map(|(variable, column)| (*variable, resolve(map, column)))
                .collect(),
            label,
        }
    }
}

fn resolve<E: Ord + Clone, K: Ord, T: Clone>(
    map: &BTreeMap<E, K>,
    column: &BTreeMap<K, T>,
) -> BTreeMap<E, T> {
    map.iter()
        .filter_map(|(external, internal)| Some((external.clone(), column.get(internal)?.clone())))
        .collect()
}

/// Aggregated or per-triangle grouping of the same outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Grouped<K> {
    /// One value per primitive.
    Aggregated(Aggregated<K>),
    /// Every triangle value per primitive.
    PerTriangle(PerTriangle<K>),
}

impl<K: Ord> Grouped<K> {
    /// Whether no primitive has output.
    pub fn is_empty(&self) -> bool {
        match self {
            Grouped::Aggregated(table) => table.is_empty(),
            Grouped::PerTriangle(table) => table.is_empty(),
        }
    }

    /// Re-key through an external id map. See [`PrimitiveTable::remap`].
    pub fn remap<E: Ord + Clone>(&self, map: &BTreeMap<E, K>) -> Grouped<E> {
        match self {
            Grouped::Aggregated(table) => Grouped::Aggregated(table.remap(map)),
            Grouped::PerTriangle(table) => Grouped::PerTriangle(table.remap(map)),
        }
    }
}

fn check_aligned(output: &TriangleOutput, ids: &[InternalId]) -> Result<()> {
    if output.len() != ids.len() {
        return Err(SceneError::LengthMismatch {
            rows: output.len(),
            triangles: ids.len(),
        });
    }
    Ok(())
}

/// Sum integrated variables per primitive and recompute flux densities.
///
/// `ids` must be the scene's id sequence at the time the outputs were
/// produced; any length difference is an error, including an empty output
/// against a non-empty scene. Densities are 0 for primitives with no area. The label of a
/// primitive is the label of its first triangle.
pub fn aggregate(output: &TriangleOutput, ids: &[InternalId]) -> Result<Aggregated<InternalId>> {
    check_aligned(output, ids)?;
    if output.is_empty() {
        return Ok(Aggregated::default());
    }

    let mut table = Aggregated::default();
    for variable in Variable::INTEGRATED {
        let column = output.column(variable);
        let sums = table.values.entry(variable).or_default();
        for (id, value) in ids.iter().zip(column) {
            *sums.entry(*id).or_insert(0.0) += value;
        }
    }
    for (id, label) in ids.iter().zip(output.labels()) {
        table.label.entry(*id).or_insert_with(|| label.clone());
    }

    let areas = table.values.get(&Variable::Area).cloned().unwrap_or_default();
    for (density, numerator) in Variable::DENSITIES {
        let means = table
            .values
            .get(&numerator)
            .map(|sums| {
                sums.iter()
                    .map(|(id, sum)| {
                        let area = areas.get(id).copied().unwrap_or(0.0);
                        (*id, if area > 0.0 { sum / area } else { 0.0 })
                    })
                    .collect()
            })
            .unwrap_or_default();
        table.values.insert(density, means);
    }
    Ok(table)
}

/// Collect every variable's triangle values per primitive, without summing.
pub fn group(output: &TriangleOutput, ids: &[InternalId]) -> Result<PerTriangle<InternalId>> {
    check_aligned(output, ids)?;
    if output.is_empty() {
        return Ok(PerTriangle::default());
    }

    let mut table = PerTriangle::default();
    for variable in Variable::ALL {
        let lists = table.values.entry(variable).or_default();
        for (id, value) in ids.iter().zip(output.column(variable)) {
            lists.entry(*id).or_default().push(*value);
        }
    }
    for (id, label) in ids.iter().zip(output.labels()) {
        table.label.entry(*id).or_default().push(label.clone());
    }
    Ok(table)
}

/// Group outputs by internal id, summing when `aggregate` is set.
pub fn output_by_id(
    output: &TriangleOutput,
    ids: &[InternalId],
    aggregate: bool,
) -> Result<Grouped<InternalId>> {
    Ok(if aggregate {
        Grouped::Aggregated(self::aggregate(output, ids)?)
    } else {
        Grouped::PerTriangle(group(output, ids)?)
    })
}

/// Group outputs by caller ids mapped onto internal ids.
///
/// The result is empty when no entry of `map` has output.
pub fn output_by_external_id<E: Ord + Clone>(
    output: &TriangleOutput,
    ids: &[InternalId],
    map: &BTreeMap<E, InternalId>,
    aggregate: bool,
) -> Result<Grouped<E>> {
    Ok(output_by_id(output, ids, aggregate)?.remap(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ids(values: &[u32]) -> Vec<InternalId> {
        values.iter().map(|&v| InternalId::new(v)).collect()
    }

    fn raw(eabs: Vec<f64>, area: Vec<f64>) -> RawTable {
        let n = eabs.len();
        RawTable {
            eabs,
            ei_inf: vec![0.25; n],
            ei_sup: vec![0.75; n],
            area,
            label: (0..n).map(|i| format!("{}", i / 2 + 1)).collect(),
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(f64::NAN), 0.0);
        assert_eq!(sanitize(-3.0), 0.0);
        assert_eq!(sanitize(2.5), 2.5);
    }

    #[test]
    fn test_from_raw_derives_integrated_columns() {
        let mut table = raw(vec![0.5, -1.0], vec![2.0, 4.0]);
        table.ei_sup[1] = f64::NAN;
        let out = TriangleOutput::from_raw(&table).unwrap();
        assert_eq!(out.column(Variable::Eabs), &[1.0, 0.0]);
        assert_eq!(out.column(Variable::Einc), &[2.0, 1.0]);
        assert_eq!(out.column(Variable::EincSup), &[1.5, 0.0]);
        assert_eq!(out.column(Variable::EincInf), &[0.5, 1.0]);
        assert_eq!(out.column(Variable::Eabsm2), &[0.5, 0.0]);
        assert_eq!(out.column(Variable::EiSup), &[0.75, 0.0]);
        assert_eq!(out.labels()[0].as_str(), "000000000001");
    }

    #[test]
    fn test_from_raw_rejects_ragged_columns() {
        let mut table = raw(vec![0.5, 0.5], vec![1.0, 1.0]);
        table.label.pop();
        let err = TriangleOutput::from_raw(&table).unwrap_err();
        assert!(matches!(
            err,
            SceneError::ColumnLength { column: "label", expected: 2, actual: 1 }
        ));
    }

    #[test]
    fn test_aggregate_sums_and_densities() {
        let out = TriangleOutput::from_raw(&raw(vec![0.5, 0.5, f64::NAN], vec![2.0, 2.0, 3.0])).unwrap();
        let table = aggregate(&out, &ids(&[1, 1, 2])).unwrap();
        let one = InternalId::new(1);
        let two = InternalId::new(2);

        assert_relative_eq!(*table.get(Variable::Eabs, &one).unwrap(), 2.0);
        assert_eq!(*table.get(Variable::Eabs, &two).unwrap(), 0.0);
        assert_relative_eq!(*table.get(Variable::Area, &one).unwrap(), 4.0);
        assert_relative_eq!(*table.get(Variable::Eabsm2, &one).unwrap(), 0.5);
        assert_relative_eq!(*table.get(Variable::Einc, &one).unwrap(), 4.0);
        assert_relative_eq!(*table.get(Variable::EiSup, &two).unwrap(), 0.75);
        assert_relative_eq!(*table.get(Variable::EiInf, &two).unwrap(), 0.25);
        assert_eq!(table.label[&one].as_str(), "000000000001");
        assert_eq!(table.keys().count(), 2);
    }

    #[test]
    fn test_zero_area_density_is_zero() {
        let out = TriangleOutput::from_raw(&raw(vec![1.0], vec![0.0])).unwrap();
        let table = aggregate(&out, &ids(&[5])).unwrap();
        assert_eq!(*table.get(Variable::Eabsm2, &InternalId::new(5)).unwrap(), 0.0);
        assert_eq!(*table.get(Variable::EiSup, &InternalId::new(5)).unwrap(), 0.0);
    }

    #[test]
    fn test_first_label_wins() {
        let mut table = raw(vec![1.0, 1.0], vec![1.0, 1.0]);
        table.label = vec!["10".into(), "20".into()];
        let out = TriangleOutput::from_raw(&table).unwrap();
        let agg = aggregate(&out, &ids(&[3, 3])).unwrap();
        assert_eq!(agg.label[&InternalId::new(3)].as_str(), "000000000010");
    }

    #[test]
    fn test_group_keeps_triangle_values() {
        let out = TriangleOutput::from_raw(&raw(vec![0.5, 0.25, 1.0], vec![2.0, 2.0, 3.0])).unwrap();
        let table = group(&out, &ids(&[1, 2, 1])).unwrap();
        let one = InternalId::new(1);
        assert_eq!(table.get(Variable::Eabs, &one).unwrap(), &vec![1.0, 3.0]);
        assert_eq!(table.get(Variable::Eabsm2, &one).unwrap(), &vec![0.5, 1.0]);
        assert_eq!(table.get(Variable::Area, &InternalId::new(2)).unwrap(), &vec![2.0]);
        assert_eq!(table.label[&one].len(), 2);
        assert_eq!(table.values.len(), Variable::ALL.len());
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let out = TriangleOutput::from_raw(&raw(vec![0.5, 0.5], vec![1.0, 1.0])).unwrap();
        let err = aggregate(&out, &ids(&[1, 1, 2])).unwrap_err();
        assert!(matches!(err, SceneError::LengthMismatch { rows: 2, triangles: 3 }));
        assert!(group(&out, &ids(&[1])).is_err());
    }

    #[test]
    fn test_empty_output_for_empty_scene() {
        let out = TriangleOutput::default();
        assert!(output_by_id(&out, &[], true).unwrap().is_empty());
        assert!(output_by_id(&out, &[], false).unwrap().is_empty());
    }

    #[test]
    fn test_empty_output_against_triangles_is_a_mismatch() {
        let out = TriangleOutput::from_raw(&RawTable::default()).unwrap();
        let err = aggregate(&out, &ids(&[1, 1, 2])).unwrap_err();
        assert!(matches!(err, SceneError::LengthMismatch { rows: 0, triangles: 3 }));
        assert!(matches!(
            group(&out, &ids(&[1])),
            Err(SceneError::LengthMismatch { rows: 0, triangles: 1 })
        ));
    }

    #[test]
    fn test_external_remap() {
        let out = TriangleOutput::from_raw(&raw(vec![0.5, 0.5, 1.0], vec![2.0, 2.0, 3.0])).unwrap();
        let mut map = BTreeMap::new();
        map.insert("stem", InternalId::new(2));
        map.insert("leaf", InternalId::new(1));
        map.insert("ghost", InternalId::new(9));
        let grouped = output_by_external_id(&out, &ids(&[1, 1, 2]), &map, true).unwrap();
        let Grouped::Aggregated(table) = grouped else {
            panic!("expected aggregated output");
        };
        assert_relative_eq!(*table.get(Variable::Eabs, &"leaf").unwrap(), 2.0);
        assert_relative_eq!(*table.get(Variable::Eabs, &"stem").unwrap(), 3.0);
        assert!(table.get(Variable::Eabs, &"ghost").is_none());
        assert_eq!(table.keys().collect::<Vec<_>>(), vec![&"leaf", &"stem"]);
    }

    #[test]
    fn test_unresolvable_map_gives_empty_result() {
        let out = TriangleOutput::from_raw(&raw(vec![0.5, 0.5, 1.0], vec![2.0, 2.0, 3.0])).unwrap();
        let map: BTreeMap<u64, InternalId> = [(100, InternalId::new(7)), (101, InternalId::new(8))]
            .into_iter()
            .collect();
        for aggregate in [true, false] {
            let grouped = output_by_external_id(&out, &ids(&[1, 1, 2]), &map, aggregate).unwrap();
            assert!(grouped.is_empty());
            match grouped {
                Grouped::Aggregated(t) => assert!(t.values.is_empty()),
                Grouped::PerTriangle(t) => assert!(t.values.is_empty()),
            }
        }
    }

    #[test]
    fn test_raw_table_json_nulls_are_nan() {
        let json = r#"{"Eabs": [0.5, null], "Ei_inf": [0, 0], "Ei_sup": [1, -0.1], "area": [1, 1], "label": ["1", "2"]}"#;
        let table: RawTable = serde_json::from_str(json).unwrap();
        assert!(table.eabs[1].is_nan());
        let out = TriangleOutput::from_raw(&table).unwrap();
        assert_eq!(out.column(Variable::Eabsm2), &[0.5, 0.0]);
        assert_eq!(out.column(Variable::EiSup), &[1.0, 0.0]);
    }

    #[test]
    fn test_aggregated_json_shape() {
        let out = TriangleOutput::from_raw(&raw(vec![0.5], vec![2.0])).unwrap();
        let table = aggregate(&out, &ids(&[1])).unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["Eabs"]["1"], 1.0);
        assert_eq!(json["label"]["1"], "000000000001");
    }
}
