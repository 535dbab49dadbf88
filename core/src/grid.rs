//! Exhaustive grid search over named real-valued parameters.
//!
//! Points are visited in odometer order: the last declared parameter varies
//! fastest and carries into the one before it on overflow. Values advance by
//! repeated addition of `step` and stay on the lattice while
//! `value <= max + GRID_EPSILON`, so the visited set matches a floating-point
//! accumulator exactly, including its boundary behavior.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::constants::GRID_EPSILON;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParameterSpecFile")]
pub struct ParameterSpec {
    name: String,
    min: f64,
    max: f64,
    step: f64,
}

#[derive(Deserialize)]
struct ParameterSpecFile {
    name: String,
    min: f64,
    max: f64,
    step: f64,
}

impl TryFrom<ParameterSpecFile> for ParameterSpec {
    type Error = String;

    fn try_from(raw: ParameterSpecFile) -> Result<Self, Self::Error> {
        let spec = Self {
            name: raw.name,
            min: raw.min,
            max: raw.max,
            step: raw.step,
        };
        spec.check()?;
        Ok(spec)
    }
}

impl ParameterSpec {
    /// # Panics
    /// If `step` is not a positive finite number or a bound is not finite.
    pub fn new(name: impl Into<String>, min: f64, max: f64, step: f64) -> Self {
        let spec = Self {
            name: name.into(),
            min,
            max,
            step,
        };
        spec.assert_valid();
        spec
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    fn check(&self) -> Result<(), String> {
        let name = &self.name;
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(format!(
                "parameter '{name}' needs a positive step, got {}",
                self.step
            ));
        }
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(format!(
                "parameter '{name}' needs finite bounds, got [{}, {}]",
                self.min, self.max
            ));
        }
        Ok(())
    }

    // A non-positive step would never overflow the odometer digit.
    fn assert_valid(&self) {
        if let Err(reason) = self.check() {
            panic!("{reason}");
        }
    }

    /// Number of lattice values this parameter takes.
    pub fn value_count(&self) -> usize {
        self.assert_valid();
        let mut count = 1usize;
        let mut value = self.min;
        loop {
            value += self.step;
            if value > self.max + GRID_EPSILON {
                return count;
            }
            count += 1;
        }
    }
}

/// One assignment of a value to every parameter, in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct GridPoint {
    pub index: usize,
    names: Arc<[String]>,
    values: Vec<f64>,
}

impl GridPoint {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|candidate| candidate == name)
            .map(|idx| self.values[idx])
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `name=value` pairs joined by commas, for logs and reports.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (idx, (name, value)) in self.iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            out.push_str(name);
            out.push('=');
            out.push_str(&value.to_string());
        }
        out
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridSearch {
    specs: Vec<ParameterSpec>,
}

impl GridSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    /// If any spec has a non-positive or non-finite step.
    pub fn from_specs(specs: impl IntoIterator<Item = ParameterSpec>) -> Self {
        let specs: Vec<ParameterSpec> = specs.into_iter().collect();
        specs.iter().for_each(ParameterSpec::assert_valid);
        Self { specs }
    }

    pub fn add_parameter(&mut self, name: impl Into<String>, min: f64, max: f64, step: f64) {
        self.specs.push(ParameterSpec::new(name, min, max, step));
    }

    pub fn point_count(&self) -> usize {
        self.specs.iter().map(ParameterSpec::value_count).product()
    }

    pub fn iter(&self) -> GridIter {
        GridIter {
            names: self.specs.iter().map(|spec| spec.name.clone()).collect(),
            specs: self.specs.clone(),
            values: Some(self.specs.iter().map(|spec| spec.min).collect()),
            index: 0,
        }
    }

    /// Calls `visit` once per grid point, in odometer order.
    pub fn run<F>(&self, mut visit: F)
    where
        F: FnMut(&GridPoint),
    {
        for point in self.iter() {
            visit(&point);
        }
    }
}

impl<'a> IntoIterator for &'a GridSearch {
    type Item = GridPoint;
    type IntoIter = GridIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct GridIter {
    names: Arc<[String]>,
    specs: Vec<ParameterSpec>,
    // `None` once the first digit has overflowed.
    values: Option<Vec<f64>>,
    index: usize,
}

impl Iterator for GridIter {
    type Item = GridPoint;

    fn next(&mut self) -> Option<GridPoint> {
        let values = self.values.as_mut()?;
        let point = GridPoint {
            index: self.index,
            names: Arc::clone(&self.names),
            values: values.clone(),
        };
        self.index += 1;

        let mut finished = true;
        for k in (0..self.specs.len()).rev() {
            let spec = &self.specs[k];
            values[k] += spec.step;
            if values[k] <= spec.max + GRID_EPSILON {
                finished = false;
                break;
            }
            values[k] = spec.min;
        }
        if finished {
            self.values = None;
        }

        Some(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visited(grid: &GridSearch) -> Vec<Vec<f64>> {
        let mut out = Vec::new();
        grid.run(|point| out.push(point.values().to_vec()));
        out
    }

    #[test]
    fn single_parameter_includes_both_ends() {
        let mut grid = GridSearch::new();
        grid.add_parameter("p", 0.0, 1.0, 0.5);

        let mut seen = Vec::new();
        grid.run(|point| seen.push(point.get("p").unwrap()));
        assert_eq!(seen, [0.0, 0.5, 1.0]);
        assert_eq!(grid.point_count(), 3);
    }

    #[test]
    fn last_parameter_varies_fastest() {
        let mut grid = GridSearch::new();
        grid.add_parameter("a", 0.0, 1.0, 1.0);
        grid.add_parameter("b", 0.0, 1.0, 1.0);

        assert_eq!(
            visited(&grid),
            vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]]
        );
    }

    #[test]
    fn accumulated_steps_keep_the_upper_bound() {
        // 20 additions of 0.05 overshoot 1.0 by a rounding error; the epsilon keeps it.
        let mut grid = GridSearch::new();
        grid.add_parameter("t", 0.0, 1.0, 0.05);

        let values: Vec<f64> = grid.iter().map(|p| p.values()[0]).collect();
        assert_eq!(values.len(), 21);
        assert!((values[20] - 1.0).abs() < 1e-9);
        assert_eq!(grid.point_count(), 21);
    }

    #[test]
    fn odometer_with_three_digits() {
        let grid = GridSearch::from_specs([
            ParameterSpec::new("a", 0.0, 1.0, 1.0),
            ParameterSpec::new("b", 10.0, 12.0, 1.0),
            ParameterSpec::new("c", 0.0, 0.5, 0.5),
        ]);

        let points: Vec<GridPoint> = grid.iter().collect();
        assert_eq!(points.len(), 12);
        assert_eq!(grid.point_count(), 12);
        assert_eq!(points[0].values(), [0.0, 10.0, 0.0]);
        assert_eq!(points[1].values(), [0.0, 10.0, 0.5]);
        assert_eq!(points[2].values(), [0.0, 11.0, 0.0]);
        assert_eq!(points[6].values(), [1.0, 10.0, 0.0]);
        assert_eq!(points[11].values(), [1.0, 12.0, 0.5]);
        for (idx, point) in points.iter().enumerate() {
            assert_eq!(point.index, idx);
        }
    }

    #[test]
    fn min_above_max_still_visits_min_once() {
        let grid = GridSearch::from_specs([ParameterSpec::new("x", 2.0, 1.0, 0.5)]);
        assert_eq!(visited(&grid), vec![vec![2.0]]);
        assert_eq!(grid.point_count(), 1);
    }

    #[test]
    fn empty_grid_visits_one_empty_point() {
        let grid = GridSearch::new();
        let points: Vec<GridPoint> = grid.iter().collect();
        assert_eq!(points.len(), 1);
        assert!(points[0].is_empty());
        assert_eq!(grid.point_count(), 1);
    }

    #[test]
    fn points_expose_names_in_declaration_order() {
        let grid = GridSearch::from_specs([
            ParameterSpec::new("alpha", 0.25, 0.25, 1.0),
            ParameterSpec::new("beta", 3.0, 3.0, 1.0),
        ]);
        let point = grid.iter().next().unwrap();

        let pairs: Vec<(&str, f64)> = point.iter().collect();
        assert_eq!(pairs, [("alpha", 0.25), ("beta", 3.0)]);
        assert_eq!(point.get("gamma"), None);
        assert_eq!(point.describe(), "alpha=0.25,beta=3");
    }

    #[test]
    #[should_panic]
    fn zero_step_is_rejected() {
        ParameterSpec::new("p", 0.0, 1.0, 0.0);
    }

    #[test]
    #[should_panic(expected = "positive step")]
    fn negative_step_panics_instead_of_spinning() {
        let spec = ParameterSpec {
            name: "p".to_string(),
            min: 0.0,
            max: 1.0,
            step: -0.5,
        };
        GridSearch::from_specs([spec]);
    }

    #[test]
    fn deserialized_specs_are_validated() {
        let ok: ParameterSpec =
            serde_json::from_str(r#"{"name":"p","min":0.0,"max":1.0,"step":0.5}"#).unwrap();
        assert_eq!(ok, ParameterSpec::new("p", 0.0, 1.0, 0.5));
        assert_eq!((ok.name(), ok.min(), ok.max(), ok.step()), ("p", 0.0, 1.0, 0.5));

        let zero = serde_json::from_str::<ParameterSpec>(
            r#"{"name":"p","min":0.0,"max":1.0,"step":0}"#,
        );
        assert!(zero.is_err());
        let negative = serde_json::from_str::<ParameterSpec>(
            r#"{"name":"p","min":0.0,"max":1.0,"step":-0.5}"#,
        );
        assert!(negative.is_err());
    }
}
