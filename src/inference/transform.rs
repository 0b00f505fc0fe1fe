//! Preprocessing transforms applied before classification

use serde::Deserialize;

use crate::models::layout::FEATURE_COUNT;

/// Pre-fitted feature transform
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    /// z = (x - mean) / scale
    StandardScaler { mean: Vec<f64>, scale: Vec<f64> },
    /// z = (x - min) / (max - min)
    MinMaxScaler { data_min: Vec<f64>, data_max: Vec<f64> },
    Identity,
}

fn check_vector(name: &str, values: &[f64]) -> Result<(), String> {
    if values.len() != FEATURE_COUNT {
        return Err(format!("`{}` has {} values, expected {}", name, values.len(), FEATURE_COUNT));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(format!("`{}` contains non-finite values", name));
    }
    Ok(())
}

impl Transform {
    pub fn kind(&self) -> &'static str {
        match self {
            Transform::StandardScaler { .. } => "standard_scaler",
            Transform::MinMaxScaler { .. } => "min_max_scaler",
            Transform::Identity => "identity",
        }
    }

    /// Shape and value checks against the feature layout
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Transform::StandardScaler { mean, scale } => {
                check_vector("mean", mean)?;
                check_vector("scale", scale)
            }
            Transform::MinMaxScaler { data_min, data_max } => {
                check_vector("data_min", data_min)?;
                check_vector("data_max", data_max)?;
                if data_min.iter().zip(data_max).any(|(lo, hi)| lo > hi) {
                    return Err("`data_min` exceeds `data_max`".to_string());
                }
                Ok(())
            }
            Transform::Identity => Ok(()),
        }
    }

    /// Apply to one sample. Assumes `validate` passed.
    pub fn apply(&self, x: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = *x;

        match self {
            Transform::StandardScaler { mean, scale } => {
                for (i, v) in out.iter_mut().enumerate() {
                    // zero variance columns are left unscaled
                    let s = if scale[i].abs() < 1e-12 { 1.0 } else { scale[i] };
                    *v = (*v - mean[i]) / s;
                }
            }
            Transform::MinMaxScaler { data_min, data_max } => {
                for (i, v) in out.iter_mut().enumerate() {
                    // constant columns keep a unit range
                    let range = data_max[i] - data_min[i];
                    let range = if range.abs() < 1e-12 { 1.0 } else { range };
                    *v = (*v - data_min[i]) / range;
                }
            }
            Transform::Identity => {}
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaler() {
        let mut mean = vec![0.0; FEATURE_COUNT];
        let mut scale = vec![1.0; FEATURE_COUNT];
        mean[0] = 1000.0;
        scale[0] = 500.0;
        scale[1] = 0.0;
        let transform = Transform::StandardScaler { mean, scale };
        assert!(transform.validate().is_ok());

        let mut x = [0.0; FEATURE_COUNT];
        x[0] = 2000.0;
        x[1] = 1.0;
        let z = transform.apply(&x);
        assert_eq!(z[0], 2.0);
        assert_eq!(z[1], 1.0);
    }

    #[test]
    fn test_min_max_scaler() {
        let transform = Transform::MinMaxScaler {
            data_min: vec![0.0; FEATURE_COUNT],
            data_max: vec![4.0; FEATURE_COUNT],
        };
        let z = transform.apply(&[1.0; FEATURE_COUNT]);
        assert!(z.iter().all(|v| (*v - 0.25).abs() < 1e-12));
    }

    #[test]
    fn test_min_max_scaler_constant_column() {
        let mut data_max = vec![4.0; FEATURE_COUNT];
        data_max[0] = 5.0;
        let mut data_min = vec![0.0; FEATURE_COUNT];
        data_min[0] = 5.0;
        let transform = Transform::MinMaxScaler { data_min, data_max };
        assert!(transform.validate().is_ok());

        let z = transform.apply(&[6.0; FEATURE_COUNT]);
        assert_eq!(z[0], 1.0);
        assert_eq!(z[1], 1.5);
    }

    #[test]
    fn test_wrong_dimension_rejected() {
        let transform = Transform::StandardScaler {
            mean: vec![0.0; 21],
            scale: vec![1.0; FEATURE_COUNT],
        };
        let err = transform.validate().unwrap_err();
        assert!(err.contains("21"));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut scale = vec![1.0; FEATURE_COUNT];
        scale[3] = f64::NAN;
        let transform = Transform::StandardScaler { mean: vec![0.0; FEATURE_COUNT], scale };
        assert!(transform.validate().is_err());
    }

    #[test]
    fn test_parse_tagged() {
        let transform: Transform = serde_json::from_str(r#"{"kind": "identity"}"#).unwrap();
        assert_eq!(transform.kind(), "identity");
    }
}
