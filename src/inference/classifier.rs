//! Pre-fitted classifiers mapping a transformed vector to a price-range label

use serde::Deserialize;

use crate::models::layout::FEATURE_COUNT;

/// Classifier artifact, selected by its `kind` tag
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    LinearSvm(LinearSvm),
    KernelSvm(KernelSvm),
}

impl Classifier {
    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::LinearSvm(_) => "linear_svm",
            Classifier::KernelSvm(_) => "kernel_svm",
        }
    }

    pub fn classes(&self) -> &[i64] {
        match self {
            Classifier::LinearSvm(m) => &m.classes,
            Classifier::KernelSvm(m) => &m.classes,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Classifier::LinearSvm(m) => m.validate(),
            Classifier::KernelSvm(m) => m.validate(),
        }
    }

    /// Predict one label. Assumes `validate` passed.
    pub fn predict(&self, x: &[f64; FEATURE_COUNT]) -> i64 {
        match self {
            Classifier::LinearSvm(m) => m.predict(x),
            Classifier::KernelSvm(m) => m.predict(x),
        }
    }
}

fn check_row(name: &str, row: &[f64]) -> Result<(), String> {
    if row.len() != FEATURE_COUNT {
        return Err(format!("`{}` row has {} values, expected {}", name, row.len(), FEATURE_COUNT));
    }
    check_finite(name, row)
}

fn check_finite(name: &str, values: &[f64]) -> Result<(), String> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(format!("`{}` contains non-finite values", name));
    }
    Ok(())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Index of the first maximum
fn argmax<T: PartialOrd + Copy>(values: &[T]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

// ============================================================================
// LINEAR SVM
// ============================================================================

/// Linear SVM: binary (one weight row) or one-vs-rest (one row per class)
#[derive(Debug, Clone, Deserialize)]
pub struct LinearSvm {
    pub classes: Vec<i64>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

impl LinearSvm {
    fn validate(&self) -> Result<(), String> {
        let k = self.classes.len();
        let m = self.coef.len();

        if k < 2 {
            return Err("need at least two classes".to_string());
        }
        if !(m == k || (k == 2 && m == 1)) {
            return Err(format!("{} coefficient rows for {} classes", m, k));
        }
        if self.intercept.len() != m {
            return Err(format!("{} intercepts for {} coefficient rows", self.intercept.len(), m));
        }
        for row in &self.coef {
            check_row("coef", row)?;
        }
        check_finite("intercept", &self.intercept)
    }

    /// w·x + b for each coefficient row
    pub fn decision_function(&self, x: &[f64; FEATURE_COUNT]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(w, b)| dot(w, x) + b)
            .collect()
    }

    fn predict(&self, x: &[f64; FEATURE_COUNT]) -> i64 {
        let decisions = self.decision_function(x);

        if decisions.len() == 1 {
            let positive = decisions[0] > 0.0;
            return self.classes[usize::from(positive)];
        }

        self.classes[argmax(&decisions)]
    }
}

// ============================================================================
// KERNEL SVM (one-vs-one)
// ============================================================================

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    Linear,
    Rbf,
    Poly,
    Sigmoid,
}

fn default_degree() -> i32 {
    3
}

/// libsvm style SVC.
///
/// `dual_coef` and `intercept` use libsvm's sign convention: for class pair
/// (i, j), a positive decision value votes for class i.
#[derive(Debug, Clone, Deserialize)]
pub struct KernelSvm {
    pub kernel: Kernel,
    #[serde(default)]
    pub gamma: f64,
    #[serde(default)]
    pub coef0: f64,
    #[serde(default = "default_degree")]
    pub degree: i32,
    pub classes: Vec<i64>,
    pub n_support: Vec<usize>,
    pub support_vectors: Vec<Vec<f64>>,
    pub dual_coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

impl KernelSvm {
    fn validate(&self) -> Result<(), String> {
        let k = self.classes.len();
        let n_sv = self.support_vectors.len();

        if k < 2 {
            return Err("need at least two classes".to_string());
        }
        if self.n_support.len() != k {
            return Err(format!("`n_support` has {} entries for {} classes", self.n_support.len(), k));
        }
        if self.n_support.iter().sum::<usize>() != n_sv {
            return Err(format!("`n_support` does not add up to {} support vectors", n_sv));
        }
        if self.dual_coef.len() != k - 1 || self.dual_coef.iter().any(|row| row.len() != n_sv) {
            return Err(format!("`dual_coef` must be {} rows of {} values", k - 1, n_sv));
        }
        if self.intercept.len() != k * (k - 1) / 2 {
            return Err(format!("`intercept` must have {} values", k * (k - 1) / 2));
        }
        if self.kernel != Kernel::Linear && !(self.gamma > 0.0) {
            return Err("`gamma` must be positive for non-linear kernels".to_string());
        }
        if self.kernel == Kernel::Poly && self.degree < 0 {
            return Err("`degree` must not be negative".to_string());
        }
        for sv in &self.support_vectors {
            check_row("support_vectors", sv)?;
        }
        for row in &self.dual_coef {
            check_finite("dual_coef", row)?;
        }
        check_finite("intercept", &self.intercept)?;
        check_finite("gamma", &[self.gamma, self.coef0])
    }

    fn kernel_value(&self, x: &[f64], sv: &[f64]) -> f64 {
        match self.kernel {
            Kernel::Linear => dot(x, sv),
            Kernel::Rbf => {
                let dist: f64 = x.iter().zip(sv).map(|(a, b)| (a - b) * (a - b)).sum();
                (-self.gamma * dist).exp()
            }
            Kernel::Poly => (self.gamma * dot(x, sv) + self.coef0).powi(self.degree),
            Kernel::Sigmoid => (self.gamma * dot(x, sv) + self.coef0).tanh(),
        }
    }

    /// Pairwise decision values, ordered (0,1), (0,2), ..., (k-2,k-1)
    pub fn decision_function(&self, x: &[f64; FEATURE_COUNT]) -> Vec<f64> {
        let k = self.classes.len();
        let kvalues: Vec<f64> = self
            .support_vectors
            .iter()
            .map(|sv| self.kernel_value(x, sv))
            .collect();

        let mut start = Vec::with_capacity(k);
        let mut offset = 0;
        for n in &self.n_support {
            start.push(offset);
            offset += n;
        }

        let mut decisions = Vec::with_capacity(self.intercept.len());
        let mut p = 0;
        for i in 0..k {
            for j in (i + 1)..k {
                let (si, ci) = (start[i], self.n_support[i]);
                let (sj, cj) = (start[j], self.n_support[j]);
                let coef_i = &self.dual_coef[j - 1];
                let coef_j = &self.dual_coef[i];

                let mut sum = self.intercept[p];
                sum += (si..si + ci).map(|s| coef_i[s] * kvalues[s]).sum::<f64>();
                sum += (sj..sj + cj).map(|s| coef_j[s] * kvalues[s]).sum::<f64>();

                decisions.push(sum);
                p += 1;
            }
        }

        decisions
    }

    fn predict(&self, x: &[f64; FEATURE_COUNT]) -> i64 {
        let k = self.classes.len();
        let decisions = self.decision_function(x);

        let mut votes = vec![0u32; k];
        let mut p = 0;
        for i in 0..k {
            for j in (i + 1)..k {
                if decisions[p] > 0.0 {
                    votes[i] += 1;
                } else {
                    votes[j] += 1;
                }
                p += 1;
            }
        }

        self.classes[argmax(&votes)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(index: usize, value: f64) -> Vec<f64> {
        let mut row = vec![0.0; FEATURE_COUNT];
        row[index] = value;
        row
    }

    fn sample(index: usize, value: f64) -> [f64; FEATURE_COUNT] {
        let mut x = [0.0; FEATURE_COUNT];
        x[index] = value;
        x
    }

    #[test]
    fn test_linear_binary_uses_sign() {
        let svm = Classifier::LinearSvm(LinearSvm {
            classes: vec![0, 1],
            coef: vec![unit(0, 1.0)],
            intercept: vec![-0.5],
        });
        assert!(svm.validate().is_ok());
        assert_eq!(svm.predict(&sample(0, 1.0)), 1);
        assert_eq!(svm.predict(&sample(0, 0.0)), 0);
        // a point on the hyperplane goes to the first class
        assert_eq!(svm.predict(&sample(0, 0.5)), 0);
    }

    #[test]
    fn test_linear_one_vs_rest_argmax() {
        let svm = Classifier::LinearSvm(LinearSvm {
            classes: vec![0, 1, 2, 3],
            coef: vec![unit(13, -2.0), unit(13, -1.0), unit(13, 1.0), unit(13, 2.0)],
            intercept: vec![-1.5, 0.0, 0.0, -1.5],
        });
        assert!(svm.validate().is_ok());
        assert_eq!(svm.predict(&sample(13, -1.8)), 0);
        assert_eq!(svm.predict(&sample(13, -1.0)), 1);
        assert_eq!(svm.predict(&sample(13, 0.048)), 2);
        assert_eq!(svm.predict(&sample(13, 3.0)), 3);
    }

    #[test]
    fn test_linear_shape_mismatch_rejected() {
        let svm = LinearSvm {
            classes: vec![0, 1, 2],
            coef: vec![unit(0, 1.0); 2],
            intercept: vec![0.0; 2],
        };
        assert!(svm.validate().is_err());

        let svm = LinearSvm {
            classes: vec![0, 1],
            coef: vec![vec![1.0; 5]],
            intercept: vec![0.0],
        };
        assert!(svm.validate().unwrap_err().contains("expected 20"));
    }

    fn three_class_rbf() -> KernelSvm {
        KernelSvm {
            kernel: Kernel::Rbf,
            gamma: 1.0,
            coef0: 0.0,
            degree: 3,
            classes: vec![0, 1, 2],
            n_support: vec![1, 1, 1],
            support_vectors: vec![unit(13, 0.0), unit(13, 2.0), unit(13, 4.0)],
            dual_coef: vec![vec![1.0, -1.0, -1.0], vec![1.0, 1.0, -1.0]],
            intercept: vec![0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn test_kernel_one_vs_one_votes_nearest() {
        let svm = Classifier::KernelSvm(three_class_rbf());
        assert!(svm.validate().is_ok());
        assert_eq!(svm.predict(&sample(13, 0.1)), 0);
        assert_eq!(svm.predict(&sample(13, 2.1)), 1);
        assert_eq!(svm.predict(&sample(13, 3.9)), 2);
    }

    #[test]
    fn test_kernel_decision_values_ordered_by_pair() {
        let svm = three_class_rbf();
        let decisions = svm.decision_function(&sample(13, 0.0));
        assert_eq!(decisions.len(), 3);
        // (0,1): K0 - K1, K0 = 1 at the first support vector
        assert!((decisions[0] - (1.0 - (-4.0f64).exp())).abs() < 1e-12);
        assert!(decisions[1] > 0.0);
        assert!(decisions[2] > 0.0);
    }

    #[test]
    fn test_kernel_shape_mismatch_rejected() {
        let mut svm = three_class_rbf();
        svm.n_support = vec![1, 2, 1];
        assert!(svm.validate().is_err());

        let mut svm = three_class_rbf();
        svm.intercept.pop();
        assert!(svm.validate().is_err());

        let mut svm = three_class_rbf();
        svm.gamma = 0.0;
        assert!(svm.validate().unwrap_err().contains("gamma"));
    }

    #[test]
    fn test_parse_kernel_svm() {
        let json = serde_json::json!({
            "kind": "kernel_svm",
            "kernel": "linear",
            "classes": [0, 1],
            "n_support": [1, 1],
            "support_vectors": [unit(0, 1.0), unit(0, -1.0)],
            "dual_coef": [[0.5, -0.5]],
            "intercept": [0.0]
        });
        let svm: Classifier = serde_json::from_value(json).unwrap();
        assert_eq!(svm.kind(), "kernel_svm");
        assert!(svm.validate().is_ok());
        assert_eq!(svm.predict(&sample(0, 2.0)), 0);
        assert_eq!(svm.predict(&sample(0, -2.0)), 1);
    }
}
