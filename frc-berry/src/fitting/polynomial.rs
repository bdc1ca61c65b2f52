//! 多项式曲线.

use nalgebra::{DMatrix, DVector};
use ndarray::ArrayView1;

use crate::{FrcError, FrcResult};

/// 系数按升幂排列的多项式 `c0 + c1 x + ... + cd x^d`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polynomial(Vec<f64>);

impl Polynomial {
    /// 由升幂系数构建. 系数为空时视为零多项式.
    pub fn new(coefficients: Vec<f64>) -> Self {
        if coefficients.is_empty() {
            return Self(vec![0.0]);
        }
        Self(coefficients)
    }

    /// Horner 求值.
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        self.0.iter().rev().fold(0.0, |acc, &cur| acc * x + cur)
    }

    /// 升幂系数.
    #[inline]
    pub fn coefficients(&self) -> &[f64] {
        &self.0
    }

    /// 次数, 即系数个数减一.
    #[inline]
    pub fn degree(&self) -> usize {
        self.0.len() - 1
    }
}

/// 基于最小二乘法拟合 `degree` 次多项式.
///
/// Vandermonde 矩阵的每一列先缩放为单位范数, 再经 SVD 求解;
/// 小于 `最大奇异值 * 样本数 * EPSILON` 的奇异值视为 0.
///
/// `x` 与 `y` 长度必须一致. 样本数少于 `degree + 1` 时返回 [`FrcError::UnderdeterminedFit`].
pub(crate) fn polynomial_fit(
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
    degree: u32,
) -> FrcResult<Polynomial> {
    debug_assert_eq!(x.len(), y.len(), "x 值和 y 值必须一一对应");
    let m = x.len().min(y.len());
    let n = degree as usize + 1;
    if m < n {
        return Err(FrcError::UnderdeterminedFit {
            samples: m,
            required: n,
        });
    }

    // shape: (m, n)
    let mut v_mat = DMatrix::<f64>::from_fn(m, n, |i, j| x[i].powi(j as i32));
    let scale: Vec<f64> = v_mat
        .column_iter()
        .map(|col| match col.norm() {
            s if s > 0.0 && s.is_finite() => s,
            _ => 1.0,
        })
        .collect();
    for (mut col, &s) in v_mat.column_iter_mut().zip(scale.iter()) {
        col /= s;
    }
    let rhs = DVector::<f64>::from_iterator(m, y.iter().take(m).copied());

    let svd = v_mat.svd(true, true);
    let eps = svd.singular_values.max() * m as f64 * f64::EPSILON;
    let theta = svd.solve(&rhs, eps).map_err(FrcError::FitFailed)?;

    debug_assert_eq!(theta.len(), n);
    let coef: Vec<f64> = theta
        .iter()
        .zip(scale.iter())
        .map(|(&t, &s)| t / s)
        .collect();
    if coef.iter().any(|c| !c.is_finite()) {
        return Err(FrcError::FitFailed("non-finite coefficient"));
    }
    Ok(Polynomial::new(coef))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn test_eval() {
        // 1 - 2x + 3x^2
        let p = Polynomial::new(vec![1.0, -2.0, 3.0]);
        assert_eq!(p.degree(), 2);
        assert_eq!(p.eval(0.0), 1.0);
        assert_eq!(p.eval(2.0), 9.0);
        assert_eq!(Polynomial::new(vec![]).eval(3.0), 0.0);
    }

    #[test]
    fn test_exact_recovery() {
        let x = Array1::linspace(0.0, 0.9, 12);
        let y = x.mapv(|v| 0.5 - 1.5 * v + 2.0 * v * v * v);
        let p = polynomial_fit(x.view(), y.view(), 3).unwrap();
        let expected = [0.5, -1.5, 0.0, 2.0];
        for (c, e) in p.coefficients().iter().zip(expected) {
            assert!((c - e).abs() < 1e-8, "{c} vs {e}");
        }
    }

    #[test]
    fn test_least_squares_line() {
        // 点 (0, 0), (1, 1), (2, 1), (3, 2) 的最小二乘直线为 y = 0.1 + 0.6x.
        let x = Array1::from(vec![0.0, 1.0, 2.0, 3.0]);
        let y = Array1::from(vec![0.0, 1.0, 1.0, 2.0]);
        let p = polynomial_fit(x.view(), y.view(), 1).unwrap();
        assert!((p.coefficients()[0] - 0.1).abs() < 1e-12);
        assert!((p.coefficients()[1] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_high_degree_is_stable() {
        // 31 个样本, 20 次: Vandermonde 矩阵病态, 但拟合值仍应贴近数据.
        let x = Array1::linspace(0.0, 0.9375, 31);
        let y = x.mapv(|v: f64| (-(v * 2.0).powi(2)).exp() + 0.1 * (5.0 * v).sin());
        let p = polynomial_fit(x.view(), y.view(), 20).unwrap();
        for (&xi, &yi) in x.iter().zip(y.iter()) {
            assert!((p.eval(xi) - yi).abs() < 1e-3);
        }
    }

    #[test]
    fn test_underdetermined() {
        let x = Array1::from(vec![0.0, 0.5, 1.0]);
        assert_eq!(
            polynomial_fit(x.view(), x.view(), 3),
            Err(FrcError::UnderdeterminedFit {
                samples: 3,
                required: 4
            })
        );
    }
}
