//! 曲线拟合.
//!
//! 对原始 FRC 曲线的有效样本做固定次数的最小二乘多项式平滑.

use log::debug;
use ndarray::ArrayView1;

use crate::correlate::CorrelationCurve;
use crate::FrcResult;

mod polynomial;

pub use polynomial::Polynomial;

/// 基于最小二乘法拟合 n 次多项式.
///
/// `x` 是自变量数组, `y` 是对应函数值, `degree` 是多项式次数 (最小为 1).
pub fn polynomial_f64(
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
    degree: u32,
) -> FrcResult<Polynomial> {
    polynomial::polynomial_fit(x, y, degree)
}

/// 拟合后的 FRC 曲线, 在每个采样频率处求值.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FittedCurve {
    polynomial: Polynomial,
    frequencies: Vec<f64>,
    values: Vec<f64>,
}

impl FittedCurve {
    /// 拟合多项式.
    #[inline]
    pub fn polynomial(&self) -> &Polynomial {
        &self.polynomial
    }

    /// 采样频率, 与原始曲线一致 (包括退化环所在的频率).
    #[inline]
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// 每个采样频率处的拟合值.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 在任意频率处求值.
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        self.polynomial.eval(x)
    }
}

/// 用 `degree` 次多项式平滑 `curve`. NaN 样本不参与拟合.
pub fn fit_curve(curve: &CorrelationCurve, degree: u32) -> FrcResult<FittedCurve> {
    let (x, y) = curve.valid_samples();
    let polynomial = polynomial_f64(
        ArrayView1::from(x.as_slice()),
        ArrayView1::from(y.as_slice()),
        degree,
    )?;
    debug!(
        "fitted degree {} polynomial over {} of {} samples",
        degree,
        x.len(),
        curve.len()
    );
    let values = curve
        .frequencies()
        .iter()
        .map(|&f| polynomial.eval(f))
        .collect();
    Ok(FittedCurve {
        polynomial,
        frequencies: curve.frequencies().to_vec(),
        values,
    })
}
