//! 交点求解.
//!
//! - one-bit / half-bit: 按空间频率从低到高依次取种子点做局部求根 ([`local_root`]),
//!   接受第一个严格位于采样区间内部、且残差足够小的根.
//! - half-height: 仅当区间两端符号相反时, 对 `fitted(x) - 0.5` 做二分.
//!
//! 找不到交点时返回 [`FrcError::NoCrossingFound`].

use log::debug;

use crate::consts::{BISECT_MAX_ITER, BISECT_XTOL, ROOT_MAX_BACKTRACK, ROOT_MAX_ITER, ROOT_XTOL};
use crate::criterion::{Criterion, CriterionCurve};
use crate::fitting::{FittedCurve, Polynomial};
use crate::{FrcError, FrcResult};

/// 拟合曲线与判据曲线的交点, 以及换算后的分辨率.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolutionPoint {
    /// 所属判据.
    pub criterion: Criterion,
    /// 交点的空间频率, 位于 `(0, 1)`.
    pub spatial_frequency: f64,
    /// 交点处的拟合 FRC 值.
    pub value: f64,
    /// `nyquist / spatial_frequency`, 单位为像素.
    pub resolution_pixels: f64,
    /// `resolution_pixels * pixel_size`. 未给出像素尺寸时为 `None`.
    pub resolution_physical: Option<f64>,
}

impl ResolutionPoint {
    /// 由交点构建.
    pub fn new(
        criterion: Criterion,
        spatial_frequency: f64,
        value: f64,
        nyquist: usize,
        pixel_size: Option<f64>,
    ) -> Self {
        let resolution_pixels = nyquist as f64 / spatial_frequency;
        Self {
            criterion,
            spatial_frequency,
            value,
            resolution_pixels,
            resolution_physical: pixel_size.map(|p| resolution_pixels * p),
        }
    }
}

/// 求解所需的其他参数.
#[derive(Copy, Clone, Debug)]
pub struct SolveParams {
    /// Nyquist 半径 (像素).
    pub nyquist: usize,
    /// 交点残差容限.
    pub residual_tolerance: f64,
    /// 物理像素尺寸.
    pub pixel_size: Option<f64>,
}

/// 求 `fitted` 与 `threshold` 的第一个交点.
pub fn solve_crossing(
    fitted: &FittedCurve,
    threshold: &CriterionCurve,
    params: SolveParams,
) -> FrcResult<ResolutionPoint> {
    let criterion = threshold.criterion();
    let Some((x0, xmax)) = threshold.domain() else {
        return Err(FrcError::NoCrossingFound {
            criterion,
            sampled_up_to: 0.0,
        });
    };
    let poly = fitted.polynomial();
    let unresolved = FrcError::NoCrossingFound {
        criterion,
        sampled_up_to: xmax,
    };

    let root = match criterion {
        Criterion::OneBit | Criterion::HalfBit => threshold
            .frequencies()
            .iter()
            .find_map(|&seed| {
                let root = local_root(poly, threshold, seed)?;
                let residual = (poly.eval(root) - threshold.interpolate(root)?).abs();
                (x0 < root && root < xmax && residual < params.residual_tolerance).then_some(root)
            }),
        Criterion::HalfHeight => {
            let g = |x: f64| poly.eval(x) - 0.5;
            bisect(g, x0, xmax)
        }
    };

    let root = root.ok_or(unresolved)?;
    debug!("{criterion} crossing at spatial frequency {root:.6}");
    Ok(ResolutionPoint::new(
        criterion,
        root,
        poly.eval(root),
        params.nyquist,
        params.pixel_size,
    ))
}

/// 从 `seed` 出发, 用阻尼 Newton 法求 `poly(x) - criterion(x)` 的根.
///
/// 判据曲线在采样点之间线性插值, 采样区间之外无定义.
/// 导数用中心差分 (区间端点处退化为单侧差分) 估计.
/// 步长超出区间时逐次减半; 导数为 0、无法回到区间内或迭代次数耗尽时返回 `None`.
pub fn local_root(poly: &Polynomial, criterion: &CriterionCurve, seed: f64) -> Option<f64> {
    let (lo, hi) = criterion.domain()?;
    let inside = |x: f64| lo <= x && x <= hi;
    let g = |x: f64| Some(poly.eval(x) - criterion.interpolate(x)?);

    let derivative = |x: f64, gx: f64| {
        let h = 1.49e-8 * x.abs().max(1.0);
        if inside(x - h) && inside(x + h) {
            Some((g(x + h)? - g(x - h)?) / (2.0 * h))
        } else if inside(x + h) {
            Some((g(x + h)? - gx) / h)
        } else if inside(x - h) {
            Some((gx - g(x - h)?) / h)
        } else {
            None
        }
    };

    if !inside(seed) {
        return None;
    }
    let mut x = seed;
    for _ in 0..ROOT_MAX_ITER {
        let gx = g(x)?;
        if gx == 0.0 {
            return Some(x);
        }
        let d = derivative(x, gx)?;
        if d == 0.0 || !d.is_finite() {
            return None;
        }
        let step = gx / d;
        if step.abs() <= ROOT_XTOL * x.abs().max(ROOT_XTOL) && inside(x - step) {
            return Some(x - step);
        }

        let mut t = 1.0;
        let mut next = x - step;
        let mut tries = 0;
        while !inside(next) {
            tries += 1;
            if tries > ROOT_MAX_BACKTRACK {
                return None;
            }
            t *= 0.5;
            next = x - t * step;
        }
        x = next;
    }
    None
}

/// 在 `[a, b]` 上二分求 `g` 的根. 两端函数值符号不相反时返回 `None`.
pub fn bisect<F: Fn(f64) -> f64>(g: F, a: f64, b: f64) -> Option<f64> {
    let (mut lo, mut hi) = (a, b);
    let (mut g_lo, g_hi) = (g(lo), g(hi));
    if !(g_lo * g_hi < 0.0) {
        return None;
    }
    for _ in 0..BISECT_MAX_ITER {
        let mid = lo + 0.5 * (hi - lo);
        let g_mid = g(mid);
        if g_mid == 0.0 || (hi - lo) * 0.5 < BISECT_XTOL {
            return Some(mid);
        }
        if (g_mid < 0.0) == (g_lo < 0.0) {
            lo = mid;
            g_lo = g_mid;
        } else {
            hi = mid;
        }
    }
    Some(lo + 0.5 * (hi - lo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate::CorrelationCurve;
    use crate::fitting::fit_curve;

    fn line_curve(values: Vec<f64>, counts: Vec<usize>) -> CorrelationCurve {
        let n = values.len();
        let freqs = (0..n).map(|k| k as f64 / n as f64).collect();
        CorrelationCurve::new(freqs, values, counts, 32).unwrap()
    }

    fn params() -> SolveParams {
        SolveParams {
            nyquist: 32,
            residual_tolerance: 0.1,
            pixel_size: None,
        }
    }

    #[test]
    fn test_bisect() {
        let r = bisect(|x| x * x - 2.0, 0.0, 2.0).unwrap();
        assert!((r - std::f64::consts::SQRT_2).abs() < 1e-10);
        assert_eq!(bisect(|x| x * x + 1.0, -1.0, 1.0), None);
        assert_eq!(bisect(|x| x, 0.0, 1.0), None);
    }

    #[test]
    fn test_local_root_line() {
        // 1 - x 与常数 0.5 相交于 0.5.
        let poly = Polynomial::new(vec![1.0, -1.0]);
        let curve = line_curve(vec![0.5; 8], vec![100; 8]);
        let thr = Criterion::HalfHeight.curve(&curve);
        for seed in [0.0, 0.25, 0.625, 0.875] {
            let r = local_root(&poly, &thr, seed).unwrap();
            assert!((r - 0.5).abs() < 1e-10);
        }
        // 区间之外的种子点.
        assert_eq!(local_root(&poly, &thr, 0.95), None);
        assert_eq!(local_root(&poly, &thr, -0.1), None);
    }

    #[test]
    fn test_local_root_no_root() {
        // 拟合值恒为 1, 永远高于阈值: 每次 Newton 步都走出区间.
        let poly = Polynomial::new(vec![1.0, 0.0]);
        let curve = line_curve(vec![1.0; 8], vec![4, 8, 16, 24, 32, 40, 48, 56]);
        let thr = Criterion::OneBit.curve(&curve);
        for &seed in thr.frequencies() {
            assert_eq!(local_root(&poly, &thr, seed), None);
        }
    }

    #[test]
    fn test_solve_linear_drop() {
        // FRC 从 1 线性下降到 0.125, half-height 交点在 0.5.
        let values: Vec<f64> = (0..8).map(|k| 1.0 - k as f64 / 8.0).collect();
        let curve = line_curve(values, vec![10_000; 8]);
        let fitted = fit_curve(&curve, 1).unwrap();

        let p = solve_crossing(&fitted, &Criterion::HalfHeight.curve(&curve), params()).unwrap();
        assert!((p.spatial_frequency - 0.5).abs() < 1e-9);
        assert!((p.value - 0.5).abs() < 1e-9);
        assert!((p.resolution_pixels - 64.0).abs() < 1e-6);
        assert_eq!(p.resolution_physical, None);

        // one-bit 在 n 很大时约为 1/3, 交点在 2/3 附近.
        let p = solve_crossing(&fitted, &Criterion::OneBit.curve(&curve), params()).unwrap();
        let t = Criterion::OneBit.threshold(10_000);
        assert!((p.spatial_frequency - (1.0 - t)).abs() < 1e-6);
        assert!(p.spatial_frequency > 0.0 && p.spatial_frequency < 0.875);
    }

    #[test]
    fn test_no_crossing_reported() {
        // 整条曲线都位于 half-bit 阈值之上.
        let curve = line_curve(vec![0.95; 8], vec![100; 8]);
        let fitted = fit_curve(&curve, 2).unwrap();
        for c in Criterion::ALL {
            let err = solve_crossing(&fitted, &c.curve(&curve), params()).unwrap_err();
            assert_eq!(
                err,
                FrcError::NoCrossingFound {
                    criterion: c,
                    sampled_up_to: 0.875
                }
            );
            assert!(err.is_unresolved());
        }
    }

    #[test]
    fn test_physical_resolution() {
        let p = ResolutionPoint::new(Criterion::HalfBit, 0.25, 0.4, 64, Some(0.5));
        assert_eq!(p.resolution_pixels, 256.0);
        assert_eq!(p.resolution_physical, Some(128.0));
    }
}
