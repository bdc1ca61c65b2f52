//! 环相关统计与 FRC 曲线.

use log::{debug, warn};
use num::complex::Complex64;
use num::Zero;

use crate::rings::{Ring, RingSet};
use crate::spectrum::Spectrum;
use crate::{FrcError, FrcResult};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 单个环上的三个累加量.
///
/// `cross = Σ S1·conj(S2)`, `power1 = Σ|S1|²`, `power2 = Σ|S2|²`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RingStatistic {
    /// 互功率.
    pub cross: Complex64,
    /// 第一幅频谱的自功率.
    pub power1: f64,
    /// 第二幅频谱的自功率.
    pub power2: f64,
    /// 环内样本数.
    pub count: usize,
}

impl Default for RingStatistic {
    fn default() -> Self {
        Self {
            cross: Complex64::zero(),
            power1: 0.0,
            power2: 0.0,
            count: 0,
        }
    }
}

impl RingStatistic {
    /// 累加一对频谱样本.
    #[inline]
    pub fn accumulate(&mut self, s1: Complex64, s2: Complex64) {
        self.cross += s1 * s2.conj();
        self.power1 += s1.norm_sqr();
        self.power2 += s2.norm_sqr();
        self.count += 1;
    }

    /// 在 `ring` 的全部频率点上累加.
    pub fn over_ring(s1: &Spectrum, s2: &Spectrum, ring: &Ring) -> Self {
        ring.bins()
            .iter()
            .fold(Self::default(), |mut acc, &pos| {
                acc.accumulate(s1[pos], s2[pos]);
                acc
            })
    }

    /// 任一自功率为 0 的环.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.power1 == 0.0 || self.power2 == 0.0
    }

    /// `|C1| / sqrt(C2 · C3)`. 退化环返回 NaN.
    ///
    /// 舍入误差可能使结果略大于 1.
    pub fn frc(&self) -> f64 {
        if self.is_degenerate() {
            return f64::NAN;
        }
        self.cross.norm() / (self.power1.sqrt() * self.power2.sqrt())
    }
}

/// 计算 `rings` 中每个环的统计量, 顺序与 `rings` 一致.
///
/// 两个频谱形状不同, 或与环集合的边长不符时返回 [`FrcError::ShapeMismatch`].
pub fn ring_statistics(
    s1: &Spectrum,
    s2: &Spectrum,
    rings: &RingSet,
) -> FrcResult<Vec<RingStatistic>> {
    if s1.shape() != s2.shape() {
        return Err(FrcError::ShapeMismatch {
            left: s1.shape(),
            right: s2.shape(),
        });
    }
    let side = rings.side();
    if s1.shape() != (side, side) {
        return Err(FrcError::ShapeMismatch {
            left: s1.shape(),
            right: (side, side),
        });
    }

    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            let ans = rings
                .rings()
                .par_iter()
                .map(|ring| RingStatistic::over_ring(s1, s2, ring))
                .collect();
        } else {
            let ans = rings
                .iter()
                .map(|ring| RingStatistic::over_ring(s1, s2, ring))
                .collect();
        }
    }
    Ok(ans)
}

/// 原始 FRC 曲线: 每个环一个 `(空间频率, FRC)` 样本, 以及环内样本数.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrelationCurve {
    frequencies: Vec<f64>,
    values: Vec<f64>,
    counts: Vec<usize>,
    nyquist: usize,
}

impl CorrelationCurve {
    /// 直接由样本构建. 三个数组长度必须一致, 否则返回 `None`.
    ///
    /// 主要用于合成曲线.
    pub fn new(
        frequencies: Vec<f64>,
        values: Vec<f64>,
        counts: Vec<usize>,
        nyquist: usize,
    ) -> Option<Self> {
        if frequencies.len() != values.len() || frequencies.len() != counts.len() {
            return None;
        }
        Some(Self {
            frequencies,
            values,
            counts,
            nyquist,
        })
    }

    /// 由环统计量构建.
    ///
    /// 没有任何环时返回 [`FrcError::EmptyCurve`]. 退化环记为 NaN 并打出一条 `warn`.
    pub fn from_statistics(rings: &RingSet, stats: &[RingStatistic]) -> FrcResult<Self> {
        if rings.is_empty() {
            return Err(FrcError::EmptyCurve {
                side: rings.side(),
                ring_width: rings.width(),
            });
        }
        debug_assert_eq!(rings.len(), stats.len());

        let ans = Self {
            frequencies: rings.spatial_frequencies(),
            values: stats.iter().map(RingStatistic::frc).collect(),
            counts: stats.iter().map(|s| s.count).collect(),
            nyquist: rings.nyquist(),
        };
        debug!(
            "FRC curve: {} rings, width {}, nyquist {}",
            ans.len(),
            rings.width(),
            ans.nyquist
        );
        let bad = ans.degenerate_rings();
        if bad > 0 {
            warn!("{bad} of {} rings have zero power, excluded from fit", ans.len());
        }
        Ok(ans)
    }

    /// 对两幅频谱做完整的环相关.
    pub fn compute(s1: &Spectrum, s2: &Spectrum, rings: &RingSet) -> FrcResult<Self> {
        let stats = ring_statistics(s1, s2, rings)?;
        Self::from_statistics(rings, &stats)
    }

    /// 空间频率, 严格递增, 位于 `[0, 1)`.
    #[inline]
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// FRC 值. 退化环为 NaN.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 每个环的样本数.
    #[inline]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Nyquist 半径 (像素).
    #[inline]
    pub fn nyquist(&self) -> usize {
        self.nyquist
    }

    /// 样本个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// 是否没有样本.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// 最高采样空间频率.
    #[inline]
    pub fn max_frequency(&self) -> Option<f64> {
        self.frequencies.last().copied()
    }

    /// FRC 为 NaN 的环的个数.
    pub fn degenerate_rings(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// 全部非 NaN 的 `(空间频率, FRC)` 样本.
    pub fn valid_samples(&self) -> (Vec<f64>, Vec<f64>) {
        self.frequencies
            .iter()
            .zip(self.values.iter())
            .filter(|(_, v)| !v.is_nan())
            .map(|(&f, &v)| (f, v))
            .unzip()
    }
}
