//! 分辨率判据.
//!
//! one-bit 与 half-bit 阈值只依赖环内样本数 `n`, half-height 为常数 0.5.

use std::fmt;
use std::str::FromStr;

use crate::consts::criterion::*;
use crate::correlate::CorrelationCurve;

/// 判定 FRC 曲线 "仍然可信" 的阈值模型.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Criterion {
    /// 每个环至少携带 1 bit 信息.
    OneBit,
    /// 每个环至少携带 1/2 bit 信息.
    HalfBit,
    /// 常数阈值 0.5.
    HalfHeight,
}

impl Criterion {
    /// 全部判据, 顺序固定.
    pub const ALL: [Criterion; 3] = [Self::OneBit, Self::HalfBit, Self::HalfHeight];

    /// 判据名称, 与命令行取值一致.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OneBit => "one-bit",
            Self::HalfBit => "half-bit",
            Self::HalfHeight => "half-height",
        }
    }

    /// 样本数为 `n` 的环的阈值.
    ///
    /// `n == 0` 时 one-bit 与 half-bit 的极限分别为 `2.4142 / 1.4142` 与 `1.9102 / 0.9102`.
    pub fn threshold(&self, n: usize) -> f64 {
        let t = |a: f64, b: f64, c: f64, d: f64| {
            if n == 0 {
                return b / d;
            }
            let s = (n as f64).sqrt();
            (a + b / s) / (c + d / s)
        };
        match self {
            Self::OneBit => t(ONE_BIT_A, ONE_BIT_B, ONE_BIT_C, ONE_BIT_D),
            Self::HalfBit => t(HALF_BIT_A, HALF_BIT_B, HALF_BIT_C, HALF_BIT_D),
            Self::HalfHeight => HALF_HEIGHT,
        }
    }

    /// 与 `curve` 逐环对齐的阈值曲线.
    pub fn curve(&self, curve: &CorrelationCurve) -> CriterionCurve {
        CriterionCurve {
            criterion: *self,
            frequencies: curve.frequencies().to_vec(),
            values: curve.counts().iter().map(|&n| self.threshold(n)).collect(),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 无法识别的判据名称.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown criterion `{0}`, expected one of one-bit, half-bit, half-height")]
pub struct ParseCriterionError(pub String);

impl FromStr for Criterion {
    type Err = ParseCriterionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one-bit" | "onebit" | "1bit" => Ok(Self::OneBit),
            "half-bit" | "halfbit" => Ok(Self::HalfBit),
            "half-height" | "halfheight" => Ok(Self::HalfHeight),
            _ => Err(ParseCriterionError(s.to_string())),
        }
    }
}

/// 一条阈值曲线, 与相关曲线共享横坐标.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriterionCurve {
    criterion: Criterion,
    frequencies: Vec<f64>,
    values: Vec<f64>,
}

impl CriterionCurve {
    /// 所属判据.
    #[inline]
    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    /// 空间频率.
    #[inline]
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// 阈值.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 采样区间 `[x_first, x_last]`. 曲线为空时返回 `None`.
    pub fn domain(&self) -> Option<(f64, f64)> {
        Some((*self.frequencies.first()?, *self.frequencies.last()?))
    }

    /// 在相邻样本之间线性插值. `x` 落在采样区间之外时返回 `None`.
    pub fn interpolate(&self, x: f64) -> Option<f64> {
        let (lo, hi) = self.domain()?;
        if !(lo..=hi).contains(&x) {
            return None;
        }
        // 第一个 > x 的位置.
        let k = self.frequencies.partition_point(|&f| f <= x);
        if k == self.frequencies.len() {
            return self.values.last().copied();
        }
        // lo <= x, 因此 k >= 1.
        let (x0, x1) = (self.frequencies[k - 1], self.frequencies[k]);
        let (y0, y1) = (self.values[k - 1], self.values[k]);
        Some(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_monotone_in_n() {
        for c in [Criterion::OneBit, Criterion::HalfBit] {
            let mut last = f64::INFINITY;
            for n in [1usize, 4, 9, 50, 200, 1_000, 100_000] {
                let t = c.threshold(n);
                assert!(t < last, "{c} is not decreasing at n = {n}");
                assert!(t > 0.0 && t <= 1.0 + 1e-3);
                last = t;
            }
        }
        // n -> ∞
        assert!((Criterion::OneBit.threshold(usize::MAX) - 0.5 / 1.5).abs() < 1e-6);
        assert!((Criterion::HalfBit.threshold(usize::MAX) - 0.2071 / 1.2071).abs() < 1e-6);
        assert_eq!(Criterion::HalfHeight.threshold(7), 0.5);
    }

    #[test]
    fn test_threshold_known_values() {
        // n = 1: (0.5 + 2.4142) / (1.5 + 1.4142)
        let t = Criterion::OneBit.threshold(1);
        assert!((t - 2.9142 / 2.9142).abs() < 1e-12);
        let t = Criterion::HalfBit.threshold(4);
        assert!((t - (0.2071 + 0.9551) / (1.2071 + 0.4551)).abs() < 1e-12);
    }

    #[test]
    fn test_parse_and_display() {
        for c in Criterion::ALL {
            assert_eq!(c.to_string().parse::<Criterion>().unwrap(), c);
        }
        assert_eq!("HalfBit".parse::<Criterion>().unwrap(), Criterion::HalfBit);
        assert!("quarter-bit".parse::<Criterion>().is_err());
    }

    #[test]
    fn test_interpolate() {
        let curve = CriterionCurve {
            criterion: Criterion::HalfBit,
            frequencies: vec![0.0, 0.1, 0.2],
            values: vec![1.0, 0.5, 0.3],
        };
        assert_eq!(curve.interpolate(0.0), Some(1.0));
        assert!((curve.interpolate(0.05).unwrap() - 0.75).abs() < 1e-12);
        assert!((curve.interpolate(0.15).unwrap() - 0.4).abs() < 1e-12);
        assert!((curve.interpolate(0.2).unwrap() - 0.3).abs() < 1e-12);
        assert_eq!(curve.interpolate(-1e-9), None);
        assert_eq!(curve.interpolate(0.2 + 1e-9), None);
        assert_eq!(curve.interpolate(f64::NAN), None);
    }
}
