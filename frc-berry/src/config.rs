//! FRC 分析配置.

use crate::consts::{
    DEFAULT_POLY_DEGREE, DEFAULT_RESIDUAL_TOLERANCE, DEFAULT_RING_WIDTH, MAX_POLY_DEGREE,
    MIN_RING_WIDTH,
};
use crate::criterion::Criterion;
use crate::{FrcError, FrcResult};

/// FRC 分析配置.
///
/// 该配置是只读的. 所有 `with_*` 方法都消费自身并返回新的实例, 数值参数会立即校验.
/// 经反序列化得到的配置需要再调用一次 [`FrcConfig::validate`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrcConfig {
    ring_width: f64,
    degree: u32,
    resol_square: bool,
    hanning: bool,
    criteria: Vec<Criterion>,
    residual_tolerance: f64,
    pixel_size: Option<f64>,
}

impl Default for FrcConfig {
    fn default() -> Self {
        Self {
            ring_width: DEFAULT_RING_WIDTH,
            degree: DEFAULT_POLY_DEGREE,
            resol_square: false,
            hanning: false,
            criteria: Criterion::ALL.to_vec(),
            residual_tolerance: DEFAULT_RESIDUAL_TOLERANCE,
            pixel_size: None,
        }
    }
}

impl FrcConfig {
    /// 以环宽 `ring_width` 和拟合次数 `degree` 构建配置, 其余参数取默认值.
    ///
    /// `ring_width` 必须是不小于 [`MIN_RING_WIDTH`] 的有限数, `degree` 必须在 `1..=MAX_POLY_DEGREE` 内, 否则返回 `Err`.
    pub fn new(ring_width: f64, degree: u32) -> FrcResult<Self> {
        let config = Self {
            ring_width,
            degree,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// 校验全部参数.
    pub fn validate(&self) -> FrcResult<()> {
        if !(self.ring_width.is_finite() && self.ring_width >= MIN_RING_WIDTH) {
            return Err(invalid(format!(
                "ring width must be finite and at least {MIN_RING_WIDTH}, got {}",
                self.ring_width
            )));
        }
        if !(1..=MAX_POLY_DEGREE).contains(&self.degree) {
            return Err(invalid(format!(
                "polynomial degree must be within 1..={MAX_POLY_DEGREE}, got {}",
                self.degree
            )));
        }
        if self.criteria.is_empty() {
            return Err(invalid("at least one criterion is required".to_string()));
        }
        if !(self.residual_tolerance.is_finite() && self.residual_tolerance > 0.0) {
            return Err(invalid(format!(
                "residual tolerance must be positive, got {}",
                self.residual_tolerance
            )));
        }
        if let Some(p) = self.pixel_size {
            if !(p.is_finite() && p > 0.0) {
                return Err(invalid(format!("pixel size must be positive, got {p}")));
            }
        }
        Ok(())
    }

    /// 是否只在分辨率圆的内接正方形中分析.
    #[inline]
    pub fn with_resol_square(mut self, on: bool) -> Self {
        self.resol_square = on;
        self
    }

    /// 是否在变换前乘以可分离 Hann 窗.
    #[inline]
    pub fn with_hanning(mut self, on: bool) -> Self {
        self.hanning = on;
        self
    }

    /// 指定要计算的判据. 重复项会被去除, 顺序保持不变.
    pub fn with_criteria<I: IntoIterator<Item = Criterion>>(mut self, it: I) -> FrcResult<Self> {
        let mut criteria: Vec<Criterion> = Vec::with_capacity(3);
        for c in it {
            if !criteria.contains(&c) {
                criteria.push(c);
            }
        }
        self.criteria = criteria;
        self.validate()?;
        Ok(self)
    }

    /// 指定交点残差容限.
    pub fn with_residual_tolerance(mut self, tol: f64) -> FrcResult<Self> {
        self.residual_tolerance = tol;
        self.validate()?;
        Ok(self)
    }

    /// 指定物理像素尺寸, 以便把像素分辨率换算为物理单位.
    pub fn with_pixel_size(mut self, pixel_size: f64) -> FrcResult<Self> {
        self.pixel_size = Some(pixel_size);
        self.validate()?;
        Ok(self)
    }

    /// 环宽.
    #[inline]
    pub fn ring_width(&self) -> f64 {
        self.ring_width
    }

    /// 拟合多项式次数.
    #[inline]
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// 是否裁剪到分辨率正方形.
    #[inline]
    pub fn resol_square(&self) -> bool {
        self.resol_square
    }

    /// 是否加 Hann 窗.
    #[inline]
    pub fn hanning(&self) -> bool {
        self.hanning
    }

    /// 需要计算的判据.
    #[inline]
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// 交点残差容限.
    #[inline]
    pub fn residual_tolerance(&self) -> f64 {
        self.residual_tolerance
    }

    /// 物理像素尺寸.
    #[inline]
    pub fn pixel_size(&self) -> Option<f64> {
        self.pixel_size
    }
}

#[inline]
fn invalid(msg: String) -> FrcError {
    FrcError::InvalidConfiguration(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_valid_init(ring_width: f64, degree: u32) -> bool {
        FrcConfig::new(ring_width, degree).is_ok()
    }

    #[test]
    fn test_config_invalid_input() {
        assert!(!is_valid_init(0.0, 20));
        assert!(!is_valid_init(-1.0, 20));
        assert!(!is_valid_init(f64::NAN, 20));
        assert!(!is_valid_init(f64::INFINITY, 20));
        assert!(!is_valid_init(1e-9, 20));
        assert!(!is_valid_init(MIN_RING_WIDTH / 2.0, 20));
        assert!(!is_valid_init(5.0, 0));
        assert!(!is_valid_init(5.0, MAX_POLY_DEGREE + 1));

        assert!(is_valid_init(0.5, 1));
        assert!(is_valid_init(MIN_RING_WIDTH, 20));
        assert!(is_valid_init(5.0, MAX_POLY_DEGREE));
    }

    #[test]
    fn test_config_defaults() {
        let c = FrcConfig::default();
        assert_eq!(c.ring_width(), 5.0);
        assert_eq!(c.degree(), 20);
        assert!(!c.resol_square());
        assert!(!c.hanning());
        assert_eq!(c.criteria(), &Criterion::ALL);
        assert_eq!(c.pixel_size(), None);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_config_setters() {
        let c = FrcConfig::new(2.0, 8)
            .unwrap()
            .with_hanning(true)
            .with_criteria([Criterion::HalfBit, Criterion::HalfBit, Criterion::OneBit])
            .unwrap()
            .with_pixel_size(0.65)
            .unwrap();
        assert!(c.hanning());
        assert_eq!(c.criteria(), &[Criterion::HalfBit, Criterion::OneBit]);
        assert_eq!(c.pixel_size(), Some(0.65));

        assert!(FrcConfig::default().with_criteria(std::iter::empty()).is_err());
        assert!(FrcConfig::default().with_pixel_size(0.0).is_err());
        assert!(FrcConfig::default().with_residual_tolerance(-1.0).is_err());
    }
}
