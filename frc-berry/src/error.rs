//! 运行时错误.

use crate::criterion::Criterion;
use crate::Idx2d;

/// FRC 分析的运行时错误.
///
/// 零功率环 (degenerate ring) 不属于错误: 它只会在曲线中记为 NaN 并被排除在拟合之外,
/// 见 [`crate::correlate::CorrelationCurve::degenerate_rings`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FrcError {
    /// 两幅图像 (或两个频谱) 形状不一致.
    #[error("shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch {
        /// 第一幅图像的 `(h, w)`.
        left: Idx2d,
        /// 第二幅图像的 `(h, w)`.
        right: Idx2d,
    },

    /// 给定图像边长和环宽时一个环都分不出来.
    #[error("no ring fits below the Nyquist radius (side {side}, ring width {ring_width})")]
    EmptyCurve {
        /// 预处理后的图像边长.
        side: usize,
        /// 环宽.
        ring_width: f64,
    },

    /// 有效样本不足以拟合给定次数的多项式.
    ///
    /// 第一个参数代表目前已有的有效样本数, 第二个参数代表拟合需要的最少样本数.
    #[error("under-determined fit: {samples} valid samples, {required} required")]
    UnderdeterminedFit {
        /// 有效 (非 NaN) 样本数.
        samples: usize,
        /// 最少样本数, 即 `degree + 1`.
        required: usize,
    },

    /// 最小二乘求解失败.
    #[error("least-squares fit failed: {0}")]
    FitFailed(&'static str),

    /// 在整个采样区间内都找不到可接受的交点.
    ///
    /// `sampled_up_to` 是最高采样空间频率; 两条曲线在该频率之前都没有相交.
    #[error("no {criterion} crossing found up to spatial frequency {sampled_up_to:.4}")]
    NoCrossingFound {
        /// 产生该结果的判据.
        criterion: Criterion,
        /// 最高采样空间频率.
        sampled_up_to: f64,
    },

    /// 配置非法. 在处理任何图像之前报告.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl FrcError {
    /// 是否为 "未解析" 结果 (即 [`FrcError::NoCrossingFound`]).
    #[inline]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::NoCrossingFound { .. })
    }
}

/// FRC 计算运行时结果.
pub type FrcResult<T> = Result<T, FrcError>;
