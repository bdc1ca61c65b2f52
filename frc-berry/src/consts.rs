//! 通用常量.

/// 分辨率判据曲线的系数.
///
/// one-bit 与 half-bit 判据均形如 `(a + b / √n) / (c + d / √n)`, 其中 `n` 为环内样本数.
pub mod criterion {
    /// one-bit 判据分子常数项.
    pub const ONE_BIT_A: f64 = 0.5;

    /// one-bit 判据分子 `1/√n` 项系数.
    pub const ONE_BIT_B: f64 = 2.4142;

    /// one-bit 判据分母常数项.
    pub const ONE_BIT_C: f64 = 1.5;

    /// one-bit 判据分母 `1/√n` 项系数.
    pub const ONE_BIT_D: f64 = 1.4142;

    /// half-bit 判据分子常数项.
    pub const HALF_BIT_A: f64 = 0.2071;

    /// half-bit 判据分子 `1/√n` 项系数.
    pub const HALF_BIT_B: f64 = 1.9102;

    /// half-bit 判据分母常数项.
    pub const HALF_BIT_C: f64 = 1.2071;

    /// half-bit 判据分母 `1/√n` 项系数.
    pub const HALF_BIT_D: f64 = 0.9102;

    /// half-height 判据的常数阈值.
    pub const HALF_HEIGHT: f64 = 0.5;
}

/// 默认环宽 (频率格点单位).
pub const DEFAULT_RING_WIDTH: f64 = 5.0;

/// 允许的最小环宽. 频率格点间距为 1, 更窄的环只会产生大量空环.
pub const MIN_RING_WIDTH: f64 = 1e-3;

/// 默认拟合多项式次数.
pub const DEFAULT_POLY_DEGREE: u32 = 20;

/// 允许的最大拟合多项式次数.
pub const MAX_POLY_DEGREE: u32 = 40;

/// 默认的交点残差容限: 拟合曲线与判据曲线在根处之差的绝对值必须小于该值.
pub const DEFAULT_RESIDUAL_TOLERANCE: f64 = 1e-1;

/// 局部求根的最大迭代次数.
pub const ROOT_MAX_ITER: usize = 200;

/// 局部求根的相对步长收敛容限.
pub const ROOT_XTOL: f64 = 1.49012e-8;

/// 局部求根中单步最多回退 (步长减半) 的次数.
pub const ROOT_MAX_BACKTRACK: usize = 60;

/// 二分法的绝对容限.
pub const BISECT_XTOL: f64 = 2e-12;

/// 二分法的最大迭代次数.
pub const BISECT_MAX_ITER: usize = 100;
