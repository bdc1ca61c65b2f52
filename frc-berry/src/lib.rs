#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 通过傅里叶环相关 (Fourier Ring Correlation, FRC) 估计两幅独立重建图像的空间分辨率.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 输入图像需要是同一物体的两次独立重建 (例如奇数投影与偶数投影各自重建的结果),
//!   否则 FRC 曲线没有统计意义.
//! 2. 所有图像在进入流水线之前都会被中心裁剪为正方形.
//! 3. 核心库本身不做任何文件或终端输出 (除了 `log` 记录), 结果全部以结构化数据返回.
//!
//! # 开发计划
//!
//! ### 中心化二维傅里叶变换 ✅
//!
//! 实现位于 `frc-berry/src/spectrum.rs`.
//!
//! ### 频率平面环形分箱 ✅
//!
//! 频率网格只计算一次, 之后在 O(N^2) 时间内把每个频率点放进对应的环.
//! 环边界采用 "下闭上开" 规则.
//!
//! 实现位于 `frc-berry/src/rings.rs`.
//!
//! ### 环相关统计 ✅
//!
//! 每个环累加互功率与两个自功率, 零功率环记为 NaN.
//!
//! 实现位于 `frc-berry/src/correlate.rs`.
//!
//! ### 分辨率判据 ✅
//!
//! one-bit, half-bit, half-height 三种阈值曲线.
//!
//! 实现位于 `frc-berry/src/criterion.rs`.
//!
//! ### 最小二乘多项式拟合 ✅
//!
//! 实现位于 `frc-berry/src/fitting`.
//!
//! ### 交点求解 ✅
//!
//! 从低频到高频扫描种子点做局部求根 (one-bit, half-bit), 或对整个区间二分 (half-height).
//! 找不到交点时显式返回 [`FrcError::NoCrossingFound`], 而不是伪造一个分辨率.
//!
//! 实现位于 `frc-berry/src/solve.rs`.
//!
//! ### 流水线与批处理 ✅
//!
//! 实现位于 `frc-berry/src/pipeline.rs`.
//!
//! ### 图像读取与预处理 ✅
//!
//! 1. 支持 DMP, TIFF, PNG, JPEG, NPY 以及无头 raw 文件. ✅
//! 2. 中心正方形裁剪, 分辨率圆内接正方形裁剪, 可分离 Hann 窗. ✅
//!
//! 实现位于 `frc-berry/src/data/*`.

/// 二维索引 `(h, w)`, 同时也可一定程度上用作图像形状.
pub type Idx2d = (usize, usize);

mod data;

pub use data::{io, prep, FrcImage};

pub mod config;
pub mod consts;
pub mod correlate;
pub mod criterion;
pub mod error;
pub mod fitting;
pub mod pipeline;
pub mod prelude;
pub mod rings;
pub mod solve;
pub mod spectrum;

pub use config::FrcConfig;
pub use error::{FrcError, FrcResult};
