//! 输入图像及其预处理、读写.

use std::ops::Index;

use ndarray::{Array2, ArrayView2};

use crate::Idx2d;

pub mod io;
pub mod prep;

/// 二维实数图像, 行优先, 以 `(h, w)` 索引.
///
/// 交给流水线后不可再修改. 所有预处理操作都返回新的实例.
#[derive(Debug, Clone, PartialEq)]
pub struct FrcImage {
    data: Array2<f64>,
}

impl FrcImage {
    /// 直接从二维数组初始化.
    #[inline]
    pub fn new(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// 由形状 `(h, w)` 和逐像素函数构建图像.
    #[inline]
    pub fn from_shape_fn<F: FnMut(Idx2d) -> f64>(shape: Idx2d, f: F) -> Self {
        Self::new(Array2::from_shape_fn(shape, f))
    }

    /// 由行优先的数据构建图像. 如果 `buf.len() != h * w`, 则返回 `None`.
    pub fn from_row_major(shape: Idx2d, buf: Vec<f64>) -> Option<Self> {
        Array2::from_shape_vec(shape, buf).ok().map(Self::new)
    }

    /// 获得底层数据的一份不可变 shallow copy.
    #[inline]
    pub fn view(&self) -> ArrayView2<f64> {
        self.data.view()
    }

    /// 消费自我, 获得底层数据.
    #[inline]
    pub fn into_inner(self) -> Array2<f64> {
        self.data
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 图像的像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 是否为正方形图像.
    #[inline]
    pub fn is_square(&self) -> bool {
        let (h, w) = self.shape();
        h == w
    }

    /// 较短边的长度.
    #[inline]
    pub fn min_side(&self) -> usize {
        let (h, w) = self.shape();
        h.min(w)
    }

    /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&f64> {
        self.data.get(pos)
    }
}

impl Index<Idx2d> for FrcImage {
    type Output = f64;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl From<Array2<f64>> for FrcImage {
    #[inline]
    fn from(data: Array2<f64>) -> Self {
        Self::new(data)
    }
}
