//! 中心化二维傅里叶变换.

use std::ops::Index;

use ndarray::{Array2, ArrayView2, Axis};
use num::complex::Complex64;
use num::Zero;
use rustfft::FftPlanner;

use crate::{FrcImage, Idx2d};

/// 中心化的二维复频谱. 零频位于 `(h / 2, w / 2)`.
#[derive(Debug, Clone)]
pub struct Spectrum {
    data: Array2<Complex64>,
}

impl Spectrum {
    /// 对 `image` 做二维 DFT, 再做象限交换 (fftshift).
    pub fn forward(image: &FrcImage) -> Self {
        let data = fft2(image.view());
        Self {
            data: fftshift(&data),
        }
    }

    /// 频谱形状 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 获得底层数据的一份不可变 shallow copy.
    #[inline]
    pub fn view(&self) -> ArrayView2<Complex64> {
        self.data.view()
    }
}

impl Index<Idx2d> for Spectrum {
    type Output = Complex64;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 二维 DFT: 先逐行、再逐列做一维变换. 不做归一化.
fn fft2(image: ArrayView2<f64>) -> Array2<Complex64> {
    let (h, w) = image.dim();
    let mut data = image.mapv(|v| Complex64::new(v, 0.0));
    if h == 0 || w == 0 {
        return data;
    }

    let mut planner = FftPlanner::<f64>::new();

    let row_fft = planner.plan_fft_forward(w);
    let mut buf = vec![Complex64::zero(); w];
    for mut row in data.axis_iter_mut(Axis(0)) {
        buf.iter_mut().zip(row.iter()).for_each(|(b, v)| *b = *v);
        row_fft.process(&mut buf);
        row.iter_mut().zip(buf.iter()).for_each(|(v, b)| *v = *b);
    }

    let col_fft = planner.plan_fft_forward(h);
    let mut buf = vec![Complex64::zero(); h];
    for mut col in data.axis_iter_mut(Axis(1)) {
        buf.iter_mut().zip(col.iter()).for_each(|(b, v)| *b = *v);
        col_fft.process(&mut buf);
        col.iter_mut().zip(buf.iter()).for_each(|(v, b)| *v = *b);
    }

    data
}

/// 象限交换: 输出的 `((i + h/2) % h, (j + w/2) % w)` 取输入的 `(i, j)`.
fn fftshift<T: Copy + Zero>(data: &Array2<T>) -> Array2<T> {
    let (h, w) = data.dim();
    let mut ans = Array2::<T>::zeros((h, w));
    for ((i, j), &v) in data.indexed_iter() {
        ans[((i + h / 2) % h, (j + w / 2) % w)] = v;
    }
    ans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complex_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-9
    }

    #[test]
    fn test_fftshift_odd_even() {
        let a = Array2::from_shape_fn((1, 4), |(_, j)| j as f64);
        assert_eq!(fftshift(&a).row(0).to_vec(), vec![2.0, 3.0, 0.0, 1.0]);

        let a = Array2::from_shape_fn((1, 5), |(_, j)| j as f64);
        assert_eq!(fftshift(&a).row(0).to_vec(), vec![3.0, 4.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_dc_at_center() {
        for side in [6usize, 7] {
            let img = FrcImage::from_shape_fn((side, side), |_| 2.0);
            let s = Spectrum::forward(&img);
            let c = side / 2;
            let dc = 2.0 * (side * side) as f64;
            assert!(complex_eq(s[(c, c)], Complex64::new(dc, 0.0)));
            let total: f64 = s.view().iter().map(|v| v.norm()).sum();
            assert!((total - dc).abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_cosine() {
        // cos(2π * 2w / 8): 能量集中在 w 方向的 ±2 频率处.
        let img = FrcImage::from_shape_fn((8, 8), |(_, w)| {
            (2.0 * std::f64::consts::PI * 2.0 * w as f64 / 8.0).cos()
        });
        let s = Spectrum::forward(&img);
        assert!(complex_eq(s[(4, 6)], Complex64::new(32.0, 0.0)));
        assert!(complex_eq(s[(4, 2)], Complex64::new(32.0, 0.0)));
        assert!(complex_eq(s[(4, 4)], Complex64::zero()));
    }
}
