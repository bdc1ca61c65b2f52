//! 进入流水线之前的图像预处理.
//!
//! 顺序固定为: 中心正方形裁剪 -> (可选) 分辨率正方形裁剪 -> (可选) Hann 窗.

use ndarray::{s, Array1, Axis};

use crate::{FrcConfig, FrcImage};

impl FrcImage {
    /// 中心裁剪为边长 `min(h, w)` 的正方形. 正方形图像原样 (深拷贝) 返回.
    pub fn center_square(&self) -> FrcImage {
        let (h, w) = self.shape();
        let side = h.min(w);
        let (h0, w0) = ((h - side) / 2, (w - side) / 2);
        FrcImage::new(
            self.view()
                .slice(s![h0..h0 + side, w0..w0 + side])
                .to_owned(),
        )
    }

    /// 裁剪到分辨率圆 (直径为较短边) 的内接正方形.
    ///
    /// 半边长 `l = r * √2 / 2`, 取 `[ceil(c - l), floor(c + l))` 作为每个方向的保留区间.
    pub fn resolution_square(&self) -> FrcImage {
        let (h, w) = self.shape();
        let radius = 0.5 * h.min(w) as f64;
        let l = radius * std::f64::consts::SQRT_2 * 0.5;

        #[inline]
        fn edges(len: usize, l: f64) -> (usize, usize) {
            let c = len as f64 * 0.5;
            let lo = (c - l).ceil().max(0.0) as usize;
            let hi = ((c + l).floor() as usize).min(len);
            (lo, hi.max(lo))
        }

        let (h0, h1) = edges(h, l);
        let (w0, w1) = edges(w, l);
        FrcImage::new(self.view().slice(s![h0..h1, w0..w1]).to_owned())
    }

    /// 乘以可分离 Hann 窗 `hann(h) ⊗ hann(w)`.
    pub fn hann_windowed(&self) -> FrcImage {
        let (h, w) = self.shape();
        let wh = hann_window(h);
        let ww = hann_window(w);
        let mut data = self.view().to_owned();
        for (mut row, &fh) in data.axis_iter_mut(Axis(0)).zip(wh.iter()) {
            row.zip_mut_with(&ww, |v, &fw| *v *= fh * fw);
        }
        FrcImage::new(data)
    }
}

/// 长度为 `m` 的 Hann 窗: `0.5 - 0.5 cos(2πk / (m - 1))`.
///
/// `m == 1` 时返回 `[1.0]`, `m == 0` 时返回空数组.
pub fn hann_window(m: usize) -> Array1<f64> {
    match m {
        0 => Array1::zeros(0),
        1 => Array1::ones(1),
        _ => {
            let denom = (m - 1) as f64;
            Array1::from_shape_fn(m, |k| {
                0.5 - 0.5 * (2.0 * std::f64::consts::PI * k as f64 / denom).cos()
            })
        }
    }
}

/// 按照 `config` 对图像做完整的预处理, 得到可直接变换的正方形图像.
pub fn prepare(image: &FrcImage, config: &FrcConfig) -> FrcImage {
    let mut ans = image.center_square();
    if config.resol_square() {
        ans = ans.resolution_square();
    }
    if config.hanning() {
        ans = ans.hann_windowed();
    }
    ans
}
