//! 图像的读取与持久化存储.
//!
//! 按扩展名分派:
//!
//! | 扩展名 | 格式 |
//! |---|---|
//! | `dmp` | 三个小端 `u16` 头 (宽, 高, 0), 之后是行优先的小端 `f32` 数据 |
//! | `tif`, `tiff`, `png`, `jpg`, `jpeg` | 经 `image` 解码后取灰度 |
//! | `npy` | 二维 `f64` 或 `f32` 数组 |
//! | `raw` | 无头行优先小端 `f32`, 形状由调用者给出 |

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use image::DynamicImage;
use ndarray::Array2;
use ndarray_npy::ReadNpyError;

use crate::{FrcImage, Idx2d};

/// 读取图像错误.
#[derive(thiserror::Error, Debug)]
pub enum ReadImageError {
    /// 扩展名无法识别.
    #[error("unsupported image format `{0}`")]
    UnsupportedFormat(String),

    /// raw 文件需要显式给出形状.
    #[error("raw file needs an explicit (height, width)")]
    MissingRawShape,

    /// 数据长度与头部 (或给定形状) 不符.
    ///
    /// 第一个参数代表期望的样本数, 第二个参数代表实际读到的样本数.
    #[error("expected {0} samples, found {1}")]
    SizeMismatch(usize, usize),

    /// npy 文件读取错误.
    #[error(transparent)]
    Npy(#[from] ReadNpyError),

    /// 图像解码错误.
    #[error(transparent)]
    Decode(#[from] image::ImageError),

    /// 其他底层 I/O 错误.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// 能被读取的图像格式.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ImageFormat {
    /// 带三值头的 `f32` 转储.
    Dmp,
    /// 由 `image` 解码的常见位图格式.
    Bitmap,
    /// numpy 数组.
    Npy,
    /// 无头 `f32` 数据.
    Raw,
}

impl ImageFormat {
    /// 根据扩展名 (不区分大小写) 判断格式.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ReadImageError> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "dmp" => Ok(Self::Dmp),
            "tif" | "tiff" | "png" | "jpg" | "jpeg" => Ok(Self::Bitmap),
            "npy" => Ok(Self::Npy),
            "raw" => Ok(Self::Raw),
            _ => Err(ReadImageError::UnsupportedFormat(ext)),
        }
    }
}

/// 按扩展名读取二维图像. `raw` 文件请使用 [`read_raw`].
pub fn read_image<P: AsRef<Path>>(path: P) -> Result<FrcImage, ReadImageError> {
    let path = path.as_ref();
    match ImageFormat::from_path(path)? {
        ImageFormat::Dmp => read_dmp(path),
        ImageFormat::Bitmap => read_bitmap(path),
        ImageFormat::Npy => read_npy(path),
        ImageFormat::Raw => Err(ReadImageError::MissingRawShape),
    }
}

/// 读取 DMP 文件.
pub fn read_dmp<P: AsRef<Path>>(path: P) -> Result<FrcImage, ReadImageError> {
    let mut rd = BufReader::new(File::open(path)?);
    let width = rd.read_u16::<LittleEndian>()? as usize;
    let height = rd.read_u16::<LittleEndian>()? as usize;
    let _ = rd.read_u16::<LittleEndian>()?;
    read_f32_body(&mut rd, (height, width))
}

/// 把图像以 DMP 格式保存到 `path`. 像素会被转换为 `f32`.
///
/// 宽或高超过 `u16::MAX` 时返回 `Err`.
pub fn write_dmp<P: AsRef<Path>>(image: &FrcImage, path: P) -> std::io::Result<()> {
    let (h, w) = image.shape();
    let (Ok(w16), Ok(h16)) = (u16::try_from(w), u16::try_from(h)) else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "DMP header only holds 16-bit dimensions",
        ));
    };
    let mut wr = BufWriter::new(File::create(path)?);
    wr.write_u16::<LittleEndian>(w16)?;
    wr.write_u16::<LittleEndian>(h16)?;
    wr.write_u16::<LittleEndian>(0)?;
    for &v in image.view().iter() {
        wr.write_f32::<LittleEndian>(v as f32)?;
    }
    wr.flush()
}

/// 读取无头行优先小端 `f32` 文件, 形状为 `(h, w)`.
pub fn read_raw<P: AsRef<Path>>(path: P, shape: Idx2d) -> Result<FrcImage, ReadImageError> {
    let mut rd = BufReader::new(File::open(path)?);
    read_f32_body(&mut rd, shape)
}

/// 读取剩余全部 `f32` 数据, 要求恰好为 `h * w` 个.
fn read_f32_body<R: Read>(rd: &mut R, (h, w): Idx2d) -> Result<FrcImage, ReadImageError> {
    let mut bytes = Vec::with_capacity(h * w * 4);
    rd.read_to_end(&mut bytes)?;
    if bytes.len() % 4 != 0 || bytes.len() / 4 != h * w {
        return Err(ReadImageError::SizeMismatch(h * w, bytes.len() / 4));
    }
    let mut buf = vec![0f32; h * w];
    LittleEndian::read_f32_into(&bytes, &mut buf);
    let data = buf.into_iter().map(f64::from).collect();
    // 长度已检查.
    FrcImage::from_row_major((h, w), data).ok_or(ReadImageError::SizeMismatch(h * w, 0))
}

/// 读取常见位图, 并转换为单通道灰度.
///
/// 8 位与 16 位灰度按原值读取, 其他像素格式先转换为 16 位灰度.
fn read_bitmap(path: &Path) -> Result<FrcImage, ReadImageError> {
    let img = image::open(path)?;
    let (w, h) = (img.width() as usize, img.height() as usize);
    let data = match img {
        DynamicImage::ImageLuma8(buf) => buf.into_raw().into_iter().map(f64::from).collect(),
        DynamicImage::ImageLuma16(buf) => buf.into_raw().into_iter().map(f64::from).collect(),
        other => other
            .to_luma16()
            .into_raw()
            .into_iter()
            .map(f64::from)
            .collect(),
    };
    FrcImage::from_row_major((h, w), data).ok_or(ReadImageError::SizeMismatch(h * w, 0))
}

/// 读取二维 npy 数组. 先尝试 `f64`, 失败后再尝试 `f32`.
fn read_npy(path: &Path) -> Result<FrcImage, ReadImageError> {
    match ndarray_npy::read_npy::<_, Array2<f64>>(path) {
        Ok(arr) => Ok(FrcImage::new(arr)),
        Err(ReadNpyError::WrongDescriptor(_)) => {
            let arr: Array2<f32> = ndarray_npy::read_npy(path)?;
            Ok(FrcImage::new(arr.mapv(f64::from)))
        }
        Err(e) => Err(e.into()),
    }
}
