//! 对 `frc-berry::io` 的更一层封装. 按图像对列表加载图像.

use std::path::Path;

use frc_berry::io::{read_image, ReadImageError};
use frc_berry::pipeline::ImagePair;
use frc_berry::FrcImage;

use crate::pairs::PairSpec;

/// 读取图像时附带文件名的错误.
#[derive(thiserror::Error, Debug)]
#[error("cannot read `{path}`: {source}")]
pub struct LoadError {
    /// 出错的文件.
    pub path: String,
    /// 底层错误.
    #[source]
    pub source: ReadImageError,
}

/// 读取单幅图像.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<FrcImage, LoadError> {
    let path = path.as_ref();
    read_image(path).map_err(|source| LoadError {
        path: path.display().to_string(),
        source,
    })
}

/// 读取一对图像. `label` 为空时使用两个文件名的公共前缀, 公共前缀也为空时使用 `pair{index}`.
pub fn load_pair(
    spec: &PairSpec,
    label: Option<&str>,
    index: usize,
) -> Result<ImagePair, LoadError> {
    let label = match label {
        Some(l) if !l.is_empty() => l.to_string(),
        _ => match spec.prefix() {
            p if p.is_empty() => format!("pair{index}"),
            p => p,
        },
    };
    Ok(ImagePair::new(
        label,
        load_image(&spec.first)?,
        load_image(&spec.second)?,
    ))
}
