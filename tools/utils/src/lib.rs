//! FRC 批处理工具依赖的通用组件.

use std::env;
use std::path::PathBuf;

pub mod loader;
pub mod pairs;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 获取输出目录.
///
/// 1. 若给出了 `explicit`, 则返回它;
/// 2. 若环境变量 `$FRC_OUTPUT_DIR` 非空, 则返回其值;
/// 3. 否则, 返回 `$HOME/frc`. 无法获取家目录时返回 `None`.
pub fn output_dir_from_env_or_home(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(d) = explicit {
        return Some(d);
    }
    match env::var("FRC_OUTPUT_DIR") {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => dirs::home_dir().map(|h| h.join("frc")),
    }
}
