//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx2d;

pub use crate::config::FrcConfig;
pub use crate::error::{FrcError, FrcResult};
pub use crate::io::{read_image, read_raw, write_dmp, ImageFormat, ReadImageError};
pub use crate::FrcImage;

pub use crate::correlate::CorrelationCurve;
pub use crate::criterion::{Criterion, CriterionCurve};
pub use crate::fitting::FittedCurve;
pub use crate::pipeline::{BatchReport, FrcAnalysis, ImagePair, PairAnalysis, PairReport};
pub use crate::solve::ResolutionPoint;
