//! 完整的 FRC 流水线: 预处理 -> 频谱 -> 分环 -> 环相关 -> 拟合 -> 求交点.
//!
//! 单对图像使用 [`FrcAnalysis::run`], 多对图像使用 [`FrcAnalysis::run_batch`].
//! 批处理中同一边长的环集合只构建一次, 各对图像之间互不影响.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::correlate::CorrelationCurve;
use crate::criterion::{Criterion, CriterionCurve};
use crate::fitting::{fit_curve, FittedCurve};
use crate::prep::prepare;
use crate::rings::RingSet;
use crate::solve::{solve_crossing, ResolutionPoint, SolveParams};
use crate::spectrum::Spectrum;
use crate::{FrcConfig, FrcError, FrcImage, FrcResult};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 一种判据下的分析结果.
#[derive(Clone, Debug)]
pub struct CriterionOutcome {
    /// 判据.
    pub criterion: Criterion,
    /// 与相关曲线对齐的阈值曲线.
    pub threshold: CriterionCurve,
    /// 交点, 或者该判据失败的原因.
    pub result: FrcResult<ResolutionPoint>,
}

/// 一对图像的分析结果.
#[derive(Clone, Debug)]
pub struct PairAnalysis {
    /// 原始 FRC 曲线.
    pub curve: CorrelationCurve,
    /// 拟合曲线. 所有判据共用同一次拟合.
    pub fit: FrcResult<FittedCurve>,
    /// 各判据的结果, 顺序与配置一致.
    pub outcomes: Vec<CriterionOutcome>,
}

impl PairAnalysis {
    /// 查找某个判据的结果. 未配置该判据时返回 `None`.
    pub fn outcome(&self, criterion: Criterion) -> Option<&CriterionOutcome> {
        self.outcomes.iter().find(|o| o.criterion == criterion)
    }

    /// 查找某个判据的交点.
    pub fn resolution(&self, criterion: Criterion) -> Option<&FrcResult<ResolutionPoint>> {
        self.outcome(criterion).map(|o| &o.result)
    }
}

/// 批处理中的一对图像.
#[derive(Clone, Debug)]
pub struct ImagePair {
    /// 标签, 用于日志与输出文件命名.
    pub label: String,
    /// 第一幅图像.
    pub first: FrcImage,
    /// 第二幅图像.
    pub second: FrcImage,
}

impl ImagePair {
    /// 构建一对图像.
    pub fn new<S: Into<String>>(label: S, first: FrcImage, second: FrcImage) -> Self {
        Self {
            label: label.into(),
            first,
            second,
        }
    }
}

/// 批处理中一对图像的结果.
#[derive(Clone, Debug)]
pub struct PairReport {
    /// 标签.
    pub label: String,
    /// 分析结果. 该对图像失败时为 `Err`, 不影响其他图像对.
    pub result: FrcResult<PairAnalysis>,
}

/// 批处理结果, 顺序与输入一致.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    /// 每对图像的结果.
    pub reports: Vec<PairReport>,
}

impl BatchReport {
    /// 所有成功分析的图像对的原始 FRC 曲线, 用于对比.
    pub fn comparison_curves(&self) -> Vec<(&str, &CorrelationCurve)> {
        self.reports
            .iter()
            .filter_map(|r| {
                r.result
                    .as_ref()
                    .ok()
                    .map(|a| (r.label.as_str(), &a.curve))
            })
            .collect()
    }

    /// 成功分析的图像对的个数.
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.result.is_ok()).count()
    }
}

/// FRC 分析器. 持有一份经过校验的配置, 不含其他状态.
#[derive(Clone, Debug)]
pub struct FrcAnalysis {
    config: FrcConfig,
}

impl FrcAnalysis {
    /// 校验配置并构建分析器. 配置非法时返回 [`FrcError::InvalidConfiguration`].
    pub fn new(config: FrcConfig) -> FrcResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 当前配置.
    #[inline]
    pub fn config(&self) -> &FrcConfig {
        &self.config
    }

    /// 分析一对图像.
    ///
    /// 两幅图像形状不同时立即返回 [`FrcError::ShapeMismatch`], 不产生任何部分结果.
    pub fn run(&self, first: &FrcImage, second: &FrcImage) -> FrcResult<PairAnalysis> {
        let (a, b) = self.prepare_pair(first, second)?;
        let rings = RingSet::try_partition(a.min_side(), self.config.ring_width())?;
        self.analyze_prepared(&a, &b, &rings)
    }

    /// 依次 (开启 `rayon` 时并行) 分析多对图像.
    ///
    /// 先完成全部预处理, 再为每个出现过的边长构建一次环集合.
    pub fn run_batch(&self, pairs: &[ImagePair]) -> BatchReport {
        let prepared: Vec<FrcResult<(FrcImage, FrcImage)>> = pairs
            .iter()
            .map(|p| self.prepare_pair(&p.first, &p.second))
            .collect();

        let mut ring_sets: HashMap<usize, FrcResult<RingSet>> = HashMap::new();
        for (a, _) in prepared.iter().flatten() {
            let side = a.min_side();
            ring_sets
                .entry(side)
                .or_insert_with(|| RingSet::try_partition(side, self.config.ring_width()));
        }

        let work = |(pair, prep): (&ImagePair, &FrcResult<(FrcImage, FrcImage)>)| {
            let result = match prep {
                // 上面已为每个预处理成功的边长建好环集合.
                Ok((a, b)) => match &ring_sets[&a.min_side()] {
                    Ok(rings) => self.analyze_prepared(a, b, rings),
                    Err(e) => Err(e.clone()),
                },
                Err(e) => Err(e.clone()),
            };
            log_report(&pair.label, &result);
            PairReport {
                label: pair.label.clone(),
                result,
            }
        };

        let jobs: Vec<_> = pairs.iter().zip(prepared.iter()).collect();
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let reports = jobs.par_iter().map(|&job| work(job)).collect();
            } else {
                let reports = jobs.iter().map(|&job| work(job)).collect();
            }
        }
        BatchReport { reports }
    }

    /// 形状检查与预处理.
    fn prepare_pair(
        &self,
        first: &FrcImage,
        second: &FrcImage,
    ) -> FrcResult<(FrcImage, FrcImage)> {
        if first.shape() != second.shape() {
            return Err(FrcError::ShapeMismatch {
                left: first.shape(),
                right: second.shape(),
            });
        }
        Ok((prepare(first, &self.config), prepare(second, &self.config)))
    }

    /// 对预处理后的图像执行其余步骤.
    fn analyze_prepared(
        &self,
        a: &FrcImage,
        b: &FrcImage,
        rings: &RingSet,
    ) -> FrcResult<PairAnalysis> {
        let (s1, s2) = (Spectrum::forward(a), Spectrum::forward(b));
        let curve = CorrelationCurve::compute(&s1, &s2, rings)?;
        let fit = fit_curve(&curve, self.config.degree());
        if let Err(e) = &fit {
            warn!("polynomial fit failed: {e}");
        }

        let params = SolveParams {
            nyquist: curve.nyquist(),
            residual_tolerance: self.config.residual_tolerance(),
            pixel_size: self.config.pixel_size(),
        };
        let outcomes = self
            .config
            .criteria()
            .iter()
            .map(|&criterion| {
                let threshold = criterion.curve(&curve);
                let result = match &fit {
                    Ok(fitted) => solve_crossing(fitted, &threshold, params),
                    Err(e) => Err(e.clone()),
                };
                match &result {
                    Ok(p) => debug!(
                        "{criterion}: {:.4} pixels at spatial frequency {:.4}",
                        p.resolution_pixels, p.spatial_frequency
                    ),
                    Err(e) => warn!("{criterion}: {e}"),
                }
                CriterionOutcome {
                    criterion,
                    threshold,
                    result,
                }
            })
            .collect();

        Ok(PairAnalysis {
            curve,
            fit,
            outcomes,
        })
    }
}

fn log_report(label: &str, result: &FrcResult<PairAnalysis>) {
    match result {
        Ok(analysis) => {
            let summary: Vec<String> = analysis
                .outcomes
                .iter()
                .map(|o| match &o.result {
                    Ok(p) => format!("{} {:.3} px", o.criterion, p.resolution_pixels),
                    Err(_) => format!("{} unresolved", o.criterion),
                })
                .collect();
            info!("pair `{label}`: {}", summary.join(", "));
        }
        Err(e) => warn!("pair `{label}` skipped: {e}"),
    }
}
