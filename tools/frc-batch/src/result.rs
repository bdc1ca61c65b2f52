//! 分析结果的输出: 日志文件、曲线表以及终端汇总.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use frc_berry::correlate::CorrelationCurve;
use frc_berry::pipeline::{BatchReport, PairAnalysis, PairReport};
use frc_berry::solve::ResolutionPoint;
use frc_berry::{FrcConfig, FrcError, FrcResult};
use itertools::Itertools;
use utils::pairs::PairSpec;

/// 成功读取的一对图像的文件信息.
pub struct PairEntry {
    /// 输入文件.
    pub spec: PairSpec,
    /// 输出文件名前缀.
    pub prefix: String,
}

/// 一次批处理的最终结果.
pub struct BatchOutcome {
    pub config: FrcConfig,
    pub out_dir: PathBuf,
    pub entries: Vec<PairEntry>,
    pub report: BatchReport,
    pub load_failures: Vec<String>,
}

#[inline]
fn f64_to_display(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else {
        format!("{f:.6}")
    }
}

/// 某一判据的结果, 写成一行文字.
fn resolution_to_display(r: &FrcResult<ResolutionPoint>) -> String {
    match r {
        Ok(p) => match p.resolution_physical {
            Some(phys) => format!(
                "{:.4} pixels ({:.4} physical units) at spatial frequency {:.4}",
                p.resolution_pixels, phys, p.spatial_frequency
            ),
            None => format!(
                "{:.4} pixels at spatial frequency {:.4}",
                p.resolution_pixels, p.spatial_frequency
            ),
        },
        Err(FrcError::NoCrossingFound { sampled_up_to, .. }) => format!(
            "unresolved (no crossing up to spatial frequency {sampled_up_to:.4})"
        ),
        Err(e) => format!("failed ({e})"),
    }
}

/// 将一对图像的结果写进 `w` 中.
fn describe_into<W: Write>(report: &PairReport, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Pair `{}`:", report.label)?;
    match &report.result {
        Ok(a) => {
            writeln!(
                w,
                "{S4}Rings: {} (degenerate {})",
                a.curve.len(),
                a.curve.degenerate_rings()
            )?;
            for o in &a.outcomes {
                writeln!(
                    w,
                    "{S4}Criterion {}: {}",
                    o.criterion,
                    resolution_to_display(&o.result)
                )?;
            }
        }
        Err(e) => writeln!(w, "{S4}Skipped: {e}")?,
    }
    Ok(())
}

/// 日志文件: 计算时间, 输入, 预处理选项, 环宽, 拟合次数以及各判据的结果.
fn write_log<W: Write>(
    w: &mut W,
    spec: &PairSpec,
    config: &FrcConfig,
    report: &PairReport,
    date: &DateTime<Local>,
) -> io::Result<()> {
    writeln!(w, "FRC analysis log file")?;
    writeln!(w)?;
    writeln!(w, "Calculation done on the {}", date.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(w)?;
    writeln!(w, "Input images:")?;
    writeln!(w, "1) {}", spec.first.display())?;
    writeln!(w, "2) {}", spec.second.display())?;
    if config.resol_square() {
        writeln!(w, "Computation done inside the resolution circle")?;
    }
    if config.hanning() {
        writeln!(w, "Hanning pre-filter activated")?;
    }
    writeln!(w, "Ring thickness: {}", config.ring_width())?;
    writeln!(w, "Polynomial degree: {}", config.degree())?;
    if let Some(p) = config.pixel_size() {
        writeln!(w, "Pixel size: {p}")?;
    }
    writeln!(w)?;
    writeln!(w, "Resolution results:")?;
    match &report.result {
        Ok(a) => {
            for (i, o) in a.outcomes.iter().enumerate() {
                writeln!(
                    w,
                    "{}) Criterion {}: {}",
                    i + 1,
                    o.criterion,
                    resolution_to_display(&o.result)
                )?;
            }
        }
        Err(e) => writeln!(w, "Analysis failed: {e}")?,
    }
    Ok(())
}

/// 曲线表: 空间频率, 原始 FRC, 拟合值, 以及各判据的阈值.
fn write_curve_table<W: Write>(w: &mut W, a: &PairAnalysis) -> io::Result<()> {
    let header = ["spatial_frequency", "frc", "fitted"]
        .into_iter()
        .map(str::to_string)
        .chain(a.outcomes.iter().map(|o| o.criterion.to_string()))
        .join(" ");
    writeln!(w, "# {header}")?;

    let fitted = a.fit.as_ref().ok().map(|f| f.values());
    for (k, (&f, &v)) in a
        .curve
        .frequencies()
        .iter()
        .zip(a.curve.values())
        .enumerate()
    {
        let fit = fitted.map_or_else(|| "/".to_string(), |fv| f64_to_display(fv[k]));
        let thresholds = a
            .outcomes
            .iter()
            .map(|o| f64_to_display(o.threshold.values()[k]))
            .join(" ");
        writeln!(
            w,
            "{} {} {} {}",
            f64_to_display(f),
            f64_to_display(v),
            fit,
            thresholds
        )?;
    }
    Ok(())
}

/// 对比曲线表: 每条曲线一块, 块之间空一行.
fn write_comparison_table<W: Write>(
    w: &mut W,
    curves: &[(&str, &CorrelationCurve)],
) -> io::Result<()> {
    for (i, (label, curve)) in curves.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        writeln!(w, "# {label}")?;
        for (&f, &v) in curve.frequencies().iter().zip(curve.values()) {
            writeln!(w, "{} {}", f64_to_display(f), f64_to_display(v))?;
        }
    }
    Ok(())
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let f = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    Ok(BufWriter::new(f))
}

impl BatchOutcome {
    /// 写出每对图像的日志文件与曲线表, 以及多对图像时的对比曲线表.
    pub fn write_files(&self) -> anyhow::Result<()> {
        let date = Local::now();
        for (entry, report) in self.entries.iter().zip(self.report.reports.iter()) {
            let mut w = create(&self.out_dir.join(format!("{}frc_log.txt", entry.prefix)))?;
            write_log(&mut w, &entry.spec, &self.config, report, &date)?;
            w.flush()?;

            if let Ok(a) = &report.result {
                let mut w =
                    create(&self.out_dir.join(format!("{}_frc_curves.txt", entry.prefix)))?;
                write_curve_table(&mut w, a)?;
                w.flush()?;
            }
        }

        let curves = self.report.comparison_curves();
        if curves.len() > 1 {
            let mut w = create(&self.out_dir.join("comparison_curves.txt"))?;
            write_comparison_table(&mut w, &curves)?;
            w.flush()?;
        }
        Ok(())
    }

    /// 打印运行结果汇总.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);

        for report in self.report.reports.iter() {
            if describe_into(report, &mut buf).is_ok() {
                print!("{}", String::from_utf8_lossy(&buf));
            }
            buf.clear();

            utils::sep();
        }
        for e in self.load_failures.iter() {
            println!("Not analysed: {e}");
        }
        println!(
            "{} of {} pairs analysed, output in {}",
            self.report.succeeded(),
            self.report.reports.len() + self.load_failures.len(),
            self.out_dir.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use frc_berry::criterion::Criterion;

    #[test]
    fn test_resolution_to_display() {
        let p = ResolutionPoint::new(Criterion::HalfBit, 0.25, 0.3, 32, None);
        assert_eq!(
            resolution_to_display(&Ok(p)),
            "128.0000 pixels at spatial frequency 0.2500"
        );
        let p = ResolutionPoint::new(Criterion::HalfBit, 0.5, 0.3, 32, Some(0.5));
        assert!(resolution_to_display(&Ok(p)).contains("(32.0000 physical units)"));

        let e = FrcError::NoCrossingFound {
            criterion: Criterion::OneBit,
            sampled_up_to: 0.875,
        };
        assert_eq!(
            resolution_to_display(&Err(e)),
            "unresolved (no crossing up to spatial frequency 0.8750)"
        );
    }

    #[test]
    fn test_comparison_table() {
        let a = CorrelationCurve::new(vec![0.0, 0.5], vec![1.0, 0.25], vec![1, 8], 4).unwrap();
        let b = CorrelationCurve::new(vec![0.0], vec![f64::NAN], vec![1], 2).unwrap();
        let mut buf = Vec::new();
        write_comparison_table(&mut buf, &[("A", &a), ("B", &b)]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "# A\n0.000000 1.000000\n0.500000 0.250000\n\n# B\n0.000000 NaN\n"
        );
    }

    #[test]
    fn test_log_header() {
        let spec = PairSpec {
            first: PathBuf::from("rec_odd.dmp"),
            second: PathBuf::from("rec_even.dmp"),
        };
        let config = FrcConfig::default().with_hanning(true);
        let report = PairReport {
            label: "rec".to_string(),
            result: Err(FrcError::EmptyCurve {
                side: 4,
                ring_width: 5.0,
            }),
        };
        let date = Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let mut buf = Vec::new();
        write_log(&mut buf, &spec, &config, &report, &date).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(
            "FRC analysis log file\n\nCalculation done on the 2024-05-01 09:30:00\n\nInput images:\n"
        ));
        assert!(text.contains("1) rec_odd.dmp\n2) rec_even.dmp\n"));
        assert!(text.contains("Hanning pre-filter activated"));
        assert!(text.contains("Analysis failed: "));
    }

    #[test]
    fn test_skipped_pair_description() {
        let report = PairReport {
            label: "broken".to_string(),
            result: Err(FrcError::ShapeMismatch {
                left: (4, 4),
                right: (4, 5),
            }),
        };
        let mut buf = Vec::new();
        describe_into(&report, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Pair `broken`:"));
        assert!(text.contains("Skipped: shape mismatch"));
    }
}
