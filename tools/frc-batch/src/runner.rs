//! 程序运行函数.

use std::collections::HashSet;
use std::fs;

use anyhow::Context;
use frc_berry::pipeline::FrcAnalysis;
use frc_berry::FrcConfig;
use log::{info, warn};
use utils::loader::load_pair;
use utils::pairs::{parse_labels, parse_pairs};

use crate::result::{BatchOutcome, PairEntry};
use crate::Cli;

/// 由命令行参数构建分析配置.
pub fn config_from_cli(cli: &Cli) -> anyhow::Result<FrcConfig> {
    let mut config = FrcConfig::new(cli.ring_width, cli.degree)?
        .with_resol_square(cli.resol_square)
        .with_hanning(cli.hanning)
        .with_criteria(cli.criteria.iter().copied())?
        .with_residual_tolerance(cli.residual_tolerance)?;
    if let Some(p) = cli.pixel_size {
        config = config.with_pixel_size(p)?;
    }
    Ok(config)
}

/// 输出文件名前缀. 公共前缀为空时退回到标签, 重复时追加序号.
fn unique_prefix(used: &mut HashSet<String>, prefix: String, label: &str) -> String {
    let base = if prefix.is_empty() {
        format!("{label}_")
    } else {
        prefix
    };
    let mut ans = base.clone();
    let mut k = 1;
    while !used.insert(ans.clone()) {
        ans = format!("{base}{k}_");
        k += 1;
    }
    ans
}

/// 实际运行.
pub fn run(cli: &Cli) -> anyhow::Result<BatchOutcome> {
    let config = config_from_cli(cli)?;
    let specs = parse_pairs(&cli.images)?;
    let labels = cli
        .labels
        .as_deref()
        .map(|l| parse_labels(l, specs.len()))
        .transpose()?;
    println!("Number of images to analyze: {}", specs.len() * 2);

    let out_dir = utils::output_dir_from_env_or_home(cli.output.clone())
        .context("cannot determine an output directory, use -o")?;
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("cannot create output directory {}", out_dir.display()))?;

    // 读取失败的图像对被跳过, 不影响其他图像对.
    let mut entries = Vec::with_capacity(specs.len());
    let mut pairs = Vec::with_capacity(specs.len());
    let mut load_failures = Vec::new();
    let mut used = HashSet::new();
    for (i, spec) in specs.into_iter().enumerate() {
        let label = labels.as_ref().map(|l| l[i].as_str());
        match load_pair(&spec, label, i) {
            Ok(pair) => {
                info!(
                    "pair `{}`: {} / {}",
                    pair.label,
                    spec.first.display(),
                    spec.second.display()
                );
                let prefix = unique_prefix(&mut used, spec.prefix(), &pair.label);
                entries.push(PairEntry { prefix, spec });
                pairs.push(pair);
            }
            Err(e) => {
                warn!("{e}");
                load_failures.push(e.to_string());
            }
        }
    }

    let analysis = FrcAnalysis::new(config)?;
    let report = analysis.run_batch(&pairs);

    let outcome = BatchOutcome {
        config: analysis.config().clone(),
        out_dir,
        entries,
        report,
        load_failures,
    };
    outcome.write_files()?;
    Ok(outcome)
}
