//! 图像对列表与标签的解析.
//!
//! 图像对写作 `a1:b1,a2:b2,...`, 标签写作 `L1:L2:...`, 标签个数必须与图像对个数一致.

use std::path::{Path, PathBuf};

/// 图像对列表解析错误.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PairListError {
    /// 没有任何图像对.
    #[error("no image pair given")]
    Empty,

    /// 某一项不是 `a:b` 的形式.
    #[error("`{0}` is not of the form `first:second`")]
    Malformed(String),

    /// 标签个数与图像对个数不一致.
    ///
    /// 第一个参数代表标签个数, 第二个参数代表图像对个数.
    #[error("{0} labels given for {1} image pairs")]
    LabelCount(usize, usize),
}

/// 一对待分析的图像文件.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairSpec {
    /// 第一幅图像.
    pub first: PathBuf,
    /// 第二幅图像.
    pub second: PathBuf,
}

impl PairSpec {
    /// 两个文件名 (不含目录) 的最长公共前缀, 用于输出文件命名.
    pub fn prefix(&self) -> String {
        common_prefix(&self.first, &self.second)
    }
}

/// 解析 `a1:b1,a2:b2,...`. 空白项被忽略.
pub fn parse_pairs(s: &str) -> Result<Vec<PairSpec>, PairListError> {
    let ans = s
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.split(':').collect::<Vec<_>>().as_slice() {
            [a, b] if !a.is_empty() && !b.is_empty() => Ok(PairSpec {
                first: PathBuf::from(a),
                second: PathBuf::from(b),
            }),
            _ => Err(PairListError::Malformed(item.to_string())),
        })
        .collect::<Result<Vec<_>, _>>()?;
    if ans.is_empty() {
        return Err(PairListError::Empty);
    }
    Ok(ans)
}

/// 解析 `L1:L2:...`, 并检查个数是否等于 `pairs`.
pub fn parse_labels(s: &str, pairs: usize) -> Result<Vec<String>, PairListError> {
    let labels: Vec<String> = s.split(':').map(|l| l.trim().to_string()).collect();
    if labels.len() != pairs {
        return Err(PairListError::LabelCount(labels.len(), pairs));
    }
    Ok(labels)
}

/// 两个路径的文件名部分的最长公共前缀.
pub fn common_prefix<P: AsRef<Path>, Q: AsRef<Path>>(a: P, b: Q) -> String {
    #[inline]
    fn file_name(p: &Path) -> String {
        p.file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    let (a, b) = (file_name(a.as_ref()), file_name(b.as_ref()));
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let p = parse_pairs("rec/odd_a.dmp:rec/even_a.dmp, b1.npy:b2.npy").unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p[0].first, PathBuf::from("rec/odd_a.dmp"));
        assert_eq!(p[1].second, PathBuf::from("b2.npy"));

        assert_eq!(parse_pairs(""), Err(PairListError::Empty));
        assert_eq!(
            parse_pairs("a.dmp"),
            Err(PairListError::Malformed("a.dmp".to_string()))
        );
        assert!(parse_pairs("a:b:c").is_err());
        assert!(parse_pairs("a:").is_err());
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(
            parse_labels("EST:GRIDREC:IFBPTV", 3).unwrap(),
            vec!["EST", "GRIDREC", "IFBPTV"]
        );
        assert_eq!(
            parse_labels("EST:GRIDREC", 3),
            Err(PairListError::LabelCount(2, 3))
        );
    }

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix("x/y/slice_odd.dmp", "z/slice_even.dmp"), "slice_");
        assert_eq!(common_prefix("abc.tif", "abc.tif"), "abc.tif");
        assert_eq!(common_prefix("a.tif", "b.tif"), "");
        let spec = PairSpec {
            first: PathBuf::from("rec_odd.npy"),
            second: PathBuf::from("rec_even.npy"),
        };
        assert_eq!(spec.prefix(), "rec_");
    }
}
