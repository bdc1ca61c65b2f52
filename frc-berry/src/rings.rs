//! 频率平面的环形分箱.
//!
//! 对边长为 `N` 的中心化频谱, 频率坐标为 `-floor(N/2) .. N - floor(N/2)`,
//! Nyquist 半径为 `floor(N/2)`.
//!
//! 环的下边界从 0 开始逐次累加环宽 (`r += w`) 得到, 每个环覆盖 `[r, r + w)`,
//! 直到 `r + w` 到达 Nyquist 半径为止, 最后一个不完整的环被丢弃.
//! 边界用累加而不是 `k * w` 计算, 二者在 `w = 0.1` 这类环宽下相差几个 ulp,
//! 会改变环的个数以及恰好落在边界上的点的归属.

use ndarray::Array2;

use crate::consts::MIN_RING_WIDTH;
use crate::{FrcError, FrcResult, Idx2d};

/// 每个频率点到频谱中心的半径. 对同一边长只需计算一次.
#[derive(Clone, Debug)]
pub struct FrequencyGrid {
    side: usize,
    radius: Array2<f64>,
}

impl FrequencyGrid {
    /// 边长为 `side` 的正方形频率网格.
    pub fn new(side: usize) -> Self {
        let c = (side / 2) as f64;
        let radius = Array2::from_shape_fn((side, side), |(h, w)| {
            let (y, x) = (h as f64 - c, w as f64 - c);
            (x * x + y * y).sqrt()
        });
        Self { side, radius }
    }

    /// 网格边长.
    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    /// Nyquist 半径 `floor(N/2)`.
    #[inline]
    pub fn nyquist(&self) -> usize {
        self.side / 2
    }

    /// 给定位置的半径.
    #[inline]
    pub fn radius(&self, pos: Idx2d) -> f64 {
        self.radius[pos]
    }
}

/// 一个环: 半径区间 `[lower, lower + width)` 及落在其中的全部频率点.
#[derive(Clone, Debug)]
pub struct Ring {
    index: usize,
    lower: f64,
    width: f64,
    bins: Vec<Idx2d>,
}

impl Ring {
    /// 环序号, 从 0 开始.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// 下边界 (包含).
    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// 上边界 (不包含).
    #[inline]
    pub fn upper(&self) -> f64 {
        self.lower + self.width
    }

    /// 半径 `r` 是否属于该环.
    #[inline]
    pub fn contains(&self, r: f64) -> bool {
        self.lower <= r && r < self.upper()
    }

    /// 环内的频率点.
    #[inline]
    pub fn bins(&self) -> &[Idx2d] {
        &self.bins
    }

    /// 环内频率点个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// 环内是否没有任何频率点.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// 该环的空间频率 `lower / nyquist`.
    #[inline]
    pub fn spatial_frequency(&self, nyquist: usize) -> f64 {
        self.lower / nyquist as f64
    }
}

/// 有序且互不相交的环.
#[derive(Clone, Debug)]
pub struct RingSet {
    side: usize,
    width: f64,
    rings: Vec<Ring>,
}

impl RingSet {
    /// 在 `grid` 上以环宽 `width` 分环.
    ///
    /// 每个频率点先按 `floor(radius / width)` 猜测桶号, 再对照各环实际的
    /// 上下边界修正, 这样分箱结果与逐环比较 `lower <= radius < lower + width` 完全一致.
    ///
    /// `width` 非有限、小于 [`MIN_RING_WIDTH`] 或不小于 Nyquist 半径时得到空的环集合.
    pub fn new(grid: &FrequencyGrid, width: f64) -> Self {
        let nyq = grid.nyquist() as f64;
        let mut rings: Vec<Ring> = ring_lower_bounds(nyq, width)
            .into_iter()
            .enumerate()
            .map(|(index, lower)| Ring {
                index,
                lower,
                width,
                bins: Vec::new(),
            })
            .collect();

        if let Some(top) = rings.last().map(Ring::upper) {
            let last = rings.len() - 1;
            for ((h, w), &r) in grid.radius.indexed_iter() {
                if r >= top {
                    continue;
                }
                let mut k = ((r / width).floor() as usize).min(last);
                while k > 0 && r < rings[k].lower {
                    k -= 1;
                }
                // 相邻环共享边界 (`upper(k) == lower(k + 1)`), 且 `r < top`, 一定能停下.
                while r >= rings[k].upper() {
                    k += 1;
                }
                debug_assert!(rings[k].contains(r));
                rings[k].bins.push((h, w));
            }
        }

        Self {
            side: grid.side(),
            width,
            rings,
        }
    }

    /// 直接由边长构建, 网格用完即弃.
    pub fn partition(side: usize, width: f64) -> Self {
        Self::new(&FrequencyGrid::new(side), width)
    }

    /// 同 [`RingSet::partition`], 但在没有任何环时返回 [`FrcError::EmptyCurve`].
    pub fn try_partition(side: usize, width: f64) -> FrcResult<Self> {
        let ans = Self::partition(side, width);
        if ans.is_empty() {
            return Err(FrcError::EmptyCurve {
                side,
                ring_width: width,
            });
        }
        Ok(ans)
    }

    /// 网格边长.
    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    /// Nyquist 半径.
    #[inline]
    pub fn nyquist(&self) -> usize {
        self.side / 2
    }

    /// 环宽.
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// 环的个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.rings.len()
    }

    /// 是否一个环也没有.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// 按半径递增的顺序遍历.
    pub fn iter(&self) -> std::slice::Iter<'_, Ring> {
        self.rings.iter()
    }

    /// 全部环的引用.
    #[inline]
    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// 每个环的空间频率.
    pub fn spatial_frequencies(&self) -> Vec<f64> {
        let nyq = self.nyquist();
        self.rings
            .iter()
            .map(|r| r.spatial_frequency(nyq))
            .collect()
    }

    /// 每个环的样本数.
    pub fn sample_counts(&self) -> Vec<usize> {
        self.rings.iter().map(Ring::len).collect()
    }
}

impl<'a> IntoIterator for &'a RingSet {
    type Item = &'a Ring;
    type IntoIter = std::slice::Iter<'a, Ring>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// 从 0 开始逐次累加 `width`, 收集满足 `r + width < nyq` 的下边界 `r`.
fn ring_lower_bounds(nyq: f64, width: f64) -> Vec<f64> {
    if !(width.is_finite() && width >= MIN_RING_WIDTH) || width >= nyq {
        return Vec::new();
    }
    let mut ans = Vec::with_capacity((nyq / width) as usize + 1);
    let mut r = 0.0;
    while r + width < nyq {
        ans.push(r);
        r += width;
    }
    ans
}

#[cfg(test)]
fn ring_count(nyq: f64, width: f64) -> usize {
    ring_lower_bounds(nyq, width).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_count() {
        assert_eq!(ring_count(32.0, 2.0), 15);
        assert_eq!(ring_count(32.0, 5.0), 6);
        assert_eq!(ring_count(32.0, 3.0), 10);
        assert_eq!(ring_count(32.0, 32.0), 0);
        assert_eq!(ring_count(32.0, 0.0), 0);
        assert_eq!(ring_count(32.0, -1.0), 0);
        assert_eq!(ring_count(32.0, f64::NAN), 0);
        assert_eq!(ring_count(32.0, 1e-9), 0);
    }

    #[test]
    fn test_accumulated_lower_bounds() {
        // 0.1 不能精确表示: 累加得到 160 个环, 而 k * 0.1 只有 159 个.
        let set = RingSet::partition(32, 0.1);
        assert_eq!(set.len(), 160);

        let mut r = 0.0;
        for ring in &set {
            assert_eq!(ring.lower(), r);
            r += 0.1;
        }

        // 半径恰好为 2 的点落在第 19 个环 [1.9000000000000006, 2.0000000000000004) 中.
        let c = 16;
        let owner = set
            .iter()
            .find(|ring| ring.bins().contains(&(c, c + 2)))
            .map(Ring::index);
        assert_eq!(owner, Some(19));
        assert!(set.rings()[19].lower() < 2.0 && 2.0 < set.rings()[19].upper());
    }

    #[test]
    fn test_grid_center() {
        let g = FrequencyGrid::new(8);
        assert_eq!(g.nyquist(), 4);
        assert_eq!(g.radius((4, 4)), 0.0);
        assert_eq!(g.radius((4, 0)), 4.0);
        assert_eq!(g.radius((7, 4)), 3.0);

        let g = FrequencyGrid::new(7);
        assert_eq!(g.nyquist(), 3);
        assert_eq!(g.radius((3, 3)), 0.0);
        assert_eq!(g.radius((0, 3)), 3.0);
    }

    #[test]
    fn test_rings_disjoint_and_cover() {
        for (side, width) in [(64usize, 2.0), (64, 5.0), (33, 1.5), (50, 0.7)] {
            let grid = FrequencyGrid::new(side);
            let set = RingSet::new(&grid, width);
            assert!(!set.is_empty());

            let mut owner = Array2::<Option<usize>>::from_elem((side, side), None);
            for ring in &set {
                for &pos in ring.bins() {
                    assert!(owner[pos].is_none(), "{pos:?} appears twice");
                    owner[pos] = Some(ring.index());
                    assert!(ring.contains(grid.radius(pos)));
                }
            }

            // 覆盖: 最后一个环上界以下的每个点都有归属.
            let top = set.rings().last().map(Ring::upper).unwrap();
            for ((h, w), r) in grid.radius.indexed_iter() {
                assert_eq!(owner[(h, w)].is_some(), *r < top, "{side} {width} {h} {w}");
            }

            let freqs = set.spatial_frequencies();
            assert!(freqs.windows(2).all(|p| p[0] < p[1]));
            assert_eq!(freqs[0], 0.0);
            assert!(*freqs.last().unwrap() < 1.0);
        }
    }

    #[test]
    fn test_boundary_goes_to_upper_ring() {
        // 半径恰好为 2 的点 (例如 (c, c + 2)) 属于 [2, 4), 不属于 [0, 2).
        let set = RingSet::partition(16, 2.0);
        let c = 8;
        assert!(set.rings()[1].bins().contains(&(c, c + 2)));
        assert!(!set.rings()[0].bins().contains(&(c, c + 2)));
        assert_eq!(set.rings()[0].bins().iter().filter(|p| **p == (c, c)).count(), 1);
        // r = 0: 1 个; r = 1: 4 个; r = √2: 4 个.
        assert_eq!(set.rings()[0].len(), 9);
    }

    #[test]
    fn test_empty_partition() {
        assert!(RingSet::partition(64, 32.0).is_empty());
        assert!(RingSet::partition(64, 0.0).is_empty());
        assert!(RingSet::partition(1, 1.0).is_empty());
        assert!(matches!(
            RingSet::try_partition(64, 40.0),
            Err(FrcError::EmptyCurve { side: 64, .. })
        ));
        assert_eq!(RingSet::try_partition(64, 2.0).unwrap().len(), 15);
    }
}
