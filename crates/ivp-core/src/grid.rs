use crate::{Bounds, Domain, Interval, Region};

/// Upper limit on the number of cells chosen automatically.
const MAX_AUTO_CELLS: usize = 40_000;

/// Upper limit on the number of cells of any grid.
pub const MAX_CELLS: usize = 1 << 24;

#[derive(Debug, Clone, Default)]
struct Cell {
    /// Indices of regions touching this cell, ascending.
    regions: Vec<u32>,
    /// Largest `max_value` among those regions.
    upper: Option<f64>,
}

/// Uniform grid over the point-index space of a domain.
///
/// Each cell remembers which regions touch it, so a query only inspects regions registered in
/// the cells it overlaps instead of scanning the whole partition. Cells also carry a cheap upper
/// bound on the utility of anything inside them, used by the solver to prune.
///
/// Built once per function; read-only afterwards (apart from [`SpatialIndex::refresh_bounds`]
/// when the function's utilities are rescaled).
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    extent: Vec<i64>,
    cell_width: Vec<i64>,
    stride: Vec<usize>,
    cells: Vec<Cell>,
}

impl SpatialIndex {
    /// Build with cell widths derived from the region count and domain size.
    pub fn new(domain: &Domain, regions: &[Region]) -> Self {
        let widths = auto_cell_width(domain, regions.len());
        Self::with_cell_width(domain, regions, &widths)
    }

    /// Build with an explicit cell width (in points) per dimension.
    ///
    /// Widths are clamped to `[2, points]`, so a too-fine request still yields a usable grid.
    /// A request whose cell count would exceed [`MAX_CELLS`] falls back to the automatic widths
    /// (and, failing that, to a single cell).
    pub fn with_cell_width(domain: &Domain, regions: &[Region], widths: &[u32]) -> Self {
        let extent: Vec<i64> = domain.vars().iter().map(|v| v.points as i64).collect();

        let GridLayout {
            cell_width,
            stride,
            total,
        } = grid_layout(&extent, widths)
            .or_else(|| grid_layout(&extent, &auto_cell_width(domain, regions.len())))
            .unwrap_or_else(|| GridLayout::single_cell(&extent));

        let mut index = Self {
            extent,
            cell_width,
            stride,
            cells: vec![Cell::default(); total.max(1)],
        };

        for (i, region) in regions.iter().enumerate() {
            let upper = region.max_value();
            let mut touched = Vec::new();
            index.visit_cells(&region.bounds, |ix| touched.push(ix));
            for ix in touched {
                let cell = &mut index.cells[ix];
                cell.regions.push(i as u32);
                cell.upper = max_opt(cell.upper, upper);
            }
        }

        index
    }

    pub fn dim(&self) -> usize {
        self.extent.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_width(&self) -> &[i64] {
        &self.cell_width
    }

    /// Average number of regions registered per cell.
    pub fn regions_per_cell(&self) -> f64 {
        let total: usize = self.cells.iter().map(|c| c.regions.len()).sum();
        total as f64 / self.cells.len() as f64
    }

    /// Indices of every region of `regions` intersecting `query`, ascending and de-duplicated.
    ///
    /// `regions` must be the slice this index was built from. `out` is cleared first; its
    /// capacity is reused across calls.
    pub fn candidates_into(&self, regions: &[Region], query: &Bounds, out: &mut Vec<usize>) {
        out.clear();
        let mut cells_seen = 0usize;
        self.visit_cells(query, |ix| {
            cells_seen += 1;
            for &r in &self.cells[ix].regions {
                let r = r as usize;
                if regions[r].bounds.overlaps(query) {
                    out.push(r);
                }
            }
        });

        // A region spanning several cells is reported once per cell.
        if cells_seen > 1 {
            out.sort_unstable();
            out.dedup();
        }
    }

    pub fn candidates(&self, regions: &[Region], query: &Bounds) -> Vec<usize> {
        let mut out = Vec::new();
        self.candidates_into(regions, query, &mut out);
        out
    }

    /// Upper bound on the utility of any region touching the cells `query` overlaps.
    ///
    /// `None` when none of those cells holds a region.
    pub fn upper_bound(&self, query: &Bounds) -> Option<f64> {
        let mut bound = None;
        self.visit_cells(query, |ix| {
            bound = max_opt(bound, self.cells[ix].upper);
        });
        bound
    }

    /// Recompute per-cell bounds after the regions' utilities changed.
    pub fn refresh_bounds(&mut self, regions: &[Region]) {
        for cell in self.cells.iter_mut() {
            cell.upper = cell
                .regions
                .iter()
                .fold(None, |acc, &r| max_opt(acc, regions[r as usize].max_value()));
        }
    }

    /// Cells along dimension `d` overlapped by `iv`, as `(first, count)`.
    fn cell_span(&self, d: usize, iv: &Interval) -> Option<(usize, usize)> {
        let (lo, hi) = iv.effective_range()?;
        let lo = lo.max(0);
        let hi = hi.min(self.extent[d] - 1);
        if lo > hi {
            return None;
        }
        let first = (lo / self.cell_width[d]) as usize;
        let last = (hi / self.cell_width[d]) as usize;
        Some((first, last - first + 1))
    }

    /// Call `f` with the flat index of every cell overlapped by `query`.
    fn visit_cells(&self, query: &Bounds, mut f: impl FnMut(usize)) {
        let dim = self.dim();
        if query.dim() != dim {
            return;
        }

        let mut total = 1usize;
        for d in 0..dim {
            match self.cell_span(d, query.interval(d)) {
                Some((_, count)) => total *= count,
                None => return,
            }
        }

        // Decode a flat counter into per-dimension offsets; avoids a per-query odometer buffer.
        for k in 0..total {
            let mut rem = k;
            let mut ix = 0usize;
            for d in 0..dim {
                let Some((first, count)) = self.cell_span(d, query.interval(d)) else {
                    return;
                };
                ix += (first + rem % count) * self.stride[d];
                rem /= count;
            }
            f(ix);
        }
    }
}

struct GridLayout {
    cell_width: Vec<i64>,
    stride: Vec<usize>,
    total: usize,
}

impl GridLayout {
    fn single_cell(extent: &[i64]) -> Self {
        Self {
            cell_width: extent.iter().map(|&e| e.max(1)).collect(),
            stride: vec![1; extent.len()],
            total: 1,
        }
    }
}

/// Cell widths, strides and cell count for `widths` (missing entries span the whole extent).
///
/// `None` when the cell count overflows or exceeds [`MAX_CELLS`].
fn grid_layout(extent: &[i64], widths: &[u32]) -> Option<GridLayout> {
    let dim = extent.len();
    let cell_width: Vec<i64> = (0..dim)
        .map(|d| {
            let requested = widths.get(d).copied().unwrap_or(u32::MAX) as i64;
            requested.max(2).min(extent[d])
        })
        .collect();

    let mut stride = vec![1usize; dim];
    let mut total = 1usize;
    for d in 0..dim {
        stride[d] = total;
        let cells = ((extent[d] + cell_width[d] - 1) / cell_width[d]) as usize;
        total = total.checked_mul(cells)?;
    }
    if total > MAX_CELLS {
        return None;
    }

    Some(GridLayout {
        cell_width,
        stride,
        total,
    })
}

fn max_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Cell widths targeting roughly one cell per four regions (at least `2^dim`, at most
/// [`MAX_AUTO_CELLS`]), with the same number of cells along every edge.
fn auto_cell_width(domain: &Domain, region_count: usize) -> Vec<u32> {
    let dim = domain.len();
    if dim == 0 {
        return Vec::new();
    }

    let min_cells = 2f64.powi(dim as i32);
    let max_cells = ((region_count / 4) as f64).max(min_cells).min(MAX_AUTO_CELLS as f64);

    let mut per_edge = 1u32;
    let mut cells = 1f64;
    while cells <= max_cells {
        per_edge += 1;
        cells = (per_edge as f64).powi(dim as i32);
    }

    domain
        .vars()
        .iter()
        .map(|v| v.points.div_ceil(per_edge).min(v.points))
        .collect()
}
