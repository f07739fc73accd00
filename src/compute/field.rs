//! Dense scalar grid with clamped access and bilinear sampling.
//!
//! Every physical quantity of the solver is a `Field`. Cells are stored
//! column-major (`i * height + j`), so the neighbour offsets are `±1` along
//! y and `±height` along x for all fields alike.
//!
//! Staggering is expressed through the field's origin: the world position of
//! cell `(i, j)` is `origin + (i, j) * h`. An x-velocity field lives on the
//! left cell faces (origin `(0, h/2)`), a y-velocity field on the bottom
//! faces (origin `(h/2, 0)`), and cell-centered quantities at `(h/2, h/2)`.

/// Scalar field over a fixed `width x height` grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    data: Vec<f32>,
    width: usize,
    height: usize,
    spacing: f32,
    origin: (f32, f32),
}

impl Field {
    /// Create a zero-filled field with an explicit world origin.
    pub fn new(width: usize, height: usize, spacing: f32, origin: (f32, f32)) -> Self {
        debug_assert!(width > 0 && height > 0, "field must have at least one cell");
        debug_assert!(spacing > 0.0, "cell spacing must be positive");
        Self {
            data: vec![0.0; width * height],
            width,
            height,
            spacing,
            origin,
        }
    }

    /// Field sampled at cell centers.
    pub fn centered(width: usize, height: usize, spacing: f32) -> Self {
        Self::new(width, height, spacing, (0.5 * spacing, 0.5 * spacing))
    }

    /// Field sampled on the left faces (x-velocity).
    pub fn x_faces(width: usize, height: usize, spacing: f32) -> Self {
        Self::new(width, height, spacing, (0.0, 0.5 * spacing))
    }

    /// Field sampled on the bottom faces (y-velocity).
    pub fn y_faces(width: usize, height: usize, spacing: f32) -> Self {
        Self::new(width, height, spacing, (0.5 * spacing, 0.0))
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    #[inline]
    pub fn origin(&self) -> (f32, f32) {
        self.origin
    }

    /// Flat index of an in-range cell.
    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.width && j < self.height);
        i * self.height + j
    }

    /// Flat index with both coordinates clamped into the grid.
    #[inline]
    fn clamped_idx(&self, i: isize, j: isize) -> usize {
        let i = i.clamp(0, self.width as isize - 1) as usize;
        let j = j.clamp(0, self.height as isize - 1) as usize;
        i * self.height + j
    }

    /// Read a cell; out-of-range coordinates read the nearest edge cell.
    #[inline]
    pub fn get(&self, i: isize, j: isize) -> f32 {
        self.data[self.clamped_idx(i, j)]
    }

    /// Write a cell; out-of-range coordinates write the nearest edge cell.
    #[inline]
    pub fn set(&mut self, i: isize, j: isize, value: f32) {
        let idx = self.clamped_idx(i, j);
        self.data[idx] = value;
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Copy all values from another field of the same shape.
    pub fn copy_from(&mut self, other: &Field) {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        self.data.copy_from_slice(&other.data);
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Map a world position to fractional grid coordinates, clamped so the
    /// sampler never extrapolates past the outermost stored values.
    #[inline]
    fn local(&self, x: f32, y: f32) -> (f32, f32) {
        let inv = 1.0 / self.spacing;
        let lx = ((x - self.origin.0) * inv).clamp(0.0, (self.width - 1) as f32);
        let ly = ((y - self.origin.1) * inv).clamp(0.0, (self.height - 1) as f32);
        (lx, ly)
    }

    /// Bilinear interpolation at world position `(x, y)`.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let (lx, ly) = self.local(x, y);
        let i0 = lx.floor();
        let j0 = ly.floor();
        let tx = lx - i0;
        let ty = ly - j0;
        let sx = 1.0 - tx;
        let sy = 1.0 - ty;

        let i0 = i0 as isize;
        let j0 = j0 as isize;

        sx * sy * self.get(i0, j0)
            + tx * sy * self.get(i0 + 1, j0)
            + sx * ty * self.get(i0, j0 + 1)
            + tx * ty * self.get(i0 + 1, j0 + 1)
    }

    /// World position of cell `(i, j)` on this field's lattice.
    #[inline]
    pub fn position(&self, i: usize, j: usize) -> (f32, f32) {
        (
            self.origin.0 + i as f32 * self.spacing,
            self.origin.1 + j as f32 * self.spacing,
        )
    }

    /// Smallest and largest finite values, `(0, 0)` when none are finite.
    pub fn min_max(&self) -> (f32, f32) {
        let mut iter = self.data.iter().copied().filter(|v| v.is_finite());
        let Some(first) = iter.next() else {
            return (0.0, 0.0);
        };
        iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }

    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }
}
