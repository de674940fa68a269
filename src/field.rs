// src/field.rs

/// Scalar field on a 2D grid with a 1-cell ghost ring.
///
/// Interior cells live at logical coordinates (0..nx, 0..ny); the ghost
/// ring extends the range to -1..=nx and -1..=ny so the 5-point stencil
/// can be evaluated at every interior cell without branching. Storage is
/// a single contiguous `(nx+2)*(ny+2)` buffer.
#[derive(Debug, Clone)]
pub struct Field2D {
    nx: usize,
    ny: usize,
    data: Vec<f64>,
}

impl Field2D {
    /// Create a zero-initialised field with `nx × ny` interior cells.
    pub fn new(nx: usize, ny: usize) -> Self {
        Self {
            nx,
            ny,
            data: vec![0.0; (nx + 2) * (ny + 2)],
        }
    }

    /// Interior width.
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Interior height.
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Flat index for logical coordinates, ghost ring included.
    #[inline]
    fn idx(&self, x: isize, y: isize) -> usize {
        debug_assert!(x >= -1 && x <= self.nx as isize);
        debug_assert!(y >= -1 && y <= self.ny as isize);
        (y + 1) as usize * (self.nx + 2) + (x + 1) as usize
    }

    #[inline]
    pub fn at(&self, x: isize, y: isize) -> f64 {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: isize, y: isize, v: f64) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    #[inline]
    pub fn add(&mut self, x: isize, y: isize, v: f64) {
        let i = self.idx(x, y);
        self.data[i] += v;
    }

    /// Sum of the four orthogonal neighbours (may read ghosts).
    #[inline]
    pub fn neighbour_sum(&self, x: isize, y: isize) -> f64 {
        self.at(x - 1, y) + self.at(x + 1, y) + self.at(x, y - 1) + self.at(x, y + 1)
    }

    /// Bulk zero-fill, ghost ring included.
    pub fn fill_zero(&mut self) {
        self.data.fill(0.0);
    }
}
