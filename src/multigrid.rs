// src/multigrid.rs
//
// Geometric multigrid solver for the 2D Poisson equation on power-of-two
// grids. Correction scheme: the finest level carries the full problem,
// coarser levels solve for a correction with homogeneous boundaries.
//
// Smoother: red-black SOR at the fixed optimal factor for the 5-point
// Laplacian. Reference:
//   Irad Yavneh. On red-black SOR smoothing in multigrid.
//   SIAM J. Sci. Comput., 17(1):180-192, 1996.

use crate::boundary::{BoundaryCondition, BoundarySet};
use crate::config::SolverParams;
use crate::error::MgError;
use crate::field::Field2D;

/// Optimal over-relaxation factor for red-black SOR on the 2D 5-point
/// Laplacian: 4 - 2*sqrt(2) ≈ 1.1716 (Yavneh 1996).
pub const OMEGA: f64 = 4.0 - 2.0 * std::f64::consts::SQRT_2;

/// Prolongation weights for cell-centered bilinear interpolation:
/// nearest coarse parent, the two edge-adjacent neighbours, the diagonal.
const C0: f64 = 9.0 / 16.0;
const C1: f64 = 3.0 / 16.0;
const C2: f64 = 1.0 / 16.0;

#[inline]
fn is_power_of_two(x: usize) -> bool {
    x != 0 && (x & (x - 1)) == 0
}

/// Residual norms over the interior of one level.
///
/// `mse` is the mean of the squared residual (not a root-mean-square);
/// the convention is kept as-is so thresholds stay comparable across
/// tools that consume it.
#[derive(Debug, Clone, Copy)]
pub struct Residual {
    /// max |r| over interior cells.
    pub linf: f64,
    /// mean(r^2) over interior cells.
    pub mse: f64,
}

/// One resolution of the hierarchy: solution, right-hand side and
/// residual fields, all ghost-padded and identically sized.
#[derive(Debug)]
pub struct GridLevel {
    dim: (usize, usize),
    h: f64,
    u: Field2D,
    b: Field2D,
    r: Field2D,
}

impl GridLevel {
    fn new(nx: usize, ny: usize, h: f64) -> Self {
        Self {
            dim: (nx, ny),
            h,
            u: Field2D::new(nx, ny),
            b: Field2D::new(nx, ny),
            r: Field2D::new(nx, ny),
        }
    }

    /// Interior dimensions (width, height).
    #[inline]
    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Grid spacing on this level.
    #[inline]
    pub fn h(&self) -> f64 {
        self.h
    }

    pub fn u(&self) -> &Field2D {
        &self.u
    }

    pub fn b(&self) -> &Field2D {
        &self.b
    }

    /// Overwrite the ghost ring from the interior: ghost = forcing - M*u_in.
    ///
    /// Corner ghost cells are not touched; the 5-point stencil never reads
    /// them.
    fn apply_bc_impl(&mut self, bcs: &BoundarySet, with_forcing: bool) {
        let (w, h) = (self.dim.0 as isize, self.dim.1 as isize);
        let spacing = self.h;
        let forcing = |bc: &BoundaryCondition| {
            if with_forcing {
                bc.ghost_forcing(spacing)
            } else {
                0.0
            }
        };

        let (m, f) = (bcs.neg_x.stencil_coeff(), forcing(&bcs.neg_x));
        for y in 0..h {
            let g = f - m * self.u.at(0, y);
            self.u.set(-1, y, g);
        }

        let (m, f) = (bcs.pos_x.stencil_coeff(), forcing(&bcs.pos_x));
        for y in 0..h {
            let g = f - m * self.u.at(w - 1, y);
            self.u.set(w, y, g);
        }

        let (m, f) = (bcs.neg_y.stencil_coeff(), forcing(&bcs.neg_y));
        for x in 0..w {
            let g = f - m * self.u.at(x, 0);
            self.u.set(x, -1, g);
        }

        let (m, f) = (bcs.pos_y.stencil_coeff(), forcing(&bcs.pos_y));
        for x in 0..w {
            let g = f - m * self.u.at(x, h - 1);
            self.u.set(x, h, g);
        }
    }
}

/// Multigrid Poisson solver owning the level hierarchy.
///
/// Sequential and deterministic: cost is a fixed function of the level
/// count and the smoothing counts in [`SolverParams`]. Not reentrant;
/// `&mut self` on every operation serialises callers.
#[derive(Debug)]
pub struct MultigridPoisson {
    levels: Vec<GridLevel>,
    bcs: BoundarySet,
    params: SolverParams,
}

impl MultigridPoisson {
    /// Build a hierarchy for `size` interior cells with finest spacing
    /// `h0`, homogeneous Dirichlet boundaries and default smoothing
    /// counts.
    pub fn new(size: (usize, usize), h0: f64) -> Result<Self, MgError> {
        Self::with_setup(size, h0, BoundarySet::default(), SolverParams::default())
    }

    /// Build a hierarchy with explicit boundary conditions and smoothing
    /// counts. Both axes must be powers of two and exceed 4 cells; level
    /// axes halve and `h` doubles until either axis would drop to 4.
    pub fn with_setup(
        size: (usize, usize),
        h0: f64,
        bcs: BoundarySet,
        params: SolverParams,
    ) -> Result<Self, MgError> {
        let (width, height) = size;
        if !is_power_of_two(width) || !is_power_of_two(height) {
            return Err(MgError::NotPowerOfTwo { width, height });
        }

        let mut levels = Vec::new();
        let (mut lw, mut lh) = (width, height);
        let mut spacing = h0;
        while lw > 4 && lh > 4 {
            levels.push(GridLevel::new(lw, lh, spacing));
            lw /= 2;
            lh /= 2;
            spacing *= 2.0;
        }

        if levels.is_empty() {
            return Err(MgError::TooSmall { width, height });
        }

        Ok(Self {
            levels,
            bcs,
            params,
        })
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[GridLevel] {
        &self.levels
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Solution field of the finest level.
    pub fn u0(&self) -> &Field2D {
        &self.levels[0].u
    }

    /// Mutable finest-level solution (warm start manipulation).
    pub fn u0_mut(&mut self) -> &mut Field2D {
        &mut self.levels[0].u
    }

    /// Finest-level right-hand side; written by the caller before `solve`.
    pub fn b0_mut(&mut self) -> &mut Field2D {
        &mut self.levels[0].b
    }

    fn check_level(&self, level: usize) -> Result<(), MgError> {
        if level < self.levels.len() {
            Ok(())
        } else {
            Err(MgError::InvalidLevel {
                level,
                count: self.levels.len(),
            })
        }
    }

    /// Transfer operators address a coarse level together with the next
    /// finer one, so level 0 is not a valid target.
    fn check_coarse_level(&self, level: usize) -> Result<(), MgError> {
        if level >= 1 && level < self.levels.len() {
            Ok(())
        } else {
            Err(MgError::InvalidLevel {
                level,
                count: self.levels.len(),
            })
        }
    }

    /// Refresh the ghost ring of `level` from its interior. Ghost forcing
    /// is only applied on level 0; coarser levels solve for a correction
    /// and mirror with zero forcing.
    pub fn apply_bc(&mut self, level: usize) -> Result<(), MgError> {
        self.check_level(level)?;
        let bcs = self.bcs;
        self.levels[level].apply_bc_impl(&bcs, level == 0);
        Ok(())
    }

    /// Red-black SOR smoothing: `iterations` sweeps of colour 0 then
    /// colour 1 (flipped when `reverse`, used on the up-leg to cancel
    /// directional bias), followed by one ghost refresh.
    pub fn relax(&mut self, level: usize, iterations: usize, reverse: bool) -> Result<(), MgError> {
        self.check_level(level)?;
        let bcs = self.bcs;
        {
            let lvl = &mut self.levels[level];
            let (w, h) = (lvl.dim.0 as isize, lvl.dim.1 as isize);
            let h2 = lvl.h * lvl.h;
            let colours: [isize; 2] = if reverse { [1, 0] } else { [0, 1] };

            for _ in 0..iterations {
                for &colour in &colours {
                    for y in 0..h {
                        let mut x = (colour + y) & 1;
                        while x < w {
                            // Diagonal: 4 plus the folded ghost relation of
                            // every domain edge this cell touches.
                            let mut m = 4.0;
                            if x == 0 {
                                m += bcs.neg_x.stencil_coeff();
                            }
                            if x == w - 1 {
                                m += bcs.pos_x.stencil_coeff();
                            }
                            if y == 0 {
                                m += bcs.neg_y.stencil_coeff();
                            }
                            if y == h - 1 {
                                m += bcs.pos_y.stencil_coeff();
                            }

                            let u = lvl.u.at(x, y);
                            let delta =
                                lvl.u.neighbour_sum(x, y) - h2 * lvl.b.at(x, y) - 4.0 * u;
                            lvl.u.set(x, y, u + OMEGA * delta / m);
                            x += 2;
                        }
                    }
                }
            }
        }
        self.apply_bc(level)
    }

    /// Recompute `r = b - (1/h^2)(sum4 - 4u)` over the interior and return
    /// its norms. `r` is scratch and fully overwritten.
    pub fn compute_residual(&mut self, level: usize) -> Result<Residual, MgError> {
        self.check_level(level)?;
        let lvl = &mut self.levels[level];
        let (w, h) = (lvl.dim.0 as isize, lvl.dim.1 as isize);
        let inv_h2 = 1.0 / (lvl.h * lvl.h);

        let mut linf = 0.0f64;
        let mut sum_sq = 0.0f64;
        for y in 0..h {
            for x in 0..w {
                let lap = (lvl.u.neighbour_sum(x, y) - 4.0 * lvl.u.at(x, y)) * inv_h2;
                let r = lvl.b.at(x, y) - lap;
                lvl.r.set(x, y, r);
                linf = linf.max(r.abs());
                sum_sq += r * r;
            }
        }

        Ok(Residual {
            linf,
            mse: sum_sq / (lvl.dim.0 * lvl.dim.1) as f64,
        })
    }

    /// Write `b` of `level` from `r` of the next finer level by plain 2x2
    /// block averaging.
    pub fn restrict_residual(&mut self, level: usize) -> Result<(), MgError> {
        self.check_coarse_level(level)?;
        let (finer, coarser) = self.levels.split_at_mut(level);
        let fine = &finer[level - 1];
        let coarse = &mut coarser[0];

        let (wc, hc) = (coarse.dim.0 as isize, coarse.dim.1 as isize);
        for j in 0..hc {
            for i in 0..wc {
                let (fi, fj) = (2 * i, 2 * j);
                let avg = 0.25
                    * (fine.r.at(fi, fj)
                        + fine.r.at(fi + 1, fj)
                        + fine.r.at(fi, fj + 1)
                        + fine.r.at(fi + 1, fj + 1));
                coarse.b.set(i, j, avg);
            }
        }
        Ok(())
    }

    /// Add the bilinear prolongation of `u` of `level` into `u` of the
    /// next finer level. Each fine cell gathers from its parent coarse
    /// cell and the three neighbours on its side of the 2x2 block; reads
    /// of coarse ghosts rely on the ghost refresh at the end of `relax`.
    pub fn prolong_v(&mut self, level: usize) -> Result<(), MgError> {
        self.check_coarse_level(level)?;
        let (finer, coarser) = self.levels.split_at_mut(level);
        let fine = &mut finer[level - 1];
        let coarse = &coarser[0];

        let (wf, hf) = (fine.dim.0 as isize, fine.dim.1 as isize);
        for y in 0..hf {
            let j = y >> 1;
            let oy = if y & 1 == 0 { -1 } else { 1 };
            for x in 0..wf {
                let i = x >> 1;
                let ox = if x & 1 == 0 { -1 } else { 1 };

                let corr = C0 * coarse.u.at(i, j)
                    + C1 * (coarse.u.at(i + ox, j) + coarse.u.at(i, j + oy))
                    + C2 * coarse.u.at(i + ox, j + oy);
                fine.u.add(x, y, corr);
            }
        }
        Ok(())
    }

    /// One V-cycle rooted at `fine`: pre-smooth and restrict down to the
    /// coarsest level, brute-force smooth there, then prolongate and
    /// post-smooth (reversed colour order) back up.
    pub fn v_cycle(&mut self, fine: usize) -> Result<(), MgError> {
        self.check_level(fine)?;
        let last = self.levels.len() - 1;
        let SolverParams { nu1, nu2, .. } = self.params;

        self.apply_bc(fine)?;

        for i in fine..last {
            self.relax(i, nu1, false)?;
            self.compute_residual(i)?;
            self.restrict_residual(i + 1)?;
            self.levels[i + 1].u.fill_zero();
            self.apply_bc(i + 1)?;
        }

        // Coarsest level: enough smoothing to act as an exact solve.
        self.relax(last, 2 * (nu1 + nu2), false)?;

        for i in (fine..last).rev() {
            self.prolong_v(i + 1)?;
            self.apply_bc(i)?;
            self.relax(i, nu2, true)?;
        }
        Ok(())
    }

    /// Full multigrid: cascade the right-hand side down once, then solve
    /// coarse-to-fine, running `nu_v` V-cycles per root level (`nu_v + 1`
    /// at the finest) and prolongating each result as the next-finer
    /// initial guess. Returns the final finest-level residual.
    pub fn do_fmg(&mut self) -> Result<Residual, MgError> {
        let last = self.levels.len() - 1;

        for i in 0..last {
            if i > 0 {
                self.levels[i].u.fill_zero();
            }
            self.apply_bc(i)?;
            self.compute_residual(i)?;
            self.restrict_residual(i + 1)?;
        }

        for fine in (0..=last).rev() {
            let cycles = if fine == 0 {
                self.params.nu_v + 1
            } else {
                self.params.nu_v
            };
            for _ in 0..cycles {
                self.v_cycle(fine)?;
            }
            if fine > 0 {
                self.prolong_v(fine)?;
            }
        }

        self.compute_residual(0)
    }

    /// Run FMG against `tolerance` (L∞ on the finest residual). A first
    /// failure zeroes the finest solution and retries once from scratch;
    /// a second failure is reported as [`MgError::Convergence`].
    pub fn solve(&mut self, tolerance: f64) -> Result<Residual, MgError> {
        let res = self.do_fmg()?;
        if res.linf <= tolerance {
            return Ok(res);
        }

        eprintln!(
            "[mg] fmg residual {:.3e} above tolerance {:.3e}, retrying with zeroed field",
            res.linf, tolerance
        );
        self.levels[0].u.fill_zero();

        let res = self.do_fmg()?;
        if res.linf <= tolerance {
            Ok(res)
        } else {
            Err(MgError::Convergence {
                residual: res.linf,
                tolerance,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(solver: &MultigridPoisson) -> Vec<(usize, usize)> {
        solver.levels().iter().map(|l| l.dim()).collect()
    }

    #[test]
    fn omega_is_the_yavneh_constant() {
        assert!((OMEGA - 1.171_572_875_253_809_9).abs() < 1e-15);
    }

    #[test]
    fn hierarchy_halts_once_an_axis_would_reach_four() {
        let s = MultigridPoisson::new((16, 16), 1.0).unwrap();
        assert_eq!(dims(&s), vec![(16, 16), (8, 8)]);

        let s = MultigridPoisson::new((64, 64), 1.0).unwrap();
        assert_eq!(dims(&s), vec![(64, 64), (32, 32), (16, 16), (8, 8)]);
    }

    #[test]
    fn hierarchy_supports_non_square_grids() {
        let s = MultigridPoisson::new((64, 16), 1.0).unwrap();
        assert_eq!(dims(&s), vec![(64, 16), (32, 8)]);
    }

    #[test]
    fn spacing_doubles_per_level() {
        let s = MultigridPoisson::new((64, 64), 0.5).unwrap();
        let spacings: Vec<f64> = s.levels().iter().map(|l| l.h()).collect();
        assert_eq!(spacings, vec![0.5, 1.0, 2.0, 4.0]);
    }

    #[test]
    fn non_power_of_two_is_rejected() {
        let err = MultigridPoisson::new((17, 16), 1.0).unwrap_err();
        assert!(matches!(
            err,
            MgError::NotPowerOfTwo {
                width: 17,
                height: 16
            }
        ));

        assert!(MultigridPoisson::new((16, 12), 1.0).is_err());
    }

    #[test]
    fn degenerate_sizes_are_rejected() {
        assert!(matches!(
            MultigridPoisson::new((4, 4), 1.0).unwrap_err(),
            MgError::TooSmall { .. }
        ));
        // 8x4 is power-of-two but one axis never exceeds 4.
        assert!(MultigridPoisson::new((8, 4), 1.0).is_err());
    }

    #[test]
    fn out_of_range_level_indices_are_explicit_failures() {
        let mut s = MultigridPoisson::new((16, 16), 1.0).unwrap();
        assert!(matches!(
            s.relax(2, 1, false).unwrap_err(),
            MgError::InvalidLevel { level: 2, count: 2 }
        ));
        assert!(s.compute_residual(5).is_err());
        // Level 0 has no finer partner for the transfer operators.
        assert!(matches!(
            s.restrict_residual(0).unwrap_err(),
            MgError::InvalidLevel { .. }
        ));
        assert!(s.prolong_v(0).is_err());
        assert!(s.prolong_v(2).is_err());
    }

    #[test]
    fn dirichlet_ghosts_mirror_the_interior() {
        let bcs = BoundarySet::uniform(BoundaryCondition::dirichlet(2.0));
        let mut s =
            MultigridPoisson::with_setup((16, 16), 1.0, bcs, SolverParams::default()).unwrap();
        s.u0_mut().set(0, 3, 1.0);
        s.apply_bc(0).unwrap();
        // ghost = 2*value - u_in
        assert_eq!(s.u0().at(-1, 3), 4.0 - 1.0);
        // coarse levels mirror with zero forcing
        s.apply_bc(1).unwrap();
        assert_eq!(s.levels()[1].u().at(-1, 0), 0.0);
    }

    #[test]
    fn neumann_ghosts_offset_by_h_times_value() {
        let bcs = BoundarySet::uniform(BoundaryCondition::neumann(3.0));
        let mut s =
            MultigridPoisson::with_setup((8, 8), 0.5, bcs, SolverParams::default()).unwrap();
        s.u0_mut().set(2, 0, 1.5);
        s.apply_bc(0).unwrap();
        // ghost = -h*value + u_in
        assert_eq!(s.u0().at(2, -1), -0.5 * 3.0 + 1.5);
    }
}
