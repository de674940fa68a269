// src/boundary.rs

/// Kind of condition imposed on one domain edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BcType {
    /// No condition: the ghost row is left at zero.
    None,
    /// Fixed value on the edge (mirrored through the ghost row).
    Dirichlet,
    /// Fixed normal derivative on the edge.
    Neumann,
}

/// Boundary condition for one oriented edge, together with its derived
/// stencil coefficient.
///
/// The ghost cell next to an interior cell `u_in` is written as
/// `forcing - M * u_in`:
///
/// - Dirichlet value v: ghost = 2v - u_in      (M = +1, forcing = 2v)
/// - Neumann value g:   ghost = u_in - h*g     (M = -1, forcing = -h*g)
///
/// Folding the ghost relation into the 5-point stencil adds `M` to the
/// diagonal of edge-adjacent cells, which is how the smoother accounts
/// for the boundary without re-reading ghost state mid-sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryCondition {
    pub kind: BcType,
    pub value: f64,
}

impl BoundaryCondition {
    pub fn dirichlet(value: f64) -> Self {
        Self {
            kind: BcType::Dirichlet,
            value,
        }
    }

    pub fn neumann(value: f64) -> Self {
        Self {
            kind: BcType::Neumann,
            value,
        }
    }

    pub fn none() -> Self {
        Self {
            kind: BcType::None,
            value: 0.0,
        }
    }

    /// Contribution of this edge to the stencil diagonal of adjacent cells.
    #[inline]
    pub fn stencil_coeff(&self) -> f64 {
        match self.kind {
            BcType::None => 0.0,
            BcType::Dirichlet => 1.0,
            BcType::Neumann => -1.0,
        }
    }

    /// Ghost forcing term for grid spacing `h`.
    ///
    /// Only the finest level carries this term; coarser levels solve for a
    /// correction and use zero forcing with the same stencil coefficient.
    #[inline]
    pub fn ghost_forcing(&self, h: f64) -> f64 {
        match self.kind {
            BcType::None => 0.0,
            BcType::Dirichlet => 2.0 * self.value,
            BcType::Neumann => -h * self.value,
        }
    }
}

/// One condition per oriented domain edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundarySet {
    pub neg_x: BoundaryCondition,
    pub pos_x: BoundaryCondition,
    pub neg_y: BoundaryCondition,
    pub pos_y: BoundaryCondition,
}

impl BoundarySet {
    /// Homogeneous Dirichlet on all four edges.
    pub fn dirichlet_zero() -> Self {
        Self::uniform(BoundaryCondition::dirichlet(0.0))
    }

    /// Same condition on all four edges.
    pub fn uniform(bc: BoundaryCondition) -> Self {
        Self {
            neg_x: bc,
            pos_x: bc,
            neg_y: bc,
            pos_y: bc,
        }
    }
}

impl Default for BoundarySet {
    fn default() -> Self {
        Self::dirichlet_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stencil_coefficients_match_bc_kind() {
        assert_eq!(BoundaryCondition::dirichlet(1.0).stencil_coeff(), 1.0);
        assert_eq!(BoundaryCondition::neumann(1.0).stencil_coeff(), -1.0);
        assert_eq!(BoundaryCondition::none().stencil_coeff(), 0.0);
    }

    #[test]
    fn ghost_forcing_scales_as_documented() {
        let d = BoundaryCondition::dirichlet(3.0);
        assert_eq!(d.ghost_forcing(0.5), 6.0);

        let n = BoundaryCondition::neumann(3.0);
        assert_eq!(n.ghost_forcing(0.5), -1.5);

        assert_eq!(BoundaryCondition::none().ghost_forcing(0.5), 0.0);
    }
}
