//! Three-point face reconstruction with slope limiters.
//!
//! A [`Stencil1D`] holds the cell-centre values `m`, `c`, `p` of a cell
//! and its two neighbours along one index direction. A [`CellEdges`]
//! limiter fills in the reconstructed values `l` and `r` on the cell's
//! left and right faces.

/// Cell-centre values around one cell and its reconstructed face values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stencil1D {
    /// Value in the cell below.
    pub m: f64,
    /// Value in this cell.
    pub c: f64,
    /// Value in the cell above.
    pub p: f64,
    /// Reconstructed value on the lower face.
    pub l: f64,
    /// Reconstructed value on the upper face.
    pub r: f64,
}

impl Stencil1D {
    /// A stencil with faces not yet reconstructed.
    #[inline]
    pub fn new(m: f64, c: f64, p: f64) -> Self {
        Self {
            m,
            c,
            p,
            l: c,
            r: c,
        }
    }

    /// A stencil with faces reconstructed by `limiter`.
    #[inline]
    pub fn reconstruct<L: CellEdges + ?Sized>(m: f64, c: f64, p: f64, limiter: &L) -> Self {
        let mut s = Self::new(m, c, p);
        limiter.edges(&mut s);
        s
    }
}

/// A face reconstruction scheme.
pub trait CellEdges {
    /// Short name for logs and benchmarks.
    fn name(&self) -> &'static str;

    /// Set `s.l` and `s.r` from `s.m`, `s.c`, `s.p`.
    fn edges(&self, s: &mut Stencil1D);
}

/// `minmod(a, b)`: the smaller magnitude if signs agree, else zero.
#[inline]
pub fn minmod(a: f64, b: f64) -> f64 {
    if a * b <= 0.0 {
        0.0
    } else if a.abs() < b.abs() {
        a
    } else {
        b
    }
}

/// Three-argument minmod.
#[inline]
pub fn minmod3(a: f64, b: f64, c: f64) -> f64 {
    if a * b <= 0.0 || b * c <= 0.0 {
        return 0.0;
    }
    a.signum() * a.abs().min(b.abs()).min(c.abs())
}

/// First-order donor cell: both faces take the centre value.
#[derive(Clone, Copy, Debug, Default)]
pub struct Upwind;

impl CellEdges for Upwind {
    fn name(&self) -> &'static str {
        "upwind"
    }

    fn edges(&self, s: &mut Stencil1D) {
        s.l = s.c;
        s.r = s.c;
    }
}

/// Fromm's unlimited central slope.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fromm;

impl CellEdges for Fromm {
    fn name(&self) -> &'static str {
        "fromm"
    }

    fn edges(&self, s: &mut Stencil1D) {
        let half_slope = 0.25 * (s.p - s.m);
        s.l = s.c - half_slope;
        s.r = s.c + half_slope;
    }
}

/// Minmod-limited slope.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinMod;

impl CellEdges for MinMod {
    fn name(&self) -> &'static str {
        "minmod"
    }

    fn edges(&self, s: &mut Stencil1D) {
        let slope = minmod(s.p - s.c, s.c - s.m);
        s.l = s.c - 0.5 * slope;
        s.r = s.c + 0.5 * slope;
    }
}

/// Monotonised central limiter. The default for every flux operator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mc;

impl CellEdges for Mc {
    fn name(&self) -> &'static str {
        "mc"
    }

    fn edges(&self, s: &mut Stencil1D) {
        let slope = minmod3(2.0 * (s.p - s.c), 0.5 * (s.p - s.m), 2.0 * (s.c - s.m));
        s.l = s.c - 0.5 * slope;
        s.r = s.c + 0.5 * slope;
    }
}
