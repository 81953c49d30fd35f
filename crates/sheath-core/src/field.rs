//! Structured-grid fields with guard cells.
//!
//! A [`Field3D`] stores one `f64` per cell of the local `(x, y, z)` index
//! space, guard cells included. `x` is the radial index, `y` the
//! parallel (along-field) index, and `z` the periodic toroidal index,
//! which carries no guard cells. [`Field2D`] is the axisymmetric
//! counterpart used for metric coefficients.
//!
//! Every field carries a [`FieldLayout`]: the id of the mesh it was
//! built on, its [`Shape`], and its y-[`Direction`]. Binary operations
//! require identical layouts. The `std::ops` implementations panic on a
//! mismatch (as `ndarray` does for shape mismatches); the `try_*` methods
//! report [`FieldError::Incompatible`] instead and are what component code
//! uses on values read back from the shared state.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};
use std::ops::RangeInclusive;

use crate::error::FieldError;
use crate::id::MeshInstanceId;

/// Local extent of a mesh partition, guard cells included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Local x extent including `2 * mxg` guard cells.
    pub nx: usize,
    /// Local y extent including `2 * myg` guard cells.
    pub ny: usize,
    /// Number of z points (periodic, no guards).
    pub nz: usize,
    /// Guard cells on each side in x.
    pub mxg: usize,
    /// Guard cells on each side in y.
    pub myg: usize,
}

impl Shape {
    /// Build a shape from interior sizes and guard widths.
    pub fn new(nx_interior: usize, ny_interior: usize, nz: usize, mxg: usize, myg: usize) -> Self {
        Self {
            nx: nx_interior + 2 * mxg,
            ny: ny_interior + 2 * myg,
            nz,
            mxg,
            myg,
        }
    }

    /// First interior x index.
    pub fn xstart(&self) -> usize {
        self.mxg
    }

    /// Last interior x index.
    pub fn xend(&self) -> usize {
        self.nx - self.mxg - 1
    }

    /// First interior y index.
    pub fn ystart(&self) -> usize {
        self.myg
    }

    /// Last interior y index.
    pub fn yend(&self) -> usize {
        self.ny - self.myg - 1
    }

    /// Total number of 3D cells.
    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Whether the shape has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of `(x, y, z)` in row-major `[x][y][z]` order.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.ny + y) * self.nz + z
    }

    /// Flat index of `(x, y)` for axisymmetric data.
    #[inline]
    pub fn index_2d(&self, x: usize, y: usize) -> usize {
        x * self.ny + y
    }

    /// x indices covered by a region.
    pub fn x_range(&self, region: Region) -> RangeInclusive<usize> {
        match region {
            Region::All | Region::NoY => 0..=self.nx - 1,
            Region::NoBoundary | Region::NoX => self.xstart()..=self.xend(),
        }
    }

    /// y indices covered by a region.
    pub fn y_range(&self, region: Region) -> RangeInclusive<usize> {
        match region {
            Region::All | Region::NoX => 0..=self.ny - 1,
            Region::NoBoundary | Region::NoY => self.ystart()..=self.yend(),
        }
    }

    /// Iterate `(x, y, z)` over a region in storage order.
    pub fn iter(&self, region: Region) -> impl Iterator<Item = (usize, usize, usize)> {
        let nz = self.nz;
        let ys = self.y_range(region);
        self.x_range(region).flat_map(move |x| {
            ys.clone()
                .flat_map(move |y| (0..nz).map(move |z| (x, y, z)))
        })
    }
}

/// Index regions, named after what they exclude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    /// Every cell, guards included.
    All,
    /// Interior cells only: no x or y guard cells.
    NoBoundary,
    /// Interior in x, every y (guards included).
    NoX,
    /// Interior in y, every x (guards included).
    NoY,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::All => "all",
            Self::NoBoundary => "no-boundary",
            Self::NoX => "no-x",
            Self::NoY => "no-y",
        };
        f.write_str(name)
    }
}

/// Which y coordinate a field's values are expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Standard (orthogonal toroidal) coordinates.
    Standard,
    /// Field-aligned coordinates: y index lines follow magnetic field lines.
    Aligned,
}

/// Everything that must match for two fields to be combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldLayout {
    /// Mesh the field was created on.
    pub mesh: MeshInstanceId,
    /// Local extent.
    pub shape: Shape,
    /// y coordinate representation.
    pub direction: Direction,
}

impl fmt::Display for FieldLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}x{}x{} ({:?})",
            self.mesh, self.shape.nx, self.shape.ny, self.shape.nz, self.direction
        )
    }
}

// ── Field2D ────────────────────────────────────────────────────────

/// An axisymmetric `(x, y)` field, used for metric coefficients.
#[derive(Clone, Debug, PartialEq)]
pub struct Field2D {
    mesh: MeshInstanceId,
    shape: Shape,
    data: Vec<f64>,
}

impl Field2D {
    /// A field with every cell set to `value`.
    pub fn filled(mesh: MeshInstanceId, shape: Shape, value: f64) -> Self {
        Self {
            mesh,
            shape,
            data: vec![value; shape.nx * shape.ny],
        }
    }

    /// A field evaluated pointwise from `f(x, y)`.
    pub fn from_fn(mesh: MeshInstanceId, shape: Shape, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(shape.nx * shape.ny);
        for x in 0..shape.nx {
            for y in 0..shape.ny {
                data.push(f(x, y));
            }
        }
        Self { mesh, shape, data }
    }

    /// Mesh this field belongs to.
    pub fn mesh_id(&self) -> MeshInstanceId {
        self.mesh
    }

    /// Local extent.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Broadcast along z into a [`Field3D`] in standard direction.
    pub fn broadcast(&self) -> Field3D {
        let shape = self.shape;
        Field3D::from_fn(self.mesh, shape, |x, y, _| self[(x, y)])
    }

    /// Smallest value over every cell.
    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

impl Index<(usize, usize)> for Field2D {
    type Output = f64;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &f64 {
        &self.data[self.shape.index_2d(x, y)]
    }
}

impl IndexMut<(usize, usize)> for Field2D {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut f64 {
        let i = self.shape.index_2d(x, y);
        &mut self.data[i]
    }
}

// ── Field3D ────────────────────────────────────────────────────────

/// A scalar field over the full local 3D index space.
#[derive(Clone, Debug, PartialEq)]
pub struct Field3D {
    layout: FieldLayout,
    data: Vec<f64>,
}

impl Field3D {
    /// A standard-direction field with every cell set to `value`.
    pub fn filled(mesh: MeshInstanceId, shape: Shape, value: f64) -> Self {
        Self {
            layout: FieldLayout {
                mesh,
                shape,
                direction: Direction::Standard,
            },
            data: vec![value; shape.len()],
        }
    }

    /// A standard-direction field evaluated pointwise from `f(x, y, z)`.
    pub fn from_fn(
        mesh: MeshInstanceId,
        shape: Shape,
        f: impl Fn(usize, usize, usize) -> f64,
    ) -> Self {
        let mut data = Vec::with_capacity(shape.len());
        for x in 0..shape.nx {
            for y in 0..shape.ny {
                for z in 0..shape.nz {
                    data.push(f(x, y, z));
                }
            }
        }
        Self {
            layout: FieldLayout {
                mesh,
                shape,
                direction: Direction::Standard,
            },
            data,
        }
    }

    /// Wrap an existing buffer in `[x][y][z]` order.
    pub fn from_vec(mesh: MeshInstanceId, shape: Shape, data: Vec<f64>) -> Result<Self, FieldError> {
        if data.len() != shape.len() {
            return Err(FieldError::LengthMismatch {
                expected: shape.len(),
                found: data.len(),
            });
        }
        Ok(Self {
            layout: FieldLayout {
                mesh,
                shape,
                direction: Direction::Standard,
            },
            data,
        })
    }

    /// A zero field with the same layout as `self`, direction included.
    pub fn zeros_like(&self) -> Self {
        Self {
            layout: self.layout,
            data: vec![0.0; self.data.len()],
        }
    }

    /// Layout of this field.
    pub fn layout(&self) -> FieldLayout {
        self.layout
    }

    /// Local extent.
    pub fn shape(&self) -> Shape {
        self.layout.shape
    }

    /// Mesh this field belongs to.
    pub fn mesh_id(&self) -> MeshInstanceId {
        self.layout.mesh
    }

    /// Current y-direction tag.
    pub fn direction(&self) -> Direction {
        self.layout.direction
    }

    /// Retag the y direction without touching the data.
    ///
    /// Only coordinate transforms should call this.
    pub fn set_direction(&mut self, direction: Direction) {
        self.layout.direction = direction;
    }

    /// Flat data in `[x][y][z]` order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable flat data in `[x][y][z]` order.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Bounds-checked read.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Result<f64, FieldError> {
        let s = self.layout.shape;
        if x >= s.nx || y >= s.ny || z >= s.nz {
            return Err(FieldError::IndexOutOfBounds {
                index: (x, y, z),
                extent: (s.nx, s.ny, s.nz),
            });
        }
        Ok(self.data[s.index(x, y, z)])
    }

    /// Whether `other` can be combined with `self`.
    pub fn is_compatible(&self, other: &Field3D) -> bool {
        self.layout == other.layout
    }

    /// Fail with [`FieldError::Incompatible`] unless layouts match.
    pub fn check_compatible(&self, other: &Field3D, operation: &str) -> Result<(), FieldError> {
        if self.is_compatible(other) {
            Ok(())
        } else {
            Err(FieldError::Incompatible {
                operation: operation.to_string(),
                expected: self.layout,
                found: other.layout,
            })
        }
    }

    /// Apply `f` to every cell.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Field3D {
        Field3D {
            layout: self.layout,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two compatible fields cell by cell.
    pub fn zip_map(
        &self,
        other: &Field3D,
        operation: &str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Field3D, FieldError> {
        self.check_compatible(other, operation)?;
        Ok(Field3D {
            layout: self.layout,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Checked `self + other`.
    pub fn try_add(&self, other: &Field3D) -> Result<Field3D, FieldError> {
        self.zip_map(other, "add", |a, b| a + b)
    }

    /// Checked `self - other`.
    pub fn try_sub(&self, other: &Field3D) -> Result<Field3D, FieldError> {
        self.zip_map(other, "sub", |a, b| a - b)
    }

    /// Checked `self * other`.
    pub fn try_mul(&self, other: &Field3D) -> Result<Field3D, FieldError> {
        self.zip_map(other, "mul", |a, b| a * b)
    }

    /// Checked `self / other`.
    pub fn try_div(&self, other: &Field3D) -> Result<Field3D, FieldError> {
        self.zip_map(other, "div", |a, b| a / b)
    }

    /// Pointwise exponential.
    pub fn exp(&self) -> Field3D {
        self.map(f64::exp)
    }

    /// Pointwise natural logarithm.
    pub fn ln(&self) -> Field3D {
        self.map(f64::ln)
    }

    /// Pointwise square root.
    pub fn sqrt(&self) -> Field3D {
        self.map(f64::sqrt)
    }

    /// Pointwise `max(value, min)`.
    pub fn floor(&self, min: f64) -> Field3D {
        self.map(|v| if v < min { min } else { v })
    }

    /// Pointwise clamp into `[lo, hi]`.
    pub fn clamp(&self, lo: f64, hi: f64) -> Field3D {
        self.map(|v| {
            if v < lo {
                lo
            } else if v > hi {
                hi
            } else {
                v
            }
        })
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Largest absolute value over a region.
    pub fn max_abs(&self, region: Region) -> f64 {
        let shape = self.layout.shape;
        shape
            .iter(region)
            .map(|(x, y, z)| self.data[shape.index(x, y, z)].abs())
            .fold(0.0, f64::max)
    }

    /// First non-finite cell in a region, in storage order.
    pub fn first_non_finite(&self, region: Region) -> Option<(usize, usize, usize)> {
        let shape = self.layout.shape;
        shape
            .iter(region)
            .find(|&(x, y, z)| !self.data[shape.index(x, y, z)].is_finite())
    }

    fn assert_compatible(&self, other: &Field3D, op: &str) {
        assert!(
            self.is_compatible(other),
            "incompatible fields in '{op}': {} vs {}",
            self.layout,
            other.layout
        );
    }
}

impl Index<(usize, usize, usize)> for Field3D {
    type Output = f64;

    #[inline]
    fn index(&self, (x, y, z): (usize, usize, usize)) -> &f64 {
        &self.data[self.layout.shape.index(x, y, z)]
    }
}

impl IndexMut<(usize, usize, usize)> for Field3D {
    #[inline]
    fn index_mut(&mut self, (x, y, z): (usize, usize, usize)) -> &mut f64 {
        let i = self.layout.shape.index(x, y, z);
        &mut self.data[i]
    }
}

// ── Arithmetic ─────────────────────────────────────────────────────
//
// Field-field operators panic on layout mismatch; see the module docs.

macro_rules! field_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&Field3D> for &Field3D {
            type Output = Field3D;

            fn $method(self, rhs: &Field3D) -> Field3D {
                self.assert_compatible(rhs, stringify!($method));
                Field3D {
                    layout: self.layout,
                    data: self
                        .data
                        .iter()
                        .zip(&rhs.data)
                        .map(|(&a, &b)| a $op b)
                        .collect(),
                }
            }
        }

        impl $trait<&Field3D> for Field3D {
            type Output = Field3D;

            fn $method(self, rhs: &Field3D) -> Field3D {
                (&self).$method(rhs)
            }
        }

        impl $trait<f64> for &Field3D {
            type Output = Field3D;

            fn $method(self, rhs: f64) -> Field3D {
                self.map(|a| a $op rhs)
            }
        }

        impl $trait<f64> for Field3D {
            type Output = Field3D;

            fn $method(mut self, rhs: f64) -> Field3D {
                for v in &mut self.data {
                    *v = *v $op rhs;
                }
                self
            }
        }
    };
}

field_binop!(Add, add, +);
field_binop!(Sub, sub, -);
field_binop!(Mul, mul, *);
field_binop!(Div, div, /);

impl Mul<&Field3D> for f64 {
    type Output = Field3D;

    fn mul(self, rhs: &Field3D) -> Field3D {
        rhs.map(|v| self * v)
    }
}

impl Neg for Field3D {
    type Output = Field3D;

    fn neg(mut self) -> Field3D {
        for v in &mut self.data {
            *v = -*v;
        }
        self
    }
}

impl AddAssign<&Field3D> for Field3D {
    fn add_assign(&mut self, rhs: &Field3D) {
        self.assert_compatible(rhs, "add_assign");
        for (a, &b) in self.data.iter_mut().zip(&rhs.data) {
            *a += b;
        }
    }
}

impl SubAssign<&Field3D> for Field3D {
    fn sub_assign(&mut self, rhs: &Field3D) {
        self.assert_compatible(rhs, "sub_assign");
        for (a, &b) in self.data.iter_mut().zip(&rhs.data) {
            *a -= b;
        }
    }
}

impl MulAssign<f64> for Field3D {
    fn mul_assign(&mut self, rhs: f64) {
        for v in &mut self.data {
            *v *= rhs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn shape() -> Shape {
        Shape::new(3, 4, 2, 1, 2)
    }

    #[test]
    fn shape_bounds() {
        let s = shape();
        assert_eq!((s.nx, s.ny, s.nz), (5, 8, 2));
        assert_eq!((s.xstart(), s.xend()), (1, 3));
        assert_eq!((s.ystart(), s.yend()), (2, 5));
        assert_eq!(s.len(), 80);
    }

    #[test]
    fn region_iteration_counts() {
        let s = shape();
        assert_eq!(s.iter(Region::All).count(), 80);
        assert_eq!(s.iter(Region::NoBoundary).count(), 3 * 4 * 2);
        assert_eq!(s.iter(Region::NoX).count(), 3 * 8 * 2);
        assert_eq!(s.iter(Region::NoY).count(), 5 * 4 * 2);
    }

    #[test]
    fn from_fn_matches_index() {
        let mesh = MeshInstanceId::next();
        let f = Field3D::from_fn(mesh, shape(), |x, y, z| (100 * x + 10 * y + z) as f64);
        assert_eq!(f[(2, 3, 1)], 231.0);
        assert_eq!(f.get(4, 7, 1).unwrap(), 471.0);
        assert!(f.get(5, 0, 0).is_err());
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let mesh = MeshInstanceId::next();
        let err = Field3D::from_vec(mesh, shape(), vec![0.0; 3]).unwrap_err();
        assert_eq!(
            err,
            FieldError::LengthMismatch {
                expected: 80,
                found: 3
            }
        );
    }

    #[test]
    fn try_ops_reject_other_mesh() {
        let a = Field3D::filled(MeshInstanceId::next(), shape(), 1.0);
        let b = Field3D::filled(MeshInstanceId::next(), shape(), 1.0);
        assert!(matches!(
            a.try_add(&b),
            Err(FieldError::Incompatible { .. })
        ));
    }

    #[test]
    fn try_ops_reject_other_direction() {
        let mesh = MeshInstanceId::next();
        let a = Field3D::filled(mesh, shape(), 1.0);
        let mut b = a.clone();
        b.set_direction(Direction::Aligned);
        assert!(a.try_mul(&b).is_err());
    }

    #[test]
    #[should_panic(expected = "incompatible fields")]
    fn operator_panics_on_mismatch() {
        let a = Field3D::filled(MeshInstanceId::next(), shape(), 1.0);
        let b = Field3D::filled(MeshInstanceId::next(), shape(), 1.0);
        let _ = &a + &b;
    }

    #[test]
    fn clamp_and_floor() {
        let mesh = MeshInstanceId::next();
        let f = Field3D::from_fn(mesh, shape(), |x, _, _| x as f64 - 2.0);
        let c = f.clamp(-1.0, 1.0);
        assert_eq!(c[(0, 0, 0)], -1.0);
        assert_eq!(c[(2, 0, 0)], 0.0);
        assert_eq!(c[(4, 0, 0)], 1.0);
        let fl = f.floor(0.5);
        assert_eq!(fl[(0, 0, 0)], 0.5);
        assert_eq!(fl[(4, 0, 0)], 2.0);
    }

    #[test]
    fn first_non_finite_respects_region() {
        let mesh = MeshInstanceId::next();
        let mut f = Field3D::filled(mesh, shape(), 1.0);
        f[(0, 0, 0)] = f64::NAN;
        assert_eq!(f.first_non_finite(Region::NoBoundary), None);
        assert_eq!(f.first_non_finite(Region::All), Some((0, 0, 0)));
        f[(2, 3, 1)] = f64::INFINITY;
        assert_eq!(f.first_non_finite(Region::NoBoundary), Some((2, 3, 1)));
    }

    #[test]
    fn broadcast_copies_along_z() {
        let mesh = MeshInstanceId::next();
        let g = Field2D::from_fn(mesh, shape(), |x, y| (x * 10 + y) as f64);
        let f = g.broadcast();
        assert_eq!(f[(3, 2, 0)], 32.0);
        assert_eq!(f[(3, 2, 1)], 32.0);
    }

    proptest! {
        #[test]
        fn add_then_sub_is_identity(a in -1e6f64..1e6, b in -1e6f64..1e6) {
            let mesh = MeshInstanceId::next();
            let fa = Field3D::filled(mesh, shape(), a);
            let fb = Field3D::filled(mesh, shape(), b);
            let back = &(&fa + &fb) - &fb;
            for (&x, &y) in back.as_slice().iter().zip(fa.as_slice()) {
                prop_assert!((x - y).abs() <= 1e-9 * (1.0 + y.abs()));
            }
        }

        #[test]
        fn clamp_stays_in_bounds(v in -1e3f64..1e3, lo in -10f64..0.0, width in 0.0f64..10.0) {
            let mesh = MeshInstanceId::next();
            let f = Field3D::filled(mesh, shape(), v).clamp(lo, lo + width);
            for &x in f.as_slice() {
                prop_assert!(x >= lo && x <= lo + width);
            }
        }
    }
}
