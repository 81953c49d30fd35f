//! Single-partition structured mesh with shifted-metric alignment.

use std::f64::consts::PI;

use sheath_core::{Direction, Field2D, Field3D, MeshInstanceId, Region, Shape};

use crate::coordinates::Coordinates;
use crate::edge::YBoundary;
use crate::error::MeshError;
use crate::mesh::Mesh;
use crate::shift::ZShifter;

/// Minimum y guard width: the flux operators reconstruct face values
/// from a three-point stencil centred one cell outside the interior.
pub const MIN_Y_GUARDS: usize = 2;

type MetricFn = Box<dyn Fn(usize, usize) -> f64>;

/// A logically rectangular mesh held entirely by one partition.
///
/// Columns with `x < ixseps` are periodic in y (closed flux surfaces);
/// the rest are open. Field-aligned transforms shift each `(x, y)`
/// column in z by `z_shift(x, y)`.
///
/// # Examples
///
/// ```
/// use sheath_mesh::{Mesh, StructuredMesh};
///
/// let mesh = StructuredMesh::builder(4, 16, 8).dy(0.5).build().unwrap();
/// let s = mesh.shape();
/// assert_eq!((s.nx, s.ny, s.nz), (8, 20, 8));
/// assert!(mesh.first_y(2) && mesh.last_y(2));
/// assert!(!mesh.periodic_y(2));
/// ```
#[derive(Debug, Clone)]
pub struct StructuredMesh {
    shape: Shape,
    ixseps: usize,
    coords: Coordinates,
    shifter: ZShifter,
    instance_id: MeshInstanceId,
}

impl StructuredMesh {
    /// Start building a mesh with the given interior sizes.
    pub fn builder(nx: usize, ny: usize, nz: usize) -> StructuredMeshBuilder {
        StructuredMeshBuilder::new(nx, ny, nz)
    }

    /// First x index of the open region.
    pub fn ixseps(&self) -> usize {
        self.ixseps
    }

    /// Whether any `(x, y)` column has a non-zero toroidal shift.
    pub fn is_shifted(&self) -> bool {
        let s = self.shape;
        (0..s.nx).any(|x| (0..s.ny).any(|y| self.coords.z_shift[(x, y)] != 0.0))
    }

    fn shift_region(&self, f: &Field3D, region: Region, sign: f64) -> Field3D {
        let s = self.shape;
        let mut out = f.clone();
        let mut column = vec![0.0; s.nz];
        let mut scratch = Vec::with_capacity(s.nz);
        let data = out.as_mut_slice();
        for x in s.x_range(region) {
            for y in s.y_range(region) {
                let angle = sign * self.coords.z_shift[(x, y)];
                if angle == 0.0 {
                    continue;
                }
                let start = s.index(x, y, 0);
                column.copy_from_slice(&data[start..start + s.nz]);
                self.shifter.shift(&mut column, angle, &mut scratch);
                data[start..start + s.nz].copy_from_slice(&column);
            }
        }
        out
    }
}

impl Mesh for StructuredMesh {
    fn instance_id(&self) -> MeshInstanceId {
        self.instance_id
    }

    fn shape(&self) -> Shape {
        self.shape
    }

    fn coordinates(&self) -> &Coordinates {
        &self.coords
    }

    fn first_x(&self) -> bool {
        true
    }

    fn last_x(&self) -> bool {
        true
    }

    fn first_y(&self, _x: usize) -> bool {
        true
    }

    fn last_y(&self, _x: usize) -> bool {
        true
    }

    fn y_boundary(&self, x: usize) -> YBoundary {
        if x < self.ixseps {
            YBoundary::Periodic
        } else {
            YBoundary::Open
        }
    }

    fn to_field_aligned(&self, f: &Field3D, region: Region) -> Result<Field3D, MeshError> {
        self.check_owned(f)?;
        if f.direction() != Direction::Standard {
            return Err(MeshError::WrongDirection {
                expected: Direction::Standard,
                found: f.direction(),
            });
        }
        let mut out = self.shift_region(f, region, 1.0);
        out.set_direction(Direction::Aligned);
        Ok(out)
    }

    fn from_field_aligned(&self, f: &Field3D, region: Region) -> Result<Field3D, MeshError> {
        self.check_owned(f)?;
        if f.direction() != Direction::Aligned {
            return Err(MeshError::WrongDirection {
                expected: Direction::Aligned,
                found: f.direction(),
            });
        }
        let mut out = self.shift_region(f, region, -1.0);
        out.set_direction(Direction::Standard);
        Ok(out)
    }

    fn communicate(&self, f: &mut Field3D) -> Result<(), MeshError> {
        self.check_owned(f)?;
        let s = self.shape;
        let ny_int = s.yend() - s.ystart() + 1;
        for x in 0..s.nx.min(self.ixseps) {
            for g in 1..=s.myg {
                let lower = s.ystart() - g;
                let upper = s.yend() + g;
                for z in 0..s.nz {
                    f[(x, lower, z)] = f[(x, lower + ny_int, z)];
                    f[(x, upper, z)] = f[(x, upper - ny_int, z)];
                }
            }
        }
        Ok(())
    }
}

// ── Builder ────────────────────────────────────────────────────────

/// Builder for [`StructuredMesh`].
///
/// Metric coefficients default to a uniform Cartesian box with unit
/// spacing. Each can be set to a constant or to a function of the local
/// `(x, y)` index, guard cells included.
pub struct StructuredMeshBuilder {
    nx: usize,
    ny: usize,
    nz: usize,
    mxg: usize,
    myg: usize,
    ixseps: usize,
    dz: Option<f64>,
    j: MetricFn,
    g_22: MetricFn,
    g_23: MetricFn,
    g_12: MetricFn,
    dx: MetricFn,
    dy: MetricFn,
    z_shift: MetricFn,
}

impl StructuredMeshBuilder {
    fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self {
            nx,
            ny,
            nz,
            mxg: 2,
            myg: 2,
            ixseps: 0,
            dz: None,
            j: Box::new(|_, _| 1.0),
            g_22: Box::new(|_, _| 1.0),
            g_23: Box::new(|_, _| 0.0),
            g_12: Box::new(|_, _| 0.0),
            dx: Box::new(|_, _| 1.0),
            dy: Box::new(|_, _| 1.0),
            z_shift: Box::new(|_, _| 0.0),
        }
    }

    /// Guard cell widths in x and y.
    pub fn guards(mut self, mxg: usize, myg: usize) -> Self {
        self.mxg = mxg;
        self.myg = myg;
        self
    }

    /// Columns with local `x < ixseps` are periodic in y.
    pub fn ixseps(mut self, ixseps: usize) -> Self {
        self.ixseps = ixseps;
        self
    }

    /// Make every column periodic in y.
    pub fn periodic_y(mut self) -> Self {
        self.ixseps = usize::MAX;
        self
    }

    /// Uniform toroidal spacing. Defaults to `2π / nz`.
    pub fn dz(mut self, dz: f64) -> Self {
        self.dz = Some(dz);
        self
    }

    /// Uniform radial spacing.
    pub fn dx(mut self, dx: f64) -> Self {
        self.dx = Box::new(move |_, _| dx);
        self
    }

    /// Uniform parallel spacing.
    pub fn dy(mut self, dy: f64) -> Self {
        self.dy = Box::new(move |_, _| dy);
        self
    }

    /// Parallel spacing as a function of `(x, y)`.
    pub fn dy_fn(mut self, f: impl Fn(usize, usize) -> f64 + 'static) -> Self {
        self.dy = Box::new(f);
        self
    }

    /// Jacobian as a function of `(x, y)`.
    pub fn jacobian_fn(mut self, f: impl Fn(usize, usize) -> f64 + 'static) -> Self {
        self.j = Box::new(f);
        self
    }

    /// `g_22` as a function of `(x, y)`.
    pub fn g_22_fn(mut self, f: impl Fn(usize, usize) -> f64 + 'static) -> Self {
        self.g_22 = Box::new(f);
        self
    }

    /// Uniform `g_23`.
    pub fn g_23(mut self, v: f64) -> Self {
        self.g_23 = Box::new(move |_, _| v);
        self
    }

    /// Uniform `g_12`.
    pub fn g_12(mut self, v: f64) -> Self {
        self.g_12 = Box::new(move |_, _| v);
        self
    }

    /// Toroidal shift as a function of `(x, y)`.
    pub fn z_shift_fn(mut self, f: impl Fn(usize, usize) -> f64 + 'static) -> Self {
        self.z_shift = Box::new(f);
        self
    }

    /// Validate and construct the mesh.
    pub fn build(self) -> Result<StructuredMesh, MeshError> {
        if self.nx == 0 || self.ny == 0 || self.nz == 0 {
            return Err(MeshError::EmptyMesh);
        }
        if self.myg < MIN_Y_GUARDS {
            return Err(MeshError::InsufficientGuards {
                direction: "y",
                found: self.myg,
                required: MIN_Y_GUARDS,
            });
        }
        if self.mxg < 1 {
            return Err(MeshError::InsufficientGuards {
                direction: "x",
                found: self.mxg,
                required: 1,
            });
        }
        let shape = Shape::new(self.nx, self.ny, self.nz, self.mxg, self.myg);
        let id = MeshInstanceId::next();
        let dz = self.dz.unwrap_or(2.0 * PI / self.nz as f64);
        if !(dz > 0.0 && dz.is_finite()) {
            return Err(MeshError::InvalidMetric {
                name: "dz",
                x: 0,
                y: 0,
                value: dz,
            });
        }

        let positive = |name: &'static str, f: &MetricFn| -> Result<Field2D, MeshError> {
            let field = Field2D::from_fn(id, shape, f);
            for x in 0..shape.nx {
                for y in 0..shape.ny {
                    let value = field[(x, y)];
                    if !(value > 0.0 && value.is_finite()) {
                        return Err(MeshError::InvalidMetric { name, x, y, value });
                    }
                }
            }
            Ok(field)
        };

        let coords = Coordinates {
            j: positive("J", &self.j)?,
            g_22: positive("g_22", &self.g_22)?,
            g_23: Field2D::from_fn(id, shape, &self.g_23),
            g_12: Field2D::from_fn(id, shape, &self.g_12),
            dx: positive("dx", &self.dx)?,
            dy: positive("dy", &self.dy)?,
            dz,
            z_shift: Field2D::from_fn(id, shape, &self.z_shift),
        };
        let ixseps = self.ixseps.min(shape.nx);
        log::debug!(
            "built {id}: {}x{}x{} with guards ({}, {}), {ixseps} periodic columns",
            shape.nx,
            shape.ny,
            shape.nz,
            shape.mxg,
            shape.myg
        );
        Ok(StructuredMesh {
            shape,
            ixseps,
            shifter: ZShifter::new(shape.nz, coords.zlength(shape.nz)),
            coords,
            instance_id: id,
        })
    }
}
