//! Species parallel momentum evolution.
//!
//! [`EvolveMomentum`] evolves `NV`, the parallel momentum density of one
//! species. Its `transform` needs the density and atomic mass published
//! by the same species' density component, so it declares them as
//! transform reads and always runs after it.

use sheath_core::state::keys;
use sheath_core::{Field3D, Options};
use sheath_mesh::Mesh;
use sheath_ops::{div_n_bxgrad_f_b_xppm, div_par_fvv, grad_par};
use smallvec::smallvec;

use sheath_component::{
    BuildContext, Component, ComponentError, FinallyContext, StateKey, StateKeys,
    TransformContext, VarId,
};

use crate::profile::initial_profile;

/// Type tag used in the `type` option.
pub const EVOLVE_MOMENTUM: &str = "evolve_momentum";

/// Evolves the parallel momentum of one species.
#[derive(Debug)]
pub struct EvolveMomentum {
    name: String,
    var: VarId,
    bndry_flux: bool,
    poloidal_flows: bool,
    density_floor: f64,
}

impl EvolveMomentum {
    /// Build from the `name` section of `options` and register `NV<name>`,
    /// initialised from `NV<name>:function`.
    pub fn from_options(
        name: &str,
        options: &mut Options,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Self, ComponentError> {
        let label = format!("{name} ({EVOLVE_MOMENTUM})");
        let nvname = format!("NV{name}");

        let initial = initial_profile(options.section_mut(&nvname), ctx.mesh())?;
        let var = ctx.add_variable(&nvname, initial, &label)?;

        let opts = options.section_mut(name);
        let bndry_flux = opts.get_or("bndry_flux", true, "Allow flows through radial boundaries")?;
        let poloidal_flows = opts.get_or("poloidal_flows", true, "Include poloidal ExB flow")?;
        let density_floor = opts.get_or("density_floor", 1e-5, "Minimum density floor")?;

        Ok(Self {
            name: name.to_string(),
            var,
            bndry_flux,
            poloidal_flows,
            density_floor,
        })
    }

    /// Handle of `NV<name>`.
    pub fn variable(&self) -> VarId {
        self.var
    }
}

impl Component for EvolveMomentum {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        EVOLVE_MOMENTUM
    }

    fn publishes(&self) -> StateKeys {
        smallvec![
            StateKey::species(&self.name, keys::MOMENTUM),
            StateKey::species(&self.name, keys::VELOCITY),
        ]
    }

    fn transform_reads(&self) -> StateKeys {
        smallvec![
            StateKey::species(&self.name, keys::DENSITY),
            StateKey::species(&self.name, keys::ATOMIC_MASS),
        ]
    }

    fn transform(&mut self, ctx: &mut TransformContext<'_>) -> Result<(), ComponentError> {
        let mut nv = ctx.value(self.var)?.clone();
        ctx.mesh().communicate(&mut nv)?;

        let species = ctx.state().require_species(&self.name)?;
        let n = species.get_field(keys::DENSITY)?;
        let atomic_mass = species.get_real(keys::ATOMIC_MASS)?;
        // floored so an empty cell has zero velocity, not NaN
        let velocity = nv.try_div(&(n.floor(self.density_floor) * atomic_mass))?;

        let label = self.label();
        let species = ctx.state_mut().species_mut(&self.name);
        species.set(keys::MOMENTUM, nv, &label)?;
        species.set(keys::VELOCITY, velocity, &label)?;
        Ok(())
    }

    fn finally(&mut self, ctx: &mut FinallyContext<'_>) -> Result<(), ComponentError> {
        let mesh: &dyn Mesh = ctx.mesh();
        let species = ctx.state().require_species(&self.name)?;
        let nv = species.get_field(keys::MOMENTUM)?;

        let mut ddt = match ctx.state().fields().field_opt(keys::PHI)? {
            Some(phi) => -div_n_bxgrad_f_b_xppm(mesh, nv, phi, self.bndry_flux, self.poloidal_flows)?,
            None => nv.zeros_like(),
        };

        let n = species.get_field(keys::DENSITY)?;
        let atomic_mass = species.get_real(keys::ATOMIC_MASS)?;
        let v = species.get_field(keys::VELOCITY)?;
        let cs: Field3D = match ctx.state().globals().field_opt(keys::SOUND_SPEED)? {
            Some(cs) => cs.clone(),
            None => species.get_field(keys::TEMPERATURE)?.sqrt(),
        };
        // AA N rather than N: the flux f v^2 is then NV V
        let mass_density = n * atomic_mass;
        ddt = ddt.try_sub(&div_par_fvv(mesh, &mass_density, v, &cs, false)?)?;

        if let Some(p) = species.field_opt(keys::PRESSURE)? {
            ddt = ddt.try_sub(&grad_par(mesh, p)?)?;
        }
        if let Some(s) = species.field_opt(keys::MOMENTUM_SOURCE)? {
            ddt = ddt.try_add(s)?;
        }

        ctx.set_ddt(self.var, ddt)?;
        Ok(())
    }
}
