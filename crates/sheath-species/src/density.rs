//! Species density evolution.
//!
//! [`EvolveDensity`] evolves the density `N` of one species, or its
//! logarithm when `evolve_log` is set. Each evaluation it publishes `N`,
//! the atomic mass, and (for charged species) the charge, then sums
//!
//! ```text
//! ddt(N) = - div(N v_ExB)                      if fields:phi is published
//!          - div_par(N V)                      if velocity is published
//!          + div_par(K_low grad_par N)         if low_n_diffuse
//!          + div_perp(D_low grad_perp N)       if low_n_diffuse_perp
//!          - hyper_z dz^4 d4N/dz4              if hyper_z > 0
//!          + source + density_source
//! ```
//!
//! The low-density terms regularise `N` near `density_floor` and vanish
//! above it.

use sheath_core::constants::ELECTRON_PROTON_MASS_RATIO;
use sheath_core::state::keys;
use sheath_core::{Field3D, Options};
use sheath_mesh::Mesh;
use sheath_ops::{d4dz4, div_n_bxgrad_f_b_xppm, div_par, div_par_k_grad_par, div_perp_lap_fv_index};
use smallvec::smallvec;

use sheath_component::{
    BuildContext, Component, ComponentError, FinallyContext, OutputMode, OutputTarget, StateKey,
    StateKeys, TransformContext, VarId,
};

use crate::profile::{field_option, initial_profile};

/// Type tag used in the `type` option.
pub const EVOLVE_DENSITY: &str = "evolve_density";

/// Parallel low-density diffusion coefficient, before geometry.
///
/// `ln(floor / clamp(n, 1e-6 floor, floor))`: zero wherever `n >= floor`,
/// rising as `n` drops below it and capped at `ln(1e6)`.
pub fn low_density_diffusivity(n: &Field3D, density_floor: f64) -> Field3D {
    n.clamp(1e-6 * density_floor, density_floor)
        .map(|c| (density_floor / c).ln())
}

/// Perpendicular low-density diffusion coefficient,
/// `floor / max(n, 1e-3 floor)`.
pub fn low_density_perp_diffusivity(n: &Field3D, density_floor: f64) -> Field3D {
    n.floor(1e-3 * density_floor).map(|c| density_floor / c)
}

/// Evolves the density of one species.
#[derive(Debug)]
pub struct EvolveDensity {
    name: String,
    var: VarId,
    evolve_log: bool,
    bndry_flux: bool,
    poloidal_flows: bool,
    density_floor: f64,
    low_n_diffuse: bool,
    low_n_diffuse_perp: bool,
    hyper_z: f64,
    charge: f64,
    atomic_mass: f64,
    diagnose: bool,
    source: Field3D,
    last_source: Option<Field3D>,
}

impl EvolveDensity {
    /// Build from the `name` section of `options` and register the
    /// evolved variable.
    ///
    /// Reads `<name>:*` switches, the source `N<name>:source` in SI
    /// units (normalised by `units:inv_meters_cubed` and `units:seconds`),
    /// and, for a fresh start, the initial profile `N<name>:function`.
    pub fn from_options(
        name: &str,
        options: &mut Options,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Self, ComponentError> {
        let label = format!("{name} ({EVOLVE_DENSITY})");
        let nname = format!("N{name}");

        let opts = options.section_mut(name);
        let bndry_flux = opts.get_or("bndry_flux", true, "Allow flows through radial boundaries")?;
        let poloidal_flows = opts.get_or("poloidal_flows", true, "Include poloidal ExB flow")?;
        let density_floor = opts.get_or("density_floor", 1e-5, "Minimum density floor")?;
        let low_n_diffuse =
            opts.get_or("low_n_diffuse", true, "Parallel diffusion at low density")?;
        let low_n_diffuse_perp = opts.get_or(
            "low_n_diffuse_perp",
            false,
            "Perpendicular diffusion at low density",
        )?;
        let hyper_z: f64 = opts.get_or(
            "hyper_z",
            0.0,
            "Hyper-diffusion coefficient in Z. 0 disables",
        )?;
        let evolve_log =
            opts.get_or("evolve_log", false, "Evolve the logarithm of density?")?;
        let charge = opts.get_or("charge", -1.0, "Particle charge. electrons = -1")?;
        let atomic_mass = opts.get_or(
            "AA",
            ELECTRON_PROTON_MASS_RATIO,
            "Particle atomic mass. Proton = 1",
        )?;
        let diagnose = opts.get_or("diagnose", false, "Output additional diagnostics?")?;

        let var = if evolve_log {
            let logname = format!("logN{name}");
            let initial = if ctx.is_restarting() {
                log::warn!("restarting: ignoring options in section '{nname}'");
                options.section_mut(&nname).set_conditionally_used();
                // replaced by the saved value
                ctx.mesh().field(0.0)
            } else {
                let n0 = initial_profile(options.section_mut(&nname), ctx.mesh())?;
                if let Some(bad) = n0.as_slice().iter().find(|&&v| v <= 0.0 || !v.is_finite()) {
                    return Err(ComponentError::InvalidInitialValue {
                        variable: logname,
                        reason: format!("density must be positive to take its logarithm, found {bad}"),
                    });
                }
                n0.ln()
            };
            let var = ctx.add_variable(&logname, initial, &label)?;
            ctx.register_output(&nname, OutputMode::Once, OutputTarget::Restart, &label);
            ctx.register_output(&nname, OutputMode::Repeat, OutputTarget::Dump, &label);
            var
        } else {
            let initial = initial_profile(options.section_mut(&nname), ctx.mesh())?;
            ctx.add_variable(&nname, initial, &label)?
        };

        if diagnose {
            ctx.register_output(
                &format!("ddt({nname})"),
                OutputMode::Repeat,
                OutputTarget::Dump,
                &label,
            );
            ctx.register_output(&format!("S{nname}"), OutputMode::Repeat, OutputTarget::Dump, &label);
        }

        let units = options.section_mut("units");
        let nnorm: f64 = units.get("inv_meters_cubed", "Density normalisation [m^-3]")?;
        let seconds: f64 = units.get("seconds", "Time normalisation [s]")?;
        let omega_ci = 1.0 / seconds;
        let source = field_option(
            options.section_mut(&nname),
            "source",
            0.0,
            &format!("Source term in ddt({nname}). Units [m^-3/s]"),
            ctx.mesh(),
        )? / (nnorm * omega_ci);

        log::debug!(
            "{label}: evolve_log={evolve_log} floor={density_floor} low_n_diffuse={low_n_diffuse} \
             low_n_diffuse_perp={low_n_diffuse_perp} hyper_z={hyper_z}"
        );

        Ok(Self {
            name: name.to_string(),
            var,
            evolve_log,
            bndry_flux,
            poloidal_flows,
            density_floor,
            low_n_diffuse,
            low_n_diffuse_perp,
            hyper_z,
            charge,
            atomic_mass,
            diagnose,
            source,
            last_source: None,
        })
    }

    /// Handle of the evolved variable: `N<name>`, or `logN<name>` in
    /// log mode.
    pub fn variable(&self) -> VarId {
        self.var
    }

    /// Whether the logarithm of density is evolved.
    pub fn evolves_log(&self) -> bool {
        self.evolve_log
    }

    /// Normalised configured source.
    pub fn source(&self) -> &Field3D {
        &self.source
    }

    /// Total source from the last `finally`, kept when `diagnose` is set.
    pub fn last_source(&self) -> Option<&Field3D> {
        self.last_source.as_ref()
    }

    fn wave_speed(
        &self,
        ctx: &FinallyContext<'_>,
        with_phi: bool,
    ) -> Result<Field3D, ComponentError> {
        let species = ctx.state().require_species(&self.name)?;
        let cs = match ctx.state().globals().field_opt(keys::SOUND_SPEED)? {
            Some(cs) => cs.clone(),
            None => species.get_field(keys::TEMPERATURE)?.sqrt(),
        };
        // electrostatic waves travel at the electron sound speed
        Ok(if with_phi {
            cs * ELECTRON_PROTON_MASS_RATIO.sqrt()
        } else {
            cs
        })
    }
}

impl Component for EvolveDensity {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        EVOLVE_DENSITY
    }

    fn publishes(&self) -> StateKeys {
        let mut out: StateKeys = smallvec![
            StateKey::species(&self.name, keys::DENSITY),
            StateKey::species(&self.name, keys::ATOMIC_MASS),
        ];
        if self.charge != 0.0 {
            out.push(StateKey::species(&self.name, keys::CHARGE));
        }
        out
    }

    fn transform(&mut self, ctx: &mut TransformContext<'_>) -> Result<(), ComponentError> {
        let value = ctx.value(self.var)?;
        let mut n = if self.evolve_log {
            value.exp()
        } else {
            value.clone()
        };
        ctx.mesh().communicate(&mut n)?;

        let label = self.label();
        let species = ctx.state_mut().species_mut(&self.name);
        species.set(keys::DENSITY, n, &label)?;
        species.set(keys::ATOMIC_MASS, self.atomic_mass, &label)?;
        if self.charge != 0.0 {
            species.set(keys::CHARGE, self.charge, &label)?;
        }
        Ok(())
    }

    fn finally(&mut self, ctx: &mut FinallyContext<'_>) -> Result<(), ComponentError> {
        let mesh: &dyn Mesh = ctx.mesh();
        let species = ctx.state().require_species(&self.name)?;
        let n = species.get_field(keys::DENSITY)?.clone();
        let phi = ctx.state().fields().field_opt(keys::PHI)?;

        let mut ddt = match phi {
            Some(phi) => -div_n_bxgrad_f_b_xppm(mesh, &n, phi, self.bndry_flux, self.poloidal_flows)?,
            None => n.zeros_like(),
        };

        if let Some(v) = species.field_opt(keys::VELOCITY)? {
            let ws = self.wave_speed(ctx, phi.is_some())?;
            ddt = ddt.try_sub(&div_par(mesh, &n, v, &ws, true)?)?;
        }

        if self.low_n_diffuse {
            let k = mesh
                .coordinates()
                .dy2_g22()
                .try_mul(&low_density_diffusivity(&n, self.density_floor))?;
            ddt = ddt.try_add(&div_par_k_grad_par(mesh, &k, &n, true)?)?;
        }

        if self.low_n_diffuse_perp {
            let d = low_density_perp_diffusivity(&n, self.density_floor);
            ddt = ddt.try_add(&div_perp_lap_fv_index(mesh, &d, &n, self.bndry_flux)?)?;
        }

        if self.hyper_z > 0.0 {
            let dz = mesh.coordinates().dz;
            let scale = self.hyper_z * dz.powi(4);
            ddt = ddt.try_sub(&(d4dz4(mesh, &n)? * scale))?;
        }

        let mut sn = self.source.clone();
        if let Some(extra) = species.field_opt(keys::DENSITY_SOURCE)? {
            sn = sn.try_add(extra)?;
        }
        ddt = ddt.try_add(&sn)?;
        self.last_source = self.diagnose.then_some(sn);

        if self.evolve_log {
            ddt = ddt.try_div(&n)?;
        }
        ctx.set_ddt(self.var, ddt)?;
        Ok(())
    }
}
