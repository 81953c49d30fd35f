//! Physical constants in SI units.

/// Electron mass \[kg\].
pub const ELECTRON_MASS: f64 = 9.109_383_7e-31;

/// Proton mass \[kg\].
pub const PROTON_MASS: f64 = 1.672_621_9e-27;

/// Electron mass in units of the proton mass.
///
/// Default atomic mass of a species with no `AA` option.
pub const ELECTRON_PROTON_MASS_RATIO: f64 = ELECTRON_MASS / PROTON_MASS;
