//! Spatially varying inputs read from options.

use sheath_core::{Field3D, OptionValue, Options, OptionsError};
use sheath_mesh::Mesh;

use sheath_component::ComponentError;

/// Read `key` as a field: a number fills the mesh uniformly, a field is
/// taken as given after an ownership check.
pub fn field_option(
    options: &mut Options,
    key: &str,
    default: f64,
    doc: &str,
    mesh: &dyn Mesh,
) -> Result<Field3D, ComponentError> {
    let value: OptionValue = options.get_or(key, OptionValue::Real(default), doc)?;
    match value {
        OptionValue::Real(v) => Ok(mesh.field(v)),
        OptionValue::Int(i) => Ok(mesh.field(i as f64)),
        OptionValue::Field(f) => {
            mesh.check_owned(&f)?;
            Ok(f)
        }
        other => Err(OptionsError::TypeMismatch {
            path: format!("{}:{key}", options.path()),
            expected: "real or field",
            found: other.type_name(),
        }
        .into()),
    }
}

/// Initial profile of an evolved variable, from `<section>:function`.
pub fn initial_profile(
    options: &mut Options,
    mesh: &dyn Mesh,
) -> Result<Field3D, ComponentError> {
    field_option(options, "function", 0.0, "Initial profile", mesh)
}
