//! Momentum component together with the density component it depends on.

use sheath_component::{
    BuildContext, Component, ComponentError, FinallyContext, TransformContext, VariableStore,
};
use sheath_core::state::keys;
use sheath_core::{Field3D, Options, Region, State, StateError};
use sheath_mesh::{Mesh, StructuredMesh};
use sheath_ops::{div_n_bxgrad_f_b_xppm, div_par_fvv_inspect, FlowRegime, Mc};
use sheath_species::{EvolveDensity, EvolveMomentum};
use sheath_test_utils::{open_mesh, periodic_mesh, unit_options, PublishFields};

fn boxed(c: impl Component) -> Box<dyn Component> {
    Box::new(c)
}

fn evaluate(
    mesh: &StructuredMesh,
    store: &mut VariableStore,
    components: &mut [Box<dyn Component>],
) -> Result<State, ComponentError> {
    let mut state = State::new();
    for c in components.iter_mut() {
        c.transform(&mut TransformContext::new(&mut state, mesh, store))?;
    }
    for c in components.iter_mut() {
        c.finally(&mut FinallyContext::new(&state, mesh, store))?;
    }
    Ok(state)
}

/// Deuterium with uniform density `n` and momentum `nv`.
fn species(
    mesh: &StructuredMesh,
    store: &mut VariableStore,
    n: f64,
    nv: f64,
) -> (EvolveDensity, EvolveMomentum) {
    let mut options: Options = unit_options();
    options
        .section_mut("d+")
        .set("AA", 2.0)
        .set("charge", 1.0)
        .set("low_n_diffuse", false);
    options.section_mut("Nd+").set("function", n);
    options.section_mut("NVd+").set("function", nv);
    let mut ctx = BuildContext::new(mesh, store);
    let density = EvolveDensity::from_options("d+", &mut options, &mut ctx).unwrap();
    let momentum = EvolveMomentum::from_options("d+", &mut options, &mut ctx).unwrap();
    (density, momentum)
}

fn ddt(store: &VariableStore, name: &str) -> Field3D {
    store.ddt(store.id(name).unwrap()).unwrap().clone()
}

#[test]
fn velocity_is_momentum_over_mass_density() {
    let mesh = open_mesh(2, 4, 2);
    let mut store = VariableStore::new();
    let (density, momentum) = species(&mesh, &mut store, 4.0, 8.0);
    let temperature = PublishFields::new("closure").species("d+", keys::TEMPERATURE, mesh.field(1.0));
    let state = evaluate(
        &mesh,
        &mut store,
        &mut [boxed(density), boxed(momentum), boxed(temperature)],
    )
    .unwrap();

    let d = state.species("d+").unwrap();
    assert!(d.get_field(keys::VELOCITY).unwrap().as_slice().iter().all(|&v| v == 1.0));
    assert!(d.get_field(keys::MOMENTUM).unwrap().as_slice().iter().all(|&v| v == 8.0));
    assert_eq!(d.writer(keys::VELOCITY), Some("d+ (evolve_momentum)"));
}

#[test]
fn transform_without_density_fails() {
    let mesh = open_mesh(2, 4, 2);
    let mut store = VariableStore::new();
    let mut options = unit_options();
    let momentum = {
        let mut ctx = BuildContext::new(&mesh, &mut store);
        EvolveMomentum::from_options("he+", &mut options, &mut ctx).unwrap()
    };
    let err = evaluate(&mesh, &mut store, &mut [boxed(momentum)]).unwrap_err();
    assert_eq!(
        err,
        ComponentError::State(StateError::MissingField {
            section: "species".into(),
            key: "he+".into(),
        })
    );
}

#[test]
fn uniform_flow_in_periodic_domain_keeps_momentum() {
    let mesh = periodic_mesh(2, 8, 4);
    let mut store = VariableStore::new();
    let (density, momentum) = species(&mesh, &mut store, 1.5, 0.6);
    let temperature = PublishFields::new("closure").species("d+", keys::TEMPERATURE, mesh.field(1.0));
    evaluate(
        &mesh,
        &mut store,
        &mut [boxed(temperature), boxed(density), boxed(momentum)],
    )
    .unwrap();
    assert!(ddt(&store, "NVd+").max_abs(Region::NoBoundary) < 1e-14);
    assert!(ddt(&store, "Nd+").max_abs(Region::NoBoundary) < 1e-14);
}

#[test]
fn marginally_sonic_flow_is_subsonic_at_every_interior_face() {
    let mesh = open_mesh(2, 6, 2);
    let mut store = VariableStore::new();
    // AA = 2, N = 1, NV = 2 gives V = 1 = sqrt(T)
    let (density, momentum) = species(&mesh, &mut store, 1.0, 2.0);
    let temperature = PublishFields::new("closure").species("d+", keys::TEMPERATURE, mesh.field(1.0));
    let state = evaluate(
        &mesh,
        &mut store,
        &mut [boxed(density), boxed(momentum), boxed(temperature)],
    )
    .unwrap();
    assert!(ddt(&store, "NVd+").first_non_finite(Region::NoBoundary).is_none());

    let d = state.species("d+").unwrap();
    let mass_density = d.get_field(keys::DENSITY).unwrap() * 2.0;
    let v = d.get_field(keys::VELOCITY).unwrap();
    let cs = d.get_field(keys::TEMPERATURE).unwrap().sqrt();
    let mut interior_faces = 0;
    div_par_fvv_inspect(&mesh, &mass_density, v, &cs, false, &Mc, |face| {
        if face.regime != FlowRegime::Boundary {
            interior_faces += 1;
            assert_eq!(face.regime, FlowRegime::Subsonic, "face {face:?}");
        }
    })
    .unwrap();
    assert!(interior_faces > 0);
}

#[test]
fn empty_cells_keep_velocity_and_derivative_finite() {
    let mesh = open_mesh(2, 6, 2);
    for nv in [0.0, 0.5] {
        let mut store = VariableStore::new();
        let (density, momentum) = species(&mesh, &mut store, 0.0, nv);
        let temperature =
            PublishFields::new("closure").species("d+", keys::TEMPERATURE, mesh.field(1.0));
        let state = evaluate(
            &mesh,
            &mut store,
            &mut [boxed(density), boxed(momentum), boxed(temperature)],
        )
        .unwrap();

        let v = state.species("d+").unwrap().get_field(keys::VELOCITY).unwrap();
        assert!(v.first_non_finite(Region::All).is_none(), "NV = {nv}");
        // NV / (AA * density_floor)
        let expected = nv / (2.0 * 1e-5);
        assert!(v.as_slice().iter().all(|&u| u == expected), "NV = {nv}");
        assert!(ddt(&store, "NVd+").first_non_finite(Region::NoBoundary).is_none());
    }
}

#[test]
fn potential_advects_momentum_with_exb_drift() {
    let mesh = periodic_mesh(6, 4, 8);
    let dz = mesh.coordinates().dz;
    let nv = mesh.field_from_fn(&|x, _, _| 0.1 * (x * x) as f64);
    let phi = mesh.field_from_fn(&|_, _, z| (z as f64 * dz).sin());

    let mut options = unit_options();
    options
        .section_mut("d+")
        .set("AA", 2.0)
        .set("charge", 1.0)
        .set("low_n_diffuse", false);
    options.section_mut("Nd+").set("function", 1.0);
    options.section_mut("NVd+").set("function", nv.clone());
    let mut store = VariableStore::new();
    let (density, momentum) = {
        let mut ctx = BuildContext::new(&mesh, &mut store);
        (
            EvolveDensity::from_options("d+", &mut options, &mut ctx).unwrap(),
            EvolveMomentum::from_options("d+", &mut options, &mut ctx).unwrap(),
        )
    };
    let closure = PublishFields::new("closure")
        .species("d+", keys::TEMPERATURE, mesh.field(1.0))
        .field(keys::PHI, phi.clone());
    let state = evaluate(
        &mesh,
        &mut store,
        &mut [boxed(closure), boxed(density), boxed(momentum)],
    )
    .unwrap();

    // y-uniform flow in periodic columns has no parallel divergence
    let nv = state.species("d+").unwrap().get_field(keys::MOMENTUM).unwrap();
    let expected = -div_n_bxgrad_f_b_xppm(&mesh, nv, &phi, true, true).unwrap();
    assert!(expected.max_abs(Region::NoBoundary) > 1e-3);
    let d = ddt(&store, "NVd+");
    for (x, y, z) in mesh.shape().iter(Region::NoBoundary) {
        assert!(
            (d[(x, y, z)] - expected[(x, y, z)]).abs() < 1e-12,
            "at ({x}, {y}, {z})"
        );
    }
}

#[test]
fn pressure_gradient_decelerates() {
    let mesh = open_mesh(2, 6, 2);
    let mut store = VariableStore::new();
    let (density, momentum) = species(&mesh, &mut store, 1.0, 0.0);
    let closure = PublishFields::new("closure")
        .species("d+", keys::TEMPERATURE, mesh.field(1.0))
        .species("d+", keys::PRESSURE, mesh.field_from_fn(&|_, y, _| y as f64));
    evaluate(
        &mesh,
        &mut store,
        &mut [boxed(density), boxed(momentum), boxed(closure)],
    )
    .unwrap();
    let d = ddt(&store, "NVd+");
    for (x, y, z) in mesh.shape().iter(Region::NoBoundary) {
        assert!((d[(x, y, z)] + 1.0).abs() < 1e-14, "at ({x}, {y}, {z})");
    }
}

#[test]
fn momentum_source_is_added() {
    let mesh = periodic_mesh(1, 4, 2);
    let mut store = VariableStore::new();
    let (density, momentum) = species(&mesh, &mut store, 1.0, 0.0);
    let closure = PublishFields::new("closure")
        .global(keys::SOUND_SPEED, mesh.field(1.0))
        .species("d+", keys::MOMENTUM_SOURCE, mesh.field(0.75));
    evaluate(
        &mesh,
        &mut store,
        &mut [boxed(closure), boxed(density), boxed(momentum)],
    )
    .unwrap();
    let d = ddt(&store, "NVd+");
    for (x, y, z) in mesh.shape().iter(Region::NoBoundary) {
        assert_eq!(d[(x, y, z)], 0.75);
    }
}

#[test]
fn finally_without_wave_speed_fails() {
    let mesh = open_mesh(1, 4, 2);
    let mut store = VariableStore::new();
    let (density, momentum) = species(&mesh, &mut store, 1.0, 0.5);
    let err = evaluate(&mesh, &mut store, &mut [boxed(density), boxed(momentum)]).unwrap_err();
    assert_eq!(
        err,
        ComponentError::State(StateError::MissingField {
            section: "species:d+".into(),
            key: "temperature".into(),
        })
    );
}
