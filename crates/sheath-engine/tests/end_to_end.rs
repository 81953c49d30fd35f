//! Integration test: species configured from options, driven through
//! `Simulation::rhs`.

use sheath_component::{ComponentError, OutputMode, OutputTarget};
use sheath_core::state::keys;
use sheath_core::{Options, OptionsError, Region};
use sheath_engine::{ConfigError, Simulation};
use sheath_mesh::Mesh;
use sheath_test_utils::{open_mesh, periodic_mesh, unit_options, PublishFields, RecordingSink};

fn two_species_options() -> Options {
    let mut options = unit_options();
    options
        .section_mut("sheath")
        .set("components", "d+, e")
        .set("check_finite", true);
    options
        .section_mut("d+")
        .set("type", "evolve_density, evolve_momentum")
        .set("AA", 2.0)
        .set("charge", 1.0)
        .set("low_n_diffuse", false);
    options.section_mut("Nd+").set("function", 1.5);
    options.section_mut("NVd+").set("function", 0.6);
    options
        .section_mut("e")
        .set("type", "evolve_density")
        .set("low_n_diffuse", false);
    options
        .section_mut("Ne")
        .set("function", 1.5)
        .set("source", 0.25);
    options
}

#[test]
fn two_species_in_periodic_domain() {
    let mesh = periodic_mesh(2, 8, 4);
    let temperature = mesh.field(1.0);
    let mut sim = Simulation::builder()
        .mesh(mesh)
        .options(two_species_options())
        .component(PublishFields::new("closure").species("d+", keys::TEMPERATURE, temperature))
        .build()
        .unwrap();

    assert_eq!(
        sim.pipeline().labels(),
        vec![
            "d+ (evolve_density)",
            "d+ (evolve_momentum)",
            "e (evolve_density)",
            "closure (publish_fields)",
        ]
    );
    assert!(sim.options().unused().is_empty());

    sim.rhs().unwrap();

    let vars = sim.variables();
    let ddt = |name: &str| vars.ddt(vars.id(name).unwrap()).unwrap().clone();
    assert!(ddt("Nd+").max_abs(Region::NoBoundary) < 1e-14);
    assert!(ddt("NVd+").max_abs(Region::NoBoundary) < 1e-14);
    let dne = ddt("Ne");
    for (x, y, z) in sim.mesh().shape().iter(Region::NoBoundary) {
        assert_eq!(dne[(x, y, z)], 0.25);
    }

    // Electrons carry no momentum component, so no velocity is published.
    let e = sim.state().species("e").unwrap();
    assert!(!e.is_set(keys::VELOCITY));
    assert_eq!(e.get_real(keys::CHARGE).unwrap(), -1.0);
    let d = sim.state().species("d+").unwrap();
    assert!(d
        .get_field(keys::VELOCITY)
        .unwrap()
        .as_slice()
        .iter()
        .all(|&v| (v - 0.2).abs() < 1e-15));
}

#[test]
fn metrics_cover_every_component_in_order() {
    let mesh = periodic_mesh(2, 8, 4);
    let temperature = mesh.field(1.0);
    let mut sim = Simulation::builder()
        .mesh(mesh)
        .options(two_species_options())
        .component(PublishFields::new("closure").species("d+", keys::TEMPERATURE, temperature))
        .build()
        .unwrap();

    let labels = sim.pipeline().labels();
    let metrics = sim.rhs().unwrap();
    assert_eq!(metrics.evaluations, 1);
    let transform: Vec<&String> = metrics.transform_us.iter().map(|(l, _)| l).collect();
    let finally: Vec<&String> = metrics.finally_us.iter().map(|(l, _)| l).collect();
    assert_eq!(transform, labels.iter().collect::<Vec<_>>());
    assert_eq!(finally, labels.iter().collect::<Vec<_>>());
    assert!(metrics.component_us("e (evolve_density)").is_some());
}

#[test]
fn explicit_euler_grows_density_linearly() {
    let mut options = unit_options();
    options.section_mut("sheath").set("components", "d+");
    options
        .section_mut("d+")
        .set("type", "evolve_density")
        .set("low_n_diffuse", false);
    options
        .section_mut("Nd+")
        .set("function", 1.0)
        .set("source", 2.0);

    let mut sim = Simulation::builder()
        .mesh(open_mesh(2, 4, 2))
        .options(options)
        .build()
        .unwrap();
    let id = sim.variables().id("Nd+").unwrap();

    let dt = 0.1;
    for _ in 0..5 {
        sim.rhs().unwrap();
        let vars = sim.variables();
        let next = vars
            .value(id)
            .unwrap()
            .try_add(&(vars.ddt(id).unwrap() * dt))
            .unwrap();
        sim.variables_mut().set_value(id, next).unwrap();
    }

    let n = sim.variables().value(id).unwrap();
    for (x, y, z) in sim.mesh().shape().iter(Region::NoBoundary) {
        assert!((n[(x, y, z)] - 2.0).abs() < 1e-12);
    }
    assert_eq!(sim.last_metrics().evaluations, 5);
}

#[test]
fn restart_continues_from_saved_log_density() {
    let mesh = periodic_mesh(1, 4, 2);
    let saved = mesh.field(3.0_f64.ln());

    let mut options = unit_options();
    options.set("restart", true);
    options.section_mut("sheath").set("components", "e");
    options
        .section_mut("e")
        .set("type", "evolve_density")
        .set("evolve_log", true)
        .set("low_n_diffuse", false);
    options.section_mut("Ne").set("function", 1.0);

    let mut sim = Simulation::builder()
        .mesh(mesh)
        .options(options)
        .restart_from([("logNe".to_string(), saved)])
        .build()
        .unwrap();
    assert!(sim.variables().is_restarting());
    // The initial profile section is deliberately ignored on restart.
    assert!(sim.options().unused().is_empty());

    sim.rhs().unwrap();
    let n = sim.state().species("e").unwrap().get_field(keys::DENSITY).unwrap();
    assert!(n.as_slice().iter().all(|&v| (v - 3.0).abs() < 1e-12));
}

#[test]
fn restart_without_saved_variable_fails() {
    let mut options = unit_options();
    options.set("restart", true);
    options.section_mut("sheath").set("components", "e");
    options.section_mut("e").set("type", "evolve_density");

    let err = Simulation::builder()
        .mesh(open_mesh(1, 4, 1))
        .options(options)
        .restart_from(Vec::new())
        .build()
        .unwrap_err();
    match err {
        ConfigError::Component { name, source } => {
            assert_eq!(name, "e");
            assert!(matches!(source, ComponentError::Solver(_)));
        }
        other => panic!("expected Component error, got {other:?}"),
    }
}

#[test]
fn diagnostics_are_forwarded_to_sink() {
    let mut options = unit_options();
    options.section_mut("sheath").set("components", "d+");
    options
        .section_mut("d+")
        .set("type", "evolve_density")
        .set("evolve_log", true)
        .set("diagnose", true);
    options.section_mut("Nd+").set("function", 1.0);

    let sim = Simulation::builder()
        .mesh(open_mesh(1, 4, 1))
        .options(options)
        .build()
        .unwrap();

    let mut sink = RecordingSink::new();
    sim.forward_outputs(&mut sink);
    assert!(sink.has("Nd+", OutputMode::Repeat, OutputTarget::Dump));
    assert!(sink.has("Nd+", OutputMode::Once, OutputTarget::Restart));
    assert!(sink.has("ddt(Nd+)", OutputMode::Repeat, OutputTarget::Dump));
    assert!(sink.has("SNd+", OutputMode::Repeat, OutputTarget::Dump));
}

#[test]
fn misspelt_option_is_left_unused() {
    let mut options = unit_options();
    options.section_mut("sheath").set("components", "d+");
    options
        .section_mut("d+")
        .set("type", "evolve_density")
        .set("low_n_difuse", false);
    options.section_mut("Nd+").set("function", 1.0);

    let sim = Simulation::builder()
        .mesh(open_mesh(1, 4, 1))
        .options(options)
        .build()
        .unwrap();
    assert_eq!(sim.options().unused(), vec!["d+:low_n_difuse".to_string()]);
}

#[test]
fn missing_units_name_the_section() {
    let mut options = Options::new();
    options.section_mut("sheath").set("components", "d+");
    options.section_mut("d+").set("type", "evolve_density");

    let err = Simulation::builder()
        .mesh(open_mesh(1, 4, 1))
        .options(options)
        .build()
        .unwrap_err();
    match err {
        ConfigError::Component {
            name,
            source: ComponentError::Options(OptionsError::Missing { path }),
        } => {
            assert_eq!(name, "d+");
            assert!(path.starts_with("units:"), "unexpected path {path}");
        }
        other => panic!("expected missing units, got {other:?}"),
    }
}
