//! Explicit Euler loop over the reference profile.
//!
//! Demonstrates: build profile → evaluate right-hand side → advance every
//! evolved variable → report per-component timing.

use sheath_bench::reference_profile;
use sheath_core::Region;

fn main() {
    println!("=== Sheath Euler Relaxation Example ===\n");

    let mut sim = reference_profile(42);
    println!("Components:");
    for label in sim.pipeline().labels() {
        println!("  {label}");
    }
    println!();

    let dt = 1e-3;
    let ids: Vec<_> = sim.variables().ids().collect();

    for step in 0..200 {
        if let Err(e) = sim.rhs() {
            eprintln!("step {step}: {e}");
            return;
        }

        for &id in &ids {
            let vars = sim.variables();
            let next = match vars.value(id) {
                Ok(value) => value.try_add(&(vars.ddt(id).expect("registered id") * dt)),
                Err(e) => {
                    eprintln!("step {step}: {e}");
                    return;
                }
            };
            let next = next.expect("fields share one layout");
            sim.variables_mut()
                .set_value(id, next)
                .expect("fields share one layout");
        }

        if step % 50 == 0 || step == 199 {
            let vars = sim.variables();
            print!("step {step:4}:");
            for &id in &ids {
                let name = vars.name(id).unwrap_or("?");
                let max = vars
                    .ddt(id)
                    .map(|d| d.max_abs(Region::NoBoundary))
                    .unwrap_or(f64::NAN);
                print!("  max|ddt({name})| = {max:.3e}");
            }
            println!();
        }
    }

    let metrics = sim.last_metrics();
    println!("\nLast evaluation: {} us total", metrics.total_us);
    for label in sim.pipeline().labels() {
        let us = metrics.component_us(&label).unwrap_or(0);
        println!("  {label:<28} {us:>6} us");
    }
    println!("\nEvaluations: {}", metrics.evaluations);
}
