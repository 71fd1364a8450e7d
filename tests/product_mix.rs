//! Solving the factory instance: five products sharing grinding, drilling and assembly time.
#![cfg(feature = "microlp")]

use float_eq::assert_float_eq;
use product_mix::product_mix::{standard_products, standard_resources};
use product_mix::{solve, ProductMix, Resource, SolveStatus, SolverBackend, SolverConfig};

#[test]
fn standard_instance_is_optimal() {
    let mix = ProductMix::standard().unwrap();
    let result = solve(&mix.model, &SolverConfig::with_backend(SolverBackend::MicroLp)).unwrap();
    assert_eq!(result.status(), SolveStatus::Optimal);
    assert_float_eq!(result.objective_value().unwrap(), 10900., abs <= 1e-6);

    let assignment = result.assignment().unwrap();
    for constraint in mix.model.constraints() {
        assert!(
            constraint.is_satisfied_by(assignment, 1e-6),
            "{} is violated",
            constraint.label()
        );
    }
    for &product in &mix.products {
        let units = result.value(product).unwrap();
        assert!(units >= 0.);
        assert_eq!(units, units.round(), "fractional production");
    }
}

#[test]
fn any_negative_capacity_is_infeasible() {
    for i in 0..standard_resources().len() {
        let mut resources = standard_resources();
        resources[i].available = -1.;
        let mix = ProductMix::new(&standard_products(), &resources).unwrap();
        let result = solve(&mix.model, &SolverConfig::default()).unwrap();
        assert_eq!(
            result.status(),
            SolveStatus::Infeasible,
            "{} below zero",
            resources[i].label
        );
        assert_eq!(result.value(mix.products[0]), None);
        assert_eq!(result.objective_value(), None);
    }
}

#[test]
fn single_resource_instance() {
    // Only assembly: every unit takes 20, so make the most valuable product
    let resources = vec![Resource::new("Assembly", &[20.; 5], 384.)];
    let mix = ProductMix::new(&standard_products(), &resources).unwrap();
    let result = solve(&mix.model, &SolverConfig::default()).unwrap();
    assert_eq!(result.status(), SolveStatus::Optimal);
    assert_eq!(result.value(mix.products[1]), Some(19.));
    assert_float_eq!(result.objective_value().unwrap(), 19. * 600., abs <= 1e-6);
}
