//! The product mix problem: how many units of each product to make,
//! given the revenue of each product and the capacity of the shared machines.
use crate::constraint::Operator;
use crate::error::ModelError;
use crate::expression::LinearExpression;
use crate::model::{Model, Sense};
use crate::variable::{Domain, Variable};

/// A product that can be manufactured
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Name of the decision variable holding the number of units
    pub name: String,
    /// Revenue per unit
    pub revenue: f64,
}

/// A capacity shared by all products
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Constraint label
    pub label: String,
    /// Capacity used by one unit of each product, in product order
    pub usage: Vec<f64>,
    /// Total capacity
    pub available: f64,
}

impl Product {
    /// A product with the given revenue per unit
    pub fn new<S: Into<String>>(name: S, revenue: f64) -> Self {
        Product {
            name: name.into(),
            revenue,
        }
    }
}

impl Resource {
    /// A resource with a per-product usage and a capacity
    pub fn new<S: Into<String>>(label: S, usage: &[f64], available: f64) -> Self {
        Resource {
            label: label.into(),
            usage: usage.to_vec(),
            available,
        }
    }
}

/// Label of the revenue objective
pub const OBJECTIVE_LABEL: &str = "Maximise revenue of the products";

/// The five products of the factory
pub fn standard_products() -> Vec<Product> {
    [550., 600., 350., 400., 200.]
        .into_iter()
        .zip('A'..='E')
        .map(|(revenue, letter)| Product::new(format!("No. of Product {}", letter), revenue))
        .collect()
}

/// Grinding, drilling and assembly capacities of the factory
pub fn standard_resources() -> Vec<Resource> {
    vec![
        Resource::new("Grinding", &[10., 20., 0., 25., 15.], 288.),
        Resource::new("Drilling", &[10., 8., 16., 0., 0.], 192.),
        Resource::new("Assembly", &[20.; 5], 384.),
    ]
}

/// A built product mix model, with the decision variable of each product
#[derive(Debug, Clone)]
pub struct ProductMix {
    /// The model: one non-negative integer variable per product
    pub model: Model,
    /// The decision variables, in product order
    pub products: Vec<Variable>,
}

impl ProductMix {
    /// Build the model maximising revenue under the resource capacities
    pub fn new(products: &[Product], resources: &[Resource]) -> Result<Self, ModelError> {
        let mut model = Model::new("Product Mix");
        let variables = products
            .iter()
            .map(|p| model.create_variable(p.name.as_str(), 0., Domain::Integer))
            .collect::<Result<Vec<_>, _>>()?;

        let revenue: LinearExpression = variables
            .iter()
            .zip(products)
            .map(|(&var, p)| p.revenue * var)
            .sum();
        model.set_objective(revenue, Sense::Maximise, OBJECTIVE_LABEL)?;

        for resource in resources {
            if resource.usage.len() != variables.len() {
                return Err(ModelError::InvalidCoefficient {
                    context: format!(
                        "resource '{}' ({} usages for {} products)",
                        resource.label,
                        resource.usage.len(),
                        variables.len()
                    ),
                    value: f64::NAN,
                });
            }
            let mut used = LinearExpression::with_capacity(variables.len());
            for (&var, &amount) in variables.iter().zip(&resource.usage) {
                used.add_term(var, amount);
            }
            model.add_constraint(
                used,
                Operator::LessOrEqual,
                resource.available,
                resource.label.as_str(),
            )?;
        }
        Ok(ProductMix {
            model,
            products: variables,
        })
    }

    /// The factory instance: five products sharing grinding, drilling and assembly
    pub fn standard() -> Result<Self, ModelError> {
        ProductMix::new(&standard_products(), &standard_resources())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_instance_shape() {
        let mix = ProductMix::standard().unwrap();
        let model = &mix.model;
        assert_eq!(model.len(), 5);
        assert_eq!(
            model.variable_name(mix.products[0]),
            Some("No. of Product A")
        );
        let objective = model.objective().unwrap();
        assert_eq!(objective.label(), OBJECTIVE_LABEL);
        assert_eq!(objective.expression().coefficient(mix.products[1]), 600.);
        let labels: Vec<_> = model.constraints().iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["Grinding", "Drilling", "Assembly"]);
        let drilling = &model.constraints()[1];
        assert_eq!(drilling.rhs(), 192.);
        assert_eq!(drilling.expression().coefficient(mix.products[2]), 16.);
        assert_eq!(drilling.expression().coefficient(mix.products[3]), 0.);
    }

    #[test]
    fn every_product_is_a_non_negative_integer() {
        let mix = ProductMix::standard().unwrap();
        for (_, def) in mix.model.variables() {
            assert_eq!(def.get_domain(), Domain::Integer);
            assert_eq!(def.lower_bound(), 0.);
            assert_eq!(def.upper_bound(), f64::INFINITY);
        }
    }

    #[test]
    fn usage_must_cover_every_product() {
        let resources = vec![Resource::new("Short", &[1., 2.], 10.)];
        assert!(matches!(
            ProductMix::new(&standard_products(), &resources),
            Err(ModelError::InvalidCoefficient { .. })
        ));
    }
}
