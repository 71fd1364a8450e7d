use std::fmt::{self, Display, Formatter};

use crate::constraint::Operator;
use crate::error::ModelError;
use crate::expression::LinearExpression;
use crate::lp_format::names::LpNames;
use crate::model::{Model, Objective, Sense};
use crate::variable::Domain;

/// Render the model as CPLEX LP text.
/// Terms are written in variable creation order, so the output only depends on the model.
pub(crate) fn render(model: &Model) -> Result<String, ModelError> {
    let objective = model.require_objective()?;
    let file = LpFile {
        model,
        objective,
        names: LpNames::new(model),
    };
    Ok(file.to_string())
}

struct LpFile<'a> {
    model: &'a Model,
    objective: &'a Objective,
    names: LpNames,
}

impl Display for LpFile<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let LpFile {
            model,
            objective,
            names,
        } = self;
        let title = model
            .name()
            .replace("*\\", "")
            .replace(|c: char| c == '\n' || c == '\r', " ");
        writeln!(f, "\\* {} *\\", title.trim())?;
        writeln!(
            f,
            "{}",
            match objective.sense {
                Sense::Maximise => "Maximize",
                Sense::Minimise => "Minimize",
            }
        )?;
        write!(f, "{}: ", names.objective)?;
        let has_terms = write_terms(f, &objective.expression, names)?;
        if objective.expression.constant != 0. {
            write_signed(f, objective.expression.constant, has_terms)?;
        } else if !has_terms {
            write!(f, "0")?;
        }
        writeln!(f)?;

        writeln!(f, "Subject To")?;
        for (constraint, name) in model.constraints().iter().zip(&names.constraints) {
            write!(f, "{}: ", name)?;
            if !write_terms(f, &constraint.expression, names)? {
                write!(f, "0")?;
            }
            let op = match constraint.operator {
                Operator::LessOrEqual => "<=",
                Operator::GreaterOrEqual => ">=",
                Operator::Equal => "=",
            };
            writeln!(f, " {} {}", op, constraint.bound())?;
        }

        writeln!(f, "Bounds")?;
        for ((_, def), name) in model.variables().zip(&names.variables) {
            // the `Binaries` section implies [0, 1]
            if def.domain == Domain::Binary && def.min == 0. && def.max == 1. {
                continue;
            }
            if def.max == f64::INFINITY {
                writeln!(f, "{} >= {}", name, def.min)?;
            } else if def.min == def.max {
                writeln!(f, "{} = {}", name, def.min)?;
            } else {
                writeln!(f, "{} <= {} <= {}", def.min, name, def.max)?;
            }
        }

        for (header, domain) in [("Generals", Domain::Integer), ("Binaries", Domain::Binary)] {
            let mut listed = model
                .variables()
                .zip(&names.variables)
                .filter(|((_, def), _)| def.domain == domain)
                .peekable();
            if listed.peek().is_some() {
                writeln!(f, "{}", header)?;
                for (_, name) in listed {
                    writeln!(f, "{}", name)?;
                }
            }
        }
        writeln!(f, "End")
    }
}

/// Writes the non-zero terms; returns whether there was any
fn write_terms(
    f: &mut Formatter<'_>,
    expression: &LinearExpression,
    names: &LpNames,
) -> Result<bool, fmt::Error> {
    let terms = expression.sorted_terms();
    for (i, &(var, coeff)) in terms.iter().enumerate() {
        write_signed(f, coeff, i > 0)?;
        write!(f, " {}", names.variables[var.index()])?;
    }
    Ok(!terms.is_empty())
}

/// `3` or `-3` at the start of an expression, ` + 3` or ` - 3` after a term
fn write_signed(f: &mut Formatter<'_>, value: f64, after_term: bool) -> fmt::Result {
    match (after_term, value < 0.) {
        (false, _) => write!(f, "{}", value),
        (true, false) => write!(f, " + {}", value),
        (true, true) => write!(f, " - {}", -value),
    }
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::{Domain, Model, ModelError, Operator, Sense, VariableDefinition};

    #[test]
    fn renders_all_sections() {
        let mut model = Model::new("mixed");
        let x = model.create_variable("x", 0., Domain::Integer).unwrap();
        let y = model
            .add_variable(VariableDefinition::new("y").clamp(-1, 2.5))
            .unwrap();
        let z = model.create_variable("z", 0., Domain::Binary).unwrap();
        model
            .set_objective(2 * x - y + 0.5 * z + 4., Sense::Minimise, "cost")
            .unwrap();
        model
            .add_constraint(x + y + 1., Operator::GreaterOrEqual, 3., "floor")
            .unwrap();
        model
            .add_constraint(-1 * x + z, Operator::Equal, 0., "link")
            .unwrap();
        let expected = "\\* mixed *\\
Minimize
cost: 2 x - 1 y + 0.5 z + 4
Subject To
floor: 1 x + 1 y >= 2
link: -1 x + 1 z = 0
Bounds
x >= 0
-1 <= y <= 2.5
Generals
x
Binaries
z
End
";
        assert_eq!(render(&model).unwrap(), expected);
    }

    #[test]
    fn fixed_binaries_keep_their_bounds() {
        let mut model = Model::new("fixed");
        let on = model.create_variable("on", 1., Domain::Binary).unwrap();
        let free = model.create_variable("free_bit", 0., Domain::Binary).unwrap();
        model.set_objective(on + free, Sense::Maximise, "o").unwrap();
        let text = render(&model).unwrap();
        assert!(text.contains("Bounds\non = 1\nBinaries\non\nfree_bit\nEnd\n"));
    }

    #[test]
    fn requires_an_objective() {
        let model = Model::new("empty");
        assert_eq!(render(&model), Err(ModelError::MissingObjective));
    }
}
