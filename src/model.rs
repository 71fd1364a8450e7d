//! The [Model] owns the variables, the objective and the constraints of a problem.
//!
//! Every structural check happens here, when an element is added, so that a
//! model that was built without error can always be exported and solved.
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU32, Ordering};

use fnv::FnvHashMap as HashMap;

use crate::constraint::{Constraint, Operator};
use crate::error::ModelError;
use crate::expression::LinearExpression;
use crate::variable::{Domain, Variable, VariableDefinition};

static NEXT_MODEL_ID: AtomicU32 = AtomicU32::new(0);

/// Whether to search for the variable values that give the highest
/// or the lowest value of the objective function.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum Sense {
    /// Find the highest value
    Maximise,
    /// Find the lowest value
    Minimise,
}

impl Display for Sense {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sense::Maximise => "maximise",
            Sense::Minimise => "minimise",
        })
    }
}

/// The function to optimise, with its direction and a human-readable label
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub(crate) expression: LinearExpression,
    pub(crate) sense: Sense,
    pub(crate) label: String,
}

impl Objective {
    /// The expression to optimise
    pub fn expression(&self) -> &LinearExpression {
        &self.expression
    }

    /// Maximise or minimise
    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// The human-readable label
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A linear program, possibly with integer variables.
///
/// ```
/// use product_mix::{Domain, Model, Operator, Sense};
///
/// let mut model = Model::new("two products");
/// let a = model.create_variable("a", 0., Domain::Integer)?;
/// let b = model.create_variable("b", 0., Domain::Integer)?;
/// model.set_objective(3 * a + 2 * b, Sense::Maximise, "revenue")?;
/// model.add_constraint(a + b, Operator::LessOrEqual, 4., "capacity")?;
///
/// assert_eq!(model.variable("b"), Some(b));
/// assert_eq!(model.constraints().len(), 1);
/// # Ok::<_, product_mix::ModelError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    id: u32,
    name: String,
    variables: Vec<VariableDefinition>,
    by_name: HashMap<String, Variable>,
    objective: Option<Objective>,
    constraints: Vec<Constraint>,
}

impl Model {
    /// Create an empty model. The name appears in the exported LP file.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Model {
            id: NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            variables: vec![],
            by_name: HashMap::default(),
            objective: None,
            constraints: vec![],
        }
    }

    /// The model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a variable with the given name, lower bound and domain, and no upper bound
    /// (except for binary variables, which are bounded by 1).
    ///
    /// Fails with [ModelError::InvalidBound] when the lower bound is not finite,
    /// and with [ModelError::DuplicateVariable] when the name is already taken.
    pub fn create_variable<S: Into<String>>(
        &mut self,
        name: S,
        lower_bound: f64,
        domain: Domain,
    ) -> Result<Variable, ModelError> {
        self.add_variable(VariableDefinition::new(name).min(lower_bound).domain(domain))
    }

    /// Add a variable with the given definition
    pub fn add_variable(&mut self, definition: VariableDefinition) -> Result<Variable, ModelError> {
        definition.validate()?;
        if self.by_name.contains_key(&definition.name) {
            return Err(ModelError::DuplicateVariable(definition.name));
        }
        let var = Variable::at(self.id, self.variables.len());
        tracing::debug!(
            name = %definition.name,
            min = definition.min,
            max = definition.max,
            domain = %definition.domain,
            "variable created"
        );
        self.by_name.insert(definition.name.clone(), var);
        self.variables.push(definition);
        Ok(var)
    }

    /// Set the objective. A model has at most one objective:
    /// a second call fails with [ModelError::ObjectiveAlreadySet]
    /// and leaves the first objective in place.
    pub fn set_objective<E: Into<LinearExpression>, S: Into<String>>(
        &mut self,
        expression: E,
        sense: Sense,
        label: S,
    ) -> Result<(), ModelError> {
        if let Some(existing) = &self.objective {
            return Err(ModelError::ObjectiveAlreadySet(existing.label.clone()));
        }
        let expression = expression.into();
        let label = label.into();
        self.check_expression(&expression, || format!("objective '{}'", label))?;
        tracing::debug!(%label, %sense, terms = expression.len(), "objective set");
        self.objective = Some(Objective {
            expression,
            sense,
            label,
        });
        Ok(())
    }

    /// Append the constraint `expression operator rhs`
    pub fn add_constraint<E: Into<LinearExpression>, S: Into<String>>(
        &mut self,
        expression: E,
        operator: Operator,
        rhs: f64,
        label: S,
    ) -> Result<(), ModelError> {
        let expression = expression.into();
        let label = label.into();
        let context = || format!("constraint '{}'", label);
        self.check_expression(&expression, context)?;
        if !rhs.is_finite() {
            return Err(ModelError::InvalidCoefficient {
                context: context(),
                value: rhs,
            });
        }
        tracing::debug!(%label, %operator, rhs, terms = expression.len(), "constraint added");
        self.constraints.push(Constraint {
            expression,
            operator,
            rhs,
            label,
        });
        Ok(())
    }

    fn check_expression<F: Fn() -> String>(
        &self,
        expression: &LinearExpression,
        context: F,
    ) -> Result<(), ModelError> {
        if let Some(value) = expression.first_non_finite() {
            return Err(ModelError::InvalidCoefficient {
                context: context(),
                value,
            });
        }
        if !expression.terms().all(|(var, _)| self.contains(var)) {
            return Err(ModelError::UnknownVariable { context: context() });
        }
        Ok(())
    }

    /// Whether the variable was created by this model
    pub fn contains(&self, var: Variable) -> bool {
        var.model() == self.id && var.index() < self.variables.len()
    }

    /// Find a variable by name
    pub fn variable(&self, name: &str) -> Option<Variable> {
        self.by_name.get(name).copied()
    }

    /// The definition of a variable of this model
    pub fn definition(&self, var: Variable) -> Option<&VariableDefinition> {
        if var.model() != self.id {
            return None;
        }
        self.variables.get(var.index())
    }

    /// The name a variable was created with
    pub fn variable_name(&self, var: Variable) -> Option<&str> {
        self.definition(var).map(|def| def.name.as_str())
    }

    /// Iterates over the variables with their definitions, in creation order
    pub fn variables(&self) -> impl Iterator<Item = (Variable, &VariableDefinition)> {
        let id = self.id;
        self.variables
            .iter()
            .enumerate()
            .map(move |(i, def)| (Variable::at(id, i), def))
    }

    /// The objective, if it was set
    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// The objective, or [ModelError::MissingObjective]
    pub fn require_objective(&self) -> Result<&Objective, ModelError> {
        self.objective.as_ref().ok_or(ModelError::MissingObjective)
    }

    /// The constraints, in insertion order
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The number of variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true when no variables have been added
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
