use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use fnv::FnvHashMap as HashMap;

use crate::solvers::Solution;
use crate::variable::Variable;

/// Represents an affine expression, such as `2x + 3` or `x + y + z`:
/// a coefficient per variable, plus a constant term.
///
/// ```
/// # use product_mix::{Domain, LinearExpression, Model};
/// let mut model = Model::new("example");
/// let a = model.create_variable("a", 0., Domain::Integer)?;
/// let b = model.create_variable("b", 0., Domain::Integer)?;
/// let revenue: LinearExpression = 550 * a + 600 * b + 10.;
/// assert_eq!(revenue.coefficient(b), 600.);
/// assert_eq!(revenue.constant(), 10.);
/// # Ok::<_, product_mix::ModelError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearExpression {
    pub(crate) coefficients: HashMap<Variable, f64>,
    pub(crate) constant: f64,
}

impl LinearExpression {
    /// Create an expression that has the value 0, but has memory allocated
    /// for `capacity` coefficients.
    pub fn with_capacity(capacity: usize) -> Self {
        LinearExpression {
            coefficients: HashMap::with_capacity_and_hasher(capacity, Default::default()),
            constant: 0.0,
        }
    }

    /// Performs self = self + (a * b)
    #[inline]
    pub fn add_mul<N: Into<f64>, E: Into<LinearExpression>>(&mut self, a: N, b: E) {
        let factor = a.into();
        let b = b.into();
        for (var, value) in b.coefficients {
            *self.coefficients.entry(var).or_default() += factor * value
        }
        self.constant += factor * b.constant;
    }

    /// Add a linear term to this expression
    pub fn add_term(&mut self, var: Variable, coefficient: f64) {
        *self.coefficients.entry(var).or_default() += coefficient;
    }

    /// Add a constant term to this expression
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// The coefficient of `var`, 0 if the variable does not appear
    pub fn coefficient(&self, var: Variable) -> f64 {
        self.coefficients.get(&var).copied().unwrap_or(0.)
    }

    /// The constant term
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Iterates over the variables and their coefficients, in no particular order
    pub fn terms(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        self.coefficients.iter().map(|(&var, &coeff)| (var, coeff))
    }

    /// The non-zero terms, ordered by variable creation
    pub(crate) fn sorted_terms(&self) -> Vec<(Variable, f64)> {
        let mut terms: Vec<_> = self.terms().filter(|&(_, c)| c != 0.).collect();
        terms.sort_unstable_by_key(|&(var, _)| var);
        terms
    }

    /// Number of variables with a stored coefficient
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns true when the expression has no variable term
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Evaluate the concrete value of the expression, given the values of the variables
    ///
    /// ```
    /// use std::collections::HashMap;
    /// # use product_mix::{Domain, Model};
    /// let mut model = Model::new("example");
    /// let a = model.create_variable("a", 0., Domain::Continuous)?;
    /// let b = model.create_variable("b", 0., Domain::Continuous)?;
    /// let expr = a + b / 2;
    /// let values: HashMap<_, _> = vec![(a, 3.), (b, 10.)].into_iter().collect();
    /// assert_eq!(expr.eval_with(&values), 8.);
    /// # Ok::<_, product_mix::ModelError>(())
    /// ```
    pub fn eval_with<S: Solution>(&self, values: &S) -> f64 {
        self.constant
            + self
                .coefficients
                .iter()
                .map(|(&var, &coefficient)| coefficient * values.value(var))
                .sum::<f64>()
    }

    /// The first coefficient or constant that is NaN or infinite
    pub(crate) fn first_non_finite(&self) -> Option<f64> {
        std::iter::once(self.constant)
            .chain(self.coefficients.values().copied())
            .find(|c| !c.is_finite())
    }
}

impl From<Variable> for LinearExpression {
    fn from(var: Variable) -> Self {
        var * 1.
    }
}

impl From<&Variable> for LinearExpression {
    fn from(var: &Variable) -> Self {
        *var * 1.
    }
}

macro_rules! impl_from_num {
    ($($num:ty),*) => {$(
        impl From<$num> for LinearExpression {
            fn from(constant: $num) -> Self {
                LinearExpression {
                    coefficients: HashMap::default(),
                    constant: f64::from(constant),
                }
            }
        }
    )*};
}

impl_from_num!(f64, f32, u32, u16, u8, i32, i16, i8);

impl<RHS: Into<LinearExpression>> AddAssign<RHS> for LinearExpression {
    fn add_assign(&mut self, rhs: RHS) {
        self.add_mul(1., rhs)
    }
}

impl<RHS: Into<LinearExpression>> SubAssign<RHS> for LinearExpression {
    fn sub_assign(&mut self, rhs: RHS) {
        self.add_mul(-1., rhs)
    }
}

impl<N: Into<f64>> MulAssign<N> for LinearExpression {
    fn mul_assign(&mut self, rhs: N) {
        let factor = rhs.into();
        for value in self.coefficients.values_mut() {
            *value *= factor
        }
        self.constant *= factor
    }
}

impl<RHS: Into<LinearExpression>> Add<RHS> for LinearExpression {
    type Output = LinearExpression;

    fn add(mut self, rhs: RHS) -> Self::Output {
        self += rhs;
        self
    }
}

impl<RHS: Into<LinearExpression>> Sub<RHS> for LinearExpression {
    type Output = LinearExpression;

    fn sub(mut self, rhs: RHS) -> Self::Output {
        self -= rhs;
        self
    }
}

impl<RHS: Into<LinearExpression>> Add<RHS> for Variable {
    type Output = LinearExpression;

    fn add(self, rhs: RHS) -> Self::Output {
        LinearExpression::from(self) + rhs
    }
}

impl<RHS: Into<LinearExpression>> Sub<RHS> for Variable {
    type Output = LinearExpression;

    fn sub(self, rhs: RHS) -> Self::Output {
        LinearExpression::from(self) - rhs
    }
}

impl Neg for LinearExpression {
    type Output = LinearExpression;

    fn neg(mut self) -> Self::Output {
        self *= -1.;
        self
    }
}

macro_rules! impl_num_ops_for_expr {
    ($($num:ty),*) => {$(
        impl Mul<$num> for LinearExpression {
            type Output = LinearExpression;
            fn mul(mut self, rhs: $num) -> Self::Output {
                self *= rhs;
                self
            }
        }

        impl Div<$num> for LinearExpression {
            type Output = LinearExpression;
            fn div(mut self, rhs: $num) -> Self::Output {
                self *= 1.0 / f64::from(rhs);
                self
            }
        }

        impl Mul<LinearExpression> for $num {
            type Output = LinearExpression;
            fn mul(self, mut rhs: LinearExpression) -> Self::Output {
                rhs *= self;
                rhs
            }
        }

        impl Add<LinearExpression> for $num {
            type Output = LinearExpression;
            fn add(self, rhs: LinearExpression) -> Self::Output {
                rhs + self
            }
        }

        impl Sub<LinearExpression> for $num {
            type Output = LinearExpression;
            fn sub(self, rhs: LinearExpression) -> Self::Output {
                -rhs + self
            }
        }

        impl Add<Variable> for $num {
            type Output = LinearExpression;
            fn add(self, rhs: Variable) -> Self::Output {
                rhs + self
            }
        }

        impl Sub<Variable> for $num {
            type Output = LinearExpression;
            fn sub(self, rhs: Variable) -> Self::Output {
                -rhs + self
            }
        }
    )*};
}

impl_num_ops_for_expr!(f64, i32);

impl<E: Into<LinearExpression>> Sum<E> for LinearExpression {
    fn sum<I: Iterator<Item = E>>(iter: I) -> Self {
        let mut total = LinearExpression::default();
        for expr in iter {
            total += expr;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::{Domain, LinearExpression, Model};

    #[test]
    fn expression_manipulation() {
        let mut model = Model::new("t");
        let v0 = model.create_variable("v0", 0., Domain::Continuous).unwrap();
        let v1 = model.create_variable("v1", 0., Domain::Continuous).unwrap();
        assert_eq!((3. - v0) - v1, (-1.) * v0 + (-1.) * v1 + 3.)
    }

    #[test]
    fn like_terms_are_merged() {
        let mut model = Model::new("t");
        let a = model.create_variable("a", 0., Domain::Integer).unwrap();
        let b = model.create_variable("b", 0., Domain::Integer).unwrap();
        let expr = 9. * (a - b * 2.) + 4 * a / 2 - a;
        assert_eq!(expr.coefficient(a), 10.);
        assert_eq!(expr.coefficient(b), -18.);
        assert_eq!(expr.sorted_terms(), vec![(a, 10.), (b, -18.)]);
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn eval() {
        let mut model = Model::new("t");
        let a = model.create_variable("a", 0., Domain::Continuous).unwrap();
        let b = model.create_variable("b", 0., Domain::Continuous).unwrap();
        let mut values = HashMap::new();
        values.insert(a, 100.);
        values.insert(b, -1.);
        assert_eq!((a + 3.0_f64 * (b + 3.0_f64)).eval_with(&values), 106.)
    }

    #[test]
    fn sum_of_variables() {
        let mut model = Model::new("t");
        let vars: Vec<_> = (0..10)
            .map(|i| {
                model
                    .create_variable(format!("x{}", i), 0., Domain::Integer)
                    .unwrap()
            })
            .collect();
        let forward: LinearExpression = vars.iter().sum();
        let reverse: LinearExpression = vars.iter().rev().sum();
        assert_eq!(forward, reverse);
        assert_eq!(forward.len(), 10);
    }

    #[test]
    fn detects_non_finite_coefficients() {
        let mut model = Model::new("t");
        let a = model.create_variable("a", 0., Domain::Continuous).unwrap();
        assert_eq!((2 * a + 1.).first_non_finite(), None);
        assert!((f64::NAN * a).first_non_finite().unwrap().is_nan());
        assert_eq!(
            (a + f64::INFINITY).first_non_finite(),
            Some(f64::INFINITY)
        );
    }
}
