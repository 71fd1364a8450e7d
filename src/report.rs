//! Human-readable rendering of a [SolveResult].
use std::io::{self, Write};

use crate::model::Model;
use crate::solvers::SolveResult;

/// Write the status line, then one `name = value` line per variable, in creation order.
/// Values are only printed for an optimal result; otherwise every line reads `None`.
///
/// ```
/// use product_mix::{report, Domain, Model, SolveResult, SolveStatus};
/// let mut model = Model::new("r");
/// model.create_variable("x", 0., Domain::Integer)?;
/// let mut out: Vec<u8> = vec![];
/// report(&model, &SolveResult::without_solution(SolveStatus::Infeasible), &mut out)?;
/// assert_eq!(String::from_utf8(out)?, "Status: Infeasible\nx = None\n");
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
pub fn report<W: Write>(model: &Model, result: &SolveResult, out: &mut W) -> io::Result<()> {
    writeln!(out, "Status: {}", result.status())?;
    for (var, def) in model.variables() {
        match result.value(var) {
            Some(value) => writeln!(out, "{} = {}", def.name(), value)?,
            None => writeln!(out, "{} = None", def.name())?,
        }
    }
    Ok(())
}

/// [report] to the standard output
pub fn print_report(model: &Model, result: &SolveResult) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    report(model, result, &mut lock)?;
    lock.flush()
}

#[cfg(test)]
mod tests {
    use super::report;
    use crate::{Domain, Model, Sense, SolveResult, SolveStatus};

    fn rendered(model: &Model, result: &SolveResult) -> String {
        let mut out: Vec<u8> = vec![];
        report(model, result, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn optimal_values_in_creation_order() {
        let mut model = Model::new("r");
        let b = model.create_variable("b", 0., Domain::Continuous).unwrap();
        let a = model.create_variable("a", 0., Domain::Integer).unwrap();
        model.set_objective(a + b, Sense::Maximise, "o").unwrap();
        let result = SolveResult::optimal(&model, vec![2.5, 10.]).unwrap();
        assert_eq!(rendered(&model, &result), "Status: Optimal\nb = 2.5\na = 10\n");
    }

    #[test]
    fn non_optimal_statuses_print_none() {
        let mut model = Model::new("r");
        model.create_variable("x", 0., Domain::Integer).unwrap();
        model.create_variable("y", 0., Domain::Integer).unwrap();
        for status in [
            SolveStatus::Infeasible,
            SolveStatus::Unbounded,
            SolveStatus::Undefined,
            SolveStatus::NotSolved,
        ] {
            let text = rendered(&model, &SolveResult::without_solution(status));
            let mut lines = text.lines();
            assert_eq!(lines.next(), Some(format!("Status: {}", status).as_str()));
            assert!(lines.all(|line| line.ends_with(" = None")));
        }
    }
}
