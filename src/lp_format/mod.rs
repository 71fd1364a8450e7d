//! Reading and writing models in the CPLEX LP text format.
//!
//! The writer emits the objective, the constraints, the variable bounds and
//! the `Generals`/`Binaries` integrality sections. Free text labels are
//! turned into valid LP identifiers by [LpNames]. Terms are written in
//! variable creation order, so exporting the same model twice yields
//! byte-identical files.
use std::io;
use std::path::Path;

pub use names::LpNames;
pub use reader::parse_lp;

use crate::error::{ExportError, ModelError, ReadError};
use crate::model::Model;

mod names;
mod reader;
mod writer;

/// The LP file content describing the model
pub fn to_lp_string(model: &Model) -> Result<String, ModelError> {
    writer::render(model)
}

/// Write the LP representation of the model to any writer
pub fn write_lp<W: io::Write>(model: &Model, mut out: W) -> Result<(), ExportError> {
    let text = writer::render(model)?;
    out.write_all(text.as_bytes())
        .map_err(|source| ExportError::Write {
            path: "<writer>".into(),
            source,
        })
}

/// Persist the model to `path` as an LP file, overwriting any existing file.
///
/// ```
/// use product_mix::{export, Domain, Model, Sense};
/// let mut model = Model::new("tiny");
/// let x = model.create_variable("x", 0., Domain::Integer)?;
/// model.set_objective(x, Sense::Maximise, "obj")?;
/// let path = std::env::temp_dir().join("product_mix_doc_tiny.lp");
/// export(&model, &path)?;
/// assert!(std::fs::read_to_string(&path)?.starts_with("\\* tiny *\\"));
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
pub fn export<P: AsRef<Path>>(model: &Model, path: P) -> Result<(), ExportError> {
    let path = path.as_ref();
    let text = writer::render(model)?;
    std::fs::write(path, &text).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = text.len(), "model exported");
    Ok(())
}

/// Load a model from an LP file
pub fn read_lp<P: AsRef<Path>>(path: P) -> Result<Model, ReadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let model = parse_lp(&text)?;
    tracing::debug!(
        path = %path.display(),
        variables = model.len(),
        constraints = model.constraints().len(),
        "model read"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Domain, Operator, Sense};

    fn small_model() -> Model {
        let mut model = Model::new("small");
        let a = model.create_variable("a", 0., Domain::Integer).unwrap();
        let b = model.create_variable("b", 1., Domain::Continuous).unwrap();
        model.set_objective(a + 2 * b, Sense::Maximise, "obj").unwrap();
        model
            .add_constraint(a + b, Operator::LessOrEqual, 10., "cap")
            .unwrap();
        model
    }

    #[test]
    fn export_is_idempotent() {
        let model = small_model();
        let path = std::env::temp_dir().join(format!("product_mix_idem_{}.lp", std::process::id()));
        export(&model, &path).unwrap();
        let first = std::fs::read(&path).unwrap();
        export(&model, &path).unwrap();
        let second = std::fs::read(&path).unwrap();
        assert_eq!(first, second);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn export_to_a_directory_fails() {
        let model = small_model();
        let dir = std::env::temp_dir();
        match export(&model, &dir) {
            Err(ExportError::Write { path, .. }) => assert_eq!(path, dir),
            other => panic!("expected a write error, got {:?}", other),
        }
    }

    #[test]
    fn write_lp_matches_to_lp_string() {
        let model = small_model();
        let mut buffer: Vec<u8> = vec![];
        write_lp(&model, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), to_lp_string(&model).unwrap());
    }

    #[test]
    fn read_what_was_written() {
        let model = small_model();
        let path = std::env::temp_dir().join(format!("product_mix_read_{}.lp", std::process::id()));
        export(&model, &path).unwrap();
        let read = read_lp(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(read.name(), "small");
        assert_eq!(read.len(), 2);
        let b = read.variable("b").unwrap();
        assert_eq!(read.definition(b).unwrap().lower_bound(), 1.);
        assert_eq!(read.constraints()[0].rhs(), 10.);
    }
}
