//! Variable and constraint names as they appear in an LP file.
//!
//! Model names are free text ("No. of Product A"), LP names are not:
//! they cannot contain spaces or operators, cannot start with a digit or a
//! period, and must be unique within their kind.
use fnv::FnvHashSet as HashSet;

use crate::model::Model;

const FORBIDDEN: &[char] = &['+', '-', '*', '/', '\\', '^', ':', '<', '>', '=', '[', ']'];

const KEYWORDS: &[&str] = &[
    "max", "maximize", "maximise", "maximum", "min", "minimize", "minimise", "minimum", "st",
    "s.t.", "st.", "subject", "such", "bound", "bounds", "gen", "general", "generals", "integer",
    "integers", "bin", "binary", "binaries", "end", "free", "inf", "infinity",
];

/// Turn free text into a valid LP identifier
pub(crate) fn sanitize(raw: &str, fallback: &str) -> String {
    let mut name: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || !c.is_ascii() || c.is_ascii_control() || FORBIDDEN.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    if name.is_empty() {
        name = fallback.to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        || KEYWORDS.contains(&name.to_ascii_lowercase().as_str())
    {
        name.insert(0, '_');
    }
    name
}

#[derive(Default)]
struct UniqueNames {
    used: HashSet<String>,
}

impl UniqueNames {
    fn add(&mut self, name: String) -> String {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while !self.used.insert(candidate.clone()) {
            candidate = format!("{}_{}", name, suffix);
            suffix += 1;
        }
        candidate
    }
}

/// The LP names of every element of a model
#[derive(Debug, Clone, PartialEq)]
pub struct LpNames {
    /// Objective row name
    pub objective: String,
    /// Variable names, in creation order
    pub variables: Vec<String>,
    /// Constraint names, in insertion order
    pub constraints: Vec<String>,
}

impl LpNames {
    /// Compute unique LP names for the elements of a model
    pub fn new(model: &Model) -> Self {
        let mut variable_names = UniqueNames::default();
        let variables = model
            .variables()
            .map(|(var, def)| {
                variable_names.add(sanitize(&def.name, &format!("x{}", var.index())))
            })
            .collect();
        let mut row_names = UniqueNames::default();
        let objective = row_names.add(sanitize(
            model.objective().map(|o| o.label()).unwrap_or_default(),
            "OBJ",
        ));
        let constraints = model
            .constraints()
            .iter()
            .enumerate()
            .map(|(i, c)| row_names.add(sanitize(&c.label, &format!("C{}", i + 1))))
            .collect();
        LpNames {
            objective,
            variables,
            constraints,
        }
    }
}
