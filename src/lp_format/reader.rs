//! A reader for the subset of the CPLEX LP format that describes linear
//! programs with integer and binary variables.
use fnv::FnvHashMap as HashMap;

use crate::constraint::Operator;
use crate::error::ReadError;
use crate::expression::LinearExpression;
use crate::model::{Model, Sense};
use crate::variable::{Domain, VariableDefinition};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Preamble,
    Objective(Sense),
    Constraints,
    Bounds,
    Generals,
    Binaries,
    End,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Name(String),
    Op(Operator),
    Plus,
    Minus,
    Colon,
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: usize,
}

fn syntax(line: usize, message: impl Into<String>) -> ReadError {
    ReadError::Syntax {
        line,
        message: message.into(),
    }
}

/// Removes `\* ... *\` and `\ ...` comments, keeping line breaks.
/// Returns the cleaned text and the content of the first block comment.
fn strip_comments(text: &str) -> (String, Option<String>) {
    let mut out = String::with_capacity(text.len());
    let mut title = None;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'*') {
            chars.next();
            let mut comment = String::new();
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'\\') {
                    chars.next();
                    break;
                }
                if c == '\n' {
                    out.push('\n');
                }
                comment.push(c);
            }
            if title.is_none() {
                title = Some(comment.trim().to_string());
            }
        } else {
            for c in chars.by_ref() {
                if c == '\n' {
                    out.push('\n');
                    break;
                }
            }
        }
    }
    (out, title)
}

/// Recognizes a section keyword at the start of a line,
/// and returns the section with the rest of the line
fn section_header(line: &str) -> Option<(Section, &str)> {
    let lower = line.to_ascii_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    let first = *words.first()?;
    let (section, consumed) = match first {
        "max" | "maximize" | "maximise" | "maximum" => (Section::Objective(Sense::Maximise), 1),
        "min" | "minimize" | "minimise" | "minimum" => (Section::Objective(Sense::Minimise), 1),
        "st" | "s.t." | "st." => (Section::Constraints, 1),
        "subject" | "such" if words.get(1) == Some(&"to") || words.get(1) == Some(&"that") => {
            (Section::Constraints, 2)
        }
        "bound" | "bounds" => (Section::Bounds, 1),
        "gen" | "general" | "generals" | "integer" | "integers" => (Section::Generals, 1),
        "bin" | "binary" | "binaries" => (Section::Binaries, 1),
        "end" => (Section::End, 1),
        _ => return None,
    };
    // the keyword is a whole word: "bin x" is a header, "bin_x" is not
    let mut rest = line.trim_start();
    for _ in 0..consumed {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    Some((section, rest))
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '+' | '-' | ':' | '<' | '>' | '=')
}

fn tokenize(text: &str, line: usize, tokens: &mut Vec<Spanned>) -> Result<(), ReadError> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let token = if c.is_whitespace() {
            i += 1;
            continue;
        } else if c == '+' {
            i += 1;
            Token::Plus
        } else if c == '-' {
            i += 1;
            Token::Minus
        } else if c == ':' {
            i += 1;
            Token::Colon
        } else if matches!(c, '<' | '>' | '=') {
            let mut op: String = c.to_string();
            i += 1;
            if i < chars.len() && matches!(chars[i], '<' | '>' | '=') {
                op.push(chars[i]);
                i += 1;
            }
            Token::Op(match op.as_str() {
                "<" | "<=" | "=<" => Operator::LessOrEqual,
                ">" | ">=" | "=>" => Operator::GreaterOrEqual,
                "=" | "==" => Operator::Equal,
                other => return Err(syntax(line, format!("unknown operator '{}'", other))),
            })
        } else if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            // exponent, only when digits follow
            if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                let mut j = i + 1;
                if j < chars.len() && matches!(chars[j], '+' | '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    while j < chars.len() && chars[j].is_ascii_digit() {
                        j += 1;
                    }
                    i = j;
                }
            }
            let literal: String = chars[start..i].iter().collect();
            let value = literal
                .parse::<f64>()
                .map_err(|_| syntax(line, format!("invalid number '{}'", literal)))?;
            Token::Number(value)
        } else {
            let start = i;
            while i < chars.len() && is_name_char(chars[i]) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            match word.to_ascii_lowercase().as_str() {
                "inf" | "infinity" => Token::Number(f64::INFINITY),
                _ => Token::Name(word),
            }
        };
        tokens.push(Spanned { token, line });
    }
    Ok(())
}

/// Variables in order of first appearance, with their definition so far
#[derive(Default)]
struct Registry {
    definitions: Vec<VariableDefinition>,
    index: HashMap<String, usize>,
}

impl Registry {
    fn get_or_add(&mut self, name: &str) -> usize {
        if let Some(&i) = self.index.get(name) {
            return i;
        }
        let i = self.definitions.len();
        self.definitions.push(VariableDefinition::new(name));
        self.index.insert(name.to_string(), i);
        i
    }
}

type Terms = (Vec<(usize, f64)>, f64);

struct Cursor<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.line)
    }

    fn is_done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// `name :` at the cursor
    fn label(&mut self) -> Option<&'a str> {
        match (self.peek(), self.peek_at(1)) {
            (Some(Token::Name(name)), Some(Token::Colon)) => {
                self.pos += 2;
                Some(name.as_str())
            }
            _ => None,
        }
    }

    /// A signed number, such as `- 3` or `+inf`
    fn signed_number(&mut self) -> Result<f64, ReadError> {
        let mut sign = 1.;
        loop {
            match self.next() {
                Some(Token::Plus) => {}
                Some(Token::Minus) => sign = -sign,
                Some(Token::Number(n)) => return Ok(sign * n),
                _ => return Err(syntax(self.line(), "expected a number")),
            }
        }
    }

    /// Terms until anything that cannot continue the expression.
    /// Stops before a `name :` pair, which starts the next row.
    fn expression(&mut self, registry: &mut Registry) -> Result<Terms, ReadError> {
        let mut terms = vec![];
        let mut constant = 0.;
        loop {
            let start = self.pos;
            let mut sign = 1.;
            while let Some(Token::Plus | Token::Minus) = self.peek() {
                if self.next() == Some(&Token::Minus) {
                    sign = -sign;
                }
            }
            match (self.peek(), self.peek_at(1)) {
                (Some(Token::Number(n)), Some(Token::Name(name)))
                    if self.peek_at(2) != Some(&Token::Colon) =>
                {
                    terms.push((registry.get_or_add(name), sign * n));
                    self.pos += 2;
                }
                (Some(Token::Number(n)), _) => {
                    constant += sign * n;
                    self.pos += 1;
                }
                (Some(Token::Name(name)), next) if next != Some(&Token::Colon) => {
                    terms.push((registry.get_or_add(name), sign));
                    self.pos += 1;
                }
                _ => {
                    if self.pos != start {
                        return Err(syntax(self.line(), "dangling sign"));
                    }
                    return Ok((terms, constant));
                }
            }
        }
    }
}

struct Row {
    label: String,
    terms: Vec<(usize, f64)>,
    constant: f64,
    operator: Operator,
    rhs: f64,
}

/// Parse LP text into a [Model].
///
/// Variables are registered in order of first appearance, with the
/// LP defaults (lower bound 0, no upper bound, continuous) until the
/// `Bounds`, `Generals` and `Binaries` sections say otherwise.
pub fn parse_lp(text: &str) -> Result<Model, ReadError> {
    let (clean, title) = strip_comments(text);
    let mut sections: Vec<(Section, Vec<Spanned>)> = vec![];
    let mut current = Section::Preamble;
    let mut tokens = vec![];
    for (i, raw_line) in clean.lines().enumerate() {
        let line = i + 1;
        let mut content = raw_line;
        if let Some((section, rest)) = section_header(raw_line) {
            sections.push((current, std::mem::take(&mut tokens)));
            current = section;
            content = rest;
        }
        tokenize(content, line, &mut tokens)?;
    }
    sections.push((current, tokens));

    let mut registry = Registry::default();
    let mut objective: Option<(Sense, String, Terms)> = None;
    let mut rows: Vec<Row> = vec![];
    let mut ended = false;
    for (section, tokens) in &sections {
        let mut cursor = Cursor {
            tokens,
            pos: 0,
        };
        match *section {
            Section::Preamble | Section::End => {
                if let Some(t) = tokens.first() {
                    return Err(syntax(t.line, "content outside of any section"));
                }
                ended |= *section == Section::End;
            }
            Section::Objective(sense) => {
                if objective.is_some() {
                    return Err(syntax(cursor.line(), "more than one objective section"));
                }
                let label = cursor.label().unwrap_or("obj").to_string();
                let terms = cursor.expression(&mut registry)?;
                if !cursor.is_done() {
                    return Err(syntax(cursor.line(), "unexpected token in objective"));
                }
                objective = Some((sense, label, terms));
            }
            Section::Constraints => {
                while !cursor.is_done() {
                    let label = cursor
                        .label()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("C{}", rows.len() + 1));
                    let (terms, constant) = cursor.expression(&mut registry)?;
                    let operator = match cursor.next() {
                        Some(Token::Op(op)) => *op,
                        _ => {
                            return Err(syntax(
                                cursor.line(),
                                format!("constraint '{}' has no comparison operator", label),
                            ))
                        }
                    };
                    let rhs = cursor.signed_number()?;
                    rows.push(Row {
                        label,
                        terms,
                        constant,
                        operator,
                        rhs,
                    });
                }
            }
            Section::Bounds => {
                while !cursor.is_done() {
                    parse_bound(&mut cursor, &mut registry)?;
                }
            }
            Section::Generals | Section::Binaries => {
                let domain = if *section == Section::Generals {
                    Domain::Integer
                } else {
                    Domain::Binary
                };
                while let Some(token) = cursor.next() {
                    let Token::Name(name) = token else {
                        return Err(syntax(cursor.line(), "expected a variable name"));
                    };
                    let i = registry.get_or_add(name);
                    let def = &mut registry.definitions[i];
                    def.domain = domain;
                    if domain == Domain::Binary {
                        def.min = def.min.max(0.);
                        def.max = def.max.min(1.);
                    }
                }
            }
        }
    }
    if !ended {
        return Err(syntax(clean.lines().count(), "missing 'End'"));
    }

    let mut model = Model::new(title.unwrap_or_else(|| "lp".to_string()));
    let variables = registry
        .definitions
        .into_iter()
        .map(|def| model.add_variable(def))
        .collect::<Result<Vec<_>, _>>()?;
    let expression = |(terms, constant): Terms| {
        let mut expr = LinearExpression::with_capacity(terms.len());
        for (i, coeff) in terms {
            expr.add_term(variables[i], coeff);
        }
        expr.add_constant(constant);
        expr
    };
    if let Some((sense, label, terms)) = objective {
        model.set_objective(expression(terms), sense, label)?;
    }
    for row in rows {
        model.add_constraint(
            expression((row.terms, 0.)),
            row.operator,
            row.rhs - row.constant,
            row.label,
        )?;
    }
    Ok(model)
}

/// One of `x free`, `x op n`, `n op x`, `n op x op m`
fn parse_bound(cursor: &mut Cursor<'_>, registry: &mut Registry) -> Result<(), ReadError> {
    let line = cursor.line();
    if let Some(Token::Name(name)) = cursor.peek() {
        cursor.pos += 1;
        let i = registry.get_or_add(name);
        match cursor.next() {
            Some(Token::Name(word)) if word.eq_ignore_ascii_case("free") => {
                registry.definitions[i].min = f64::NEG_INFINITY;
                registry.definitions[i].max = f64::INFINITY;
            }
            Some(Token::Op(op)) => {
                let op = *op;
                let value = cursor.signed_number()?;
                apply_bound(&mut registry.definitions[i], op, value, false);
            }
            _ => return Err(syntax(line, format!("invalid bound for '{}'", name))),
        }
        return Ok(());
    }
    let value = cursor.signed_number()?;
    let Some(Token::Op(op)) = cursor.next() else {
        return Err(syntax(line, "expected a comparison operator in bound"));
    };
    let op = *op;
    let Some(Token::Name(name)) = cursor.next() else {
        return Err(syntax(line, "expected a variable name in bound"));
    };
    let i = registry.get_or_add(name);
    apply_bound(&mut registry.definitions[i], op, value, true);
    if let Some(Token::Op(op)) = cursor.peek() {
        cursor.pos += 1;
        let op = *op;
        let value = cursor.signed_number()?;
        apply_bound(&mut registry.definitions[i], op, value, false);
    }
    Ok(())
}

/// `value_first` means `value op x` rather than `x op value`
fn apply_bound(def: &mut VariableDefinition, op: Operator, value: f64, value_first: bool) {
    let op = match (op, value_first) {
        (Operator::LessOrEqual, true) => Operator::GreaterOrEqual,
        (Operator::GreaterOrEqual, true) => Operator::LessOrEqual,
        (op, _) => op,
    };
    match op {
        Operator::LessOrEqual => def.max = value,
        Operator::GreaterOrEqual => def.min = value,
        Operator::Equal => {
            def.min = value;
            def.max = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelError;

    #[test]
    fn parses_a_small_model() {
        let text = "\\* small *\\
Maximize
 revenue: 3 x + 2 y
  + 1.5 z
Subject To
 cap: x + y <= 4
 c2: - x + 2 y >= -1e1
Bounds
 x <= 3
 0 <= y <= 2.5
General
 x
End";
        let model = parse_lp(text).unwrap();
        assert_eq!(model.name(), "small");
        let objective = model.objective().unwrap();
        assert_eq!(objective.sense(), Sense::Maximise);
        assert_eq!(objective.label(), "revenue");
        let x = model.variable("x").unwrap();
        let z = model.variable("z").unwrap();
        assert_eq!(objective.expression().coefficient(z), 1.5);
        assert_eq!(model.definition(x).unwrap().upper_bound(), 3.);
        assert_eq!(model.definition(x).unwrap().get_domain(), Domain::Integer);
        let c2 = &model.constraints()[1];
        assert_eq!(c2.label(), "c2");
        assert_eq!(c2.operator(), Operator::GreaterOrEqual);
        assert_eq!(c2.rhs(), -10.);
        assert_eq!(c2.expression().coefficient(x), -1.);
    }

    #[test]
    fn unlabelled_rows_and_comments() {
        let text = "min \\ cheapest
 x + y
st
 x + y >= 2 \\ demand
 x - y = 0
end";
        let model = parse_lp(text).unwrap();
        let labels: Vec<_> = model.constraints().iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["C1", "C2"]);
        assert_eq!(model.objective().unwrap().label(), "obj");
    }

    #[test]
    fn reports_the_line_of_a_syntax_error() {
        let text = "Maximize\nobj: x\nSubject To\nc1: x + y 4\nEnd\n";
        assert!(matches!(
            parse_lp(text),
            Err(ReadError::Syntax { line: 4, .. })
        ));
    }

    #[test]
    fn free_variables_are_not_representable() {
        let text = "Minimize\nobj: x\nBounds\nx free\nEnd\n";
        assert!(matches!(
            parse_lp(text),
            Err(ReadError::Model(ModelError::InvalidBound { .. }))
        ));
    }

    #[test]
    fn missing_end_is_an_error() {
        assert!(parse_lp("Maximize\nobj: x\n").is_err());
    }
}
