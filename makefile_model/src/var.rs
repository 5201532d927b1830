use crate::error::{Error, Result};

/// Assignment flavor, named after the operator it renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assign {
    /// Recursively expanded, `=`
    Deferred,
    /// Simply expanded, `:=`
    Simple,
    /// Immediately expanded, `:::=`
    Immediate,
    /// Conditional default, `?=`
    Conditional,
    /// Appending, `+=`
    Append,
}

impl Assign {
    pub fn op(self) -> &'static str {
        match self {
            Assign::Deferred => "=",
            Assign::Simple => ":=",
            Assign::Immediate => ":::=",
            Assign::Conditional => "?=",
            Assign::Append => "+=",
        }
    }
}

/// Host `make` version, queried once by the caller and injected here.
/// Rendering stays pure; nothing in this crate shells out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MakeInfo {
    pub version: f64,
}

impl MakeInfo {
    pub fn new(version: f64) -> Self {
        Self { version }
    }

    /// `define NAME =` headers appeared after 3.81; older versions only
    /// accept the bare `define NAME` spelling.
    pub fn define_takes_op(self) -> bool {
        self.version > 3.81
    }
}

impl Default for MakeInfo {
    fn default() -> Self {
        Self { version: 4.4 }
    }
}

/// A Makefile variable: key, value and assignment flavor.
///
/// A multi-valued variable joins its values with newlines and renders as a
/// `define`/`endef` block instead of an inline assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    key: String,
    value: String,
    assign: Assign,
}

impl Var {
    /// Build a variable from one or more value lines. Zero values is a
    /// construction error.
    pub fn new<S: AsRef<str>>(key: &str, assign: Assign, values: &[S]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::EmptyVariable(key.to_string()));
        }
        let value = values
            .iter()
            .map(|v| v.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        Ok(Self {
            key: key.to_string(),
            value,
            assign,
        })
    }

    pub fn deferred<S: AsRef<str>>(key: &str, values: &[S]) -> Result<Self> {
        Self::new(key, Assign::Deferred, values)
    }

    pub fn simple<S: AsRef<str>>(key: &str, values: &[S]) -> Result<Self> {
        Self::new(key, Assign::Simple, values)
    }

    pub fn immediate<S: AsRef<str>>(key: &str, values: &[S]) -> Result<Self> {
        Self::new(key, Assign::Immediate, values)
    }

    pub fn conditional<S: AsRef<str>>(key: &str, values: &[S]) -> Result<Self> {
        Self::new(key, Assign::Conditional, values)
    }

    pub fn append<S: AsRef<str>>(key: &str, values: &[S]) -> Result<Self> {
        Self::new(key, Assign::Append, values)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn assign(&self) -> Assign {
        self.assign
    }

    /// Render as `KEY op VALUE`, or as a `define`/`endef` block when the
    /// value spans multiple lines.
    pub fn render(&self, make: MakeInfo) -> String {
        if self.value.contains('\n') {
            let header = if make.define_takes_op() {
                format!("define {} {}", self.key, self.assign.op())
            } else {
                format!("define {}", self.key)
            };
            format!("{header}\n{}\nendef\n", self.value)
        } else {
            format!("{} {} {}", self.key, self.assign.op(), self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_renders_inline() {
        let var = Var::deferred("CC", &["gcc"]).unwrap();
        assert_eq!(var.render(MakeInfo::default()), "CC = gcc");
    }

    #[test]
    fn each_flavor_renders_its_operator() {
        let make = MakeInfo::default();
        let cases = [
            (Assign::Deferred, "FLAGS = -Wall"),
            (Assign::Simple, "FLAGS := -Wall"),
            (Assign::Immediate, "FLAGS :::= -Wall"),
            (Assign::Conditional, "FLAGS ?= -Wall"),
            (Assign::Append, "FLAGS += -Wall"),
        ];
        for (assign, expected) in cases {
            let var = Var::new("FLAGS", assign, &["-Wall"]).unwrap();
            assert_eq!(var.render(make), expected);
        }
    }

    #[test]
    fn multiline_value_renders_define_block() {
        let var = Var::deferred("make_echos", &["@echo 1", "@echo 2"]).unwrap();
        assert_eq!(
            var.render(MakeInfo::new(4.3)),
            "define make_echos =\n@echo 1\n@echo 2\nendef\n"
        );
    }

    #[test]
    fn old_make_gets_bare_define_header() {
        let var = Var::deferred("make_echos", &["@echo 1", "@echo 2"]).unwrap();
        assert_eq!(
            var.render(MakeInfo::new(3.79)),
            "define make_echos\n@echo 1\n@echo 2\nendef\n"
        );
    }

    #[test]
    fn zero_values_is_a_construction_error() {
        let values: &[&str] = &[];
        let err = Var::deferred("EMPTY", values).unwrap_err();
        assert!(matches!(err, Error::EmptyVariable(_)));
    }
}
