use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure conditions raised while assembling a build command or Makefile.
///
/// All of these are local and synchronous; the CLI is the only place that
/// catches them.
#[derive(Debug)]
pub enum Error {
    /// A variable was constructed with zero values.
    EmptyVariable(String),
    /// A directory-valued entry does not name an existing directory.
    InvalidDir(String),
    /// A `$(NAME)` reference to a variable that was never registered.
    UnknownVariable(String),
    /// A referenced variable whose value is not an existing directory.
    VariableNotDir { key: String, value: String },
    /// Re-added entry under the `OnDuplicate::Error` policy.
    DuplicateEntry { entry: String, list: &'static str },
    /// Re-registered variable key under the `OnDuplicate::Error` policy.
    DuplicateVariable(String),
    /// A target whose rendered text already exists.
    DuplicateTarget(String),
    /// A pattern rule whose rendered text already exists.
    DuplicatePatternRule(String),
    /// A target with neither recipe nor dependencies.
    EmptyTarget(String),
    /// A pattern rule with an empty recipe.
    EmptyRecipe(String),
    /// A pattern-rule side without the `%` wildcard.
    MissingWildcard { which: &'static str, pattern: String },
    /// An automatic-variable token outside the fixed set.
    UnknownAutoVar(String),
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyVariable(key) => {
                write!(f, "variable '{key}' needs at least one value")
            }
            Error::InvalidDir(path) => write!(f, "not a directory: {path}"),
            Error::UnknownVariable(key) => write!(f, "invalid variable: {key}"),
            Error::VariableNotDir { key, value } => {
                write!(f, "value of variable {key} is not a directory: {value}")
            }
            Error::DuplicateEntry { entry, list } => {
                write!(f, "entry: {entry} already exists in {list} list")
            }
            Error::DuplicateVariable(key) => {
                write!(f, "variable: {key} already exists")
            }
            Error::DuplicateTarget(target) => {
                write!(f, "target: '{target}' already exists in targets list")
            }
            Error::DuplicatePatternRule(rule) => {
                write!(f, "pattern rule: '{rule}' already exists")
            }
            Error::EmptyTarget(name) => {
                write!(f, "target '{name}' needs a recipe or dependencies")
            }
            Error::EmptyRecipe(name) => {
                write!(f, "pattern rule '{name}' needs a recipe")
            }
            Error::MissingWildcard { which, pattern } => {
                write!(f, "{which} '{pattern}' must contain a '%' wildcard")
            }
            Error::UnknownAutoVar(token) => {
                write!(f, "unknown automatic variable: {token}")
            }
            Error::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
