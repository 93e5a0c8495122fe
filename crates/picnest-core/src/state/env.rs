use self::Env::*;
use std::fmt;

/// Application running environment.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Env {
    #[default]
    /// The `dev` environment.
    Dev,
    /// The `prod` environment.
    Prod,
    /// A custom environment.
    Custom(&'static str),
}

impl Env {
    /// Parses the environment name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "dev" => Dev,
            "prod" => Prod,
            _ => Custom(name.to_owned().leak()),
        }
    }

    /// Reads the environment from the `--env=` command line argument,
    /// falling back to `dev`.
    pub fn from_args() -> Self {
        std::env::args()
            .find_map(|arg| arg.strip_prefix("--env=").map(Self::from_name))
            .unwrap_or_default()
    }

    /// Returns `true` if `self` is the `dev` environment.
    #[inline]
    pub fn is_dev(&self) -> bool {
        matches!(self, Dev)
    }

    /// Returns `true` if `self` is the `prod` environment.
    #[inline]
    pub fn is_prod(&self) -> bool {
        matches!(self, Prod)
    }

    /// Returns `self` as `&'static str`.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Dev => "dev",
            Prod => "prod",
            Custom(name) => name,
        }
    }
}

impl fmt::Display for Env {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
