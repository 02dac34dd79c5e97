//! Product configuration

/// How much the optimizer and executor report through `log`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// No walk tracing
    #[default]
    Silent,
    /// Log the dimension chain, every push/pop of the walk and the final cost
    Walk,
}

/// Options threaded through one product call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProductOptions {
    pub verbosity: Verbosity,
}

impl ProductOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub(crate) fn tracing(&self) -> bool {
        self.verbosity == Verbosity::Walk
    }
}
