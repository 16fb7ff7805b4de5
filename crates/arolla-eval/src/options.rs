/// Options that change what [`compile`](crate::compile) produces. Part of
/// the compile-cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CompileOptions {
    pub(crate) fold_literals: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            fold_literals: true,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate backend calls over literal inputs once, at compile time
    /// (default: true).
    pub fn fold_literals(mut self, fold: bool) -> Self {
        self.fold_literals = fold;
        self
    }

    pub fn get_fold_literals(&self) -> bool {
        self.fold_literals
    }
}
