//! String interning for identifiers

pub use lasso::Spur as Name;
use lasso::ThreadedRodeo;
use std::sync::Arc;

/// Thread-safe string interner shared by the tree builder and the resolver
#[derive(Clone, Debug)]
pub struct Interner {
    inner: Arc<ThreadedRodeo>,
}

impl Interner {
    /// Create an empty interner
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern `text`, returning the existing name if already present
    pub fn intern(&self, text: &str) -> Name {
        self.inner.get_or_intern(text)
    }

    /// Look up a name without interning it
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Name> {
        self.inner.get(text)
    }

    /// Text of an interned name
    #[must_use]
    pub fn resolve(&self, name: &Name) -> &str {
        self.inner.resolve(name)
    }

    /// Text of a name, or `None` if it came from a different interner
    #[must_use]
    pub fn try_resolve(&self, name: &Name) -> Option<&str> {
        self.inner.try_resolve(name)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
