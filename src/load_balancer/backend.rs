//! Backend identity.

use std::fmt;
use std::sync::Arc;

/// Opaque `host:port` name of one backend instance.
///
/// Cheap to clone; the pool is fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendId(Arc<str>);

impl BackendId {
    pub fn new(addr: impl AsRef<str>) -> Self {
        Self(Arc::from(addr.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BackendId {
    fn from(addr: &str) -> Self {
        Self::new(addr)
    }
}

impl From<String> for BackendId {
    fn from(addr: String) -> Self {
        Self::new(addr)
    }
}
