use std::path::Path;

use crate::error::{Error, Result};

/// Explicit permission to delete, passed to every `remove` call.
///
/// Nothing on disk is deleted unless the caller passes `Permitted`. The
/// node and artifact gates are independent: permitting removal of an
/// artifact says nothing about its owning node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Removal {
    #[default]
    Denied,
    Permitted,
}

impl Removal {
    /// Fail with `RemovalDenied` unless removal is permitted.
    pub fn check(self, what: &str, path: &Path) -> Result<()> {
        match self {
            Removal::Permitted => Ok(()),
            Removal::Denied => Err(Error::RemovalDenied {
                what: what.to_string(),
                path: path.to_path_buf(),
            }),
        }
    }
}
