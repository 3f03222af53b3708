//! Per-principal key scoping.
//!
//! Every logical path is placed under its owner's namespace segment before it
//! reaches the store: `notes/x.ipynb` for `alice` becomes
//! `alice/notes/x.ipynb`. The mapping is total and reversible.

/// Strips leading and trailing slashes from a logical path.
pub fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

/// Maps logical paths to scoped store keys and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathScoper {
    principal: String,
}

impl PathScoper {
    /// Creates a scoper for the given principal (user) name.
    pub fn new(principal: impl Into<String>) -> Self {
        let principal: String = principal.into();
        Self {
            principal: normalize(&principal).to_string(),
        }
    }

    /// The principal's namespace segment.
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Joins the principal namespace and the normalized path.
    ///
    /// The empty path maps to the namespace root (`"alice/"`).
    pub fn scope(&self, path: &str) -> String {
        let path = normalize(path);
        if self.principal.is_empty() {
            path.to_string()
        } else {
            format!("{}/{path}", self.principal)
        }
    }

    /// Inverse of [`scope`](Self::scope). Keys outside the namespace are
    /// only normalized.
    pub fn unscope(&self, key: &str) -> String {
        if self.principal.is_empty() {
            return normalize(key).to_string();
        }

        let key = key.trim_start_matches('/');
        let rest = match key.strip_prefix(self.principal.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => key,
        };
        normalize(rest).to_string()
    }
}
