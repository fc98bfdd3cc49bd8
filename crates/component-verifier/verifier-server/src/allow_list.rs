use std::collections::HashSet;

/// Which components may be grabbed for and verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowList {
    Any,
    Only(HashSet<String>),
}

impl AllowList {
    pub fn only<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(components.into_iter().map(Into::into).collect())
    }

    pub fn is_allowed(&self, component: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Only(components) => components.contains(component),
        }
    }
}
