//! Identity of the object that owns validated methods.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;

/// Registry key for the owner of a method.
///
/// Equality is exact: two targets match only when both their name and their
/// type identity match. There is no notion of a parent target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    name: Cow<'static, str>,
    type_id: Option<TypeId>,
}

impl Target {
    /// Creates the target for a Rust type.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            name: Cow::Borrowed(std::any::type_name::<T>()),
            type_id: Some(TypeId::of::<T>()),
        }
    }

    /// Creates a target identified only by name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            type_id: None,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type identity, for type-derived targets.
    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
