pub mod task;
pub mod user;

use serde::{Deserialize, Deserializer};
use validator::{ValidationError, ValidationErrors};

pub use task::{NewTask, Task, TaskChanges, TaskChangesInput, TaskInput};
pub use user::{NewUser, User, UserChanges, UserChangesInput, UserInput};

/// Reads a field that may be absent, `null` or a value. Paired with
/// `#[serde(default)]`, absent stays `None` and `null` becomes `Some(None)`.
pub(crate) fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Reports every flagged field as missing a required value.
pub(crate) fn reject_nulls(fields: &[(&'static str, bool)]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for &(field, is_null) in fields {
        if is_null {
            errors.add(field, ValidationError::new("required"));
        }
    }
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
