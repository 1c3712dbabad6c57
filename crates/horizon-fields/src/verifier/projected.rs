//! Field projection for verifiers that do not know the field type.

use std::fmt;

use super::{Adjustment, Capability, GroupValue, GroupVerifier};
use crate::error::VerifyError;
use crate::grammar::LengthHint;

type ProjectFn<V> = Box<dyn Fn(&V) -> Option<GroupValue> + Send + Sync>;
type InjectFn<V> = Box<dyn Fn(&V, &GroupValue) -> Option<V> + Send + Sync>;

/// Wraps a verifier with a projection between the whole field value and the
/// group's sub-value.
///
/// This lets a plain range verifier drive one component of a compound value,
/// for example the width of a rectangle:
///
/// ```
/// use horizon_fields::verifier::{BoundedIntegerVerifier, GroupValue, GroupVerifier, Projected};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Size { width: i64, height: i64 }
///
/// let width = Projected::new(
///     BoundedIntegerVerifier::new(0, 1000),
///     |s: &Size| Some(GroupValue::Integer(s.width)),
///     |s: &Size, v: &GroupValue| Some(Size { width: v.as_integer()?, ..s.clone() }),
/// );
///
/// let size = Size { width: 10, height: 20 };
/// assert_eq!(width.project(&size), Some(GroupValue::Integer(10)));
/// assert_eq!(width.inject(&size, &GroupValue::Integer(11)), Some(Size { width: 11, height: 20 }));
/// ```
pub struct Projected<T, V> {
    inner: T,
    project: ProjectFn<V>,
    inject: InjectFn<V>,
}

impl<T, V> Projected<T, V> {
    /// Wrap `inner` with the given projection functions.
    pub fn new<P, I>(inner: T, project: P, inject: I) -> Self
    where
        P: Fn(&V) -> Option<GroupValue> + Send + Sync + 'static,
        I: Fn(&V, &GroupValue) -> Option<V> + Send + Sync + 'static,
    {
        Self {
            inner,
            project: Box::new(project),
            inject: Box::new(inject),
        }
    }

    /// The wrapped verifier.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T, V> GroupVerifier<V> for Projected<T, V>
where
    T: GroupVerifier<V>,
{
    fn accepts(&self, candidate: &str, field: Option<&V>) -> bool {
        self.inner.accepts(candidate, field)
    }

    fn supports(&self, capability: Capability) -> bool {
        capability == Capability::FieldValue || self.inner.supports(capability)
    }

    fn range(&self, field: Option<&V>) -> Option<(i64, i64)> {
        self.inner.range(field)
    }

    fn length(&self) -> Option<LengthHint> {
        self.inner.length()
    }

    fn format(&self, value: &GroupValue) -> Result<String, VerifyError> {
        self.inner.format(value)
    }

    fn parse(&self, text: &str) -> Result<GroupValue, VerifyError> {
        self.inner.parse(text)
    }

    fn adjust(
        &self,
        current: &GroupValue,
        adjustment: Adjustment,
        restart: bool,
        field: Option<&V>,
    ) -> Result<GroupValue, VerifyError> {
        self.inner.adjust(current, adjustment, restart, field)
    }

    fn project(&self, field: &V) -> Option<GroupValue> {
        (self.project)(field)
    }

    fn inject(&self, field: &V, value: &GroupValue) -> Option<V> {
        (self.inject)(field, value)
    }
}

impl<T: fmt::Debug, V> fmt::Debug for Projected<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projected")
            .field("inner", &self.inner)
            .field("project", &"<fn>")
            .field("inject", &"<fn>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::BoundedIntegerVerifier;

    #[test]
    fn test_projection_adds_capability() {
        let plain = BoundedIntegerVerifier::new(0, 9);
        assert!(!GroupVerifier::<(i64, i64)>::supports(&plain, Capability::FieldValue));

        let first = Projected::new(
            plain,
            |p: &(i64, i64)| Some(GroupValue::Integer(p.0)),
            |p: &(i64, i64), v: &GroupValue| Some((v.as_integer()?, p.1)),
        );
        assert!(first.supports(Capability::FieldValue));
        assert!(first.supports(Capability::Adjust));
        assert_eq!(first.inject(&(1, 2), &GroupValue::Integer(7)), Some((7, 2)));
        assert!(first.accepts("9", Some(&(1, 2))));
    }
}
