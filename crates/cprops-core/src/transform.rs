#![forbid(unsafe_code)]

//! The transform contract shared by every combinator.
//!
//! A transform takes the read-only [`State`] and the current [`Props`] and
//! returns an [`Outcome`]: either the next props, or [`Outcome::Halted`] when
//! the pipeline must stop. Mappers, validators and composed pipelines all
//! implement [`Transform`], so any of them can be a step of another pipeline.

use std::fmt;
use std::rc::Rc;

use crate::value::{Props, State};

/// Result of a single transform step.
///
/// `Halted` is distinct from `Props(Props::new())`: an empty mapping is a
/// valid result, a halt is not.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Props(Props),
    Halted,
}

impl Outcome {
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        matches!(self, Self::Halted)
    }

    #[must_use]
    pub const fn props(&self) -> Option<&Props> {
        match self {
            Self::Props(props) => Some(props),
            Self::Halted => None,
        }
    }

    /// The carried props, or an empty mapping for a halt.
    #[must_use]
    pub fn into_props(self) -> Props {
        match self {
            Self::Props(props) => props,
            Self::Halted => Props::new(),
        }
    }
}

impl From<Props> for Outcome {
    fn from(props: Props) -> Self {
        Self::Props(props)
    }
}

/// A `(state, props) -> outcome` step.
pub trait Transform {
    fn apply(&self, state: &State, props: Props) -> Outcome;
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    fn apply(&self, state: &State, props: Props) -> Outcome {
        (**self).apply(state, props)
    }
}

impl<T: Transform + ?Sized> Transform for Rc<T> {
    fn apply(&self, state: &State, props: Props) -> Outcome {
        (**self).apply(state, props)
    }
}

impl<T: Transform + ?Sized> Transform for &T {
    fn apply(&self, state: &State, props: Props) -> Outcome {
        (**self).apply(state, props)
    }
}

/// An owned, type-erased transform.
pub type BoxedTransform = Box<dyn Transform>;

/// A transform backed by a plain closure. Built with [`from_fn`].
pub struct FromFn<F> {
    f: F,
}

impl<F> Transform for FromFn<F>
where
    F: Fn(&State, Props) -> Outcome,
{
    fn apply(&self, state: &State, props: Props) -> Outcome {
        (self.f)(state, props)
    }
}

impl<F> fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromFn").finish_non_exhaustive()
    }
}

/// Create a transform from a closure.
///
/// ```
/// use cprops_core::{Outcome, Props, Transform, from_fn};
///
/// let tag = from_fn(|_state, props| props.with("tagged", true).into());
/// let out = tag.apply(&Props::new(), Props::new());
/// assert_eq!(out, Outcome::Props(Props::new().with("tagged", true)));
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(&State, Props) -> Outcome,
{
    FromFn { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;

    #[test]
    fn closures_are_transforms() {
        let add_flag = from_fn(|_state, props| props.with("flag", true).into());
        let out = add_flag.apply(&State::new(), props! { "a" => 1 });
        assert_eq!(out, Outcome::Props(props! { "a" => 1, "flag" => true }));
    }

    #[test]
    fn boxed_and_shared_transforms_delegate() {
        let halt: BoxedTransform = Box::new(from_fn(|_, _| Outcome::Halted));
        assert!(halt.apply(&State::new(), Props::new()).is_halted());

        let shared = Rc::new(from_fn(|_, props| Outcome::Props(props)));
        let again = Rc::clone(&shared);
        assert_eq!(
            again.apply(&State::new(), props! { "x" => 1 }).into_props(),
            props! { "x" => 1 }
        );
    }

    #[test]
    fn halted_into_props_is_empty() {
        assert!(Outcome::Halted.into_props().is_empty());
        assert_eq!(Outcome::Halted.props(), None);
        assert_ne!(Outcome::Halted, Outcome::Props(Props::new()));
    }
}
