#![forbid(unsafe_code)]

//! Composition of transforms into a pipeline.
//!
//! [`ComposeProps`] folds its steps left to right: each step receives the
//! unchanged state and the accumulator produced by the previous step. How a
//! step's result becomes the next accumulator is the [`FoldPolicy`].
//!
//! The pipeline's public output ([`ComposeProps::call`]) is always a mapping:
//! a halted fold yields an empty one. [`ComposeProps::run`] keeps the
//! distinction for callers that need to tell "halted" from "legitimately
//! empty".
//!
//! A pipeline is itself a [`Transform`]. Nested inside another pipeline it
//! keeps its own output contract, so a halt inside it reaches the outer fold
//! as an empty mapping rather than as a halt.

use std::fmt;

use crate::transform::{BoxedTransform, Outcome, Transform};
use crate::value::{Props, State};

/// How a step's result becomes the next accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FoldPolicy {
    /// The accumulator is exactly what the step returned; a halt stops the
    /// fold and later steps never run.
    #[default]
    ShortCircuit,
    /// The accumulator is exactly what the step returned; a halt is passed on
    /// as an empty mapping and the fold continues.
    Replace,
    /// The step's result is laid over the previous accumulator; a halt
    /// contributes nothing.
    Merge,
}

/// An ordered chain of transforms. Built with [`compose_props`],
/// [`ComposeProps::then`] or the [`compose!`](crate::compose) macro.
#[derive(Default)]
pub struct ComposeProps {
    steps: Vec<BoxedTransform>,
    policy: FoldPolicy,
}

impl ComposeProps {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_policy(mut self, policy: FoldPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Append a step.
    #[must_use]
    pub fn then(mut self, step: impl Transform + 'static) -> Self {
        self.push(step);
        self
    }

    pub fn push(&mut self, step: impl Transform + 'static) {
        self.steps.push(Box::new(step));
    }

    #[must_use]
    pub fn policy(&self) -> FoldPolicy {
        self.policy
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Fold the steps over `props` (an empty mapping when absent), keeping a
    /// halt visible.
    pub fn run(&self, state: &State, props: Option<Props>) -> Outcome {
        let mut acc = props.unwrap_or_default();
        for (index, step) in self.steps.iter().enumerate() {
            acc = match self.policy {
                FoldPolicy::ShortCircuit => match step.apply(state, acc) {
                    Outcome::Props(next) => next,
                    Outcome::Halted => {
                        tracing::debug!(
                            message = "props.compose.halted",
                            step = index,
                            remaining = self.steps.len() - index - 1
                        );
                        return Outcome::Halted;
                    }
                },
                FoldPolicy::Replace => step.apply(state, acc).into_props(),
                FoldPolicy::Merge => {
                    let base = acc.clone();
                    base.overlay(step.apply(state, acc).into_props())
                }
            };
        }
        Outcome::Props(acc)
    }

    /// Fold the steps over `props`; a halted fold yields an empty mapping.
    pub fn call(&self, state: &State, props: Option<Props>) -> Props {
        self.run(state, props).into_props()
    }
}

impl Transform for ComposeProps {
    fn apply(&self, state: &State, props: Props) -> Outcome {
        Outcome::Props(self.call(state, Some(props)))
    }
}

impl fmt::Debug for ComposeProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeProps")
            .field("steps", &self.steps.len())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Compose boxed steps with the default short-circuiting policy.
pub fn compose_props<I>(steps: I) -> ComposeProps
where
    I: IntoIterator<Item = BoxedTransform>,
{
    ComposeProps {
        steps: steps.into_iter().collect(),
        policy: FoldPolicy::default(),
    }
}

/// Compose transforms left to right.
///
/// ```
/// use cprops_core::{compose, from_fn, map_state_to_props, props};
///
/// let pipeline = compose![
///     map_state_to_props(|_, _| props! { "a" => 1 }),
///     from_fn(|_, props| props.with("b", 2).into()),
/// ];
/// assert_eq!(pipeline.call(&props! {}, None), props! { "a" => 1, "b" => 2 });
/// ```
#[macro_export]
macro_rules! compose {
    ($($step:expr),* $(,)?) => {
        $crate::ComposeProps::new()$(.then($step))*
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;
    use crate::transform::from_fn;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn init_state() -> State {
        props! { "b" => 1 }
    }

    #[test]
    fn absent_props_default_to_empty() {
        let seen = Rc::new(RefCell::new(None));
        let record = Rc::clone(&seen);
        let expected_state = init_state();
        let pipeline = compose![from_fn(move |state, props| {
            assert_eq!(state, &expected_state);
            *record.borrow_mut() = Some(props.clone());
            props.into()
        })];

        let out = pipeline.call(&init_state(), None);
        assert!(out.is_empty());
        assert_eq!(*seen.borrow(), Some(Props::new()));
    }

    #[test]
    fn steps_run_in_order_and_last_result_wins() {
        let calls = Rc::new(Cell::new(0u32));
        let (c1, c2) = (Rc::clone(&calls), Rc::clone(&calls));
        let pipeline = compose![
            from_fn(move |_, props| {
                assert_eq!(c1.get(), 0);
                c1.set(c1.get() + 1);
                assert_eq!(props, props! { "a" => 1, "b" => props! { "c" => 2 } });
                Outcome::Props(props! { "a" => 1 })
            }),
            from_fn(move |_, props| {
                assert_eq!(c2.get(), 1);
                c2.set(c2.get() + 1);
                assert_eq!(props, props! { "a" => 1 });
                Outcome::Props(props! { "c" => 1 })
            }),
        ];

        assert_eq!(calls.get(), 0);
        let out = pipeline.call(
            &init_state(),
            Some(props! { "a" => 1, "b" => props! { "c" => 2 } }),
        );
        assert_eq!(calls.get(), 2);
        assert_eq!(out, props! { "c" => 1 });
    }

    #[test]
    fn re_merging_step_keeps_earlier_fields() {
        let pipeline = compose![
            from_fn(|_, _| Outcome::Props(props! { "a" => 1 })),
            from_fn(|_, props| props.with("c", 1).into()),
        ];
        assert_eq!(
            pipeline.call(&init_state(), None),
            props! { "a" => 1, "c" => 1 }
        );
    }

    #[test]
    fn short_circuit_skips_remaining_steps() {
        let count = Rc::new(Cell::new(0u32));
        let (before, after) = (Rc::clone(&count), Rc::clone(&count));
        let pipeline = compose![
            from_fn(move |_, props| {
                before.set(before.get() + 1);
                props.into()
            }),
            from_fn(|_, _| Outcome::Halted),
            from_fn(move |_, props| {
                after.set(after.get() + 1);
                props.into()
            }),
        ];

        assert_eq!(pipeline.run(&init_state(), Some(props! { "a" => 1 })), Outcome::Halted);
        assert_eq!(count.get(), 1);
        assert_eq!(pipeline.call(&init_state(), Some(props! { "a" => 1 })), Props::new());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn replace_policy_continues_after_halt_with_empty_props() {
        let pipeline = compose![
            from_fn(|_, _| Outcome::Halted),
            from_fn(|_, props| {
                assert!(props.is_empty());
                props.with("after", true).into()
            }),
        ]
        .with_policy(FoldPolicy::Replace);

        assert_eq!(
            pipeline.run(&init_state(), Some(props! { "a" => 1 })),
            Outcome::Props(props! { "after" => true })
        );
    }

    #[test]
    fn merge_policy_overlays_each_result() {
        let pipeline = compose![
            from_fn(|_, _| Outcome::Props(props! { "b" => 2 })),
            from_fn(|_, _| Outcome::Halted),
            from_fn(|_, props| {
                assert_eq!(props, props! { "a" => 1, "b" => 2 });
                Outcome::Props(props! { "a" => 3 })
            }),
        ]
        .with_policy(FoldPolicy::Merge);

        assert_eq!(
            pipeline.call(&init_state(), Some(props! { "a" => 1 })),
            props! { "a" => 3, "b" => 2 }
        );
    }

    #[test]
    fn empty_pipeline_returns_input() {
        let pipeline = ComposeProps::new();
        assert!(pipeline.is_empty());
        assert_eq!(
            pipeline.call(&init_state(), Some(props! { "a" => 1 })),
            props! { "a" => 1 }
        );
    }

    #[test]
    fn pipelines_nest() {
        let state = init_state();
        let inner = compose![from_fn(|_, props| {
            assert_eq!(props, props! { "a" => 1 });
            Outcome::Props(props! { "c" => 1 })
        })];
        let outer = compose![from_fn(|_, props| {
            assert!(props.is_empty());
            Outcome::Props(props! { "a" => 1 })
        })]
        .then(inner);

        assert_eq!(outer.len(), 2);
        assert_eq!(outer.call(&state, None), props! { "c" => 1 });
    }

    #[test]
    fn nested_halt_reaches_outer_fold_as_empty_props() {
        let inner = compose![from_fn(|_, _| Outcome::Halted)];
        let outer = ComposeProps::new()
            .then(inner)
            .then(from_fn(|_, props| props.with("after", true).into()));

        assert_eq!(
            outer.run(&init_state(), Some(props! { "a" => 1 })),
            Outcome::Props(props! { "after" => true })
        );
    }

    #[test]
    fn compose_props_from_boxed_steps() {
        let steps: Vec<BoxedTransform> = vec![
            Box::new(from_fn(|_, props| props.with("x", 1).into())),
            Box::new(from_fn(|_, props| props.with("y", 2).into())),
        ];
        let pipeline = compose_props(steps);
        assert_eq!(pipeline.policy(), FoldPolicy::ShortCircuit);
        assert_eq!(pipeline.call(&init_state(), None), props! { "x" => 1, "y" => 2 });
    }
}
