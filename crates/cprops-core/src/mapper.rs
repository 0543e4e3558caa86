#![forbid(unsafe_code)]

//! Prop mapper: derive fields from `(state, props)` and lay them over props.

use std::fmt;

use crate::transform::{Outcome, Transform};
use crate::value::{Props, State};

/// Transform produced by [`map_state_to_props`].
pub struct MapStateToProps<F> {
    mapper: F,
}

impl<F> Transform for MapStateToProps<F>
where
    F: Fn(&State, &Props) -> Props,
{
    fn apply(&self, state: &State, props: Props) -> Outcome {
        let computed = (self.mapper)(state, &props);
        Outcome::Props(props.overlay(computed))
    }
}

impl<F> fmt::Debug for MapStateToProps<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapStateToProps").finish_non_exhaustive()
    }
}

/// Build a transform that calls `mapper(state, props)` and returns `props`
/// overlaid by the mapper's output. Mapper fields win on key collisions;
/// keys the mapper does not return keep their original value.
///
/// ```
/// use cprops_core::{Transform, map_state_to_props, props};
///
/// let state = props! { "selected" => 7 };
/// let with_selection = map_state_to_props(|state, _props| {
///     props! { "selected" => state.get("selected").cloned() }
/// });
/// let out = with_selection.apply(&state, props! { "a" => 1 }).into_props();
/// assert_eq!(out, props! { "a" => 1, "selected" => 7 });
/// ```
pub fn map_state_to_props<F>(mapper: F) -> MapStateToProps<F>
where
    F: Fn(&State, &Props) -> Props,
{
    MapStateToProps { mapper }
}

/// Alias of [`map_state_to_props`].
pub fn map_props<F>(mapper: F) -> MapStateToProps<F>
where
    F: Fn(&State, &Props) -> Props,
{
    map_state_to_props(mapper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;
    use crate::value::Value;
    use std::cell::Cell;

    fn sample_state() -> State {
        props! {
            "set" => Value::list([props! { "id" => 1 }, props! { "id" => 2 }]),
        }
    }

    #[test]
    fn mapper_sees_state_and_props() {
        let state = sample_state();
        let props = props! { "a" => 1, "b" => props! { "c" => 2 } };
        let seen = Cell::new(false);
        let expected_state = state.clone();
        let expected_props = props.clone();

        let step = map_state_to_props(|s, p| {
            assert_eq!(s, &expected_state);
            assert_eq!(p, &expected_props);
            seen.set(true);
            Props::new()
        });
        let _ = step.apply(&state, props);
        assert!(seen.get());
    }

    #[test]
    fn mapper_fields_override_props() {
        let step = map_state_to_props(|_, _| props! { "b" => 3 });
        let out = step
            .apply(&sample_state(), props! { "a" => 1, "b" => props! { "c" => 2 } })
            .into_props();
        assert_eq!(out, props! { "a" => 1, "b" => 3 });
    }

    #[test]
    fn derived_item_is_added_alongside_existing_props() {
        let step = map_state_to_props(|state, props| {
            let wanted = props.get_as::<i64>("a").unwrap_or_default();
            let item = state
                .get("set")
                .and_then(Value::as_list)
                .and_then(|set| {
                    set.iter().find(|entry| {
                        entry
                            .as_map()
                            .is_some_and(|m| m.get_as::<i64>("id") == Ok(wanted))
                    })
                })
                .cloned();
            props! { "item" => item }
        });

        let b = Value::from(props! { "c" => 2 });
        let out = step
            .apply(&sample_state(), props! { "a" => 1, "b" => b.clone() })
            .into_props();
        assert_eq!(out, props! { "a" => 1, "b" => b, "item" => props! { "id" => 1 } });
    }

    #[test]
    fn map_props_is_an_alias() {
        let step = map_props(|_, _| props! { "z" => true });
        assert_eq!(
            step.apply(&State::new(), Props::new()).into_props(),
            props! { "z" => true }
        );
    }
}
