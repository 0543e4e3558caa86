#![forbid(unsafe_code)]

//! Core: prop-transform combinators for view-model layers.
//!
//! Every combinator produces a [`Transform`], a step of the form
//! `(state, props) -> outcome`:
//!
//! - [`map_state_to_props`]: derive fields and lay them over props.
//! - [`map_props_on_change`]: the same, recomputed only when a watched subset
//!   of props changes (shallow comparison).
//! - [`set_prop_types`] / [`set_state_types`]: check fields against
//!   per-key validators, reporting diagnostics and optionally halting.
//! - [`ComposeProps`]: thread the steps through an accumulator.
//!
//! ```
//! use cprops_core::{compose, map_props_on_change, map_state_to_props, props, Props};
//!
//! let pipeline = compose![
//!     map_state_to_props(|state, _props| props! { "user" => state.get("user").cloned() }),
//!     map_props_on_change(["user"], |_state, props| {
//!         let name = props.get("user").and_then(|u| u.as_str()).unwrap_or("nobody");
//!         props! { "greeting" => format!("hello, {name}") }
//!     }),
//! ];
//!
//! let state = props! { "user" => "ada" };
//! let out = pipeline.call(&state, Some(Props::new()));
//! assert_eq!(out, props! { "greeting" => "hello, ada" });
//! ```

pub mod compose;
pub mod config;
pub mod error;
pub mod mapper;
pub mod on_change;
pub mod transform;
pub mod validate;
pub mod value;

pub use compose::{ComposeProps, FoldPolicy, compose_props};
pub use config::{Severity, ValidationConfig, ValidationMode};
pub use error::{CpropsError, Result};
pub use mapper::{MapStateToProps, map_props, map_state_to_props};
pub use on_change::{MapPropsOnChange, map_props_on_change};
pub use transform::{BoxedTransform, FromFn, Outcome, Transform, from_fn};
pub use validate::{
    Diagnostic, SetTypes, ShapeReport, ShapeTarget, Validate, Validator, ValidatorMap,
    check_shape, set_prop_types, set_state_types,
};
pub use value::{Props, State, Value};
