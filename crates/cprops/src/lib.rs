#![forbid(unsafe_code)]

//! compose-props public facade crate.
//!
//! Re-exports the combinators from `cprops-core` and, with the default
//! `rules` feature, the built-in validators from `cprops-rules`.

pub use cprops_core::*;

#[cfg(feature = "rules")]
pub use cprops_rules as rules;

pub mod prelude {
    pub use cprops_core as core;
    pub use cprops_core::{
        ComposeProps, FoldPolicy, Outcome, Props, State, Transform, ValidationConfig,
        ValidatorMap, Value, compose, compose_props, from_fn, map_props, map_props_on_change,
        map_state_to_props, props, set_prop_types, set_state_types,
    };

    #[cfg(feature = "rules")]
    pub use cprops_rules as rules;
}
