//! Categorical and mixed-code encoding.
//!
//! - **categorical**: indicator expansion of declared categorical attributes
//! - **lookup**: fixed code tables for composite attributes
//! - **mixed**: decomposition of composite attributes

pub mod categorical;
pub mod lookup;
pub mod mixed;

pub use categorical::{CategoricalPlan, CategoryValue, IndicatorExpansion};
pub use lookup::CodeTable;
pub use mixed::{Decomposition, MixedPlan};
