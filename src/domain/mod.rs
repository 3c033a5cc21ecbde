//! Product-display domain: variants, selection and pricing
pub mod aggregates;
pub mod events;
pub mod options;
pub mod palette;
pub mod pricing;
pub mod resolver;
pub mod value_objects;
