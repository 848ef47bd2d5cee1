// Domain layer - Week state, calendar and business rules

pub mod archive;
pub mod calendar;
pub mod errors;
pub mod model;
pub mod rules;
pub mod snapshot;
