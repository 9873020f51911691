//! Domain models for the burden analysis
//!
//! Every model is created once by a pipeline stage and never mutated
//! afterwards; later stages derive new values from it.

pub mod burden;
pub mod merged;
pub mod mortality;
pub mod observation;
pub mod poverty;
pub mod traits;

pub use burden::{BurdenEntry, GroupBurden, RegionalTotal, YearlyTotal};
pub use merged::{Covariate, MergedRecord};
pub use mortality::{MortalityIndicator, MortalityObservation, MortalityProfile};
pub use observation::Observation;
pub use poverty::PovertyRecord;
pub use traits::{ArrowSchema, Dated, EntityKeyed};
