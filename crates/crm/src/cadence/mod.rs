//! Cadence templates and their application to leads.

pub mod definition;
pub mod engine;
pub mod lifecycle;

pub use definition::{
    CadenceChanges, CadenceFilter, CadenceWithSteps, NewCadence, NewCadenceStep,
};
pub use engine::{ApplyCadence, LeadCadenceSummary, ScheduledStep};
pub use lifecycle::{LifecycleError, Transition};

pub const CADENCE_NOT_FOUND: &str = "Cadência não encontrada";
