//! sea-orm models for the CRM tables.

pub mod activity;
pub mod cadence;
pub mod cadence_step;
pub mod contact;
pub mod deal;
pub mod lead;
pub mod lead_cadence;
pub mod lead_cadence_activity;
pub mod lead_contact;
pub mod organization;
pub mod partner;
pub mod shared_entity;
pub mod user;
