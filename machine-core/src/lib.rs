// Shared settings model, update planning and device discovery for the dart machine.

pub mod discovery;
pub mod form;
pub mod plan;
pub mod settings;
pub mod timing;
