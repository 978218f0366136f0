//! SSAS Account-Opening Forms Library
//!
//! This library models the two account-opening forms of a Small
//! Self-Administered Scheme: the corporate (scheme) form and the individual
//! (employee) form. It provides the form records, declarative validation
//! schemas, conditional-section derivations, display formatters, reference
//! lists and the boundary a validated record is submitted through.
//!
//! # Modules
//!
//! - `api`: Form controllers (the surface a UI binds to).
//! - `core`: Records, schemas and the validation engine.
//! - `integrations`: External collaborators (submission, reference data).
//! - `config`: Configuration management.
//! - `corporate_form`: Corporate form schema, events and controller.
//! - `errors`: Error handling types.
//! - `formatting`: Date, currency and phone display transforms.
//! - `individual_form`: Individual form schema, events and controller.
//! - `models`: Form records and normalization.
//! - `reference_data`: Static reference lists.
//! - `submission`: Submission envelope and submitters.
//! - `validation`: Data-driven validation engine.
//! - `visibility`: Conditional section derivations.

pub mod api;
pub mod core;
pub mod integrations;

pub mod config;
pub mod corporate_form;
pub mod errors;
pub mod formatting;
pub mod individual_form;
pub mod models;
pub mod reference_data;
pub mod submission;
pub mod validation;
pub mod visibility;
