//! Tourdesk - Billing Sync Backend
//!
//! This crate keeps subscription and trial state for the Tourdesk CRM in
//! step with Stripe, through verified webhooks and scheduled reconciliation.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
