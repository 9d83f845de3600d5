//! Honeypot Engine - conversational fraud engagement
//!
//! Classifies inbound messages, engages suspected fraud with a synthetic
//! persona, extracts actionable intelligence from the exchange, and reports
//! a summary to an evaluator once the conversation has run its course.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
