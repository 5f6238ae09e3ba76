//! Stencil turns an existing codebase into a reusable, parameterized
//! template: it records which literal strings in which files become
//! variables, persists that mapping in a small textual definition format,
//! and replays the mapping onto a fresh copy of the source tree with
//! user-supplied values substituted in.

/// Command-line interface module for the Stencil application
pub mod cli;

/// Error types and handling for the Stencil application
pub mod error;

/// Definition text generation
/// Renders a template model as canonical definition text that
/// round-trips through the parser
pub mod generator;

/// Replacement application engine
/// Mirrors the template tree into a destination with literal substitution
pub mod installer;

/// Core template model entities and collaborator data contracts
pub mod model;

/// Definition file parsing
/// Tolerant and total; malformed lines degrade to defaults
pub mod parser;

/// User input and interaction handling
pub mod prompt;

/// Variable resolution with per-type validation
pub mod resolver;

/// Post-install command execution
pub mod runner;
