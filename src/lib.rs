//! Session core for an elimination-style team trivia contest.
//!
//! The presentation layer drives one [`state::SessionHub`] per team through
//! explicit calls; settled rounds land in a [`dao::result_store::ResultStore`],
//! which is the only bridge to the cross-team
//! [`services::scoreboard::ScoreboardAggregator`].

/// Contest format configuration.
pub mod config;
/// Stores, entities, and change notification.
pub mod dao;
/// Presentation-facing views and payloads.
pub mod dto;
/// Service-level error taxonomy.
pub mod error;
/// Scoring, elimination, and scoreboard services.
pub mod services;
/// Session state machine and its async facade.
pub mod state;

pub use config::{GameRules, RoundRules};
pub use error::ServiceError;
pub use state::{SessionHub, SessionPhase, SharedHub};
