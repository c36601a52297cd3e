pub mod catalog;
pub mod intake;
pub mod providers;
pub mod recommendation;
pub mod scoring;

pub use intake::{IntakeOutcome, IntakeSessions, IntakeStep};
pub use recommendation::RecommendationEngine;
pub use scoring::{build_scorer, Scorer};
