pub mod feedback_service;
pub mod grading_service;
pub mod matching_service;
pub mod prompt_builder;
pub mod response_parser;
pub mod scoring_service;
pub mod tier_chain;

pub use feedback_service::{FeedbackRequest, FeedbackService};
pub use grading_service::GradingService;
pub use matching_service::answer_matches;
pub use scoring_service::{aggregate, progress};
pub use tier_chain::{TierChain, TierSuccess};
