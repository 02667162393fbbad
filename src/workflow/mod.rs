pub mod exam_session;
pub mod session_ctx;

pub use exam_session::ExamSession;
pub use session_ctx::SessionCtx;
