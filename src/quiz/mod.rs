pub mod session;
pub mod timer;

pub use session::{QuestionReview, QuizSession, SessionStatus};
pub use timer::{Clock, ManualClock, SessionTimer, SystemClock};
