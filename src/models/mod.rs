pub mod category;
pub mod chat;
pub mod envelope;
pub mod question;
pub mod question_bank;
pub mod result;
pub mod study;
pub mod submission;
pub mod user;

pub use category::Category;
pub use chat::{ChatMessage, ChatReply, Sender};
pub use envelope::{validate_path_segment, Envelope, StatusReply};
pub use question::{Level, Question};
pub use question_bank::{NewQuestion, QuestionBatch};
pub use result::{AnalysisItem, Grade, QuizResult};
pub use study::{StudyFilter, StudyQuestion};
pub use submission::{AnswerEntry, SubmissionPayload, SubmissionResult, SubmitReceipt};
pub use user::{Role, SignupForm, User};
