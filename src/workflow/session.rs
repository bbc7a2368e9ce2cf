//! 答题会话 - 流程层
//!
//! 一次限时答题的唯一状态来源。所有修改都是同步的，修改完立刻对观察者可见
//! （控制器每处理完一个事件就发布一次 `SessionSnapshot`）。

use crate::error::SessionError;
use crate::models::{AnswerEntry, Question, SubmissionPayload};
use crate::utils::logging::format_clock;

/// 默认答题时限：10 分钟
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 10 * 60;

/// 一次计时的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 未开始或已超时，计时不起作用
    Idle,
    /// 正常倒计时，`previous` 为本次递减前的剩余秒数
    Counting { previous: u32, remaining: u32 },
    /// 本次计时让剩余时间归零，只会出现一次
    Expired { previous: u32 },
}

/// 答题会话
#[derive(Debug, Clone)]
pub struct QuizSession {
    category_id: String,
    time_limit: u32,
    questions: Vec<Question>,
    /// 0 <= current < len；全部浏览完时 current == len
    current: usize,
    answers: Vec<Option<usize>>,
    /// 0 <= remaining <= time_limit
    remaining: u32,
    started: bool,
    started_fullscreen: bool,
    expired: bool,
}

impl QuizSession {
    /// 创建未开始的会话
    pub fn new(category_id: impl Into<String>, time_limit: u32) -> Self {
        Self {
            category_id: category_id.into(),
            time_limit,
            questions: Vec::new(),
            current: 0,
            answers: Vec::new(),
            remaining: time_limit,
            started: false,
            started_fullscreen: false,
            expired: false,
        }
    }

    /// 开始答题；题目为空时不开始
    pub fn start(&mut self, questions: Vec<Question>) -> Result<(), SessionError> {
        if self.started {
            return Err(SessionError::AlreadyStarted);
        }
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }

        self.answers = vec![None; questions.len()];
        self.questions = questions;
        self.current = 0;
        self.remaining = self.time_limit;
        self.expired = false;
        self.started = true;
        Ok(())
    }

    fn ensure_started(&self) -> Result<(), SessionError> {
        if self.started {
            Ok(())
        } else {
            Err(SessionError::NotStarted)
        }
    }

    /// 回答当前题目
    ///
    /// 不是最后一题时立即跳到下一题，返回跳转后的下标。
    pub fn select_answer(&mut self, index: usize, option: usize) -> Result<Option<usize>, SessionError> {
        self.ensure_started()?;
        if self.current >= self.questions.len() {
            return Err(SessionError::Completed);
        }
        if index != self.current {
            return Err(SessionError::NotCurrentQuestion {
                current: self.current,
                requested: index,
            });
        }

        let question = &self.questions[index];
        if !question.has_option(option) {
            return Err(SessionError::OptionOutOfRange {
                option,
                max_option: question.options.len().saturating_sub(1),
            });
        }

        self.answers[index] = Some(option);

        if index + 1 < self.questions.len() {
            self.current = index + 1;
            Ok(Some(self.current))
        } else {
            Ok(None)
        }
    }

    /// 下一题；当前题未作答时拒绝
    pub fn advance(&mut self) -> Result<usize, SessionError> {
        self.ensure_started()?;
        if self.current >= self.questions.len() {
            return Err(SessionError::Completed);
        }
        if self.answers[self.current].is_none() {
            return Err(SessionError::Unanswered {
                index: self.current,
            });
        }
        self.current += 1;
        Ok(self.current)
    }

    /// 上一题；第一题时拒绝
    pub fn retreat(&mut self) -> Result<usize, SessionError> {
        self.ensure_started()?;
        if self.current == 0 {
            return Err(SessionError::AtFirstQuestion);
        }
        self.current -= 1;
        Ok(self.current)
    }

    /// 倒计时一秒
    pub fn tick(&mut self) -> TickOutcome {
        if !self.started || self.expired {
            return TickOutcome::Idle;
        }

        let previous = self.remaining;
        self.remaining = previous.saturating_sub(1);
        if self.remaining == 0 {
            self.expired = true;
            TickOutcome::Expired { previous }
        } else {
            TickOutcome::Counting {
                previous,
                remaining: self.remaining,
            }
        }
    }

    /// 记录本次答题是否在全屏中开始
    pub fn set_started_fullscreen(&mut self, fullscreen: bool) {
        self.started_fullscreen = fullscreen;
    }

    /// 未作答题目的下标
    pub fn unanswered(&self) -> Vec<usize> {
        self.answers
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.is_none().then_some(i))
            .collect()
    }

    /// 完整答卷；有未作答的题目时拒绝
    pub fn payload(&self) -> Result<SubmissionPayload, SessionError> {
        self.ensure_started()?;
        let count = self.answers.iter().filter(|a| a.is_none()).count();
        if count > 0 {
            return Err(SessionError::Incomplete { count });
        }
        Ok(self.answered_payload())
    }

    /// 只包含已作答题目的答卷，保持原题顺序
    pub fn answered_payload(&self) -> SubmissionPayload {
        let answers = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter_map(|(q, a)| {
                a.map(|user_answer| AnswerEntry {
                    question_id: q.id.clone(),
                    user_answer,
                })
            })
            .collect();

        SubmissionPayload {
            category_id: self.category_id.clone(),
            answers,
        }
    }

    /// 当前状态的只读快照
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            category_id: self.category_id.clone(),
            position: self.current,
            total: self.questions.len(),
            question: self.current_question().cloned(),
            selected: self.answers.get(self.current).copied().flatten(),
            answered: self.answers.iter().filter(|a| a.is_some()).count(),
            remaining_secs: self.remaining,
            started: self.started,
            expired: self.expired,
        }
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn started_fullscreen(&self) -> bool {
        self.started_fullscreen
    }

    /// 所有题目都已浏览完（current == len）
    pub fn is_complete(&self) -> bool {
        self.started && self.current == self.questions.len()
    }
}

/// 会话快照，给界面渲染用
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub category_id: String,
    pub position: usize,
    pub total: usize,
    pub question: Option<Question>,
    pub selected: Option<usize>,
    pub answered: usize,
    pub remaining_secs: u32,
    pub started: bool,
    pub expired: bool,
}

impl SessionSnapshot {
    /// 进度百分比（当前题号 / 总题数）
    pub fn progress_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.position as f64 / self.total as f64 * 100.0
        }
    }

    /// `m:ss` 格式的剩余时间
    pub fn clock(&self) -> String {
        format_clock(self.remaining_secs)
    }

    pub fn is_last_question(&self) -> bool {
        self.total > 0 && self.position + 1 == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Level;

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| {
                Question::new(
                    format!("q{}", i + 1),
                    format!("Question {}", i + 1),
                    vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    Level::Medium,
                )
            })
            .collect()
    }

    fn started(n: usize) -> QuizSession {
        let mut session = QuizSession::new("cat", DEFAULT_TIME_LIMIT_SECS);
        session.start(questions(n)).unwrap();
        session
    }

    #[test]
    fn test_start_initializes_state() {
        for n in [1, 3, 10] {
            let session = started(n);
            assert_eq!(session.answers().len(), n);
            assert!(session.answers().iter().all(Option::is_none));
            assert_eq!(session.current_index(), 0);
            assert_eq!(session.remaining(), 600);
            assert!(session.is_started());
        }
    }

    #[test]
    fn test_start_empty_does_not_start() {
        let mut session = QuizSession::new("cat", DEFAULT_TIME_LIMIT_SECS);
        assert_eq!(session.start(Vec::new()), Err(SessionError::NoQuestions));
        assert!(!session.is_started());
        assert_eq!(session.tick(), TickOutcome::Idle);
        assert_eq!(session.advance(), Err(SessionError::NotStarted));
    }

    #[test]
    fn test_start_twice_rejected() {
        let mut session = started(2);
        assert_eq!(session.start(questions(3)), Err(SessionError::AlreadyStarted));
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_select_advances_except_on_last() {
        let mut session = started(3);
        assert_eq!(session.select_answer(0, 1), Ok(Some(1)));
        assert_eq!(session.select_answer(1, 0), Ok(Some(2)));
        assert_eq!(session.select_answer(2, 2), Ok(None));
        assert_eq!(session.current_index(), 2);
        assert_eq!(session.answers(), &[Some(1), Some(0), Some(2)]);
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut once = started(3);
        once.select_answer(0, 3).unwrap();

        // 回到第一题再选同一个选项，状态与只选一次相同
        let mut twice = started(3);
        twice.select_answer(0, 3).unwrap();
        assert_eq!(twice.retreat(), Ok(0));
        assert_eq!(twice.select_answer(0, 3), Ok(Some(1)));

        assert_eq!(once.answers(), twice.answers());
        assert_eq!(once.current_index(), twice.current_index());

        // 最后一题重复选择同样幂等
        let mut last = started(1);
        last.select_answer(0, 2).unwrap();
        last.select_answer(0, 2).unwrap();
        assert_eq!(last.answers(), &[Some(2)]);
        assert_eq!(last.current_index(), 0);
    }

    #[test]
    fn test_select_validates_index_and_option() {
        let mut session = started(3);
        assert_eq!(
            session.select_answer(1, 0),
            Err(SessionError::NotCurrentQuestion {
                current: 0,
                requested: 1
            })
        );
        assert_eq!(
            session.select_answer(0, 4),
            Err(SessionError::OptionOutOfRange {
                option: 4,
                max_option: 3
            })
        );
        assert!(session.answers().iter().all(Option::is_none));
    }

    #[test]
    fn test_advance_from_last_rejected_iff_unanswered() {
        let mut session = started(2);
        session.select_answer(0, 0).unwrap();
        assert_eq!(session.current_index(), 1);

        assert_eq!(session.advance(), Err(SessionError::Unanswered { index: 1 }));
        assert_eq!(session.current_index(), 1);

        session.select_answer(1, 1).unwrap();
        assert_eq!(session.advance(), Ok(2));
        assert!(session.is_complete());
        assert_eq!(session.advance(), Err(SessionError::Completed));
    }

    #[test]
    fn test_retreat_bounds() {
        let mut session = started(3);
        assert_eq!(session.retreat(), Err(SessionError::AtFirstQuestion));
        session.select_answer(0, 1).unwrap();
        assert_eq!(session.retreat(), Ok(0));
        // 回到前面可以改答案
        assert_eq!(session.select_answer(0, 2), Ok(Some(1)));
        assert_eq!(session.answers()[0], Some(2));
    }

    #[test]
    fn test_ticks_expire_exactly_once() {
        let mut session = started(1);
        let mut expirations = 0;
        for _ in 0..600 {
            if let TickOutcome::Expired { .. } = session.tick() {
                expirations += 1;
            }
        }
        assert_eq!(session.remaining(), 0);
        assert_eq!(expirations, 1);
        assert!(session.is_expired());
        assert_eq!(session.tick(), TickOutcome::Idle);
        assert_eq!(session.remaining(), 0);
    }

    #[test]
    fn test_first_tick_reports_previous_value() {
        let mut session = started(1);
        assert_eq!(
            session.tick(),
            TickOutcome::Counting {
                previous: 600,
                remaining: 599
            }
        );
    }

    #[test]
    fn test_payload_requires_all_answers() {
        let mut session = started(3);
        session.select_answer(0, 1).unwrap();
        session.select_answer(1, 0).unwrap();
        assert_eq!(session.payload(), Err(SessionError::Incomplete { count: 1 }));
        assert_eq!(session.unanswered(), vec![2]);

        let partial = session.answered_payload();
        assert_eq!(partial.len(), 2);

        session.select_answer(2, 2).unwrap();
        let payload = session.payload().unwrap();
        let ids: Vec<_> = payload.answers.iter().map(|a| a.question_id.as_str()).collect();
        let picks: Vec<_> = payload.answers.iter().map(|a| a.user_answer).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
        assert_eq!(picks, vec![1, 0, 2]);
        assert_eq!(payload.category_id, "cat");
    }

    #[test]
    fn test_snapshot_reflects_mutations() {
        let mut session = started(4);
        session.select_answer(0, 3).unwrap();
        session.tick();

        let snap = session.snapshot();
        assert_eq!(snap.position, 1);
        assert_eq!(snap.total, 4);
        assert_eq!(snap.answered, 1);
        assert_eq!(snap.selected, None);
        assert_eq!(snap.question.as_ref().map(|q| q.id.as_str()), Some("q2"));
        assert_eq!(snap.clock(), "9:59");
        assert_eq!(snap.progress_percent(), 25.0);
        assert!(!snap.is_last_question());
    }
}
