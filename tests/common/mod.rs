//! 集成测试用的内存替身
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use quiz_client::error::{ApiError, AppResult};
use quiz_client::models::{Level, Question, SubmissionPayload, SubmitReceipt};
use quiz_client::orchestrator::{QuizController, QuizSettings};
use quiz_client::services::{Notice, Notifier, QuestionSource, RouteRecorder, SubmissionSink};
use quiz_client::{ExpiryPolicy, FullscreenHost, QuizCtx};

pub fn questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| {
            Question::new(
                format!("q{}", i + 1),
                format!("Question {}", i + 1),
                vec!["A".into(), "B".into(), "C".into(), "D".into()],
                Level::Easy,
            )
        })
        .collect()
}

pub fn ctx() -> QuizCtx {
    QuizCtx::new("cat1", "tester@example.com")
}

/// 固定题目；None 表示取题失败
pub struct FakeSource(pub Option<Vec<Question>>);

#[async_trait]
impl QuestionSource for FakeSource {
    async fn fetch_questions(&self, category_id: &str) -> AppResult<Vec<Question>> {
        self.0.clone().ok_or_else(|| {
            ApiError::BadResponse {
                endpoint: format!("/question/{}", category_id),
                message: Some("boom".to_string()),
            }
            .into()
        })
    }
}

/// 记录所有交卷请求
#[derive(Default)]
pub struct RecordingSink {
    pub payloads: Mutex<Vec<SubmissionPayload>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn count(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }

    pub fn first(&self) -> SubmissionPayload {
        self.payloads.lock().unwrap()[0].clone()
    }
}

#[async_trait]
impl SubmissionSink for RecordingSink {
    async fn submit_quiz(&self, payload: &SubmissionPayload) -> AppResult<SubmitReceipt> {
        self.payloads.lock().unwrap().push(payload.clone());
        if self.fail {
            return Err(ApiError::HttpStatus {
                endpoint: "/quiz/submit-quiz".to_string(),
                status: 500,
                message: None,
            }
            .into());
        }
        Ok(SubmitReceipt {
            message: Some("Quiz submitted".to_string()),
        })
    }
}

/// 记录所有提示
#[derive(Default)]
pub struct RecordingNotifier(Mutex<Vec<Notice>>);

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn count(&self, message: &str) -> usize {
        self.messages().iter().filter(|m| *m == message).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.0.lock().unwrap().push(notice);
    }
}

/// 可控的全屏宿主
pub struct ScriptedFullscreen {
    grant: bool,
    exits: Mutex<Option<mpsc::Receiver<()>>>,
}

impl ScriptedFullscreen {
    /// 同意全屏，返回用来模拟"退出全屏"的发送端
    pub fn granted() -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel(4);
        (
            Self {
                grant: true,
                exits: Mutex::new(Some(rx)),
            },
            tx,
        )
    }

    pub fn denied() -> (Self, mpsc::Sender<()>) {
        let (host, tx) = Self::granted();
        (
            Self {
                grant: false,
                ..host
            },
            tx,
        )
    }
}

#[async_trait]
impl FullscreenHost for ScriptedFullscreen {
    async fn request_fullscreen(&self) -> anyhow::Result<bool> {
        Ok(self.grant)
    }

    async fn subscribe_exit(&self) -> anyhow::Result<mpsc::Receiver<()>> {
        self.exits
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| anyhow::anyhow!("already subscribed"))
    }
}

/// 组装好的控制器和它的观察者
pub struct Harness {
    pub controller: Arc<QuizController>,
    pub sink: Arc<RecordingSink>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RouteRecorder>,
}

pub struct HarnessBuilder {
    source: FakeSource,
    sink: RecordingSink,
    host: Option<Arc<dyn FullscreenHost>>,
    settings: QuizSettings,
}

impl HarnessBuilder {
    pub fn new(questions: Option<Vec<Question>>) -> Self {
        Self {
            source: FakeSource(questions),
            sink: RecordingSink::default(),
            host: None,
            // 计时器不会自己走，Tick 由测试手动投递
            settings: QuizSettings {
                tick_period: Duration::from_secs(3600),
                ..QuizSettings::default()
            },
        }
    }

    pub fn sink(mut self, sink: RecordingSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn fullscreen(mut self, host: impl FullscreenHost + 'static) -> Self {
        self.host = Some(Arc::new(host));
        self
    }

    pub fn policy(mut self, policy: ExpiryPolicy) -> Self {
        self.settings.expiry_policy = policy;
        self
    }

    pub fn settings(mut self, settings: QuizSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Harness {
        let sink = Arc::new(self.sink);
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RouteRecorder::new());

        let mut controller = QuizController::new(
            Arc::new(self.source),
            sink.clone(),
            notifier.clone(),
            navigator.clone(),
            self.settings,
        );
        if let Some(host) = self.host {
            controller = controller.with_fullscreen(host);
        }

        Harness {
            controller: Arc::new(controller),
            sink,
            notifier,
            navigator,
        }
    }
}
