//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：会话日志、HTTP 客户端、恢复登录身份、连接监考浏览器
//! 2. **命令分发**：登录注册 / 分类 / 答题 / 复习 / 聊天 / 管理员录题 / 仪表盘 / 成绩分析
//! 3. **答题接线**：把标准输入和界面渲染接到 `QuizController` 的队列上
//! 4. **资源管理**：持有 Browser，保证监考页面在整个运行期间有效

use anyhow::{Context, Result};
use chrono::Utc;
use chromiumoxide::Browser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::{AppError, AuthError};
use crate::infrastructure::{ApiClient, CdpFullscreen, FullscreenHost, NoFullscreen};
use crate::models::{ChatMessage, QuestionBatch, Role, SignupForm, StudyFilter, User};
use crate::orchestrator::quiz_controller::{QuizController, QuizHandles, QuizInbox, QuizSettings};
use crate::orchestrator::terminal::{self, ChatAction, Command};
use crate::services::{
    messages, AccountService, AppContext, ChatHistory, ChatService, ConsoleNotifier, Navigator,
    Notice, Notifier, OtpCooldown, QuizApi, Route, RouteRecorder, TokenStore,
};
use crate::utils::logging::{init_log_file, log_startup, print_quiz_summary};
use crate::workflow::{QuizCtx, QuizEvent, SessionSnapshot};

/// 应用主结构
pub struct App {
    config: Config,
    context: AppContext,
    notifier: Arc<ConsoleNotifier>,
    navigator: Arc<RouteRecorder>,
    fullscreen: Arc<dyn FullscreenHost>,
    _browser: Option<Browser>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        let client = ApiClient::new(&config).context("无法创建 HTTP 客户端")?;
        let mut context = AppContext::new(client, TokenStore::new(&config.token_file));
        match context.hydrate().await {
            Ok(Some(user)) => info!("👤 当前用户: {}", user.email),
            Ok(None) => info!("👤 未登录"),
            Err(e) => warn!("无法恢复登录身份，按未登录处理: {}", e),
        }

        let (browser, fullscreen) = connect_proctor(&config).await;

        Ok(Self {
            notifier: Arc::new(ConsoleNotifier::with_log_file(config.output_log_file.clone())),
            navigator: Arc::new(RouteRecorder::new()),
            config,
            context,
            fullscreen,
            _browser: browser,
        })
    }

    /// 执行一条命令
    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Help => println!("{}", terminal::USAGE),
            Command::Login {
                role: Role::User,
                email,
                password,
            } => self.login(&email, &password).await?,
            Command::Login {
                role: Role::Admin,
                email,
                password,
            } => self.admin_login(&email, &password).await?,
            Command::Logout { role: Role::User } => {
                self.context.sign_out()?;
                println!("已退出登录");
            }
            Command::Logout { role: Role::Admin } => {
                self.admin_context().await?.sign_out()?;
                println!("管理员已退出登录");
            }
            Command::WhoAmI { role: Role::User } => match self.context.user() {
                Some(user) => println!("{}", terminal::render_user(user)),
                None => println!("尚未登录"),
            },
            Command::WhoAmI { role: Role::Admin } => match self.admin_context().await?.user() {
                Some(admin) => println!("[admin] {}", terminal::render_user(admin)),
                None => println!("管理员尚未登录"),
            },
            Command::Signup(form) => self.signup(&form).await?,
            Command::VerifyOtp { user_id, otp } => self.verify_otp(&user_id, &otp).await?,
            Command::ResendOtp { user_id } => self.resend_otp(&user_id).await?,
            Command::ForgotPassword { role, email } => self.forgot_password(role, &email).await?,
            Command::ResetPassword {
                role,
                email,
                otp,
                password,
                confirm_password,
            } => {
                self.reset_password(role, &email, &otp, &password, &confirm_password)
                    .await?
            }
            Command::Prepare {
                category_id,
                filter,
                show_answers,
            } => self.prepare(&category_id, &filter, show_answers).await?,
            Command::Chat(action) => self.chat(action).await?,
            Command::AddQuestions { category_id, file } => self.add_questions(&category_id, &file).await?,
            Command::Categories => {
                let categories = self
                    .api()
                    .categories()
                    .await
                    .context("获取分类失败")?;
                println!("{}", terminal::render_categories(&categories));
            }
            Command::Quiz { category_id } => self.run_quiz(&category_id).await?,
            Command::Dashboard => self.show_dashboard().await?,
            Command::Result { result_id } => self.show_analysis(&result_id).await?,
        }
        Ok(())
    }

    fn api(&self) -> QuizApi {
        QuizApi::new(self.context.api().clone())
    }

    /// 需要登录的命令先检查身份，未登录时跳到登录页
    fn signed_in_user(&self) -> Option<&User> {
        let user = self.context.user();
        if user.is_none() {
            self.notifier.notify(Notice::error(messages::LOGIN_REQUIRED));
            self.navigator.navigate(Route::Login);
        }
        user
    }

    async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        match self.context.login(email, password).await {
            Ok(user) => {
                info!("✓ 登录成功: {}", user.email);
                self.notifier.notify(Notice::success(messages::LOGGED_IN));
                self.navigator.navigate(Route::Home);
            }
            Err(AppError::Auth(AuthError::InvalidCredentials)) => {
                self.notifier.notify(Notice::error(messages::INVALID_LOGIN));
            }
            Err(AppError::Auth(AuthError::Rejected(message))) => {
                self.notifier.notify(Notice::error(message));
            }
            Err(e) => return Err(e).context("登录失败"),
        }
        Ok(())
    }

    /// 管理员身份单独保存，只在管理员命令里恢复
    async fn admin_context(&self) -> Result<AppContext> {
        let client = ApiClient::new(&self.config).context("无法创建 HTTP 客户端")?;
        let mut admin = AppContext::for_role(
            Role::Admin,
            client,
            TokenStore::new(&self.config.admin_token_file),
        );
        if let Err(e) = admin.hydrate().await {
            warn!("无法恢复管理员身份，按未登录处理: {}", e);
        }
        Ok(admin)
    }

    async fn admin_login(&self, email: &str, password: &str) -> Result<()> {
        let mut admin = self.admin_context().await?;
        match admin.login(email, password).await {
            Ok(user) => {
                info!("✓ 管理员登录成功: {}", user.email);
                self.notifier.notify(Notice::success(messages::LOGGED_IN));
                self.navigator.navigate(Route::AdminDashboard);
            }
            Err(e @ AppError::Auth(_)) => {
                self.notifier
                    .notify(Notice::error(messages::for_app_error(&e, messages::INVALID_LOGIN, true)));
            }
            Err(e) => return Err(e).context("管理员登录失败"),
        }
        Ok(())
    }

    fn account(&self) -> Result<AccountService> {
        let client = ApiClient::new(&self.config).context("无法创建 HTTP 客户端")?;
        let cooldown = OtpCooldown::new(&self.config.otp_state_file, self.config.otp_cooldown_secs);
        Ok(AccountService::new(client, cooldown))
    }

    /// 后端拒绝、本地校验失败和冷却中只提示，不当作程序错误
    fn report(&self, err: &AppError, fallback: &str, trust_server: bool) {
        warn!("请求未完成: {}", err);
        self.notifier
            .notify(Notice::error(messages::for_app_error(err, fallback, trust_server)));
    }

    async fn signup(&self, form: &SignupForm) -> Result<()> {
        match self.account()?.signup(form).await {
            Ok(pending) => {
                self.notifier.notify(Notice::success(
                    pending.message.unwrap_or_else(|| messages::OTP_SENT.to_string()),
                ));
                println!("用户 ID: {}", pending.user_id);
                println!("收到验证码后运行: quiz-client verify-otp {} <otp>", pending.user_id);
            }
            Err(e) => self.report(&e, messages::GENERIC_ERROR, true),
        }
        Ok(())
    }

    async fn verify_otp(&mut self, user_id: &str, otp: &str) -> Result<()> {
        let token = match self.account()?.verify_otp(user_id, otp).await {
            Ok(token) => token,
            Err(e) => {
                self.report(&e, messages::GENERIC_ERROR, true);
                return Ok(());
            }
        };
        let user = self.context.adopt_token(&token).await.context("验证成功但无法读取用户")?;
        info!("✓ 账号已验证: {}", user.email);
        self.notifier.notify(Notice::success(messages::OTP_VERIFIED));
        self.navigator.navigate(Route::Dashboard);
        Ok(())
    }

    async fn resend_otp(&self, user_id: &str) -> Result<()> {
        match self.account()?.resend_otp(user_id, Utc::now()).await {
            Ok(_) => self.notifier.notify(Notice::success(messages::OTP_RESENT)),
            Err(e) => self.report(&e, messages::GENERIC_ERROR, true),
        }
        Ok(())
    }

    async fn forgot_password(&self, role: Role, email: &str) -> Result<()> {
        match self.account()?.forgot_password(role, email, Utc::now()).await {
            Ok(()) => {
                self.notifier.notify(Notice::success(messages::OTP_SENT));
                println!(
                    "收到验证码后运行: quiz-client reset-password{} {} <otp> <新密码> <确认密码>",
                    if role == Role::Admin { " admin" } else { "" },
                    email.trim()
                );
            }
            Err(e) => self.report(&e, messages::SEND_OTP_FAILED, false),
        }
        Ok(())
    }

    async fn reset_password(
        &self,
        role: Role,
        email: &str,
        otp: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        match self
            .account()?
            .change_password(role, email, otp, password, confirm_password)
            .await
        {
            Ok(()) => {
                self.notifier.notify(Notice::success(messages::PASSWORD_CHANGED));
                self.navigator.navigate(match role {
                    Role::User => Route::Login,
                    Role::Admin => Route::AdminLogin,
                });
            }
            Err(e) => self.report(&e, messages::CHANGE_PASSWORD_FAILED, false),
        }
        Ok(())
    }

    /// 复习模式：列出分类的全部题目，可按难度和关键字筛选
    async fn prepare(&self, category_id: &str, filter: &StudyFilter, show_answers: bool) -> Result<()> {
        if self.signed_in_user().is_none() {
            return Ok(());
        }

        let questions = match self.api().study_questions(category_id).await {
            Ok(questions) => questions,
            Err(e) => {
                self.report(&e, messages::PREPARE_FAILED, false);
                self.navigator.navigate(Route::Home);
                return Ok(());
            }
        };
        self.notifier.notify(Notice::success(messages::QUESTIONS_LOADED));
        self.navigator.navigate(Route::Prepare(category_id.to_string()));

        let shown = filter.apply(&questions);
        println!("共 {} 道题，显示 {} 道", questions.len(), shown.len());
        println!("{}", terminal::render_study_questions(&shown, show_answers));
        Ok(())
    }

    async fn chat(&self, action: ChatAction) -> Result<()> {
        let chat = ChatService::new(
            self.context.api().clone(),
            ChatHistory::new(&self.config.chat_history_file),
        );
        match action {
            ChatAction::Send(prompt) => {
                if let Some(reply) = chat.send(&prompt).await? {
                    println!("{}", terminal::render_chat(&[ChatMessage::you(prompt.trim()), reply]));
                }
            }
            ChatAction::History => println!("{}", terminal::render_chat(&chat.history()?)),
            ChatAction::Clear => {
                chat.clear()?;
                self.notifier.notify(Notice::info(messages::CHAT_CLEARED));
            }
        }
        Ok(())
    }

    /// 管理员从 TOML 文件录题
    async fn add_questions(&self, category_id: &str, file: &str) -> Result<()> {
        let admin = self.admin_context().await?;
        if !admin.is_signed_in() {
            self.notifier.notify(Notice::error(messages::LOGIN_REQUIRED));
            self.navigator.navigate(Route::AdminLogin);
            return Ok(());
        }

        let batch = QuestionBatch::from_toml_file(file).with_context(|| format!("无法读取题目文件 {}", file))?;
        match QuizApi::new(admin.api().clone())
            .add_questions(category_id, &batch.questions)
            .await
        {
            Ok(_) => {
                self.notifier.notify(Notice::success(messages::QUESTIONS_ADDED));
                self.navigator.navigate(Route::AdminDashboard);
            }
            Err(e) => self.report(&e, messages::ADD_QUESTIONS_FAILED, true),
        }
        Ok(())
    }

    /// 一次完整的限时答题
    async fn run_quiz(&self, category_id: &str) -> Result<()> {
        let Some(user) = self.signed_in_user() else {
            return Ok(());
        };
        let ctx = QuizCtx::new(category_id, user.email.clone());

        let api = Arc::new(self.api());
        let controller = QuizController::new(
            api.clone(),
            api,
            self.notifier.clone(),
            self.navigator.clone(),
            QuizSettings::from(&self.config),
        )
        .with_fullscreen(self.fullscreen.clone());

        let Some(questions) = controller.load(&ctx).await else {
            return Ok(());
        };

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        if !questions.is_empty() {
            println!(
                "{}",
                terminal::render_intro(
                    questions.len(),
                    controller.settings().time_limit_secs,
                    self.config.proctor_browser_port.is_some()
                )
            );
            if lines.next_line().await?.is_none() {
                return Ok(());
            }
        }

        let (inbox, handles) = QuizInbox::channel();
        let input = tokio::spawn(forward_input(lines, handles.clone()));
        let render = tokio::spawn(render_snapshots(handles.snapshots.clone()));

        let outcome = controller.run(&ctx, questions, inbox).await;
        input.abort();
        render.abort();

        let last = handles.snapshots.borrow().clone();
        print_quiz_summary(
            outcome.label(),
            last.answered,
            last.total,
            &self.config.output_log_file,
        );

        if self.navigator.current() == Some(Route::Dashboard) {
            self.show_dashboard().await?;
        }
        Ok(())
    }

    async fn show_dashboard(&self) -> Result<()> {
        let Some(user) = self.signed_in_user() else {
            return Ok(());
        };
        println!("📋 {} 的答题记录", user.name);

        let results = self
            .api()
            .user_results()
            .await
            .context("获取答题记录失败")?;
        println!("{}", terminal::render_results(&results));
        Ok(())
    }

    async fn show_analysis(&self, result_id: &str) -> Result<()> {
        if self.signed_in_user().is_none() {
            return Ok(());
        }

        let items = self
            .api()
            .result_analysis(result_id)
            .await
            .context("获取成绩分析失败")?;
        self.navigator.navigate(Route::Result(result_id.to_string()));
        println!("{}", terminal::render_analysis(&items));
        Ok(())
    }
}

/// 连接监考浏览器；未配置或连接失败时不启用全屏监考
async fn connect_proctor(config: &Config) -> (Option<Browser>, Arc<dyn FullscreenHost>) {
    let Some(port) = config.proctor_browser_port else {
        return (None, Arc::new(NoFullscreen));
    };

    match browser::connect_to_browser_and_page(port, config.proctor_page_url.as_deref()).await {
        Ok((browser, page)) => {
            let poll = Duration::from_millis(config.proctor_poll_interval_ms);
            (Some(browser), Arc::new(CdpFullscreen::new(page, poll)))
        }
        Err(e) => {
            warn!("⚠️ 连接监考浏览器失败，不启用全屏监考: {}", e);
            (None, Arc::new(NoFullscreen))
        }
    }
}

/// 把标准输入逐行转成答题事件；输入结束视为离开
async fn forward_input(mut lines: Lines<BufReader<Stdin>>, handles: QuizHandles) {
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) | Err(_) => {
                let _ = handles.events.send(QuizEvent::Dispose).await;
                break;
            }
        };

        let snapshot = handles.snapshots.borrow().clone();
        match terminal::parse_quiz_input(&line, &snapshot) {
            Some(event) => {
                if handles.events.send(event).await.is_err() {
                    break;
                }
            }
            None => println!("无法识别的输入: {}", line.trim()),
        }
    }
}

/// 题号或选择变化时重新渲染
async fn render_snapshots(mut snapshots: watch::Receiver<SessionSnapshot>) {
    let mut last = None;
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        let key = (snapshot.position, snapshot.selected);
        if snapshot.started && last != Some(key) {
            println!("{}", terminal::render_question(&snapshot));
            last = Some(key);
        }
    }
}
