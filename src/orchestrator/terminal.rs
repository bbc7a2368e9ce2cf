//! 终端界面
//!
//! 命令行参数解析、答题时的键盘输入映射，以及题目/分类/成绩的文本渲染。
//! 这里只做格式转换，不碰会话状态。

use crate::models::{
    AnalysisItem, Category, ChatMessage, Level, QuizResult, Role, Sender, SignupForm, StudyFilter,
    StudyQuestion, User,
};
use crate::utils::truncate_text;
use crate::workflow::{QuizEvent, SessionSnapshot};

pub const USAGE: &str = "\
用法: quiz-client <命令>

命令:
  login [admin] <email> <password>       登录（admin 为管理员账号）
  logout [admin]                         退出登录
  whoami [admin]                         显示当前用户
  signup <name> <email> <phone> <address> <password> <confirm>
                                         注册，验证码发到邮箱
  verify-otp <user_id> <otp>             校验注册验证码并登录
  resend-otp <user_id>                   重发注册验证码
  forgot-password [admin] <email>        发送找回密码验证码
  reset-password [admin] <email> <otp> <password> <confirm>
                                         用验证码设置新密码
  categories                             列出所有分类
  quiz <category_id>                     开始限时答题
  prepare <category_id> [--level <easy|medium|hard>] [--search <关键字>] [--answers]
                                         复习某分类的全部题目
  chat <问题...>                         向学习助手提问
  chat --history | --clear               查看或清空聊天记录
  add-questions <category_id> <file>     管理员从 TOML 文件录题
  dashboard                              查看历史成绩
  result <result_id>                     查看某次成绩的逐题分析";

/// `chat` 的三种用法
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    Send(String),
    History,
    Clear,
}

/// 顶层命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { role: Role, email: String, password: String },
    Logout { role: Role },
    WhoAmI { role: Role },
    Signup(SignupForm),
    VerifyOtp { user_id: String, otp: String },
    ResendOtp { user_id: String },
    ForgotPassword { role: Role, email: String },
    ResetPassword {
        role: Role,
        email: String,
        otp: String,
        password: String,
        confirm_password: String,
    },
    Categories,
    Quiz { category_id: String },
    Prepare {
        category_id: String,
        filter: StudyFilter,
        show_answers: bool,
    },
    Chat(ChatAction),
    AddQuestions { category_id: String, file: String },
    Dashboard,
    Result { result_id: String },
    Help,
}

/// 开头的 `admin` 表示管理员账号
fn split_role<'a, 'b>(words: &'a [&'b str]) -> (Role, &'a [&'b str]) {
    match words {
        ["admin", rest @ ..] => (Role::Admin, rest),
        rest => (Role::User, rest),
    }
}

fn parse_prepare(category_id: &str, flags: &[&str]) -> Result<Command, String> {
    let mut filter = StudyFilter::default();
    let mut show_answers = false;
    let mut flags = flags.iter();
    while let Some(flag) = flags.next() {
        match *flag {
            "--answers" => show_answers = true,
            "--level" => {
                let value = flags.next().ok_or("--level 缺少取值")?;
                filter.level = Some(Level::parse(value).ok_or_else(|| format!("未知难度: {}", value))?);
            }
            "--search" => {
                let value = flags.next().ok_or("--search 缺少取值")?;
                filter.search = Some(value.to_string());
            }
            other => return Err(format!("未知参数: {}", other)),
        }
    }
    Ok(Command::Prepare {
        category_id: category_id.to_string(),
        filter,
        show_answers,
    })
}

impl Command {
    /// 解析命令行参数（不含程序名）
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let words: Vec<&str> = args.iter().map(String::as_str).collect();
        let unknown = || format!("无法识别的命令: {}\n\n{}", words.join(" "), USAGE);

        let command = match words.as_slice() {
            [] | ["help"] | ["-h"] | ["--help"] => Command::Help,
            ["login", rest @ ..] => match split_role(rest) {
                (role, [email, password]) => Command::Login {
                    role,
                    email: email.to_string(),
                    password: password.to_string(),
                },
                _ => return Err(unknown()),
            },
            ["logout", rest @ ..] => match split_role(rest) {
                (role, []) => Command::Logout { role },
                _ => return Err(unknown()),
            },
            ["whoami", rest @ ..] => match split_role(rest) {
                (role, []) => Command::WhoAmI { role },
                _ => return Err(unknown()),
            },
            ["signup", name, email, phone, address, password, confirm] => Command::Signup(SignupForm {
                name: name.to_string(),
                email: email.to_string(),
                phone_number: phone.to_string(),
                address: address.to_string(),
                password: password.to_string(),
                confirm_password: confirm.to_string(),
            }),
            ["verify-otp", user_id, otp] => Command::VerifyOtp {
                user_id: user_id.to_string(),
                otp: otp.to_string(),
            },
            ["resend-otp", user_id] => Command::ResendOtp {
                user_id: user_id.to_string(),
            },
            ["forgot-password", rest @ ..] => match split_role(rest) {
                (role, [email]) => Command::ForgotPassword {
                    role,
                    email: email.to_string(),
                },
                _ => return Err(unknown()),
            },
            ["reset-password", rest @ ..] => match split_role(rest) {
                (role, [email, otp, password, confirm]) => Command::ResetPassword {
                    role,
                    email: email.to_string(),
                    otp: otp.to_string(),
                    password: password.to_string(),
                    confirm_password: confirm.to_string(),
                },
                _ => return Err(unknown()),
            },
            ["categories"] => Command::Categories,
            ["quiz", category_id] => Command::Quiz {
                category_id: category_id.to_string(),
            },
            ["prepare", category_id, flags @ ..] => parse_prepare(category_id, flags)?,
            ["chat", "--history"] => Command::Chat(ChatAction::History),
            ["chat", "--clear"] => Command::Chat(ChatAction::Clear),
            ["chat", prompt @ ..] if !prompt.is_empty() => Command::Chat(ChatAction::Send(prompt.join(" "))),
            ["add-questions", category_id, file] => Command::AddQuestions {
                category_id: category_id.to_string(),
                file: file.to_string(),
            },
            ["dashboard"] => Command::Dashboard,
            ["result", result_id] => Command::Result {
                result_id: result_id.to_string(),
            },
            _ => return Err(unknown()),
        };
        Ok(command)
    }
}

/// 把答题时的一行输入映射为事件
///
/// 选项编号从 1 开始，作用于快照里的当前题目
pub fn parse_quiz_input(line: &str, snapshot: &SessionSnapshot) -> Option<QuizEvent> {
    match line.trim().to_ascii_lowercase().as_str() {
        "n" | "next" => Some(QuizEvent::Advance),
        "b" | "back" => Some(QuizEvent::Retreat),
        "s" | "submit" => Some(QuizEvent::Submit),
        "q" | "quit" => Some(QuizEvent::Dispose),
        other => match other.parse::<usize>() {
            Ok(n) if n >= 1 => Some(QuizEvent::Select {
                index: snapshot.position,
                option: n - 1,
            }),
            _ => None,
        },
    }
}

/// 渲染当前题目
pub fn render_question(snapshot: &SessionSnapshot) -> String {
    let Some(question) = &snapshot.question else {
        return format!(
            "已浏览完全部 {} 道题 (已作答 {})，输入 s 交卷，b 返回",
            snapshot.total, snapshot.answered
        );
    };

    let mut out = format!(
        "{}\n第 {}/{} 题 [{}] ⏱ {} | 进度 {:.0}%\n{}\n\n",
        "─".repeat(60),
        snapshot.position + 1,
        snapshot.total,
        question.level.badge(),
        snapshot.clock(),
        snapshot.progress_percent(),
        question.title
    );
    for (i, option) in question.options.iter().enumerate() {
        let mark = if snapshot.selected == Some(i) { "●" } else { "○" };
        out.push_str(&format!("  {} {}. {}\n", mark, i + 1, option));
    }

    let next = if snapshot.is_last_question() {
        "s 交卷"
    } else {
        "n 下一题"
    };
    out.push_str(&format!(
        "\n[1-{}] 作答  {}  b 上一题  q 离开",
        question.options.len(),
        next
    ));
    out
}

/// 答题前的说明
pub fn render_intro(total: usize, time_limit_secs: u32, fullscreen: bool) -> String {
    let mut out = format!(
        "共 {} 道题，每题 1 分，时限 {} 分钟。\n选择答案后会自动进入下一题，可以返回修改。",
        total,
        time_limit_secs / 60
    );
    if fullscreen {
        out.push_str("\n答题期间请保持监考页面全屏，退出全屏将被视为作弊。");
    }
    out.push_str("\n按回车开始...");
    out
}

pub fn render_user(user: &User) -> String {
    let mut out = format!("{} <{}>", user.name, user.email);
    if let Some(phone) = &user.phone {
        out.push_str(&format!("\n电话: {}", phone));
    }
    if let Some(address) = &user.address {
        out.push_str(&format!("\n地址: {}", address));
    }
    out
}

pub fn render_categories(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "暂无分类".to_string();
    }
    categories
        .iter()
        .map(|c| format!("{:<26} {} ({} 题)", c.id, c.name, c.total))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_results(results: &[QuizResult]) -> String {
    if results.is_empty() {
        return "还没有答题记录".to_string();
    }
    results
        .iter()
        .map(|r| {
            format!(
                "{:<26} {:<20} {}/{}  {:.2}%  {}",
                r.id,
                truncate_text(&r.category.name, 20),
                r.marks,
                r.total_questions(),
                r.accuracy(),
                r.grade()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_analysis(items: &[AnalysisItem]) -> String {
    if items.is_empty() {
        return "没有可用的分析".to_string();
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let verdict = if item.is_correct { "✅" } else { "❌" };
            let mut block = format!(
                "{} {}. {}\n   你的答案: {}\n   正确答案: {}",
                verdict,
                i + 1,
                item.question_title,
                item.user_option,
                item.correct_option
            );
            if !item.explanation.is_empty() {
                block.push_str(&format!("\n   解析: {}", item.explanation));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// 复习列表；`show_answers` 为 false 时只列题目和选项
pub fn render_study_questions(questions: &[&StudyQuestion], show_answers: bool) -> String {
    if questions.is_empty() {
        return "没有符合条件的题目".to_string();
    }
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let mut block = format!("{}. [{}] {}", i + 1, q.level.badge(), q.title);
            for (n, option) in q.options.iter().enumerate() {
                let mark = if show_answers && n == q.correct_answer_index { "✔" } else { " " };
                block.push_str(&format!("\n   {} {}. {}", mark, n + 1, option));
            }
            if show_answers && !q.explanation.is_empty() {
                block.push_str(&format!("\n   解析: {}", q.explanation));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_chat(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| {
            let who = match m.sender {
                Sender::Ai => "🤖 AI",
                Sender::You => "🙂 You",
            };
            format!("{}: {}", who, m.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
