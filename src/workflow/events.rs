//! 答题事件
//!
//! 计时器、全屏监听和用户输入都只往同一个队列里投递事件，
//! 由控制器逐个处理，会话状态因此不会被并发修改。

/// 一次答题过程中的全部输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    /// 计时器走了一秒
    Tick,
    /// 给第 `index` 题选择第 `option` 个选项（均从 0 开始）
    Select { index: usize, option: usize },
    /// 下一题
    Advance,
    /// 上一题
    Retreat,
    /// 手动交卷
    Submit,
    /// 宿主报告退出了全屏
    FullscreenExited,
    /// 用户离开答题页
    Dispose,
}
