//! # Error 模块
//!
//! 定义分析过程中使用的错误类型。
//!
//! 所有错误对当前这一次编译都是终止性的：出现任何错误即中止，不返回部分结果。
//! 每个变体都携带出错的源码行或块名，便于调用方定位。

use thiserror::Error;

/// 分析错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    // ── 词法 ──
    /// 括号不配对
    #[error("括号不配对: '{text}'")]
    UnbalancedBracket { text: String },

    /// 引号未闭合
    #[error("引号未闭合: '{text}'")]
    UnterminatedQuote { text: String },

    // ── 语法 ──
    /// 关键字符号后没有关键字
    #[error("无法识别关键字: '{line}'")]
    UnrecognizedKeyword { line: String },

    /// 关键字不在当前语言表中
    #[error("未知关键字 '{keyword}': '{line}'")]
    KeywordNotFound { keyword: String, line: String },

    /// 参数数量与关键字的声明不符
    #[error("关键字 '{keyword}' 需要 {expected} 个参数，实际 {found} 个: '{line}'")]
    WrongArgumentCount {
        keyword: String,
        expected: usize,
        found: usize,
        line: String,
    },

    /// 表达式解析失败
    #[error("无效的表达式 '{text}': {message}")]
    InvalidExpression { text: String, message: String },

    // ── 结构 ──
    /// 块头之后直到文件末尾都没有结束行
    #[error("块 '{block}' 缺少结束行")]
    UnterminatedBlock { block: String },

    /// 结束行的块名与当前块不符
    #[error("块 '{expected}' 被 '{found}' 关闭")]
    MismatchedBlockEnd { expected: String, found: String },

    /// 块名重复
    #[error("块 '{block}' 重复定义")]
    DuplicateBlock { block: String },

    /// end 之前没有打开的 if
    #[error("块 '{block}' 中第 {position} 个节点：end 没有对应的 if")]
    UnexpectedEnd { block: String, position: usize },

    /// else 之前没有打开的 if
    #[error("块 '{block}' 中第 {position} 个节点：else 没有对应的 if")]
    ElseWithoutIf { block: String, position: usize },

    /// 同一个 if 出现多个 else
    #[error("块 '{block}' 中第 {position} 个节点：同一个 if 出现了多个 else")]
    DuplicateElse { block: String, position: usize },

    /// 块结束时仍有未关闭的 if
    #[error("块 '{block}' 中有 {count} 个 if 缺少 end")]
    UnclosedIf { block: String, count: usize },

    // ── 解析引用 ──
    /// 引用了不存在的块
    #[error("块 '{block}' 不存在")]
    NoSuchBlock { block: String },

    /// 未知的元指令
    #[error("元指令 '{name}' 不存在")]
    NoSuchMeta { name: String },

    /// 元指令缺少参数
    #[error("元指令 '{name}' 缺少参数")]
    MissingMetaArgument { name: String },

    // ── 内部一致性 ──
    /// 条件节点没有完成链接
    #[error("内部错误：块 '{block}' 中索引 {index} 的分支节点未链接")]
    UnlinkedBranch { block: String, index: usize },

    /// 跳转目标超出指令序列
    #[error("内部错误：块 '{block}' 中索引 {index} 的跳转目标 {destination} 超出指令序列（共 {total} 条）")]
    DestinationOutOfRange {
        block: String,
        index: usize,
        destination: usize,
        total: usize,
    },

    /// 伪节点进入了生成阶段
    #[error("内部错误：块 '{block}' 中索引 {index} 的伪节点不能生成指令")]
    FakeNodeEmitted { block: String, index: usize },
}

/// Result 类型别名
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_context() {
        let err = AnalysisError::KeywordNotFound {
            keyword: "jump".to_string(),
            line: ":jump Foo".to_string(),
        };
        assert!(err.to_string().contains("jump"));
        assert!(err.to_string().contains(":jump Foo"));

        let err = AnalysisError::NoSuchBlock {
            block: "WhenTrue".to_string(),
        };
        assert!(err.to_string().contains("WhenTrue"));
    }
}
