//! # 语法结构
//!
//! 分析流程前半段的产物：原始块与语句。

use crate::keyword::KeywordKind;

/// 主块的名称
pub const MAIN_BLOCK: &str = "Main";

/// 原始块：块名 + 规范化后的源码行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub name: String,
    pub lines: Vec<String>,
}

impl RawBlock {
    pub fn new(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }
}

/// 语句：关键字 + 参数
///
/// 一行源码对应一条语句。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub keyword: KeywordKind,
    pub args: Vec<String>,
    /// 原始源码行，用于错误信息
    pub line: String,
}

impl Statement {
    pub fn new(keyword: KeywordKind, args: Vec<String>, line: impl Into<String>) -> Self {
        Self {
            keyword,
            args,
            line: line.into(),
        }
    }

    /// 编译器补充的语句（没有对应的源码行）
    pub fn synthetic(keyword: KeywordKind) -> Self {
        Self::new(keyword, Vec::new(), String::new())
    }
}

/// 语句块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementBlock {
    pub name: String,
    pub statements: Vec<Statement>,
}

impl StatementBlock {
    /// 若最后一条语句不是 `keyword`，则追加一条
    pub fn ends_with_or_add(mut self, keyword: KeywordKind) -> Self {
        if self.statements.last().map(|s| s.keyword) != Some(keyword) {
            self.statements.push(Statement::synthetic(keyword));
        }
        self
    }
}
