//! # Analyzer 模块
//!
//! 把源码编译为 [`NodeTree`] 的分析流程（手写解析，无 regex 依赖）。
//!
//! ## 架构
//!
//! ```text
//! 源码 → [行规范化] → [阶段1: 块识别 + 元指令分离] → [阶段2: 语句解析]
//!      → [块装配: 生成节点 / 分配索引 / 链接分支] → [指令生成] → [应用元指令] → NodeTree
//! ```
//!
//! ## 设计原则
//!
//! - 整个流程单线程同步执行，每次编译独占一个 [`AnalysisContext`]
//! - 任何错误都终止本次编译，不返回部分结果
//! - 块外无法识别的文本行不算错误，记录警告后丢弃
//!
//! ## 模块结构
//!
//! - `helpers`: 行规范化、参数切分、行为调用解析
//! - `expr_parser`: 表达式解析器
//! - `phase1`: 块识别与元指令分离
//! - `phase2`: 语句解析
//! - `assemble`: 块装配
//! - `emit`: 指令生成

mod assemble;
mod emit;
mod expr_parser;
mod helpers;
mod phase1;
mod phase2;


use tracing::{debug, warn};

use crate::error::AnalysisResult;
use crate::instruction::NodeTree;
use crate::keyword::KeywordKind;
use crate::language::Language;
use crate::meta::apply_metas;
use crate::script::ast::{MAIN_BLOCK, StatementBlock};
use crate::script::context::AnalysisContext;

pub use assemble::{AssembledBlock, assemble, assign_indices, build_nodes, link_branches};
pub use emit::emit;
pub use expr_parser::parse_expression;
pub use helpers::{normalize_lines, parse_action, split_args, starts_with_any};
pub use phase1::{SplitBlocks, separate_metas, split_blocks};
pub use phase2::{parse_lines, parse_statement};

/// 脚本分析器
#[derive(Debug)]
pub struct Analyzer {
    language: &'static Language,
    /// 最近一次分析的警告
    warnings: Vec<String>,
}

impl Analyzer {
    /// 使用指定语言表创建分析器
    pub fn new(language: &'static Language) -> Self {
        Self {
            language,
            warnings: Vec::new(),
        }
    }

    pub fn language(&self) -> &'static Language {
        self.language
    }

    /// 分析源码
    ///
    /// # 返回
    ///
    /// 编译得到的 `NodeTree`，或第一个分析错误
    pub fn analyze(&mut self, source: &str) -> AnalysisResult<NodeTree> {
        self.warnings.clear();
        let language = self.language;
        let symbols = &language.symbols;

        let lines = normalize_lines(source, symbols.comment);

        // 阶段 1：块识别
        let split = split_blocks(&lines, symbols)?;
        for line in &split.dropped {
            warn!(line = %line, "块外的文本行不是语句，已忽略");
            self.warnings.push(format!("已忽略块外的文本行: '{line}'"));
        }
        let (metas, rest) = separate_metas(split.rest, language);

        // 阶段 2：语句解析，主块在前
        let main = StatementBlock {
            name: MAIN_BLOCK.to_string(),
            statements: parse_lines(&rest, language)?,
        }
        .ends_with_or_add(KeywordKind::Stop);

        let mut blocks = vec![main];
        for raw in &split.blocks {
            blocks.push(StatementBlock {
                name: raw.name.clone(),
                statements: parse_lines(&raw.lines, language)?,
            });
        }

        // 块装配与指令生成
        let mut context = AnalysisContext::new(language);
        let assembled = assemble(&blocks, &mut context)?;
        let mut tree = NodeTree::new(emit(&assembled, &context)?);

        apply_metas(&mut tree, &metas, language)?;

        debug!(
            language = %language,
            blocks = blocks.len(),
            instructions = tree.len(),
            "分析完成"
        );
        Ok(tree)
    }

    /// 获取最近一次分析的警告
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(Language::english())
    }
}

/// 使用指定语言表分析源码
pub fn analyze(source: &str, language: &'static Language) -> AnalysisResult<NodeTree> {
    Analyzer::new(language).analyze(source)
}
