//! # GAL Compiler
//!
//! GAL 叙事脚本语言的前端编译器。
//!
//! ## 架构概述
//!
//! `gal-compiler` 是纯逻辑核心，不做任何文件 IO。
//! 它把一段源码编译为交给运行时执行的扁平指令序列：
//!
//! ```text
//! 源码 ──► analyze(source, language) ──► NodeTree { nodes, file, inputs }
//! ```
//!
//! 表层语法（关键字词表与标点符号）由 [`Language`] 决定，
//! 替换语言表不影响分析流程本身。
//!
//! ## 核心类型
//!
//! - [`Instruction`]：运行时指令
//! - [`NodeTree`]：输出容器
//! - [`Language`]：语言变体
//! - [`AnalysisError`]：分析错误
//!
//! ## 使用示例
//!
//! ```ignore
//! use gal_compiler::{Language, analyze};
//!
//! let tree = analyze(":action output(10)\n:stop", Language::english())?;
//! println!("{}", tree.to_json()?);
//! ```
//!
//! ## 模块结构
//!
//! - [`error`]：错误类型定义
//! - [`value`]：字面量值
//! - [`instruction`]：指令与输出容器
//! - [`keyword`]：关键字定义与生成规则
//! - [`language`]：语言变体
//! - [`meta`]：元指令
//! - [`script`]：分析流程（语句、节点、分析器）

pub mod error;
pub mod instruction;
pub mod keyword;
pub mod language;
pub mod meta;
pub mod script;
pub mod value;

// 重导出核心类型
pub use error::{AnalysisError, AnalysisResult};
pub use instruction::{Instruction, NodeTree};
pub use keyword::{Arity, KeywordDef, KeywordKind};
pub use language::{Language, Symbols};
pub use meta::{MetaDirective, MetaKind};
pub use script::{Analyzer, BinaryOp, Expr, analyze, parse_expression};
pub use value::Value;
