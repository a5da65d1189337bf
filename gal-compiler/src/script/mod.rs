//! # Script 模块
//!
//! 脚本分析相关功能，包括语法结构、中间节点和分析器实现。
//!
//! ## 模块结构
//!
//! - [`ast`]：原始块与语句
//! - [`expr`]：表达式树
//! - [`node`]：分析节点（语句与指令之间的中间表示）
//! - [`context`]：一次编译的共享状态
//! - [`analyzer`]：分析流程实现

pub mod analyzer;
pub mod ast;
pub mod context;
pub mod expr;
pub mod node;

pub use analyzer::{Analyzer, analyze, parse_action, parse_expression};
pub use ast::*;
pub use context::{AnalysisContext, BlockInfo};
pub use expr::*;
pub use node::{AnalysisNode, NodeKind};
