//! # 分析上下文
//!
//! 一次编译独占的共享状态：当前语言表与 块名 → [`BlockInfo`] 映射。
//! 块装配器在装配每个块后写入，生成规则与降级阶段只读。

use std::collections::HashMap;

use crate::error::{AnalysisError, AnalysisResult};
use crate::language::Language;

/// 块信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// 块首条指令在最终指令序列中的位置
    pub head_offset: usize,
    /// 块的节点数（包含伪节点）
    pub length: usize,
}

/// 分析上下文
#[derive(Debug)]
pub struct AnalysisContext {
    language: &'static Language,
    blocks: HashMap<String, BlockInfo>,
}

impl AnalysisContext {
    pub fn new(language: &'static Language) -> Self {
        Self {
            language,
            blocks: HashMap::new(),
        }
    }

    pub fn language(&self) -> &'static Language {
        self.language
    }

    /// 记录块信息，返回旧值（如果有）
    pub fn insert_block(&mut self, name: impl Into<String>, info: BlockInfo) -> Option<BlockInfo> {
        self.blocks.insert(name.into(), info)
    }

    /// 查找块信息
    pub fn block_info(&self, name: &str) -> AnalysisResult<&BlockInfo> {
        self.blocks
            .get(name)
            .ok_or_else(|| AnalysisError::NoSuchBlock {
                block: name.to_string(),
            })
    }
}
