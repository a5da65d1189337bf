//! # 分析节点
//!
//! 语句与最终指令之间的中间表示。每条语句生成一个节点；
//! 块装配器为节点分配索引并链接 if/else/end，生成阶段再把节点降为指令。
//!
//! ## 链接方式
//!
//! 节点存放在块的节点数组中，`else_node` / `end_node` 记录的是
//! **数组下标**而不是引用，避免循环所有权。

use crate::error::{AnalysisError, AnalysisResult};
use crate::instruction::Instruction;
use crate::script::Expr;
use crate::script::context::AnalysisContext;

/// 节点种类
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// 原样输出的指令
    Plain(Instruction),

    /// 条件分支
    If {
        condition: Expr,
        /// 对应 else 节点在块内的下标
        else_node: Option<usize>,
        /// 对应 end 节点在块内的下标
        end_node: Option<usize>,
    },

    /// else：降为跳到 end 之后的无条件跳转
    Else {
        /// 对应 end 节点在块内的下标
        end_node: Option<usize>,
    },

    /// if 链的结束标记，伪节点
    End,

    /// 进入指定块
    Entry { block: String },

    /// 跳过指定块的整个块体
    BlockHead { block: String },
}

/// 分析节点
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisNode {
    /// 块内索引，只在非伪节点之间连续
    pub index: usize,
    pub kind: NodeKind,
}

impl AnalysisNode {
    pub fn new(kind: NodeKind) -> Self {
        Self { index: 0, kind }
    }

    pub fn plain(instruction: Instruction) -> Self {
        Self::new(NodeKind::Plain(instruction))
    }

    pub fn condition(condition: Expr) -> Self {
        Self::new(NodeKind::If {
            condition,
            else_node: None,
            end_node: None,
        })
    }

    pub fn otherwise() -> Self {
        Self::new(NodeKind::Else { end_node: None })
    }

    pub fn end() -> Self {
        Self::new(NodeKind::End)
    }

    pub fn entry(block: impl Into<String>) -> Self {
        Self::new(NodeKind::Entry {
            block: block.into(),
        })
    }

    pub fn block_head(block: impl Into<String>) -> Self {
        Self::new(NodeKind::BlockHead {
            block: block.into(),
        })
    }

    /// 伪节点占据一个位置参与索引与链接，但不生成指令
    pub fn is_fake(&self) -> bool {
        matches!(self.kind, NodeKind::End)
    }

    /// 降为最终指令
    ///
    /// - `siblings`：同一块的全部节点（用于解析链接下标）
    /// - `head_offset`：本块首条指令在最终序列中的位置
    ///
    /// 块内索引加上 `head_offset` 才是全局位置。
    pub fn lower(
        &self,
        siblings: &[AnalysisNode],
        head_offset: usize,
        block: &str,
        context: &AnalysisContext,
    ) -> AnalysisResult<Instruction> {
        let unlinked = || AnalysisError::UnlinkedBranch {
            block: block.to_string(),
            index: self.index,
        };

        match &self.kind {
            NodeKind::Plain(instruction) => Ok(instruction.clone()),

            NodeKind::If {
                condition,
                else_node,
                end_node,
            } => {
                let end = end_node.ok_or_else(unlinked)?;
                // 有 else 时跳到 else 之后，否则跳到 end 之后的第一条指令
                let false_index = match else_node {
                    Some(e) => siblings[*e].index + 1,
                    None => siblings[end].index,
                };
                Ok(Instruction::Condition {
                    condition: condition.clone(),
                    true_destination: head_offset + self.index + 1,
                    false_destination: head_offset + false_index,
                })
            }

            NodeKind::Else { end_node } => {
                let end = end_node.ok_or_else(unlinked)?;
                Ok(Instruction::Jump {
                    destination: head_offset + siblings[end].index,
                })
            }

            NodeKind::End => Err(AnalysisError::FakeNodeEmitted {
                block: block.to_string(),
                index: self.index,
            }),

            NodeKind::Entry { block } => {
                let info = context.block_info(block)?;
                Ok(Instruction::BlockEntry {
                    block_head: info.head_offset,
                })
            }

            NodeKind::BlockHead { block } => {
                let info = context.block_info(block)?;
                Ok(Instruction::Jump {
                    destination: info.head_offset + info.length,
                })
            }
        }
    }
}

impl std::fmt::Display for AnalysisNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            NodeKind::Plain(instruction) => write!(f, "[{}]{:?}", self.index, instruction),
            NodeKind::If { condition, .. } => write!(f, "[{}]:if {}", self.index, condition),
            NodeKind::Else { .. } => write!(f, "[{}]:else", self.index),
            NodeKind::End => write!(f, "[{}]:end", self.index),
            NodeKind::Entry { block } => write!(f, "[{}]:entry {}", self.index, block),
            NodeKind::BlockHead { block } => write!(f, "[{}]{}:", self.index, block),
        }
    }
}
