//! # 块装配
//!
//! 对每个语句块依次执行：
//!
//! 1. 逐条语句生成节点
//! 2. 头部插入进入本块的节点，尾部追加块结束节点
//! 3. 分配块内索引（伪节点不推进计数）
//! 4. 链接 if / else / end
//! 5. 记录块信息，累加全局偏移
//!
//! ```text
//! 节点     entry  if   action  else  action  end  block_end
//! 索引     0      1    2       3     4       5    5
//! ```

use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};
use crate::instruction::Instruction;
use crate::script::ast::StatementBlock;
use crate::script::context::{AnalysisContext, BlockInfo};
use crate::script::node::{AnalysisNode, NodeKind};

/// 装配完成的块
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledBlock {
    pub name: String,
    /// 块首条指令在最终序列中的位置
    pub head_offset: usize,
    /// 全部节点（包含伪节点）
    pub nodes: Vec<AnalysisNode>,
}

impl AssembledBlock {
    /// 会生成指令的节点数
    pub fn emitted_len(&self) -> usize {
        self.nodes.iter().filter(|node| !node.is_fake()).count()
    }
}

/// 逐条语句生成节点，并加上块首与块尾
pub fn build_nodes(
    block: &StatementBlock,
    context: &AnalysisContext,
) -> AnalysisResult<Vec<AnalysisNode>> {
    let mut nodes = Vec::with_capacity(block.statements.len() + 2);
    nodes.push(AnalysisNode::entry(block.name.as_str()));
    for statement in &block.statements {
        nodes.push(statement.keyword.def().generate(statement, context)?);
    }
    nodes.push(AnalysisNode::plain(Instruction::BlockEnd));
    Ok(nodes)
}

/// 分配块内索引
///
/// 伪节点取当前计数，不推进；因此伪节点与其后第一个非伪节点索引相同。
pub fn assign_indices(nodes: &mut [AnalysisNode]) {
    let mut counter = 0;
    for node in nodes {
        node.index = counter;
        if !node.is_fake() {
            counter += 1;
        }
    }
}

/// 等待 end 的 if
struct Frame {
    condition: usize,
    otherwise: Option<usize>,
}

/// 链接 if / else / end
///
/// 链接保存的是节点数组下标。
pub fn link_branches(nodes: &mut [AnalysisNode], block: &str) -> AnalysisResult<()> {
    let mut stack: Vec<Frame> = Vec::new();

    for position in 0..nodes.len() {
        match nodes[position].kind {
            NodeKind::If { .. } => stack.push(Frame {
                condition: position,
                otherwise: None,
            }),

            NodeKind::Else { .. } => {
                let frame = stack.last_mut().ok_or_else(|| AnalysisError::ElseWithoutIf {
                    block: block.to_string(),
                    position,
                })?;
                if frame.otherwise.is_some() {
                    return Err(AnalysisError::DuplicateElse {
                        block: block.to_string(),
                        position,
                    });
                }
                frame.otherwise = Some(position);
            }

            NodeKind::End => {
                let frame = stack.pop().ok_or_else(|| AnalysisError::UnexpectedEnd {
                    block: block.to_string(),
                    position,
                })?;

                if let NodeKind::If {
                    else_node,
                    end_node,
                    ..
                } = &mut nodes[frame.condition].kind
                {
                    *else_node = frame.otherwise;
                    *end_node = Some(position);
                }

                if let Some(otherwise) = frame.otherwise
                    && let NodeKind::Else { end_node } = &mut nodes[otherwise].kind
                {
                    *end_node = Some(position);
                }
            }

            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(AnalysisError::UnclosedIf {
            block: block.to_string(),
            count: stack.len(),
        });
    }

    Ok(())
}

/// 按顺序装配全部块，并把块信息写入上下文
pub fn assemble(
    blocks: &[StatementBlock],
    context: &mut AnalysisContext,
) -> AnalysisResult<Vec<AssembledBlock>> {
    let mut assembled = Vec::with_capacity(blocks.len());
    let mut total = 0;

    for block in blocks {
        let mut nodes = build_nodes(block, context)?;
        assign_indices(&mut nodes);
        link_branches(&mut nodes, &block.name)?;

        let info = BlockInfo {
            head_offset: total,
            length: nodes.len(),
        };
        if context.insert_block(block.name.as_str(), info).is_some() {
            return Err(AnalysisError::DuplicateBlock {
                block: block.name.clone(),
            });
        }

        let assembled_block = AssembledBlock {
            name: block.name.clone(),
            head_offset: total,
            nodes,
        };
        total += assembled_block.emitted_len();

        debug!(
            block = %block.name,
            head_offset = info.head_offset,
            length = info.length,
            "块装配完成"
        );
        assembled.push(assembled_block);
    }

    Ok(assembled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::KeywordKind;
    use crate::language::Language;
    use crate::script::Expr;
    use crate::script::ast::Statement;

    fn node(kind: KeywordKind) -> AnalysisNode {
        match kind {
            KeywordKind::If => AnalysisNode::condition(Expr::bool(true)),
            KeywordKind::Else => AnalysisNode::otherwise(),
            KeywordKind::End => AnalysisNode::end(),
            _ => AnalysisNode::plain(Instruction::Return),
        }
    }

    fn nodes(kinds: &[KeywordKind]) -> Vec<AnalysisNode> {
        let mut nodes: Vec<_> = kinds.iter().map(|k| node(*k)).collect();
        assign_indices(&mut nodes);
        nodes
    }

    #[test]
    fn test_indices_skip_fake_nodes() {
        use KeywordKind::*;
        let nodes = nodes(&[If, Return, End, End, Return]);
        let indices: Vec<_> = nodes.iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 2, 2]);

        // 末尾的伪节点取块长度
        let nodes = self::nodes(&[If, Return, End]);
        assert_eq!(nodes[2].index, 2);
    }

    #[test]
    fn test_link_nested() {
        use KeywordKind::*;
        let mut nodes = nodes(&[If, If, Return, End, Else, Return, End]);
        link_branches(&mut nodes, "Main").unwrap();

        assert_eq!(
            nodes[0].kind,
            NodeKind::If {
                condition: Expr::bool(true),
                else_node: Some(4),
                end_node: Some(6),
            }
        );
        assert_eq!(
            nodes[1].kind,
            NodeKind::If {
                condition: Expr::bool(true),
                else_node: None,
                end_node: Some(3),
            }
        );
        assert_eq!(nodes[4].kind, NodeKind::Else { end_node: Some(6) });
    }

    #[test]
    fn test_link_errors() {
        use KeywordKind::*;

        let err = link_branches(&mut nodes(&[Return, End]), "Main").unwrap_err();
        assert_eq!(
            err,
            AnalysisError::UnexpectedEnd {
                block: "Main".to_string(),
                position: 1,
            }
        );

        let err = link_branches(&mut nodes(&[Else]), "Main").unwrap_err();
        assert!(matches!(err, AnalysisError::ElseWithoutIf { .. }));

        let err = link_branches(&mut nodes(&[If, Else, Else, End]), "Main").unwrap_err();
        assert!(matches!(err, AnalysisError::DuplicateElse { position: 2, .. }));

        let err = link_branches(&mut nodes(&[If, If, End]), "Main").unwrap_err();
        assert!(matches!(err, AnalysisError::UnclosedIf { count: 1, .. }));
    }

    #[test]
    fn test_assemble_offsets() {
        let mut context = AnalysisContext::new(Language::english());
        let blocks = vec![
            StatementBlock {
                name: "Main".to_string(),
                statements: vec![
                    Statement::new(KeywordKind::If, vec!["@x".to_string()], ":if @x"),
                    Statement::synthetic(KeywordKind::End),
                    Statement::synthetic(KeywordKind::Stop),
                ],
            },
            StatementBlock {
                name: "A".to_string(),
                statements: vec![Statement::synthetic(KeywordKind::Return)],
            },
        ];

        let assembled = assemble(&blocks, &mut context).unwrap();
        // Main: entry if end stop block_end -> 4 条指令，5 个节点
        assert_eq!(assembled[0].emitted_len(), 4);
        assert_eq!(
            *context.block_info("Main").unwrap(),
            BlockInfo {
                head_offset: 0,
                length: 5
            }
        );
        assert_eq!(assembled[1].head_offset, 4);
        assert_eq!(
            *context.block_info("A").unwrap(),
            BlockInfo {
                head_offset: 4,
                length: 3
            }
        );
        // 每个块的节点数 = 语句数 + 2
        for (block, source) in assembled.iter().zip(&blocks) {
            assert_eq!(block.nodes.len(), source.statements.len() + 2);
        }
    }
}
