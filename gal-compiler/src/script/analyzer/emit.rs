//! # 指令生成
//!
//! 按装配顺序遍历全部块，跳过伪节点，把其余节点降为指令拼成一条序列。
//! 跳转目标最多指向序列末尾之后一位（跳过最后一个块）。

use super::assemble::AssembledBlock;
use crate::error::{AnalysisError, AnalysisResult};
use crate::instruction::Instruction;
use crate::script::context::AnalysisContext;

/// 生成最终指令序列
pub fn emit(
    blocks: &[AssembledBlock],
    context: &AnalysisContext,
) -> AnalysisResult<Vec<Instruction>> {
    let total: usize = blocks.iter().map(AssembledBlock::emitted_len).sum();
    let mut instructions = Vec::with_capacity(total);

    for block in blocks {
        for node in block.nodes.iter().filter(|node| !node.is_fake()) {
            let instruction = node.lower(&block.nodes, block.head_offset, &block.name, context)?;
            if let Some(destination) = instruction
                .destinations()
                .into_iter()
                .find(|&destination| destination > total)
            {
                return Err(AnalysisError::DestinationOutOfRange {
                    block: block.name.clone(),
                    index: node.index,
                    destination,
                    total,
                });
            }
            instructions.push(instruction);
        }
    }

    Ok(instructions)
}
