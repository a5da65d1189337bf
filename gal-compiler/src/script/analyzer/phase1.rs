//! # 阶段 1：块识别
//!
//! 将规范化后的行分组为命名块，并从剩余的顶层行中分离元指令。
//!
//! ```text
//! :action output(10)    -> 顶层行
//! WhenTrue:             -> 块头
//! :return               -> 块 WhenTrue 的行
//! end WhenTrue          -> 块尾
//! ```
//!
//! 块头只在顶层识别，命名块不可嵌套。

use super::helpers::starts_with_any;
use crate::error::{AnalysisError, AnalysisResult};
use crate::language::{Language, Symbols};
use crate::meta::MetaDirective;
use crate::script::ast::{MAIN_BLOCK, RawBlock};

/// 块识别结果
#[derive(Debug, Default)]
pub struct SplitBlocks {
    /// 命名块，按出现顺序
    pub blocks: Vec<RawBlock>,
    /// 不在任何块内的语句行与元指令行
    pub rest: Vec<String>,
    /// 被丢弃的行（块外既不是块头也不是语句）
    pub dropped: Vec<String>,
}

/// 解析块头 `Name:`，返回块名
fn parse_header<'a>(line: &'a str, symbols: &Symbols) -> Option<&'a str> {
    let name = line.strip_suffix(symbols.keyword)?.trim_end();
    (!name.is_empty() && !name.contains(char::is_whitespace)).then_some(name)
}

/// 解析块尾 `end Name`，返回块名
fn parse_block_end<'a>(line: &'a str, symbols: &Symbols) -> Option<&'a str> {
    let rest = line.strip_prefix(symbols.block_end)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.trim();
    (!name.is_empty()).then_some(name)
}

/// 识别命名块
pub fn split_blocks(lines: &[String], symbols: &Symbols) -> AnalysisResult<SplitBlocks> {
    let mut result = SplitBlocks::default();
    let mut current: Option<RawBlock> = None;
    let keyword_start = symbols.keyword_start();

    for line in lines {
        if let Some(block) = &mut current {
            match parse_block_end(line, symbols) {
                Some(name) if name == block.name => {
                    if let Some(block) = current.take() {
                        result.blocks.push(block);
                    }
                }
                Some(name) => {
                    return Err(AnalysisError::MismatchedBlockEnd {
                        expected: block.name.clone(),
                        found: name.to_string(),
                    });
                }
                None => block.lines.push(line.clone()),
            }
            continue;
        }

        if starts_with_any(line, &keyword_start) {
            result.rest.push(line.clone());
            continue;
        }

        match parse_header(line, symbols) {
            Some(name) => {
                if name == MAIN_BLOCK || result.blocks.iter().any(|b| b.name == name) {
                    return Err(AnalysisError::DuplicateBlock {
                        block: name.to_string(),
                    });
                }
                current = Some(RawBlock::new(name, Vec::new()));
            }
            None => result.dropped.push(line.clone()),
        }
    }

    if let Some(block) = current {
        return Err(AnalysisError::UnterminatedBlock { block: block.name });
    }

    Ok(result)
}

/// 从顶层行中分离元指令
///
/// 返回 `(元指令, 语句行)`，两者都保持原顺序。
pub fn separate_metas(
    lines: Vec<String>,
    language: &Language,
) -> (Vec<MetaDirective>, Vec<String>) {
    let mut metas = Vec::new();
    let mut statements = Vec::new();

    for line in lines {
        match MetaDirective::parse(&line, language) {
            Some(meta) => metas.push(meta),
            None => statements.push(line),
        }
    }

    (metas, statements)
}
