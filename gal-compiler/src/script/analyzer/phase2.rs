//! # 阶段 2：语句解析
//!
//! 把每一行解析为一条 [`Statement`]：识别关键字，按参数个数约定切分参数。
//! 一行对应一条语句，不增不减。

use super::helpers::split_args;
use crate::error::{AnalysisError, AnalysisResult};
use crate::keyword::{Arity, KeywordDef, KeywordKind};
use crate::language::Language;
use crate::script::ast::Statement;

/// 解析单行
///
/// 以引用符号开头的行改写为计算语句，整行作为唯一参数。
pub fn parse_statement(line: &str, language: &Language) -> AnalysisResult<Statement> {
    let symbols = &language.symbols;

    if line.starts_with(symbols.reference) {
        return Ok(Statement::new(
            KeywordKind::Compute,
            vec![line.to_string()],
            line,
        ));
    }

    let unrecognized = || AnalysisError::UnrecognizedKeyword {
        line: line.to_string(),
    };

    let body = line.strip_prefix(symbols.keyword).ok_or_else(unrecognized)?;
    let (token, remainder) = match body.find(char::is_whitespace) {
        Some(pos) => (&body[..pos], &body[pos..]),
        None => (body, ""),
    };
    if token.is_empty() {
        return Err(unrecognized());
    }

    let def = language
        .keyword(token)
        .ok_or_else(|| AnalysisError::KeywordNotFound {
            keyword: token.to_string(),
            line: line.to_string(),
        })?;

    let args = match_arity(def, remainder.trim(), line, language)?;
    Ok(Statement::new(def.kind, args, line))
}

/// 按关键字的参数个数约定切分剩余部分
fn match_arity(
    def: &KeywordDef,
    remainder: &str,
    line: &str,
    language: &Language,
) -> AnalysisResult<Vec<String>> {
    match def.arity {
        Arity::Fixed(expected) => try_arity(expected, remainder, language)?.ok_or_else(|| {
            AnalysisError::WrongArgumentCount {
                // 报告源码中的写法
                keyword: language.token_of(def.kind).unwrap_or(def.name).to_string(),
                expected,
                found: count_args(remainder, language),
                line: line.to_string(),
            }
        }),
        // 候选个数切分失败只表示不匹配，继续尝试下一个
        Arity::Variadic(options) => Ok(options
            .iter()
            .find_map(|&option| try_arity(option, remainder, language).ok().flatten())
            .unwrap_or_default()),
    }
}

/// 检查剩余部分是否恰好满足 `n` 个参数
fn try_arity(
    n: usize,
    remainder: &str,
    language: &Language,
) -> AnalysisResult<Option<Vec<String>>> {
    Ok(match n {
        0 => remainder.is_empty().then(Vec::new),
        1 => (!remainder.is_empty()).then(|| vec![remainder.to_string()]),
        _ => {
            let args = split_args(remainder, &language.symbols)?;
            (args.len() == n).then_some(args)
        }
    })
}

fn count_args(remainder: &str, language: &Language) -> usize {
    split_args(remainder, &language.symbols).map_or(1, |args| args.len())
}

/// 解析一个块的全部行
pub fn parse_lines(lines: &[String], language: &Language) -> AnalysisResult<Vec<Statement>> {
    lines
        .iter()
        .map(|line| parse_statement(line, language))
        .collect()
}
