//! # 辅助解析函数
//!
//! 手写的字符串处理函数：行规范化、参数切分、行为调用解析。

use crate::error::{AnalysisError, AnalysisResult};
use crate::instruction::Instruction;
use crate::language::Symbols;
use crate::value::Value;

/// 把源码切分为规范化的行
///
/// - 制表符视为空格，去掉行首空白
/// - 从注释符号开始截断
/// - 丢弃截断后为空的行
pub fn normalize_lines(text: &str, comment: char) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let line = line.replace('\t', " ");
            let line = line.trim_start();
            let line = match line.find(comment) {
                Some(pos) => &line[..pos],
                None => line,
            };
            let line = line.trim_end();
            (!line.is_empty()).then(|| line.to_string())
        })
        .collect()
}

/// 检查字符串是否以任一字符开头
pub fn starts_with_any(s: &str, heads: &[char]) -> bool {
    s.chars().next().is_some_and(|c| heads.contains(&c))
}

/// 按逗号切分参数
///
/// 引号与括号内的内容视为整体，其中的逗号不切分。
/// 引号与括号本身保留在参数中，参数两端空白去掉。
///
/// ```text
/// a, (b, c), "d, e"  -> ["a", "(b, c)", "\"d, e\""]
/// ```
pub fn split_args(s: &str, symbols: &Symbols) -> AnalysisResult<Vec<String>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }

    let unbalanced = || AnalysisError::UnbalancedBracket {
        text: s.to_string(),
    };

    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quote = false;

    for ch in s.chars() {
        if in_quote {
            current.push(ch);
            if ch == symbols.right_quote {
                in_quote = false;
            }
        } else if ch == symbols.left_quote {
            in_quote = true;
            current.push(ch);
        } else if ch == symbols.left_bracket {
            depth += 1;
            current.push(ch);
        } else if ch == symbols.right_bracket {
            depth = depth.checked_sub(1).ok_or_else(unbalanced)?;
            current.push(ch);
        } else if ch == symbols.comma && depth == 0 {
            args.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }

    if in_quote {
        return Err(AnalysisError::UnterminatedQuote {
            text: s.to_string(),
        });
    }
    if depth > 0 {
        return Err(unbalanced());
    }

    args.push(current.trim().to_string());
    Ok(args)
}

/// 解析行为调用
///
/// ```text
/// output              -> Action { name: "output", args: [] }
/// output()            -> Action { name: "output", args: [] }
/// output(10, "a, b")  -> Action { name: "output", args: [Int(10), String("a, b")] }
/// ```
///
/// 未加引号的参数依次尝试整数、严格布尔，否则保留为文本；
/// 加引号的参数总是文本。
pub fn parse_action(text: &str, symbols: &Symbols) -> AnalysisResult<Instruction> {
    let text = text.trim();
    let unbalanced = || AnalysisError::UnbalancedBracket {
        text: text.to_string(),
    };

    let left = text.find(symbols.left_bracket);
    let right = text.rfind(symbols.right_bracket);

    match (left, right) {
        (None, None) => Ok(Instruction::Action {
            name: text.to_string(),
            args: Vec::new(),
        }),
        (Some(l), Some(r)) if l < r => {
            // 右括号之后不允许再有内容
            if !text[r + symbols.right_bracket.len_utf8()..].trim().is_empty() {
                return Err(unbalanced());
            }
            let name = text[..l].trim().to_string();
            let inner = text[l + symbols.left_bracket.len_utf8()..r].trim();
            let args = if inner.is_empty() {
                Vec::new()
            } else {
                split_call_args(inner, symbols)?
            };
            Ok(Instruction::Action { name, args })
        }
        _ => Err(unbalanced()),
    }
}

/// 切分行为调用的参数，去掉引号并转换类型
fn split_call_args(s: &str, symbols: &Symbols) -> AnalysisResult<Vec<Value>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut quoted = false;

    let finish = |current: &mut String, quoted: &mut bool| {
        let value = if *quoted {
            Value::String(std::mem::take(current))
        } else {
            let v = Value::coerce(current.trim());
            current.clear();
            v
        };
        *quoted = false;
        value
    };

    // 引号内容必须独占一个参数
    let stray = || AnalysisError::UnbalancedBracket {
        text: s.to_string(),
    };

    for ch in s.chars() {
        if in_quote {
            if ch == symbols.right_quote {
                in_quote = false;
            } else {
                current.push(ch);
            }
        } else if ch == symbols.comma {
            args.push(finish(&mut current, &mut quoted));
        } else if ch.is_whitespace() {
            if !quoted {
                current.push(ch);
            }
        } else if quoted {
            return Err(stray());
        } else if ch == symbols.left_quote {
            if !current.trim().is_empty() {
                return Err(stray());
            }
            current.clear();
            in_quote = true;
            quoted = true;
        } else {
            current.push(ch);
        }
    }

    if in_quote {
        return Err(AnalysisError::UnterminatedQuote {
            text: s.to_string(),
        });
    }

    // 末尾的空参数（如 `f(1,)`）忽略
    if quoted || !current.trim().is_empty() {
        args.push(finish(&mut current, &mut quoted));
    }

    Ok(args)
}
