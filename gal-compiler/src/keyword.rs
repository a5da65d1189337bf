//! # Keyword 模块
//!
//! 关键字定义：名称、参数个数约定与生成规则。
//!
//! 各语言表只负责把文本映射到 [`KeywordKind`]，定义本身与语言无关。
//! 生成规则把解析好的参数变成一个 [`AnalysisNode`]，不做索引与链接，
//! 这些留给块装配阶段。

use crate::error::{AnalysisError, AnalysisResult};
use crate::instruction::Instruction;
use crate::script::analyzer::{parse_action, parse_expression};
use crate::script::ast::Statement;
use crate::script::context::AnalysisContext;
use crate::script::node::AnalysisNode;

/// 关键字种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordKind {
    If,
    Else,
    End,
    Action,
    Entry,
    Bind,
    Unbind,
    Return,
    Stop,
    Yield,
    /// 表达式计算，以引用符号开头的行会被改写为此关键字
    Compute,
}

/// 参数个数约定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// 固定个数
    ///
    /// - 0：剩余部分必须为空
    /// - 1：剩余部分整体作为唯一参数
    /// - N：按逗号切分为恰好 N 个参数
    Fixed(usize),
    /// 依次尝试各个候选个数，第一个满足的生效
    Variadic(&'static [usize]),
}

/// 生成规则
pub type GenerateFn = fn(&Statement, &AnalysisContext) -> AnalysisResult<AnalysisNode>;

/// 关键字定义
#[derive(Debug)]
pub struct KeywordDef {
    pub kind: KeywordKind,
    /// 规范名称（与语言无关，用于诊断）
    pub name: &'static str,
    pub arity: Arity,
    pub generate: GenerateFn,
}

static IF: KeywordDef = KeywordDef {
    kind: KeywordKind::If,
    name: "if",
    arity: Arity::Fixed(1),
    generate: gen_if,
};

static ELSE: KeywordDef = KeywordDef {
    kind: KeywordKind::Else,
    name: "else",
    arity: Arity::Fixed(0),
    generate: gen_else,
};

static END: KeywordDef = KeywordDef {
    kind: KeywordKind::End,
    name: "end",
    arity: Arity::Fixed(0),
    generate: gen_end,
};

static ACTION: KeywordDef = KeywordDef {
    kind: KeywordKind::Action,
    name: "action",
    arity: Arity::Fixed(1),
    generate: gen_action,
};

static ENTRY: KeywordDef = KeywordDef {
    kind: KeywordKind::Entry,
    name: "entry",
    arity: Arity::Fixed(1),
    generate: gen_entry,
};

static BIND: KeywordDef = KeywordDef {
    kind: KeywordKind::Bind,
    name: "bind",
    arity: Arity::Fixed(1),
    generate: gen_bind,
};

static UNBIND: KeywordDef = KeywordDef {
    kind: KeywordKind::Unbind,
    name: "unbind",
    arity: Arity::Variadic(&[0, 1]),
    generate: gen_unbind,
};

static RETURN: KeywordDef = KeywordDef {
    kind: KeywordKind::Return,
    name: "return",
    arity: Arity::Fixed(0),
    generate: gen_return,
};

static STOP: KeywordDef = KeywordDef {
    kind: KeywordKind::Stop,
    name: "stop",
    arity: Arity::Fixed(0),
    generate: gen_stop,
};

static YIELD: KeywordDef = KeywordDef {
    kind: KeywordKind::Yield,
    name: "yield",
    arity: Arity::Variadic(&[0, 1]),
    generate: gen_yield,
};

static COMPUTE: KeywordDef = KeywordDef {
    kind: KeywordKind::Compute,
    name: "compute",
    arity: Arity::Fixed(1),
    generate: gen_compute,
};

impl KeywordKind {
    /// 关键字定义
    pub fn def(self) -> &'static KeywordDef {
        match self {
            KeywordKind::If => &IF,
            KeywordKind::Else => &ELSE,
            KeywordKind::End => &END,
            KeywordKind::Action => &ACTION,
            KeywordKind::Entry => &ENTRY,
            KeywordKind::Bind => &BIND,
            KeywordKind::Unbind => &UNBIND,
            KeywordKind::Return => &RETURN,
            KeywordKind::Stop => &STOP,
            KeywordKind::Yield => &YIELD,
            KeywordKind::Compute => &COMPUTE,
        }
    }
}

impl KeywordDef {
    /// 对语句执行生成规则
    pub fn generate(
        &self,
        statement: &Statement,
        context: &AnalysisContext,
    ) -> AnalysisResult<AnalysisNode> {
        (self.generate)(statement, context)
    }
}

/// 取唯一参数
fn sole_arg(statement: &Statement) -> AnalysisResult<&str> {
    statement
        .args
        .first()
        .map(String::as_str)
        .ok_or_else(|| AnalysisError::WrongArgumentCount {
            keyword: statement.keyword.def().name.to_string(),
            expected: 1,
            found: 0,
            line: statement.line.clone(),
        })
}

/// 去掉引用符号前缀
fn strip_reference<'a>(s: &'a str, context: &AnalysisContext) -> &'a str {
    let s = s.trim();
    s.strip_prefix(context.language().symbols.reference)
        .unwrap_or(s)
}

fn gen_if(statement: &Statement, context: &AnalysisContext) -> AnalysisResult<AnalysisNode> {
    let condition = parse_expression(sole_arg(statement)?, &context.language().symbols)?;
    Ok(AnalysisNode::condition(condition))
}

fn gen_else(_: &Statement, _: &AnalysisContext) -> AnalysisResult<AnalysisNode> {
    Ok(AnalysisNode::otherwise())
}

fn gen_end(_: &Statement, _: &AnalysisContext) -> AnalysisResult<AnalysisNode> {
    Ok(AnalysisNode::end())
}

fn gen_return(_: &Statement, _: &AnalysisContext) -> AnalysisResult<AnalysisNode> {
    Ok(AnalysisNode::plain(Instruction::Return))
}

fn gen_stop(_: &Statement, _: &AnalysisContext) -> AnalysisResult<AnalysisNode> {
    Ok(AnalysisNode::plain(Instruction::Stop))
}

fn gen_action(statement: &Statement, context: &AnalysisContext) -> AnalysisResult<AnalysisNode> {
    let action = parse_action(sole_arg(statement)?, &context.language().symbols)?;
    Ok(AnalysisNode::plain(action))
}

fn gen_entry(statement: &Statement, _context: &AnalysisContext) -> AnalysisResult<AnalysisNode> {
    Ok(AnalysisNode::entry(sole_arg(statement)?.trim()))
}

fn gen_bind(statement: &Statement, context: &AnalysisContext) -> AnalysisResult<AnalysisNode> {
    let name = strip_reference(sole_arg(statement)?, context);
    Ok(AnalysisNode::plain(Instruction::Bind {
        bound_name: name.to_string(),
    }))
}

fn gen_unbind(statement: &Statement, context: &AnalysisContext) -> AnalysisResult<AnalysisNode> {
    let bound_name = statement
        .args
        .first()
        .map(|s| strip_reference(s, context).to_string());
    Ok(AnalysisNode::plain(Instruction::Unbind { bound_name }))
}

fn gen_yield(statement: &Statement, context: &AnalysisContext) -> AnalysisResult<AnalysisNode> {
    let expr = match statement.args.first() {
        Some(text) => Some(parse_expression(text, &context.language().symbols)?),
        None => None,
    };
    Ok(AnalysisNode::plain(Instruction::Yield { expr }))
}

fn gen_compute(statement: &Statement, context: &AnalysisContext) -> AnalysisResult<AnalysisNode> {
    let expr = parse_expression(sole_arg(statement)?, &context.language().symbols)?;
    Ok(AnalysisNode::plain(Instruction::Compute { expr }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::script::Expr;
    use crate::script::node::NodeKind;
    use crate::value::Value;

    fn generate(keyword: KeywordKind, args: &[&str]) -> AnalysisResult<AnalysisNode> {
        let context = AnalysisContext::new(Language::english());
        let statement = Statement::new(
            keyword,
            args.iter().map(|s| s.to_string()).collect(),
            "<test>",
        );
        keyword.def().generate(&statement, &context)
    }

    #[test]
    fn test_def_kind_matches() {
        for kind in [
            KeywordKind::If,
            KeywordKind::Else,
            KeywordKind::End,
            KeywordKind::Action,
            KeywordKind::Entry,
            KeywordKind::Bind,
            KeywordKind::Unbind,
            KeywordKind::Return,
            KeywordKind::Stop,
            KeywordKind::Yield,
            KeywordKind::Compute,
        ] {
            assert_eq!(kind.def().kind, kind);
        }
    }

    #[test]
    fn test_gen_action() {
        let node = generate(KeywordKind::Action, &["output(10)"]).unwrap();
        assert_eq!(
            node.kind,
            NodeKind::Plain(Instruction::Action {
                name: "output".to_string(),
                args: vec![Value::Int(10)],
            })
        );
    }

    #[test]
    fn test_gen_if_parses_condition() {
        let node = generate(KeywordKind::If, &["@IsTrue"]).unwrap();
        assert_eq!(
            node.kind,
            NodeKind::If {
                condition: Expr::var("IsTrue"),
                else_node: None,
                end_node: None,
            }
        );
    }

    #[test]
    fn test_gen_bind_strips_reference() {
        let node = generate(KeywordKind::Bind, &["@Plum"]).unwrap();
        assert_eq!(
            node.kind,
            NodeKind::Plain(Instruction::Bind {
                bound_name: "Plum".to_string()
            })
        );

        let node = generate(KeywordKind::Unbind, &[]).unwrap();
        assert_eq!(
            node.kind,
            NodeKind::Plain(Instruction::Unbind { bound_name: None })
        );
    }

    #[test]
    fn test_gen_yield_optional_expression() {
        let node = generate(KeywordKind::Yield, &[]).unwrap();
        assert_eq!(node.kind, NodeKind::Plain(Instruction::Yield { expr: None }));

        let node = generate(KeywordKind::Yield, &["@Score"]).unwrap();
        assert_eq!(
            node.kind,
            NodeKind::Plain(Instruction::Yield {
                expr: Some(Expr::var("Score"))
            })
        );
    }

    #[test]
    fn test_gen_missing_sole_arg() {
        let err = generate(KeywordKind::Entry, &[]).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::WrongArgumentCount {
                expected: 1,
                found: 0,
                ..
            }
        ));
    }
}
