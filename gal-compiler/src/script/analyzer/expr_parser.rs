//! # 表达式解析器
//!
//! 递归下降表达式解析器，支持变量、字面量、算术、比较和逻辑运算。

use crate::error::{AnalysisError, AnalysisResult};
use crate::language::Symbols;
use crate::script::{BinaryOp, Expr};

/// 解析表达式字符串
///
/// 支持的语法:
/// - 字面量: `10`, `1.5`, `"string"`, `'string'`, `true`, `false`
/// - 变量: `@var_name`（引用符号由语言表决定）
/// - 赋值: `@var = expr`（仅顶层）
/// - 算术: `+ - * / %`，一元 `-`
/// - 比较: `== != < <= > >=`
/// - 逻辑: `expr and expr`, `expr or expr`, `not expr`（及 `&& || !`）
/// - 括号: `(expr)`
pub fn parse_expression(input: &str, symbols: &Symbols) -> AnalysisResult<Expr> {
    let input = input.trim();
    let mut parser = ExprParser::new(input, symbols);
    if input.is_empty() {
        return Err(parser.error("空表达式"));
    }

    let expr = parser.parse_assign()?;
    parser.skip_whitespace();
    if !parser.remaining().is_empty() {
        return Err(parser.error(format!(
            "表达式末尾存在无法解析的内容: '{}'",
            parser.remaining()
        )));
    }
    Ok(expr)
}

/// 表达式解析器
struct ExprParser<'a> {
    input: &'a str,
    pos: usize,
    symbols: &'a Symbols,
}

impl<'a> ExprParser<'a> {
    fn new(input: &'a str, symbols: &'a Symbols) -> Self {
        Self {
            input,
            pos: 0,
            symbols,
        }
    }

    fn error(&self, message: impl Into<String>) -> AnalysisError {
        AnalysisError::InvalidExpression {
            text: self.input.to_string(),
            message: message.into(),
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// 尝试消费运算符，`not_before` 中的字符紧随其后时不算匹配
    fn eat_operator(&mut self, op: &str, not_before: &[char]) -> bool {
        let remaining = self.remaining();
        if !remaining.starts_with(op) {
            return false;
        }
        if remaining[op.len()..]
            .chars()
            .next()
            .is_some_and(|c| not_before.contains(&c))
        {
            return false;
        }
        self.pos += op.len();
        self.skip_whitespace();
        true
    }

    fn starts_with_keyword(&self, keyword: &str) -> bool {
        let remaining = self.remaining();
        if !remaining.starts_with(keyword) {
            return false;
        }
        // 确保后面不是标识符字符
        !remaining[keyword.len()..]
            .chars()
            .next()
            .is_some_and(is_identifier_char)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.starts_with_keyword(keyword) {
            self.pos += keyword.len();
            self.skip_whitespace();
            true
        } else {
            false
        }
    }

    /// 解析赋值（仅顶层）
    fn parse_assign(&mut self) -> AnalysisResult<Expr> {
        if self.peek_char() == Some(self.symbols.reference) {
            let start = self.pos;
            self.consume_char();
            let name = self.parse_identifier()?;
            self.skip_whitespace();
            if self.eat_operator("=", &['=']) {
                let value = self.parse_or()?;
                return Ok(Expr::assign(name, value));
            }
            self.pos = start;
        }
        self.parse_or()
    }

    /// 解析 or 表达式（最低优先级）
    fn parse_or(&mut self) -> AnalysisResult<Expr> {
        let mut left = self.parse_and()?;

        loop {
            self.skip_whitespace();
            if self.eat_keyword("or") || self.eat_operator("||", &[]) {
                let right = self.parse_and()?;
                left = Expr::binary(BinaryOp::Or, left, right);
            } else {
                break;
            }
        }

        Ok(left)
    }

    /// 解析 and 表达式
    fn parse_and(&mut self) -> AnalysisResult<Expr> {
        let mut left = self.parse_not()?;

        loop {
            self.skip_whitespace();
            if self.eat_keyword("and") || self.eat_operator("&&", &[]) {
                let right = self.parse_not()?;
                left = Expr::binary(BinaryOp::And, left, right);
            } else {
                break;
            }
        }

        Ok(left)
    }

    /// 解析 not 表达式
    fn parse_not(&mut self) -> AnalysisResult<Expr> {
        self.skip_whitespace();
        if self.eat_keyword("not") || self.eat_operator("!", &['=']) {
            let expr = self.parse_not()?;
            Ok(Expr::not(expr))
        } else {
            self.parse_comparison()
        }
    }

    /// 解析比较表达式（不可连写）
    fn parse_comparison(&mut self) -> AnalysisResult<Expr> {
        let left = self.parse_additive()?;

        self.skip_whitespace();

        let op = if self.eat_operator("==", &[]) {
            BinaryOp::Eq
        } else if self.eat_operator("!=", &[]) {
            BinaryOp::NotEq
        } else if self.eat_operator("<=", &[]) {
            BinaryOp::LtEq
        } else if self.eat_operator(">=", &[]) {
            BinaryOp::GtEq
        } else if self.eat_operator("<", &[]) {
            BinaryOp::Lt
        } else if self.eat_operator(">", &[]) {
            BinaryOp::Gt
        } else {
            return Ok(left);
        };

        let right = self.parse_additive()?;
        Ok(Expr::binary(op, left, right))
    }

    /// 解析加减
    fn parse_additive(&mut self) -> AnalysisResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            self.skip_whitespace();
            let op = if self.eat_operator("+", &[]) {
                BinaryOp::Add
            } else if self.eat_operator("-", &[]) {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    /// 解析乘除取余
    fn parse_multiplicative(&mut self) -> AnalysisResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            self.skip_whitespace();
            let op = if self.eat_operator("*", &[]) {
                BinaryOp::Mul
            } else if self.eat_operator("/", &[]) {
                BinaryOp::Div
            } else if self.eat_operator("%", &[]) {
                BinaryOp::Rem
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    /// 解析一元负号
    fn parse_unary(&mut self) -> AnalysisResult<Expr> {
        self.skip_whitespace();
        if self.eat_operator("-", &[]) {
            let expr = self.parse_unary()?;
            Ok(Expr::neg(expr))
        } else {
            self.parse_primary()
        }
    }

    /// 解析基本表达式
    fn parse_primary(&mut self) -> AnalysisResult<Expr> {
        self.skip_whitespace();

        let c = self
            .peek_char()
            .ok_or_else(|| self.error("表达式意外结束"))?;

        // 括号
        if c == '(' || c == self.symbols.left_bracket {
            let close = if c == '(' {
                ')'
            } else {
                self.symbols.right_bracket
            };
            self.consume_char();
            let expr = self.parse_or()?;
            self.skip_whitespace();
            if self.consume_char() != Some(close) {
                return Err(self.error(format!("缺少右括号 '{close}'")));
            }
            return Ok(expr);
        }

        // 变量
        if c == self.symbols.reference {
            self.consume_char();
            let name = self.parse_identifier()?;
            return Ok(Expr::var(name));
        }

        // 字符串字面量
        if c == '"' || c == '\'' {
            let s = self.parse_string_literal(c)?;
            return Ok(Expr::string(s));
        }
        if c == self.symbols.left_quote {
            let s = self.parse_string_literal(self.symbols.right_quote)?;
            return Ok(Expr::string(s));
        }

        // 布尔字面量或数字
        if self.eat_keyword("true") {
            Ok(Expr::bool(true))
        } else if self.eat_keyword("false") {
            Ok(Expr::bool(false))
        } else if c.is_ascii_digit() {
            self.parse_number()
        } else {
            Err(self.error(format!("无法解析表达式，意外字符: '{c}'")))
        }
    }

    /// 解析标识符
    fn parse_identifier(&mut self) -> AnalysisResult<String> {
        let start = self.pos;

        while let Some(c) = self.peek_char() {
            if is_identifier_char(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(self.error("期望标识符"));
        }

        Ok(self.input[start..self.pos].to_string())
    }

    /// 解析字符串字面量，当前位置为开始引号
    fn parse_string_literal(&mut self, close: char) -> AnalysisResult<String> {
        self.consume_char();
        let start = self.pos;

        while let Some(c) = self.peek_char() {
            if c == close {
                let s = self.input[start..self.pos].to_string();
                self.consume_char();
                return Ok(s);
            }
            self.pos += c.len_utf8();
        }

        Err(self.error(format!("字符串字面量未闭合，缺少 '{close}'")))
    }

    /// 解析数字，带小数点的为浮点数
    fn parse_number(&mut self) -> AnalysisResult<Expr> {
        let start = self.pos;
        let mut is_float = false;

        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else if c == '.' && !is_float {
                is_float = true;
                self.pos += 1;
            } else {
                break;
            }
        }

        let num_str = &self.input[start..self.pos];
        let invalid = || self.error(format!("无法解析数字: '{num_str}'"));
        if is_float {
            num_str.parse::<f64>().map(Expr::float).map_err(|_| invalid())
        } else {
            num_str.parse::<i64>().map(Expr::int).map_err(|_| invalid())
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> AnalysisResult<Expr> {
        parse_expression(input, &Symbols::ENGLISH)
    }

    #[test]
    fn test_variable_and_literals() {
        assert_eq!(parse("@IsTrue").unwrap(), Expr::var("IsTrue"));
        assert_eq!(parse("10").unwrap(), Expr::int(10));
        assert_eq!(parse("1.5").unwrap(), Expr::float(1.5));
        assert_eq!(parse("'hi'").unwrap(), Expr::string("hi"));
        assert_eq!(parse("true").unwrap(), Expr::bool(true));
    }

    #[test]
    fn test_assignment() {
        let expr = parse("@TestVar = 9 + 10").unwrap();
        assert_eq!(expr.to_string(), "@TestVar = (9 + 10)");

        // `==` 不是赋值
        let expr = parse("@a == 1").unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinaryOp::Eq, Expr::var("a"), Expr::int(1))
        );
    }

    #[test]
    fn test_precedence() {
        let expr = parse("1 + 2 * 3 > 6 and not @done || @force").unwrap();
        assert_eq!(
            expr.to_string(),
            "((((1 + (2 * 3)) > 6) and not @done) or @force)"
        );
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(parse("-@x").unwrap(), Expr::neg(Expr::var("x")));
        assert_eq!(
            parse("@a - -1").unwrap(),
            Expr::binary(BinaryOp::Sub, Expr::var("a"), Expr::neg(Expr::int(1)))
        );
    }

    #[test]
    fn test_chinese_symbols() {
        let expr = parse_expression("@是真的 == “是”", &Symbols::CHINESE).unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinaryOp::Eq, Expr::var("是真的"), Expr::string("是"))
        );
    }

    #[test]
    fn test_errors() {
        for input in ["", "(@a", "\"open", "@a @b", "@"] {
            assert!(
                matches!(parse(input), Err(AnalysisError::InvalidExpression { .. })),
                "{input}"
            );
        }
    }
}
