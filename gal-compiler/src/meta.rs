//! # Meta 模块
//!
//! 元指令：声明输出容器的元数据而不是可执行行为。
//!
//! ```text
//! @file Foo      -> NodeTree.file = "Foo"
//! @input Plum    -> NodeTree.inputs += "Plum"
//! ```
//!
//! 元指令在分析开始时从主块中分离出来，生成结束后按声明顺序应用。

use crate::error::{AnalysisError, AnalysisResult};
use crate::instruction::NodeTree;
use crate::language::Language;

/// 元指令种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKind {
    /// 设置文件名
    File,
    /// 声明输入
    Input,
}

/// 元指令：名称（不含元指令符号）+ 参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaDirective {
    pub name: String,
    pub args: Vec<String>,
}

impl MetaDirective {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// 从一行源码解析元指令
    ///
    /// 以元指令符号开头且不含赋值符号的行才是元指令，否则返回 `None`。
    pub fn parse(line: &str, language: &Language) -> Option<Self> {
        let symbols = &language.symbols;
        let rest = line.strip_prefix(symbols.meta)?;
        if line.contains(symbols.assign) {
            return None;
        }

        let mut tokens = rest.split_whitespace();
        let name = tokens.next().unwrap_or_default();
        Some(Self::new(name, tokens.map(str::to_string).collect()))
    }

    /// 应用到输出容器
    pub fn apply(&self, tree: &mut NodeTree, language: &Language) -> AnalysisResult<()> {
        let kind = language
            .meta(&self.name)
            .ok_or_else(|| AnalysisError::NoSuchMeta {
                name: self.name.clone(),
            })?;

        if self.args.is_empty() {
            return Err(AnalysisError::MissingMetaArgument {
                name: self.name.clone(),
            });
        }

        match kind {
            MetaKind::File => tree.file = self.args[0].clone(),
            MetaKind::Input => tree.inputs.extend(self.args.iter().cloned()),
        }
        Ok(())
    }
}

/// 按声明顺序应用全部元指令
pub fn apply_metas(
    tree: &mut NodeTree,
    metas: &[MetaDirective],
    language: &Language,
) -> AnalysisResult<()> {
    metas.iter().try_for_each(|meta| meta.apply(tree, language))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let en = Language::english();
        assert_eq!(
            MetaDirective::parse("@input Plum Mei", en),
            Some(MetaDirective::new(
                "input",
                vec!["Plum".to_string(), "Mei".to_string()]
            ))
        );
        // 含赋值符号的是表达式
        assert_eq!(MetaDirective::parse("@x = 1", en), None);
        assert_eq!(MetaDirective::parse(":stop", en), None);
    }

    #[test]
    fn test_apply_file_and_input() {
        let en = Language::english();
        let mut tree = NodeTree::default();
        let metas = [
            MetaDirective::parse("@file Foo", en).unwrap(),
            MetaDirective::parse("@input Plum", en).unwrap(),
            MetaDirective::parse("@input Plum", en).unwrap(),
            MetaDirective::parse("@file Bar", en).unwrap(),
        ];
        apply_metas(&mut tree, &metas, en).unwrap();
        assert_eq!(tree.file, "Bar");
        assert_eq!(tree.inputs.len(), 1);
        assert!(tree.inputs.contains("Plum"));
    }

    #[test]
    fn test_apply_chinese() {
        let zh = Language::chinese();
        let mut tree = NodeTree::default();
        MetaDirective::parse("@文件 测试", zh)
            .unwrap()
            .apply(&mut tree, zh)
            .unwrap();
        assert_eq!(tree.file, "测试");
    }

    #[test]
    fn test_apply_errors() {
        let en = Language::english();
        let mut tree = NodeTree::default();

        let err = MetaDirective::new("author", vec!["Me".to_string()])
            .apply(&mut tree, en)
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::NoSuchMeta {
                name: "author".to_string()
            }
        );

        let err = MetaDirective::new("file", Vec::new())
            .apply(&mut tree, en)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingMetaArgument { .. }));
    }
}
