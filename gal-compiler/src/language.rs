//! # Language 模块
//!
//! 语言变体：一整套关键字词表加语法符号。
//!
//! 替换语言表即可替换整套表层语法，分析流程本身不变。
//! 默认提供两套：英文（`default`）与中文（`zh`）。
//!
//! ```text
//! 英文                         中文
//! :action output(10)           ：行为 输出（10）
//! :if @IsTrue                  ：如果 @是真的
//! WhenTrue:                    正确时：
//! end WhenTrue                 结束 正确时
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::keyword::{KeywordDef, KeywordKind};
use crate::meta::MetaKind;

/// 语法符号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbols {
    /// 关键字起始符号，同时也是块头符号（`Name:`）
    pub keyword: char,
    /// 元指令起始符号
    pub meta: char,
    /// 变量引用符号
    pub reference: char,
    /// 注释符号
    pub comment: char,
    /// 赋值符号（含赋值符号的行不是元指令）
    pub assign: char,
    /// 块结束关键字（`end Name`）
    pub block_end: &'static str,
    /// 参数分隔符
    pub comma: char,
    pub left_bracket: char,
    pub right_bracket: char,
    pub left_quote: char,
    pub right_quote: char,
}

impl Symbols {
    /// 英文符号
    pub const ENGLISH: Symbols = Symbols {
        keyword: ':',
        meta: '@',
        reference: '@',
        comment: '#',
        assign: '=',
        block_end: "end",
        comma: ',',
        left_bracket: '(',
        right_bracket: ')',
        left_quote: '"',
        right_quote: '"',
    };

    /// 中文符号（全角）
    pub const CHINESE: Symbols = Symbols {
        keyword: '：',
        meta: '@',
        reference: '@',
        comment: '#',
        assign: '=',
        block_end: "结束",
        comma: '，',
        left_bracket: '（',
        right_bracket: '）',
        left_quote: '“',
        right_quote: '”',
    };

    /// 不在任何块内时，以这些符号开头的行一定是语句或元指令
    pub fn keyword_start(&self) -> [char; 2] {
        [self.keyword, self.meta]
    }
}

/// 语言变体
#[derive(Debug)]
pub struct Language {
    name: &'static str,
    /// 语法符号
    pub symbols: Symbols,
    keywords: HashMap<&'static str, KeywordKind>,
    metas: HashMap<&'static str, MetaKind>,
}

static ENGLISH: LazyLock<Language> = LazyLock::new(|| {
    Language::new(
        "Default",
        Symbols::ENGLISH,
        &[
            ("if", KeywordKind::If),
            ("else", KeywordKind::Else),
            ("end", KeywordKind::End),
            ("action", KeywordKind::Action),
            ("entry", KeywordKind::Entry),
            ("bind", KeywordKind::Bind),
            ("unbind", KeywordKind::Unbind),
            ("return", KeywordKind::Return),
            ("stop", KeywordKind::Stop),
            ("yield", KeywordKind::Yield),
            ("calcu", KeywordKind::Compute),
        ],
        &[("file", MetaKind::File), ("input", MetaKind::Input)],
    )
});

static CHINESE: LazyLock<Language> = LazyLock::new(|| {
    Language::new(
        "Chinese",
        Symbols::CHINESE,
        &[
            ("如果", KeywordKind::If),
            ("否则", KeywordKind::Else),
            ("结束", KeywordKind::End),
            ("行为", KeywordKind::Action),
            ("进入", KeywordKind::Entry),
            ("绑定", KeywordKind::Bind),
            ("解绑", KeywordKind::Unbind),
            ("返回", KeywordKind::Return),
            ("终止", KeywordKind::Stop),
            ("让步", KeywordKind::Yield),
            ("计算", KeywordKind::Compute),
        ],
        &[("文件", MetaKind::File), ("输入", MetaKind::Input)],
    )
});

impl Language {
    /// 创建语言变体
    pub fn new(
        name: &'static str,
        symbols: Symbols,
        keywords: &[(&'static str, KeywordKind)],
        metas: &[(&'static str, MetaKind)],
    ) -> Self {
        Self {
            name,
            symbols,
            keywords: keywords.iter().copied().collect(),
            metas: metas.iter().copied().collect(),
        }
    }

    /// 英文语言表
    pub fn english() -> &'static Language {
        &ENGLISH
    }

    /// 中文语言表
    pub fn chinese() -> &'static Language {
        &CHINESE
    }

    /// 按名称选择内置语言表，未知名称返回 `None`
    pub fn by_name(name: &str) -> Option<&'static Language> {
        match name.to_ascii_lowercase().as_str() {
            "default" | "en" | "english" => Some(Self::english()),
            "zh" | "cn" | "chinese" => Some(Self::chinese()),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 查找关键字定义
    pub fn keyword(&self, token: &str) -> Option<&'static KeywordDef> {
        self.keywords.get(token).map(|kind| kind.def())
    }

    /// 关键字在本语言中的写法
    pub fn token_of(&self, kind: KeywordKind) -> Option<&'static str> {
        self.keywords
            .iter()
            .find(|(_, k)| **k == kind)
            .map(|(token, _)| *token)
    }

    /// 查找元指令
    pub fn meta(&self, name: &str) -> Option<MetaKind> {
        self.metas.get(name).copied()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(Language::by_name("default").unwrap().name(), "Default");
        assert_eq!(Language::by_name("ZH").unwrap().name(), "Chinese");
        assert!(Language::by_name("klingon").is_none());
    }

    #[test]
    fn test_tables_cover_same_keywords() {
        let kinds = [
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
        ];
        for lang in [Language::english(), Language::chinese()] {
            for kind in kinds {
                let token = lang.token_of(kind).unwrap();
                assert_eq!(lang.keyword(token).unwrap().kind, kind, "{lang}: {token}");
            }
        }
    }

    #[test]
    fn test_lookup() {
        let zh = Language::chinese();
        assert_eq!(zh.keyword("行为").unwrap().kind, KeywordKind::Action);
        assert!(zh.keyword("action").is_none());
        assert_eq!(zh.meta("文件"), Some(MetaKind::File));
        assert_eq!(zh.symbols.keyword_start(), ['：', '@']);
    }
}
