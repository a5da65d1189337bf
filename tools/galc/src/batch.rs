//! # Batch 模块
//!
//! 单文件与文件夹编译。
//!
//! 文件夹模式把源目录下的相对路径原样映射到输出目录：
//!
//! ```text
//! scripts/a.gal         -> out/a.node
//! scripts/ch1/b.gal     -> out/ch1/b.node
//! ```
//!
//! 每个文件的编译互不共享状态，可以分到多个线程上并行执行。

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Context;
use gal_compiler::{Analyzer, Language, NodeTree};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// 一个编译任务：源文件 → 输出文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileJob {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// 编译结果
#[derive(Debug)]
pub struct CompileOutcome {
    pub tree: NodeTree,
    pub warnings: Vec<String>,
}

/// 批量编译汇总
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl BatchReport {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 单文件模式下的默认输出路径：替换扩展名
pub fn default_target(source: &Path, target_extension: &str) -> PathBuf {
    source.with_extension(target_extension)
}

/// 收集目录下指定扩展名的源文件（按路径排序，扩展名不区分大小写）
pub fn collect_sources(
    dir: &Path,
    extension: &str,
    recursive: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut sources = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("遍历目录失败: {}", dir.display()))?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        {
            sources.push(entry.into_path());
        }
    }
    Ok(sources)
}

/// 文件夹模式：为源目录下的每个源文件生成编译任务
pub fn folder_jobs(
    source_dir: &Path,
    target_dir: &Path,
    source_extension: &str,
    target_extension: &str,
    recursive: bool,
) -> anyhow::Result<Vec<CompileJob>> {
    collect_sources(source_dir, source_extension, recursive)?
        .into_iter()
        .map(|source| {
            let relative = source
                .strip_prefix(source_dir)
                .with_context(|| format!("无法计算相对路径: {}", source.display()))?;
            let target = target_dir.join(relative).with_extension(target_extension);
            Ok(CompileJob { source, target })
        })
        .collect()
}

/// 分析单个文件，不写出结果
pub fn analyze_file(
    source: &Path,
    language: &'static Language,
) -> anyhow::Result<CompileOutcome> {
    let text = fs::read_to_string(source)
        .with_context(|| format!("读取源文件失败: {}", source.display()))?;

    let mut analyzer = Analyzer::new(language);
    let tree = analyzer
        .analyze(&text)
        .with_context(|| format!("编译失败: {}", source.display()))?;

    Ok(CompileOutcome {
        tree,
        warnings: analyzer.warnings().to_vec(),
    })
}

/// 编译单个文件并写出 JSON
pub fn compile_file(
    job: &CompileJob,
    language: &'static Language,
) -> anyhow::Result<CompileOutcome> {
    let outcome = analyze_file(&job.source, language)?;

    if let Some(parent) = job.target.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("创建输出目录失败: {}", parent.display()))?;
    }

    let json = outcome.tree.to_json().context("序列化指令序列失败")?;
    fs::write(&job.target, json)
        .with_context(|| format!("写入输出文件失败: {}", job.target.display()))?;

    debug!(
        source = %job.source.display(),
        target = %job.target.display(),
        instructions = outcome.tree.len(),
        "编译完成"
    );
    Ok(outcome)
}

/// 在至多 `workers` 个线程上执行全部任务
///
/// 单个文件失败不影响其余文件。
pub fn run_jobs(
    jobs: &[CompileJob],
    language: &'static Language,
    workers: usize,
) -> anyhow::Result<BatchReport> {
    let workers = workers.clamp(1, jobs.len().max(1));
    let counter = AtomicUsize::new(0);
    let next = &counter;
    info!(files = jobs.len(), workers, "开始批量编译");

    let mut results = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(job) = jobs.get(index) else {
                            break;
                        };
                        done.push((index, compile_file(job, language)));
                    }
                    done
                })
            })
            .collect();

        let mut results = Vec::with_capacity(jobs.len());
        for handle in handles {
            match handle.join() {
                Ok(done) => results.extend(done),
                Err(_) => anyhow::bail!("编译线程异常退出"),
            }
        }
        Ok(results)
    })?;

    // 按任务顺序汇总，输出稳定
    results.sort_by_key(|(index, _)| *index);

    let mut report = BatchReport::default();
    for (index, result) in results {
        let source = jobs[index].source.clone();
        match result {
            Ok(outcome) => {
                for warning in &outcome.warnings {
                    warn!(source = %source.display(), "{warning}");
                }
                report.succeeded.push(source);
            }
            Err(e) => report.failed.push((source, e)),
        }
    }
    Ok(report)
}
