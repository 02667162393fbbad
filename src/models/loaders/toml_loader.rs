use crate::error::{AppError, AppResult, FileError};
use crate::models::exam::ExamPaper;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载一份试卷
pub async fn load_exam_paper(toml_file_path: &Path) -> AppResult<ExamPaper> {
    let path_str = toml_file_path.display().to_string();

    if !toml_file_path.exists() {
        return Err(FileError::NotFound { path: path_str }.into());
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    let mut paper: ExamPaper = toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
        path: path_str.clone(),
        source: Box::new(e),
    })?;

    let clamped = paper.clamp_confidence_levels();
    if clamped > 0 {
        tracing::warn!(
            "⚠️ {} 中有 {} 条作答的自评信心超出 1-5，已截断",
            path_str,
            clamped
        );
    }

    // 设置文件路径
    paper.file_path = Some(path_str);

    Ok(paper)
}

/// 加载文件夹中所有 TOML 试卷，按文件名排序
///
/// 单个文件解析失败只记录警告，不影响其他文件
pub async fn load_all_exam_papers(folder_path: &str) -> AppResult<Vec<ExamPaper>> {
    let folder = PathBuf::from(folder_path);

    if !folder.is_dir() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    let mut toml_files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut papers = Vec::with_capacity(toml_files.len());
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_exam_paper(&path).await {
            Ok(paper) => {
                tracing::info!(
                    "成功加载 {} 道题目, {} 条作答",
                    paper.questions.len(),
                    paper.answers.len()
                );
                papers.push(paper);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(papers)
}
