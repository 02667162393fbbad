use std::time::Duration;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 大模型调用错误
    #[error("大模型错误: {0}")]
    Oracle(#[from] OracleError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 考试会话错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 大模型（评分 oracle）错误
///
/// 这些错误只在梯队循环内部流转，不会暴露给判分调用方
#[derive(Debug, Error)]
pub enum OracleError {
    /// API 调用失败
    #[error("API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 单次调用超时
    #[error("调用超时 (模型: {model}, {timeout:?})")]
    Timeout { model: String, timeout: Duration },
    /// 返回内容为空
    #[error("返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 返回内容无法解析出结构化数据
    #[error("无法解析返回内容 (模型: {model}): {preview}")]
    Unparsable { model: String, preview: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 考试会话错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 所有题目都已作答
    #[error("没有更多题目可以作答 (共 {total} 题)")]
    NoMoreQuestions { total: usize },
    /// 提交的题目 ID 与当前题目不一致
    #[error("题目不匹配: 当前题目 {expected}, 提交的是 {actual}")]
    QuestionMismatch { expected: String, actual: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置项取值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    InvalidValue { field: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

impl OracleError {
    /// 创建 API 调用失败错误
    pub fn api_call_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        OracleError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
