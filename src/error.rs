use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// XML 解析 / 写入错误
    #[error("XML错误: {0}")]
    Xml(#[from] XmlError),
    /// DoR 生成错误
    #[error("DoR错误: {0}")]
    Dor(#[from] DorError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// XML 相关错误
#[derive(Debug, Error)]
pub enum XmlError {
    /// 解析失败（包括被拒绝的 DTD）
    #[error("XML解析失败: {source}")]
    ParseFailed {
        #[source]
        source: roxmltree::Error,
    },
    /// 写入合并文档失败
    #[error("XML写入失败: {source}")]
    WriteFailed {
        #[source]
        source: BoxError,
    },
    /// 写出的内容不是合法 UTF-8
    #[error("XML输出不是合法的UTF-8")]
    InvalidUtf8,
}

/// DoR 生成相关错误
#[derive(Debug, Error)]
pub enum DorError {
    /// 模型导出失败
    #[error("表单模型导出失败 ({form_path}): {source}")]
    ModelExportFailed {
        form_path: String,
        #[source]
        source: BoxError,
    },
    /// 数据合并失败
    #[error("DoR数据合并失败: {source}")]
    MergeFailed {
        #[source]
        source: BoxError,
    },
    /// 渲染失败
    #[error("PDF渲染失败 ({template}): {source}")]
    RenderFailed {
        template: String,
        #[source]
        source: BoxError,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: BoxError,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: BoxError,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少必需的配置项
    #[error("缺少配置项: {name}")]
    Missing { name: String },
}

// ========== 从常见错误类型转换 ==========

impl From<roxmltree::Error> for AppError {
    fn from(err: roxmltree::Error) -> Self {
        AppError::Xml(XmlError::ParseFailed { source: err })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建 XML 写入错误
    pub fn xml_write_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Xml(XmlError::WriteFailed {
            source: Box::new(source),
        })
    }

    /// 创建模型导出错误
    pub fn model_export_failed(form_path: impl Into<String>, source: anyhow::Error) -> Self {
        AppError::Dor(DorError::ModelExportFailed {
            form_path: form_path.into(),
            source: source.into(),
        })
    }

    /// 创建数据合并错误
    pub fn merge_failed(source: anyhow::Error) -> Self {
        AppError::Dor(DorError::MergeFailed {
            source: source.into(),
        })
    }

    /// 创建渲染错误
    pub fn render_failed(template: impl Into<String>, source: anyhow::Error) -> Self {
        AppError::Dor(DorError::RenderFailed {
            template: template.into(),
            source: source.into(),
        })
    }

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

    /// 创建 TOML 解析错误
    pub fn toml_parse_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
