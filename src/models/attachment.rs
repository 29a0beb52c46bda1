/// DoR 附件的文件名前缀
pub const DOR_PDF_PREFIX: &str = "dor_";
/// PDF 的 MIME 类型
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// 渲染生成的附件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAttachment {
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl RenderedAttachment {
    /// 按语言命名的 DoR PDF，例如 `dor_fr.pdf`
    pub fn dor_pdf(language: &str, content: Vec<u8>) -> Self {
        Self {
            file_name: format!("{}{}.pdf", DOR_PDF_PREFIX, language),
            content_type: PDF_CONTENT_TYPE.to_string(),
            content,
        }
    }
}
