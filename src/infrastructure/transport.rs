//! HTTP 提交通道

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;

/// multipart 中的一个字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub content: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: String,
}

/// multipart/form-data 请求体
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str, content_type: &str) -> Self {
        self.parts.push(FormPart {
            name: name.to_string(),
            content: value.as_bytes().to_vec(),
            file_name: None,
            content_type: content_type.to_string(),
        });
        self
    }

    pub fn file(
        mut self,
        name: &str,
        file_name: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.to_string(),
            content,
            file_name: Some(file_name.to_string()),
            content_type: content_type.to_string(),
        });
        self
    }

    pub fn part(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|p| p.name == name)
    }
}

/// multipart POST 能力，返回 HTTP 状态码
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_multipart(&self, url: &str, form: MultipartForm) -> Result<u16>;
}

/// 基于 reqwest 的实现
///
/// 每次提交新建一个客户端，请求结束时随作用域释放。
pub struct ReqwestTransport {
    timeout: Duration,
    user_agent: String,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Self {
        Self {
            timeout: config.http_timeout(),
            user_agent: config.user_agent.clone(),
        }
    }

    fn build_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .build()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_multipart(&self, url: &str, form: MultipartForm) -> Result<u16> {
        let client = self.build_client().context("无法创建 HTTP 客户端")?;
        let body = into_reqwest_form(form)?;

        let response = client
            .post(url)
            .multipart(body)
            .send()
            .await
            .with_context(|| format!("POST {} 失败", url))?;

        let status = response.status().as_u16();
        debug!("POST {} → {}", url, status);
        Ok(status)
    }
}

fn into_reqwest_form(form: MultipartForm) -> Result<Form> {
    let mut body = Form::new();
    for part in form.parts {
        let mut field = Part::bytes(part.content);
        if let Some(file_name) = part.file_name {
            field = field.file_name(file_name);
        }
        let field = field
            .mime_str(&part.content_type)
            .with_context(|| format!("非法的 Content-Type: {}", part.content_type))?;
        body = body.part(part.name, field);
    }
    Ok(body)
}
