//! 模板解析服务 - 业务能力层
//!
//! 只负责"找到可用的 DoR 模板"，不关心是否需要渲染

use tracing::{debug, error, warn};

use crate::infrastructure::ResourceResolver;
use crate::utils::locale::language_subtag;

/// 模板解析服务
///
/// 职责：
/// - 按提交语言替换模板路径中的语言片段
/// - 先找本地化模板，再找默认模板
/// - 都不存在时返回 None，由调用方跳过渲染
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateResolver;

impl TemplateResolver {
    pub fn new() -> Self {
        Self
    }

    /// 解析 DoR 模板路径
    ///
    /// # 参数
    /// - `default_ref`: 表单配置的模板路径，如 `/content/dam/tpl_en.xdp`
    /// - `locale`: 提交语言
    /// - `base_locale`: 表单声明的基础语言；`None` 表示表单上下文不可用
    /// - `store`: 资源存储
    ///
    /// # 返回
    /// 存在于资源存储中的模板路径
    pub fn resolve(
        &self,
        default_ref: &str,
        locale: &str,
        base_locale: Option<&str>,
        store: &dyn ResourceResolver,
    ) -> Option<String> {
        let Some(base_locale) = base_locale else {
            debug!("[Submit] 表单上下文不可用，无法解析模板");
            return None;
        };
        if default_ref.trim().is_empty() {
            debug!("[Submit] 未配置 DoR 模板");
            return None;
        }

        let localized_ref = self.localized_ref(default_ref, locale, base_locale);

        match self.first_existing(&localized_ref, default_ref, store) {
            Ok(Some(found)) => Some(found),
            Ok(None) => {
                warn!(
                    "[Submit] 资源存储中没有找到模板: {} 或 {}",
                    localized_ref, default_ref
                );
                None
            }
            Err(e) => {
                error!("[Submit] 检查模板是否存在时出错 {}: {:?}", default_ref, e);
                None
            }
        }
    }

    /// 把 `_<基础语言>` 替换为 `_<提交语言>`
    fn localized_ref(&self, default_ref: &str, locale: &str, base_locale: &str) -> String {
        match language_subtag(locale) {
            Some(language) => {
                default_ref.replace(&format!("_{}", base_locale), &format!("_{}", language))
            }
            None => default_ref.to_string(),
        }
    }

    fn first_existing(
        &self,
        localized_ref: &str,
        default_ref: &str,
        store: &dyn ResourceResolver,
    ) -> anyhow::Result<Option<String>> {
        if store.exists(localized_ref)? {
            debug!("[Submit] 找到本地化模板: {}", localized_ref);
            return Ok(Some(localized_ref.to_string()));
        }
        if localized_ref != default_ref && store.exists(default_ref)? {
            debug!("[Submit] 找到默认模板: {}", default_ref);
            return Ok(Some(default_ref.to_string()));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryResourceResolver;

    struct BrokenStore;

    impl ResourceResolver for BrokenStore {
        fn exists(&self, _path: &str) -> anyhow::Result<bool> {
            anyhow::bail!("repository unavailable")
        }
    }

    #[test]
    fn test_localized_template_wins() {
        let store = MemoryResourceResolver::new(["tpl_fr.xdp"]);
        let resolved = TemplateResolver::new().resolve("tpl_en.xdp", "fr", Some("en"), &store);
        assert_eq!(resolved.as_deref(), Some("tpl_fr.xdp"));
    }

    #[test]
    fn test_region_is_ignored() {
        let store = MemoryResourceResolver::new(["tpl_fr.xdp", "tpl_en.xdp"]);
        let resolved = TemplateResolver::new().resolve("tpl_en.xdp", "fr-CA", Some("en"), &store);
        assert_eq!(resolved.as_deref(), Some("tpl_fr.xdp"));
    }

    #[test]
    fn test_falls_back_to_default() {
        let store = MemoryResourceResolver::new(["tpl_en.xdp"]);
        let resolved = TemplateResolver::new().resolve("tpl_en.xdp", "de", Some("en"), &store);
        assert_eq!(resolved.as_deref(), Some("tpl_en.xdp"));
    }

    #[test]
    fn test_missing_everywhere() {
        let store = MemoryResourceResolver::new(["other.xdp"]);
        for locale in ["en", "fr", "af", "pt-BR", ""] {
            let resolved =
                TemplateResolver::new().resolve("tpl_en.xdp", locale, Some("en"), &store);
            assert_eq!(resolved, None, "locale {locale}");
        }
    }

    #[test]
    fn test_uses_declared_base_locale() {
        let store = MemoryResourceResolver::new(["/dam/dor_en.xdp"]);
        let resolved = TemplateResolver::new().resolve("/dam/dor_af.xdp", "en", Some("af"), &store);
        assert_eq!(resolved.as_deref(), Some("/dam/dor_en.xdp"));
    }

    #[test]
    fn test_blank_locale_checks_default_only() {
        let store = MemoryResourceResolver::new(["tpl_en.xdp"]);
        let resolved = TemplateResolver::new().resolve("tpl_en.xdp", "  ", Some("en"), &store);
        assert_eq!(resolved.as_deref(), Some("tpl_en.xdp"));
    }

    #[test]
    fn test_fails_fast_without_template_or_context() {
        let store = MemoryResourceResolver::new(["tpl_en.xdp"]);
        let resolver = TemplateResolver::new();
        assert_eq!(resolver.resolve("  ", "en", Some("en"), &store), None);
        assert_eq!(resolver.resolve("tpl_en.xdp", "en", None, &store), None);
    }

    #[test]
    fn test_store_errors_are_contained() {
        let resolved =
            TemplateResolver::new().resolve("tpl_en.xdp", "fr", Some("en"), &BrokenStore);
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_locale_without_letters_is_not_spliced() {
        let store = MemoryResourceResolver::new(["tpl_...xdp", "tpl_./.xdp", "tpl_en.xdp"]);
        for locale in ["..", "./", "x/../../secret"] {
            let resolved =
                TemplateResolver::new().resolve("tpl_en.xdp", locale, Some("en"), &store);
            assert_eq!(resolved.as_deref(), Some("tpl_en.xdp"), "locale {locale}");
        }
    }
}
