//! DoR 数据合并
//!
//! 把提交的数据文档与表单结构模型合并为渲染用的数据文档。

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;
use std::collections::HashSet;
use std::io::Cursor;

use crate::error::{AppError, AppResult, XmlError};

/// 合并目标文档（初始为空）
pub struct MergeDocument {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl MergeDocument {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        }
    }

    pub fn write(&mut self, event: Event<'_>) -> AppResult<()> {
        self.writer
            .write_event(event)
            .map_err(AppError::xml_write_failed)
    }

    pub fn into_string(self) -> AppResult<String> {
        String::from_utf8(self.writer.into_inner().into_inner())
            .map_err(|_| AppError::Xml(XmlError::InvalidUtf8))
    }
}

impl Default for MergeDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// 数据合并能力
pub trait DorMerger: Send + Sync {
    fn merge(
        &self,
        destination: MergeDocument,
        source: &roxmltree::Document<'_>,
        model: &Value,
    ) -> Result<String>;
}

/// 默认的合并实现
///
/// - 数据根节点：`afData/afBoundData/data`，其次 `afData/afUnboundData/data`，
///   都没有时使用文档根节点
/// - 模型中标记 `"dorExclusion": true` 的字段不会出现在结果中
/// - 元素和属性保留原有的命名空间前缀，并重新声明用到的 `xmlns`
#[derive(Debug, Default, Clone, Copy)]
pub struct BoundDataMerger;

impl DorMerger for BoundDataMerger {
    fn merge(
        &self,
        mut destination: MergeDocument,
        source: &roxmltree::Document<'_>,
        model: &Value,
    ) -> Result<String> {
        let mut excluded = HashSet::new();
        collect_dor_exclusions(model, &mut excluded);

        let root = data_root(source);

        destination.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        write_element(&mut destination, root, None, &excluded)?;

        Ok(destination.into_string()?)
    }
}

fn data_root<'a, 'input>(doc: &'a roxmltree::Document<'input>) -> roxmltree::Node<'a, 'input> {
    let root = doc.root_element();
    if root.tag_name().name() != "afData" {
        return root;
    }

    ["afBoundData", "afUnboundData"]
        .iter()
        .filter_map(|section| child_element(root, section))
        .find_map(|section| child_element(section, "data"))
        .unwrap_or(root)
}

fn child_element<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// 收集模型中被排除在 DoR 之外的字段名
fn collect_dor_exclusions(model: &Value, excluded: &mut HashSet<String>) {
    match model {
        Value::Object(map) => {
            let flagged = match map.get("dorExclusion") {
                Some(Value::Bool(b)) => *b,
                Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
                _ => false,
            };
            if flagged {
                if let Some(name) = map.get("name").and_then(Value::as_str) {
                    excluded.insert(name.to_string());
                }
            }
            for value in map.values() {
                collect_dor_exclusions(value, excluded);
            }
        }
        Value::Array(items) => {
            for value in items {
                collect_dor_exclusions(value, excluded);
            }
        }
        _ => {}
    }
}

/// XML 预定义的命名空间，不需要也不应该重新声明
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

type Namespaces = Vec<(Option<String>, String)>;

fn in_scope_namespaces(node: roxmltree::Node<'_, '_>) -> Namespaces {
    node.namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
        .collect()
}

/// 相对已写出的父元素，本元素需要新增的命名空间声明
///
/// 合并结果的根节点没有已写出的父元素，需要声明全部作用域内的命名空间。
fn namespace_declarations(
    current: &Namespaces,
    written_parent: Option<&Namespaces>,
) -> Vec<(String, String)> {
    let inherited = written_parent.map(Vec::as_slice).unwrap_or_default();

    let mut declarations: Vec<(String, String)> = current
        .iter()
        .filter(|&ns| !inherited.contains(ns))
        .map(|(prefix, uri)| match prefix {
            Some(prefix) => (format!("xmlns:{}", prefix), uri.clone()),
            None => ("xmlns".to_string(), uri.clone()),
        })
        .collect();

    // 父元素有默认命名空间而本元素没有时，需要显式取消
    if has_default_namespace(inherited) && !has_default_namespace(current) {
        declarations.push(("xmlns".to_string(), String::new()));
    }

    declarations
}

fn has_default_namespace(namespaces: &[(Option<String>, String)]) -> bool {
    namespaces.iter().any(|(prefix, _)| prefix.is_none())
}

/// 带前缀的限定名；默认命名空间下的元素不加前缀
fn qualified_name(
    namespaces: &Namespaces,
    namespace: Option<&str>,
    local: &str,
    is_attribute: bool,
) -> String {
    let Some(uri) = namespace else {
        return local.to_string();
    };
    if uri == XML_NAMESPACE {
        return format!("xml:{}", local);
    }

    let prefix = namespaces
        .iter()
        .filter(|(_, ns_uri)| ns_uri == uri)
        .find(|(prefix, _)| !is_attribute || prefix.is_some())
        .and_then(|(prefix, _)| prefix.as_deref());

    match prefix {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}

fn write_element(
    destination: &mut MergeDocument,
    node: roxmltree::Node<'_, '_>,
    written_parent: Option<&Namespaces>,
    excluded: &HashSet<String>,
) -> AppResult<()> {
    let namespaces = in_scope_namespaces(node);
    let tag = node.tag_name();
    let name = qualified_name(&namespaces, tag.namespace(), tag.name(), false);

    let mut attributes = namespace_declarations(&namespaces, written_parent);
    attributes.extend(node.attributes().map(|attr| {
        let attr_name = qualified_name(&namespaces, attr.namespace(), attr.name(), true);
        (attr_name, attr.value().to_string())
    }));

    let start = BytesStart::new(name.as_str()).with_attributes(
        attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str())),
    );

    let children: Vec<_> = node
        .children()
        .filter(|child| {
            child.is_text()
                || (child.is_element() && !excluded.contains(child.tag_name().name()))
        })
        .collect();

    if children.is_empty() {
        return destination.write(Event::Empty(start));
    }

    destination.write(Event::Start(start))?;
    for child in children {
        if child.is_element() {
            write_element(destination, child, Some(&namespaces), excluded)?;
        } else if let Some(text) = child.text() {
            destination.write(Event::Text(BytesText::new(text)))?;
        }
    }
    destination.write(Event::End(BytesEnd::new(name.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn merge(xml: &str, model: Value) -> String {
        let doc = roxmltree::Document::parse(xml).unwrap();
        BoundDataMerger
            .merge(MergeDocument::new(), &doc, &model)
            .unwrap()
    }

    #[test]
    fn test_extracts_bound_data() {
        let xml = concat!(
            "<afData><afUnboundData><data/></afUnboundData>",
            "<afBoundData><data><name>Jan</name></data></afBoundData></afData>"
        );

        let merged = merge(xml, json!({}));
        assert_eq!(
            merged,
            r#"<?xml version="1.0" encoding="UTF-8"?><data><name>Jan</name></data>"#
        );
    }

    #[test]
    fn test_plain_document_is_copied() {
        let merged = merge(r#"<form id="1"><a>x &amp; y</a></form>"#, json!({}));
        assert!(merged.ends_with(r#"<form id="1"><a>x &amp; y</a></form>"#));
    }

    #[test]
    fn test_excluded_fields_are_dropped() {
        let model = json!({
            ":items": {
                "secret": { "name": "secret", "dorExclusion": true },
                "visible": { "name": "visible", "dorExclusion": false }
            }
        });
        let merged = merge(
            "<data><visible>1</visible><secret>2</secret></data>",
            model,
        );

        assert!(merged.contains("<visible>1</visible>"));
        assert!(!merged.contains("secret"));
    }

    #[test]
    fn test_non_ascii_text_survives() {
        let merged = merge("<data><naam>Jóhan Ündé</naam></data>", json!({}));
        assert!(merged.contains("<naam>Jóhan Ündé</naam>"));
    }

    const XFA_DATA: &str = "http://www.xfa.org/schema/xfa-data/1.0/";

    #[test]
    fn test_xfa_namespace_survives() {
        let xml = format!(
            r#"<data xmlns:xfa="{XFA_DATA}"><grp xfa:dataNode="dataGroup"><f>1</f></grp></data>"#
        );

        let merged = merge(&xml, json!({}));
        assert!(merged.ends_with(&xml), "{merged}");

        let reparsed = roxmltree::Document::parse(&merged).unwrap();
        let grp = reparsed
            .descendants()
            .find(|n| n.has_tag_name("grp"))
            .unwrap();
        assert_eq!(grp.attribute((XFA_DATA, "dataNode")), Some("dataGroup"));
    }

    #[test]
    fn test_same_local_name_in_two_namespaces() {
        let xml = r#"<f xmlns:a="urn:a" xmlns:b="urn:b" a:x="1" b:x="2"/>"#;

        let merged = merge(xml, json!({}));
        let reparsed = roxmltree::Document::parse(&merged).unwrap();
        let root = reparsed.root_element();
        assert_eq!(root.attribute(("urn:a", "x")), Some("1"));
        assert_eq!(root.attribute(("urn:b", "x")), Some("2"));
    }

    #[test]
    fn test_declarations_move_to_extracted_root() {
        let xml = format!(
            concat!(
                r#"<afData xmlns:xfa="{xfa}"><afBoundData>"#,
                r#"<data><grp xfa:dataNode="dataGroup"/></data>"#,
                "</afBoundData></afData>"
            ),
            xfa = XFA_DATA
        );

        let merged = merge(&xml, json!({}));
        assert!(merged.ends_with(&format!(
            r#"<data xmlns:xfa="{XFA_DATA}"><grp xfa:dataNode="dataGroup"/></data>"#
        )));
    }

    #[test]
    fn test_default_namespace_is_kept_and_reset() {
        let xml = r#"<data xmlns="urn:form"><a>1</a><b xmlns=""><c>2</c></b></data>"#;

        let merged = merge(xml, json!({}));
        let reparsed = roxmltree::Document::parse(&merged).unwrap();
        let root = reparsed.root_element();
        assert_eq!(root.tag_name().namespace(), Some("urn:form"));

        let c = reparsed
            .descendants()
            .find(|n| n.tag_name().name() == "c")
            .unwrap();
        assert_ne!(c.tag_name().namespace(), Some("urn:form"));
    }
}
