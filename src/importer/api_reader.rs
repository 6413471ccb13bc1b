// ==========================================
// 供应商目录系统 - HTTP API 读取器
// ==========================================
// 工具: reqwest（异步 GET + JSON）
// 流程: 首个请求（带 query 参数）→ 按 items_path 取元素
//      → 分页时读取 next_page_path，按当前 URL 解析下一页地址 → 继续
// 约束:
// - 下一页 URL 原样请求，不再附加 query 参数
// - 已访问过的 URL 再次出现时停止分页（防循环）
// - 401/403 → 认证失败；其余非 2xx → 请求失败；非 JSON → 数据格式错误
// ==========================================

use crate::config::{ApiAuth, ApiImportConfig};
use crate::domain::RawRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{items_to_records, value_to_text};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// 按点分路径定位 JSON 值（对象按键、数组按数字下标）
pub fn resolve_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(data, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// 提取元素列表
///
/// # 规则
/// - 路径为空 → 响应体本身
/// - 路径缺失 → 无元素
/// - 最终值不是数组 → 单个元素
pub fn extract_items(data: &Value, items_path: &str) -> Vec<Value> {
    match resolve_path(data, items_path) {
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
        None => Vec::new(),
    }
}

/// 读取下一页地址（缺失 / null / 空串 → None）
pub fn next_page_link(data: &Value, next_page_path: &str) -> Option<String> {
    if next_page_path.trim().is_empty() {
        return None;
    }
    resolve_path(data, next_page_path)
        .map(value_to_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub struct ApiReader {
    client: Client,
}

impl Default for ApiReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiReader {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// 读取全部页面的元素
    ///
    /// # 返回
    /// - Ok(Vec<RawRecord>): 各页元素按顺序拼接
    /// - Err: 地址无效 / 认证失败 / 请求失败 / 响应格式错误
    pub async fn fetch(&self, config: &ApiImportConfig) -> ImportResult<Vec<RawRecord>> {
        let mut url = Url::parse(config.url.trim())
            .map_err(|e| ImportError::TransportError(format!("URL 无效 ({}): {}", config.url, e)))?;

        let mut visited = HashSet::new();
        let mut items = Vec::new();
        let mut page = 1usize;

        loop {
            visited.insert(url.to_string());
            let body = self.get_json(config, &url, page == 1).await?;
            let page_items = extract_items(&body, &config.items_path);
            debug!(url = %url, page, items = page_items.len(), "API 页面读取完成");
            items.extend(page_items);

            let Some(next_path) = config.next_page_path.as_deref() else {
                break;
            };
            let Some(link) = next_page_link(&body, next_path) else {
                break;
            };
            let next_url = url.join(&link).map_err(|e| {
                ImportError::MalformedPayload(format!("下一页地址无效 ({}): {}", link, e))
            })?;
            if visited.contains(next_url.as_str()) {
                warn!(url = %next_url, "下一页地址已访问过，停止分页");
                break;
            }

            url = next_url;
            page += 1;
        }

        info!(url = %config.url, pages = page, items = items.len(), "API 读取完成");
        items_to_records(&items)
    }

    async fn get_json(
        &self,
        config: &ApiImportConfig,
        url: &Url,
        with_params: bool,
    ) -> ImportResult<Value> {
        let mut request = self.client.get(url.clone());
        for (name, value) in &config.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = match &config.auth {
            ApiAuth::None => request,
            ApiAuth::Basic { username, password } => request.basic_auth(username, Some(password)),
            ApiAuth::Bearer { token } => request.bearer_auth(token),
        };
        if with_params && !config.params.is_empty() {
            request = request.query(&config.params);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ImportError::AuthenticationFailed(format!("HTTP {} ({})", status, url)));
        }
        if !status.is_success() {
            return Err(ImportError::TransportError(format!("HTTP {} ({})", status, url)));
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ImportError::MalformedPayload(format!("API 响应不是有效的 JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_items_paths() {
        let body = json!({"data": {"items": [{"sku": "A"}, {"sku": "B"}], "meta": {"sku": "M"}}});

        assert_eq!(extract_items(&body, "data.items").len(), 2);
        assert_eq!(extract_items(&body, "data.meta"), vec![json!({"sku": "M"})]);
        assert!(extract_items(&body, "data.missing").is_empty());
        assert_eq!(extract_items(&body, ""), vec![body.clone()]);
        assert_eq!(extract_items(&json!([1, 2, 3]), "").len(), 3);
        assert_eq!(extract_items(&body, "data.items.1"), vec![json!({"sku": "B"})]);
    }

    #[test]
    fn test_next_page_link() {
        assert_eq!(
            next_page_link(&json!({"links": {"next": "/p?page=2"}}), "links.next").as_deref(),
            Some("/p?page=2")
        );
        assert_eq!(next_page_link(&json!({"links": {"next": null}}), "links.next"), None);
        assert_eq!(next_page_link(&json!({"links": {"next": ""}}), "links.next"), None);
        assert_eq!(next_page_link(&json!({"links": {}}), "links.next"), None);
        assert_eq!(next_page_link(&json!({"next": "x"}), ""), None);
    }
}
