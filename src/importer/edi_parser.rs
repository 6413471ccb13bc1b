// ==========================================
// 供应商目录系统 - EDI 报文解析器
// ==========================================
// 范围: 最小定位子集（非完整 X12）
// - 段分隔符 `~`，元素分隔符 `*`
// - LIN: 开始新商品，元素 3 → sku
// - PID: 元素 5 → name
// - CTP: 元素 3 → price（能解析为数字时）
// ==========================================

use crate::domain::RawRecord;
use crate::importer::error::ImportResult;
use crate::importer::source_trait::{FileParser, TextParser};
use std::fs;
use std::path::Path;

const SEGMENT_SEPARATOR: char = '~';
const ELEMENT_SEPARATOR: char = '*';

pub struct EdiParser;

impl EdiParser {
    fn flush(current: &mut RawRecord, products: &mut Vec<RawRecord>) {
        if !current.is_empty() {
            products.push(std::mem::take(current));
        }
    }
}

impl TextParser for EdiParser {
    fn parse_text(&self, text: &str) -> ImportResult<Vec<RawRecord>> {
        let mut products = Vec::new();
        let mut current = RawRecord::new();

        for segment in text.split(SEGMENT_SEPARATOR).map(str::trim) {
            if segment.is_empty() {
                continue;
            }
            let elements: Vec<&str> = segment.split(ELEMENT_SEPARATOR).collect();

            match elements[0] {
                "LIN" => {
                    Self::flush(&mut current, &mut products);
                    if let Some(sku) = elements.get(3) {
                        current.insert("sku".to_string(), sku.to_string());
                    }
                }
                "PID" => {
                    if let Some(name) = elements.get(5) {
                        current.insert("name".to_string(), name.to_string());
                    }
                }
                "CTP" => {
                    if let Some(price) = elements.get(3).filter(|p| p.trim().parse::<f64>().is_ok()) {
                        current.insert("price".to_string(), price.trim().to_string());
                    }
                }
                _ => {}
            }
        }
        Self::flush(&mut current, &mut products);

        tracing::debug!(products = products.len(), "EDI 报文解析完成");
        Ok(products)
    }
}

impl FileParser for EdiParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        let text = fs::read_to_string(file_path)?;
        self.parse_text(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lin_pid_ctp() {
        let edi = "ISA*00*x~LIN*1*VP*SKU-1~PID*F****Blue Widget~CTP**RES*12.50~\
                   LIN*2*VP*SKU-2~PID*F****Red Widget~CTP**RES*n/a~SE*10~";
        let records = EdiParser.parse_text(edi).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("sku").map(String::as_str), Some("SKU-1"));
        assert_eq!(records[0].get("name").map(String::as_str), Some("Blue Widget"));
        assert_eq!(records[0].get("price").map(String::as_str), Some("12.50"));
        assert_eq!(records[1].get("sku").map(String::as_str), Some("SKU-2"));
        assert!(!records[1].contains_key("price"));
    }

    #[test]
    fn test_short_lin_opens_empty_product() {
        // LIN 缺少元素 3 时不产生 sku；空商品不输出
        let records = EdiParser.parse_text("LIN*1~LIN*2*VP*B~").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("sku").map(String::as_str), Some("B"));
    }

    #[test]
    fn test_segments_are_trimmed() {
        let records = EdiParser.parse_text("\n LIN*1*VP*A ~\n PID*F****Name ~\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("sku").map(String::as_str), Some("A"));
        assert_eq!(records[0].get("name").map(String::as_str), Some("Name"));
    }

    #[test]
    fn test_empty_input() {
        assert!(EdiParser.parse_text("").unwrap().is_empty());
        assert!(EdiParser.parse_text("~~ ~").unwrap().is_empty());
    }
}
