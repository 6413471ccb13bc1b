// ==========================================
// 供应商目录系统 - 文件解析器实现
// ==========================================
// 支持: CSV (.csv) / Excel (.xlsx/.xls/.xlsm/.ods) / JSON (.json) / XML (.xml)
// 输出: RawRecord（源字段名 → 标量文本）
// ==========================================

use crate::domain::RawRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::source_trait::{FileParser, TextParser};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

const UTF8_BOM: char = '\u{feff}';

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 按表头组装一行；全部为空的行返回 None
fn assemble_row(
    headers: &[String],
    cells: impl Iterator<Item = String>,
) -> Option<RawRecord> {
    let mut row = RawRecord::new();
    for (header, value) in headers.iter().zip(cells) {
        if header.is_empty() {
            continue;
        }
        row.insert(header.clone(), value.trim().to_string());
    }

    // 跳过完全空白的行
    if row.values().all(|v| v.is_empty()) {
        None
    } else {
        Some(row)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    fn parse_reader<R: std::io::Read>(&self, source: R) -> ImportResult<Vec<RawRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(source);

        // 读取表头（首列可能带 BOM）
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches(UTF8_BOM).trim().to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            if let Some(row) = assemble_row(&headers, record.iter().map(str::to_string)) {
                records.push(row);
            }
        }

        Ok(records)
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;
        let file = fs::File::open(file_path)?;
        let records = self.parse_reader(file)?;
        debug!(path = %file_path.display(), rows = records.len(), "CSV 解析完成");
        Ok(records)
    }
}

impl TextParser for CsvParser {
    fn parse_text(&self, text: &str) -> ImportResult<Vec<RawRecord>> {
        self.parse_reader(text.as_bytes())
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）；空表返回空批次
        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect(),
            None => return Ok(Vec::new()),
        };

        let records: Vec<RawRecord> = rows
            .filter_map(|data_row| {
                assemble_row(&headers, data_row.iter().map(|cell| cell.to_string()))
            })
            .collect();

        debug!(path = %file_path.display(), sheet = %sheet_name, rows = records.len(), "Excel 解析完成");
        Ok(records)
    }
}

// ==========================================
// JSON Parser 实现
// ==========================================
// 结构探测顺序: 顶层数组 → items 数组 → products 数组 → 单个对象
pub struct JsonParser;

/// JSON 标量 → 文本（null → 空串，嵌套结构 → 紧凑 JSON）
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// JSON 对象 → 原始记录；非对象为数据格式错误
pub fn object_to_record(value: &Value, position: usize) -> ImportResult<RawRecord> {
    match value {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), value_to_text(v)))
            .collect()),
        other => Err(ImportError::MalformedPayload(format!(
            "第 {} 个元素不是 JSON 对象: {}",
            position, other
        ))),
    }
}

/// JSON 元素列表 → 原始记录列表
pub fn items_to_records(items: &[Value]) -> ImportResult<Vec<RawRecord>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| object_to_record(item, i + 1))
        .collect()
}

impl JsonParser {
    pub fn parse_value(&self, value: &Value) -> ImportResult<Vec<RawRecord>> {
        match value {
            Value::Array(items) => items_to_records(items),
            Value::Object(map) => {
                for key in ["items", "products"] {
                    if let Some(Value::Array(items)) = map.get(key) {
                        return items_to_records(items);
                    }
                }
                Ok(vec![object_to_record(value, 1)?])
            }
            other => Err(ImportError::MalformedPayload(format!(
                "JSON 顶层既不是数组也不是对象: {}",
                other
            ))),
        }
    }
}

impl TextParser for JsonParser {
    fn parse_text(&self, text: &str) -> ImportResult<Vec<RawRecord>> {
        let value: Value = serde_json::from_str(text.trim_start_matches(UTF8_BOM))?;
        self.parse_value(&value)
    }
}

impl FileParser for JsonParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;
        let text = fs::read_to_string(file_path)?;
        self.parse_text(&text)
    }
}

// ==========================================
// XML Parser 实现
// ==========================================
// 探测路径: product → products/product → items/item → 根元素本身
pub struct XmlParser;

const XML_RECORD_PATHS: [&[&str]; 3] = [&["product"], &["products", "product"], &["items", "item"]];

impl XmlParser {
    fn find_path<'a, 'input>(
        root: roxmltree::Node<'a, 'input>,
        path: &[&str],
    ) -> Vec<roxmltree::Node<'a, 'input>> {
        let mut current = vec![root];
        for segment in path.iter().copied() {
            current = current
                .iter()
                .flat_map(|node| {
                    node.children()
                        .filter(move |c| c.is_element() && c.tag_name().name() == segment)
                })
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    fn element_to_record(node: roxmltree::Node<'_, '_>) -> RawRecord {
        node.children()
            .filter(|c| c.is_element())
            .map(|c| {
                (
                    c.tag_name().name().to_string(),
                    c.text().map(|t| t.trim().to_string()).unwrap_or_default(),
                )
            })
            .collect()
    }
}

impl TextParser for XmlParser {
    fn parse_text(&self, text: &str) -> ImportResult<Vec<RawRecord>> {
        // 供应商导出常带 DOCTYPE 声明
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc =
            roxmltree::Document::parse_with_options(text.trim_start_matches(UTF8_BOM), options)?;
        let root = doc.root_element();

        let elements = XML_RECORD_PATHS
            .iter()
            .map(|path| Self::find_path(root, path))
            .find(|found| !found.is_empty())
            .unwrap_or_else(|| vec![root]);

        Ok(elements.into_iter().map(Self::element_to_record).collect())
    }
}

impl FileParser for XmlParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;
        let text = fs::read_to_string(file_path)?;
        self.parse_text(&text)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// 扩展名是否受支持
    pub fn supports(path: &Path) -> bool {
        matches!(
            extension_of(path).as_str(),
            "csv" | "xlsx" | "xls" | "xlsm" | "ods" | "json" | "xml"
        )
    }

    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRecord>> {
        self.parse_to_raw_records(file_path.as_ref())
    }
}

impl FileParser for UniversalFileParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        let ext = extension_of(file_path);
        match ext.as_str() {
            "csv" => CsvParser.parse_to_raw_records(file_path),
            "xlsx" | "xls" | "xlsm" | "ods" => ExcelParser.parse_to_raw_records(file_path),
            "json" => JsonParser.parse_to_raw_records(file_path),
            "xml" => XmlParser.parse_to_raw_records(file_path),
            _ => Err(ImportError::UnsupportedFormat(if ext.is_empty() {
                file_path.display().to_string()
            } else {
                format!(".{}", ext)
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_with(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let file = temp_with(".csv", "\u{feff}sku, name ,price\nA1,Widget,9.99\nA2,Gadget,19.50\n");

        let records = CsvParser.parse_to_raw_records(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("sku").map(String::as_str), Some("A1"));
        assert_eq!(records[0].get("name").map(String::as_str), Some("Widget"));
        assert_eq!(records[1].get("price").map(String::as_str), Some("19.50"));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_raw_records(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_skip_empty_and_ragged_rows() {
        let records = CsvParser
            .parse_text("sku,name,price\nA1,Widget\n,,\nA2,Gadget,3\n")
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("price"), None);
        assert_eq!(records[1].get("price").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_json_structure_lookup_order() {
        let array = JsonParser.parse_text(r#"[{"sku": "A"}, {"sku": "B"}]"#).unwrap();
        assert_eq!(array.len(), 2);

        let items = JsonParser
            .parse_text(r#"{"items": [{"sku": "A"}], "products": [{"sku": "X"}, {"sku": "Y"}]}"#)
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("sku").map(String::as_str), Some("A"));

        let single = JsonParser.parse_text(r#"{"sku": "S", "price": 1.5, "active": true, "note": null}"#).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].get("price").map(String::as_str), Some("1.5"));
        assert_eq!(single[0].get("active").map(String::as_str), Some("true"));
        assert_eq!(single[0].get("note").map(String::as_str), Some(""));
    }

    #[test]
    fn test_json_non_object_element_is_malformed() {
        let result = JsonParser.parse_text(r#"[{"sku": "A"}, 42]"#);
        assert!(matches!(result, Err(ImportError::MalformedPayload(_))));
    }

    #[test]
    fn test_xml_products_path() {
        let xml = r#"<catalog><products>
            <product><sku>A1</sku><name>Widget</name><price/></product>
            <product><sku>A2</sku><name>Gadget</name></product>
        </products></catalog>"#;

        let records = XmlParser.parse_text(xml).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("sku").map(String::as_str), Some("A1"));
        assert_eq!(records[0].get("price").map(String::as_str), Some(""));
    }

    #[test]
    fn test_xml_accepts_doctype() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE products SYSTEM "products.dtd">
<products><product><sku>D1</sku><name>Doc</name></product></products>"#;
        let records = XmlParser.parse_text(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("sku").map(String::as_str), Some("D1"));

        let with_subset = r#"<!DOCTYPE products [<!ENTITY brand "Acme">]>
<products><product><sku>D2</sku><name>&brand; Drill</name></product></products>"#;
        let records = XmlParser.parse_text(with_subset).unwrap();
        assert_eq!(records[0].get("name").map(String::as_str), Some("Acme Drill"));
    }

    #[test]
    fn test_xml_falls_back_to_root() {
        let records = XmlParser
            .parse_text("<product_feed><sku>R1</sku><name>Root</name></product_feed>")
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("name").map(String::as_str), Some("Root"));
    }

    #[test]
    fn test_universal_rejects_unknown_extension() {
        let file = temp_with(".txt", "sku\nA\n");
        let result = UniversalFileParser.parse(file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_universal_dispatches_json() {
        let file = temp_with(".JSON", r#"{"products": [{"sku": "P1"}]}"#);
        let records = UniversalFileParser.parse(file.path()).unwrap();
        assert_eq!(records.len(), 1);
    }
}
