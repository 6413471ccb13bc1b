// ==========================================
// 供应商目录系统 - 导入源 Trait
// ==========================================
// 职责: 定义源读取器接口（不包含实现）
// 约定: 读取结果为有限、已物化的 Vec<RawRecord>
// ==========================================

use crate::domain::RawRecord;
use crate::importer::error::ImportResult;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 本地文件 → 原始记录
// 实现者: CsvParser, ExcelParser, JsonParser, XmlParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始记录
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(Vec<RawRecord>): 按文件顺序的记录
    /// - Err: 文件不存在 / 格式不支持 / 内容损坏
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>>;
}

// ==========================================
// TextParser Trait
// ==========================================
// 用途: 内存文本 → 原始记录（API 响应 / EDI 报文 / SFTP 下载内容共用）
pub trait TextParser: Send + Sync {
    fn parse_text(&self, text: &str) -> ImportResult<Vec<RawRecord>>;
}
