// ==========================================
// 供应商目录系统 - SQL 构建工具模块
// ==========================================
// 职责: 两种后端共用的动态 SQL（IN 列表 / 多行 upsert / LIKE 子串匹配）
// 差异: 仅占位符风格不同（SQLite `?N` / PostgreSQL `$N`）
// ==========================================

/// 占位符风格
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Sqlite,   // ?1, ?2, ...
    Postgres, // $1, $2, ...
}

impl Placeholder {
    fn render(self, index: usize) -> String {
        match self {
            Placeholder::Sqlite => format!("?{}", index),
            Placeholder::Postgres => format!("${}", index),
        }
    }
}

/// vendor_products 可写列（顺序即绑定顺序）
pub const VENDOR_PRODUCT_WRITE_COLUMNS: [&str; 17] = [
    "vendor_id",
    "master_product_id",
    "vendor_sku",
    "vendor_price",
    "list_price",
    "map_price",
    "mrp_price",
    "quantity",
    "quantity_nj",
    "quantity_fl",
    "eta",
    "eta_nj",
    "eta_fl",
    "shipping_weight",
    "shipping_dimensions",
    "props",
    "status",
];

/// 构建 IN 列表占位符
///
/// # 参数
/// - `start`: 第一个占位符编号（从 1 开始）
/// - `count`: 占位符个数
///
/// # 返回
/// - 例如 `?2, ?3, ?4`
pub fn in_list(style: Placeholder, start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| style.render(i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 子串匹配条件（需配合 `like_contains` 生成的参数）
pub fn like_clause(style: Placeholder, column: &str, index: usize, case_insensitive: bool) -> String {
    let op = if case_insensitive { "ILIKE" } else { "LIKE" };
    format!("{} {} {} ESCAPE '\\'", column, op, style.render(index))
}

/// 子串匹配参数：`\` `%` `_` 按字面匹配
pub fn like_contains(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// 构建 vendor_products 多行 upsert 语句
///
/// # 说明
/// - 冲突键: (vendor_id, vendor_sku)
/// - 冲突时除自然键外的全部列取 excluded 值（合并已在调用方完成）
/// - props 列的类型转换由调用方通过 `props_cast` 指定（PostgreSQL 需 `::jsonb`）
pub fn vendor_product_upsert(style: Placeholder, rows: usize, props_cast: &str) -> String {
    let width = VENDOR_PRODUCT_WRITE_COLUMNS.len();
    let props_index = VENDOR_PRODUCT_WRITE_COLUMNS
        .iter()
        .position(|c| *c == "props")
        .unwrap_or(width);

    let values = (0..rows)
        .map(|row| {
            let cells = (0..width)
                .map(|col| {
                    let p = style.render(row * width + col + 1);
                    if col == props_index {
                        format!("{}{}", p, props_cast)
                    } else {
                        p
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("({})", cells)
        })
        .collect::<Vec<_>>()
        .join(",\n    ");

    let updates = VENDOR_PRODUCT_WRITE_COLUMNS
        .iter()
        .filter(|c| **c != "vendor_id" && **c != "vendor_sku")
        .map(|c| format!("{c} = excluded.{c}"))
        .collect::<Vec<_>>()
        .join(",\n    ");

    format!(
        "INSERT INTO vendor_products ({})\nVALUES\n    {}\nON CONFLICT (vendor_id, vendor_sku) DO UPDATE SET\n    {},\n    updated_at = CURRENT_TIMESTAMP",
        VENDOR_PRODUCT_WRITE_COLUMNS.join(", "),
        values,
        updates
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_list_styles() {
        assert_eq!(in_list(Placeholder::Sqlite, 2, 3), "?2, ?3, ?4");
        assert_eq!(in_list(Placeholder::Postgres, 1, 2), "$1, $2");
    }

    #[test]
    fn test_like_contains_escapes_wildcards() {
        assert_eq!(like_contains("acme"), "%acme%");
        assert_eq!(like_contains("100%"), "%100\\%%");
        assert_eq!(like_contains("a_b\\c"), "%a\\_b\\\\c%");
        assert_eq!(
            like_clause(Placeholder::Sqlite, "name", 1, false),
            "name LIKE ?1 ESCAPE '\\'"
        );
        assert_eq!(
            like_clause(Placeholder::Postgres, "name", 1, true),
            "name ILIKE $1 ESCAPE '\\'"
        );
    }

    #[test]
    fn test_upsert_numbers_placeholders_across_rows() {
        let sql = vendor_product_upsert(Placeholder::Postgres, 2, "::jsonb");
        assert!(sql.contains("($1, $2, $3"));
        assert!(sql.contains("$16::jsonb"));
        assert!(sql.contains("($18, $19"));
        assert!(sql.contains("$34"));
        assert!(!sql.contains("$35"));
        assert!(sql.contains("ON CONFLICT (vendor_id, vendor_sku) DO UPDATE SET"));
        assert!(sql.contains("vendor_price = excluded.vendor_price"));
        assert!(!sql.contains("vendor_sku = excluded.vendor_sku"));
    }
}
