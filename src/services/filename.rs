//! 文件名清洗

/// 把产品名转换为在所有目标文件系统上都合法的文件名
///
/// 先去掉首尾空白，再把 `[A-Za-z0-9]` 以外的字符全部替换为 `_`。
/// 结果只包含 `[A-Za-z0-9_]`，对已清洗过的名字再次调用不会改变它。
pub fn sanitize_filename(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
