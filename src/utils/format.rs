const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// 以两位小数格式化字节数，例如 `1536` -> `"1.5 KB"`
pub fn format_bytes(bytes: u64) -> String {
    format_bytes_with(bytes, 2)
}

/// 按 1024 进制格式化字节数，负的小数位数按 0 处理，超过 TB 的仍以 TB 显示
pub fn format_bytes_with(bytes: u64, decimals: i32) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let decimals = decimals.max(0) as usize;
    let mut unit_index = 0;
    while unit_index < UNITS.len() - 1 && bytes >= 1024u64.pow(unit_index as u32 + 1) {
        unit_index += 1;
    }

    // 先按"五入远离零"取整，`{:.*}` 遇到恰好一半时会取偶数
    let factor = 10f64.powi(decimals as i32);
    let value = (bytes as f64 / 1024f64.powi(unit_index as i32) * factor).round() / factor;
    format!("{} {}", trim_zeros(format!("{:.*}", decimals, value)), UNITS[unit_index])
}

// "1.50" -> "1.5", "1.00" -> "1"
fn trim_zeros(mut number: String) -> String {
    if number.contains('.') {
        let trimmed = number.trim_end_matches('0').trim_end_matches('.').len();
        number.truncate(trimmed);
    }
    number
}
