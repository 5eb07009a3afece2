// ==========================================
// 产品参数配置引擎 - 颜色工具
// ==========================================
// 职责: HEX 格式校验/规范化、最近标准色号 (RAL) 匹配
// 格式: ^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$
// ==========================================

/// 常用 RAL 色卡（近似 sRGB）
const RAL_PALETTE: &[(&str, u8, u8, u8)] = &[
    ("RAL 1013", 0xE3, 0xD9, 0xC6),
    ("RAL 1015", 0xE6, 0xD2, 0xB5),
    ("RAL 1021", 0xF3, 0xA5, 0x05),
    ("RAL 3000", 0xAF, 0x2B, 0x1E),
    ("RAL 3005", 0x5E, 0x21, 0x29),
    ("RAL 5010", 0x0E, 0x29, 0x4B),
    ("RAL 5015", 0x22, 0x71, 0xB3),
    ("RAL 6005", 0x2F, 0x45, 0x38),
    ("RAL 7016", 0x29, 0x31, 0x33),
    ("RAL 7035", 0xD7, 0xD7, 0xD7),
    ("RAL 7040", 0x9D, 0xA1, 0xAA),
    ("RAL 8014", 0x38, 0x2C, 0x1E),
    ("RAL 8017", 0x45, 0x32, 0x2E),
    ("RAL 8019", 0x40, 0x3A, 0x3A),
    ("RAL 9001", 0xFD, 0xF4, 0xE3),
    ("RAL 9003", 0xF4, 0xF4, 0xF4),
    ("RAL 9005", 0x0A, 0x0A, 0x0A),
    ("RAL 9006", 0xA5, 0xA5, 0xA5),
    ("RAL 9007", 0x8F, 0x8F, 0x8F),
    ("RAL 9010", 0xFF, 0xFF, 0xFF),
    ("RAL 9016", 0xF6, 0xF6, 0xF6),
];

/// 是否“看起来像” HEX 字面量（以 # 开头）
pub fn looks_like_hex(raw: &str) -> bool {
    raw.trim_start().starts_with('#')
}

/// 严格 HEX 校验: # 后恰好 3 或 6 位十六进制
pub fn is_valid_hex(raw: &str) -> bool {
    match raw.strip_prefix('#') {
        Some(digits) => {
            (digits.len() == 3 || digits.len() == 6)
                && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// 规范化为 #RRGGBB（大写）；非法返回 None
pub fn normalize_hex(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if !is_valid_hex(trimmed) {
        return None;
    }
    let digits = &trimmed[1..];
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };
    Some(format!("#{}", expanded.to_uppercase()))
}

fn to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let normalized = normalize_hex(hex)?;
    let r = u8::from_str_radix(&normalized[1..3], 16).ok()?;
    let g = u8::from_str_radix(&normalized[3..5], 16).ok()?;
    let b = u8::from_str_radix(&normalized[5..7], 16).ok()?;
    Some((r, g, b))
}

/// 最近的标准色号（RGB 欧氏距离）
pub fn nearest_standard_color(hex: &str) -> Option<&'static str> {
    let (r, g, b) = to_rgb(hex)?;
    RAL_PALETTE
        .iter()
        .min_by_key(|(_, pr, pg, pb)| {
            let dr = r as i32 - *pr as i32;
            let dg = g as i32 - *pg as i32;
            let db = b as i32 - *pb as i32;
            dr * dr + dg * dg + db * db
        })
        .map(|(code, _, _, _)| *code)
}
