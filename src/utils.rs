/// Formats an axis magnitude with a thousands suffix: `1_500_000.0` becomes
/// `"1.5M"`, `2_300.0` becomes `"2.3K"`. Values below 1,000 with no fractional
/// part are printed as-is (`999.0` becomes `"999"`). Sign is preserved.
pub fn format_y_labels(value: f64) -> String {
    let (scaled, suffix) = match value.abs() {
        v if v >= 1e9 => (value / 1e9, "B"),
        v if v >= 1e6 => (value / 1e6, "M"),
        v if v >= 1e3 => (value / 1e3, "K"),
        _ => (value, ""),
    };

    if suffix.is_empty() && scaled.fract() == 0.0 {
        format!("{scaled}")
    } else {
        format!("{scaled:.1}{suffix}")
    }
}
