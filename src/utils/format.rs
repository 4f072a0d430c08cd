use unicode_width::UnicodeWidthStr;

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Pads `s` with spaces to `width` terminal columns, truncating with `…`
/// when it does not fit.
pub fn pad(s: &str, width: usize) -> String {
    let w = s.width();
    if w <= width {
        return format!("{}{}", s, " ".repeat(width - w));
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + cw + 1 > width {
            break;
        }
        out.push(c);
        used += cw;
    }
    out.push('…');
    used += 1;
    format!("{}{}", out, " ".repeat(width.saturating_sub(used)))
}

/// "3/7" style count.
pub fn fraction(done: usize, total: usize) -> String {
    format!("{}/{}", done, total)
}

pub fn percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}
