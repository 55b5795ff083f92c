/// Width measurement for single-line text.
///
/// Implementations must be deterministic: the same `(text, size_px)` always measures the same,
/// otherwise the measure and draw passes disagree about line breaks.
pub trait TextMeasure {
    /// Advance width of `text` rendered on one line at `size_px`.
    fn measure(&mut self, text: &str, size_px: f32) -> f32;
}

/// Break `body` into display lines no wider than `max_width` where possible.
///
/// Explicit line breaks (`\n`, `\r\n`, `\r`) always start a new line. Within a segment words are
/// packed greedily and joined by a single space. A word wider than `max_width` sits alone on its
/// own line and is never split. An empty body yields one empty line.
pub fn wrap_text<M: TextMeasure + ?Sized>(
    body: &str,
    measure: &mut M,
    size_px: f32,
    max_width: f32,
) -> Vec<String> {
    let normalized = body.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = Vec::new();
    for segment in normalized.split('\n') {
        wrap_segment(segment, measure, size_px, max_width, &mut lines);
    }
    lines
}

fn wrap_segment<M: TextMeasure + ?Sized>(
    segment: &str,
    measure: &mut M,
    size_px: f32,
    max_width: f32,
    out: &mut Vec<String>,
) {
    let mut current = String::new();
    for word in segment.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure.measure(&candidate, size_px) <= max_width {
            current = candidate;
        } else {
            out.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    out.push(current);
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
