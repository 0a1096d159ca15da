use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const ELLIPSIS: char = '\u{2026}';

/// Cells one grapheme takes in a name column. Control characters
/// (newlines, tabs) are drawn as a single space.
fn grapheme_display_width(g: &str) -> usize {
    if is_control(g) {
        1
    } else {
        UnicodeWidthStr::width(g)
    }
}

fn is_control(g: &str) -> bool {
    g.chars().next().is_some_and(char::is_control)
}

/// Display width in terminal cells, counting control characters as one.
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_display_width).sum()
}

/// Fit a name onto one row of at most `max_cells` cells. Control characters
/// become spaces; a name that doesn't fit keeps its leading graphemes and
/// ends in `…`.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    let fits = display_width(s) <= max_cells;
    let budget = if fits { max_cells } else { max_cells.saturating_sub(1) };

    let mut out = String::with_capacity(s.len());
    let mut used = 0;
    for g in s.graphemes(true) {
        let w = grapheme_display_width(g);
        if used + w > budget {
            break;
        }
        used += w;
        if is_control(g) {
            out.push(' ');
        } else {
            out.push_str(g);
        }
    }
    if !fits && max_cells > 0 {
        out.push(ELLIPSIS);
    }
    out
}
