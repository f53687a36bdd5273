use serde::Serialize;
use std::sync::LazyLock;

use regex::Regex;

// Both patterns are fixed literals; failing to compile them is a programming error.
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title.*?>(.*?[^<])</title>").expect("title pattern"));

static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"<(head|script|style|noscript).*?>[\s\S]*?</(head|script|style|noscript)>|<[^>]+>|&nbsp",
    )
    .expect("noise pattern")
});

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Knobs for the density scan. The defaults are the production contract.
#[derive(Debug, Clone)]
pub struct ExtractCfg {
    /// Lines per (non-overlapping) density window.
    pub window_lines: usize,
    /// A window is content when its share of the document's characters exceeds this.
    pub density_threshold: f64,
}

impl Default for ExtractCfg {
    fn default() -> Self {
        Self {
            window_lines: 5,
            density_threshold: 0.02,
        }
    }
}

/// Line range chosen by the density scan (indices into the stripped text's lines).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentBounds {
    pub start: usize,
    /// `None` means "through the last line".
    pub end: Option<usize>,
    /// No window was dense enough; the whole document was kept.
    pub fallback: bool,
}

impl ContentBounds {
    fn contains(&self, line: usize) -> bool {
        line >= self.start && self.end.map_or(true, |e| line <= e)
    }
}

#[derive(Debug, Clone)]
pub struct ExtractedMain {
    /// Title line, always newline-terminated (possibly just `"\n"`).
    pub title: String,
    /// Title line followed by the trimmed non-blank content lines, each newline-terminated.
    pub text: String,
    pub bounds: ContentBounds,
    pub warnings: Vec<&'static str>,
}

/// Concatenate every `<title>` body, each followed by a space, then a newline.
///
/// Never fails: a page without a title yields `"\n"`.
pub fn html_title(html: &str) -> String {
    let mut out = String::new();
    for caps in TITLE_RE.captures_iter(html) {
        if let Some(m) = caps.get(1) {
            out.push_str(m.as_str());
            out.push(' ');
        }
    }
    out.push('\n');
    out
}

/// Drop head/script/style/noscript blocks, every remaining tag, and `&nbsp`.
pub fn strip_noise(html: &str) -> String {
    NOISE_RE.replace_all(html, "").into_owned()
}

/// Density scan over `lines`; `char_count` is the character length of the whole text.
pub fn content_bounds(lines: &[&str], char_count: usize, cfg: &ExtractCfg) -> ContentBounds {
    let window = cfg.window_lines.max(1);
    let line_count = lines.len();
    let blank = |i: usize| is_blank(lines[i]);

    let mut start: Option<usize> = None;
    let mut end: Option<usize> = None;
    let mut in_content = false;

    let mut i = 0usize;
    while i < line_count {
        let hi = (i + window).min(line_count);
        let dense: usize = lines[i..hi]
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(|l| l.chars().filter(|&c| c != ' ').count())
            .sum();
        let f = if char_count == 0 {
            0.0
        } else {
            dense as f64 / char_count as f64
        };

        if f > cfg.density_threshold {
            in_content = true;
            if start.is_none() {
                // Walk the window backwards; stop once two blank lines follow text.
                let mut seen_text = false;
                let mut blanks = 0usize;
                for j in (i..hi).rev() {
                    if !blank(j) {
                        start = Some(j);
                        seen_text = true;
                    }
                    if seen_text {
                        if blank(j) {
                            blanks += 1;
                        } else {
                            blanks = 0;
                        }
                    }
                    if blanks >= 2 {
                        break;
                    }
                }
            }
        } else if in_content {
            in_content = false;
            let mut e = i;
            let mut blanks = 0usize;
            for j in i..hi {
                if blank(j) {
                    blanks += 1;
                } else {
                    e = j;
                    blanks = 0;
                }
                if blanks >= 2 {
                    break;
                }
            }
            end = Some(e);
        }
        i += window;
    }

    match start {
        Some(start) => ContentBounds {
            start,
            end,
            fallback: false,
        },
        None => ContentBounds {
            start: 0,
            end: None,
            fallback: true,
        },
    }
}

/// Isolate the main content of an HTML page by text density.
pub fn extract_main(html: &str, cfg: &ExtractCfg) -> ExtractedMain {
    let title = html_title(html);
    let stripped = strip_noise(html);
    let lines: Vec<&str> = stripped.split('\n').collect();
    let bounds = content_bounds(&lines, stripped.chars().count(), cfg);

    let mut warnings = Vec::new();
    if bounds.fallback && !is_blank(&stripped) {
        warnings.push("density_fallback_whole_document");
    }
    tracing::debug!(
        lines = lines.len(),
        start = bounds.start,
        end = ?bounds.end,
        fallback = bounds.fallback,
        "main content bounds"
    );

    let mut text = title.clone();
    for (i, line) in lines.iter().enumerate() {
        if !bounds.contains(i) {
            continue;
        }
        let l = line.trim();
        if !l.is_empty() {
            text.push_str(l);
            text.push('\n');
        }
    }

    ExtractedMain {
        title,
        text,
        bounds,
        warnings,
    }
}

/// [`extract_main`] with default knobs, returning just the text.
pub fn main_content(html: &str) -> String {
    extract_main(html, &ExtractCfg::default()).text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_page() -> String {
        let mut lines = vec![
            r#"<html><head><title>News</title><style>body { color: red }</style></head>"#
                .to_string(),
            "<body>".to_string(),
            r#"<div class="nav"><a href="/">Home</a></div>"#.to_string(),
            r#"<div class="nav"><a href="/a">About</a></div>"#.to_string(),
            r#"<div class="nav"><a href="/c">Contact</a></div>"#.to_string(),
        ];
        for i in 0..5 {
            lines.push(format!(
                "<p>Article paragraph {i}: {}</p>",
                "the quick brown fox jumps over the lazy dog ".repeat(4)
            ));
        }
        lines.push(String::new());
        lines.push(String::new());
        lines.push(r#"<div class="footer">Copyright 2024</div>"#.to_string());
        lines.push("</body></html>".to_string());
        lines.join("\n")
    }

    #[test]
    fn title_concatenates_every_match() {
        let html = "<title>First</title>\n<p>x</p><title lang=\"en\">Second</title>";
        assert_eq!(html_title(html), "First Second \n");
    }

    #[test]
    fn title_is_a_bare_newline_when_missing_or_empty() {
        assert_eq!(html_title("<p>no title here</p>"), "\n");
        assert_eq!(html_title("<title></title>"), "\n");
        assert_eq!(html_title(""), "\n");
    }

    #[test]
    fn strip_noise_removes_blocks_tags_and_nbsp() {
        let html = "<head><title>T</title></head><script type=\"x\">var a = 1;</script>\
                    <p>one&nbsp;two</p><noscript>enable js</noscript><style>p{}</style>";
        assert_eq!(strip_noise(html), "one;two");
    }

    #[test]
    fn keeps_article_and_drops_navigation_and_footer() {
        let out = extract_main(&article_page(), &ExtractCfg::default());
        assert!(out.text.starts_with("News \n"), "got {:?}", out.text);
        for i in 0..5 {
            assert!(out.text.contains(&format!("Article paragraph {i}:")));
        }
        assert!(!out.text.contains("Home"));
        assert!(!out.text.contains("Contact"));
        assert!(!out.text.contains("Copyright"));
        assert!(!out.text.contains("color"));
        assert_eq!(out.bounds.start, 5);
        assert_eq!(out.bounds.end, Some(10));
        assert!(!out.bounds.fallback);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn start_scan_stops_at_two_blank_lines_above_text() {
        let dense = "a long dense line of article text";
        let lines = ["x", "", "", dense, dense];
        let chars: usize = lines.iter().map(|l| l.chars().count()).sum::<usize>() + 4;
        let b = content_bounds(&lines, chars, &ExtractCfg::default());
        assert_eq!(b.start, 3);
        assert_eq!(b.end, None);
        assert!(!b.fallback);

        // One blank line is not enough to cut the stray text off.
        let lines = ["x", "", dense, dense, dense];
        let b = content_bounds(&lines, chars, &ExtractCfg::default());
        assert_eq!(b.start, 0);
    }

    #[test]
    fn sparse_documents_fall_back_to_whole_text() {
        let body: Vec<String> = (0..300).map(|i| format!("w{i:03}")).collect();
        let html = format!("<title>Sparse</title>\n{}", body.join("\n"));
        let out = extract_main(&html, &ExtractCfg::default());
        assert!(out.bounds.fallback);
        assert_eq!(out.warnings, vec!["density_fallback_whole_document"]);

        let mut expected = String::from("Sparse \nSparse\n");
        for w in &body {
            expected.push_str(w);
            expected.push('\n');
        }
        assert_eq!(out.text, expected);
    }

    #[test]
    fn empty_input_yields_only_the_title_line() {
        let out = extract_main("", &ExtractCfg::default());
        assert_eq!(out.text, "\n");
        assert!(out.bounds.fallback);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn single_line_document_runs_to_the_end() {
        let html = "<html><head><title>T</title></head><body>hello   world</body></html>";
        let out = extract_main(html, &ExtractCfg::default());
        assert_eq!(out.text, "T \nhello   world\n");
        assert_eq!(out.bounds.start, 0);
        assert_eq!(out.bounds.end, None);
    }

    #[test]
    fn every_output_line_is_non_blank_and_trimmed() {
        let html = "<title>x</title>\n   padded line   \n\n\t\n<b>bold</b>  \n";
        let text = main_content(html);
        let mut lines = text.split_terminator('\n');
        assert_eq!(lines.next(), Some("x "));
        for l in lines {
            assert!(!l.trim().is_empty());
            assert_eq!(l, l.trim());
        }
    }
}
