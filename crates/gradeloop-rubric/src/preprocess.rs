/// Normalize content before grading or storage.
///
/// Collapses runs of spaces, limits blank runs to a single empty line,
/// and trims the ends. Keeps grader input stable across drafts that
/// differ only in whitespace.
pub fn normalize_content(content: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = 0;

    for line in content.lines() {
        let collapsed = collapse_spaces(line.trim_end());
        if collapsed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(collapsed);
    }

    lines.join("\n").trim().to_string()
}

fn collapse_spaces(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut prev_space = false;
    for ch in line.chars() {
        if ch == ' ' {
            if !prev_space {
                out.push(ch);
            }
            prev_space = true;
        } else {
            prev_space = false;
            out.push(ch);
        }
    }
    out
}
