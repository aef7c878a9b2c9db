const INDEX_PAGE: &str = include_str!("../../templates/index.html");
const RESET_PAGE: &str = include_str!("../../templates/reset.html");

pub fn index_page() -> &'static str {
    INDEX_PAGE
}

/// Reset form with `token` embedded as a hidden field.
pub fn reset_page(token: &str) -> String {
    RESET_PAGE.replace("{{token}}", &escape_html(token))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
