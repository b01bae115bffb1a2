/// Join per-page text into a single document string.
///
/// Pages are separated by one `\n`. Pages whose text is empty or only
/// whitespace contribute nothing, not even a blank line, so line-anchored
/// patterns never see spurious empty lines between pages.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();

    for page in pages {
        let page = page.as_ref();
        if page.trim().is_empty() {
            continue;
        }
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(page);
    }

    text
}
