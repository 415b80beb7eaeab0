use scraper::{ElementRef, Html, Selector};

const BUTTON_SELECTOR: &str = r#"button, input[type="submit" i], input[type="button" i]"#;

/// How far into the body we look for NUL bytes before calling it binary.
const SNIFF_LEN: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("response body is not markup ({0} bytes of binary data)")]
    Binary(usize),
    #[error("bad selector: {0}")]
    Selector(String),
}

/// Count button-like elements whose trimmed visible text starts with
/// `prefix`. The match is exact and case-sensitive.
///
/// The HTML parser recovers from broken markup, so a truncated or malformed
/// page still yields whatever buttons survived.
pub fn count_prefixed_buttons(markup: &[u8], prefix: &str) -> Result<usize, ScanError> {
    if markup.iter().take(SNIFF_LEN).any(|b| *b == 0) {
        return Err(ScanError::Binary(markup.len()));
    }

    let selector = Selector::parse(BUTTON_SELECTOR).map_err(|e| ScanError::Selector(e.to_string()))?;
    let text = String::from_utf8_lossy(markup);
    let doc = Html::parse_document(&text);

    let count = doc
        .select(&selector)
        .filter(|el| visible_text(el).trim().starts_with(prefix))
        .count();
    Ok(count)
}

fn visible_text(el: &ElementRef<'_>) -> String {
    if el.value().name() == "input" {
        return el.value().attr("value").unwrap_or_default().to_string();
    }
    el.text().collect()
}
