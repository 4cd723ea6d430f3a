use scraper::{Html, Selector};
use tracing::warn;

/// Read-only view of a rendered job posting.
pub trait PageDom {
    /// Whether the document has structural content yet.
    fn is_loaded(&self) -> bool;

    /// Text of the first element matching `selector`, whitespace-collapsed.
    /// `None` when nothing matches or the text is blank.
    fn query_text(&self, selector: &str) -> Option<String>;
}

/// A parsed HTML snapshot.
pub struct HtmlPage {
    doc: Html,
}

impl HtmlPage {
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Html::parse_document(html),
        }
    }
}

impl PageDom for HtmlPage {
    fn is_loaded(&self) -> bool {
        let Ok(body) = Selector::parse("body") else {
            return false;
        };
        self.doc
            .select(&body)
            .next()
            .is_some_and(|b| b.children().any(|n| n.value().is_element()))
    }

    fn query_text(&self, selector: &str) -> Option<String> {
        let sel = match Selector::parse(selector) {
            Ok(s) => s,
            Err(e) => {
                warn!(selector, error = %e, "skipping unparsable selector");
                return None;
            }
        };
        let el = self.doc.select(&sel).next()?;
        let text = collapse_whitespace(&el.text().collect::<String>());
        (!text.is_empty()).then_some(text)
    }
}

/// Text nodes are joined as-is, like `textContent`; only existing whitespace runs collapse.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::new();
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed_and_collapsed_across_children() {
        let page = HtmlPage::parse(
            "<html><body><h1 class=\"t\">\n  Senior <span>Rust</span>\n\t Engineer  </h1></body></html>",
        );
        assert_eq!(page.query_text("h1.t").as_deref(), Some("Senior Rust Engineer"));
    }

    #[test]
    fn inline_markup_does_not_gain_spaces() {
        let page = HtmlPage::parse(
            "<html><body><h1 class=t>C<span>#</span> Developer</h1><a class=c>Acme<b>Corp</b></a></body></html>",
        );
        assert_eq!(page.query_text("h1.t").as_deref(), Some("C# Developer"));
        assert_eq!(page.query_text("a.c").as_deref(), Some("AcmeCorp"));
    }

    #[test]
    fn blank_or_missing_elements_yield_none() {
        let page = HtmlPage::parse("<html><body><h1>   </h1></body></html>");
        assert_eq!(page.query_text("h1"), None);
        assert_eq!(page.query_text(".nope"), None);
    }

    #[test]
    fn bad_selector_is_not_fatal() {
        let page = HtmlPage::parse("<html><body><h1>x</h1></body></html>");
        assert_eq!(page.query_text("h1[[["), None);
    }

    #[test]
    fn empty_body_is_not_loaded() {
        assert!(!HtmlPage::parse("<html><head><title>x</title></head><body>  </body></html>").is_loaded());
        assert!(!HtmlPage::parse("").is_loaded());
        assert!(HtmlPage::parse("<html><body><div id=app></div></body></html>").is_loaded());
    }
}
