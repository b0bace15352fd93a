// src/core/html.rs
//! Thin helpers over `scraper` for old `<font>`/`<table>` markup.

use scraper::{ElementRef, Html, Selector};

use super::sanitize::normalize_ws;

pub fn parse(doc: &str) -> Html {
    Html::parse_document(doc)
}

/// For the crate's own selector literals, built once behind a `LazyLock`.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("bad selector {css:?}: {e:?}"))
}

pub fn first<'a>(el: ElementRef<'a>, sel: &Selector) -> Option<ElementRef<'a>> {
    el.select(sel).next()
}

/// Direct element children with the given tag name.
pub fn children_named<'a>(el: ElementRef<'a>, name: &'static str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(move |c| c.value().name() == name)
}

/// Rows owned by `table` itself: direct `<tr>` plus those under its
/// `thead`/`tbody`/`tfoot`. Rows of nested tables are not included.
pub fn own_rows<'a>(table: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(children_named(child, "tr")),
            _ => {}
        }
    }
    rows
}

/// Whitespace-collapsed text content.
pub fn text(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

pub fn attr<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name).map(str::trim).filter(|v| !v.is_empty())
}

/// `colspan`/`rowspan` value; missing, garbage, or zero all mean 1.
pub fn span(el: ElementRef<'_>, name: &str) -> usize {
    attr(el, name)
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_td(doc: &Html) -> ElementRef<'_> {
        first(doc.root_element(), &selector("td")).expect("td")
    }

    #[test]
    fn own_rows_skip_nested_tables() {
        let doc = parse(
            "<table id=o><tr><td><table><tr><td>in</td></tr><tr><td>in2</td></tr></table></td></tr>\
             <tr><td>b</td></tr></table>",
        );
        let outer = first(doc.root_element(), &selector("table#o")).expect("outer");
        assert_eq!(own_rows(outer).len(), 2);
    }

    #[test]
    fn banner_colour_matches_any_case() {
        let doc = parse(r##"<p><font size="7" color="#0000ff">RAI 2.l</font></p>"##);
        let banner = selector(r##"font[size="7"][color="#0000FF" i]"##);
        let hit = first(doc.root_element(), &banner).expect("banner");
        assert_eq!(text(hit), "RAI 2.l");
    }

    #[test]
    fn bold_inside_font_only() {
        let doc = parse("<table><tr><td><font size=3><b> NRP\n lv </b></font><b>x</b></td></tr></table>");
        let td = first_td(&doc);
        let bolds: Vec<String> = td.select(&selector(r#"font[size="3"] b"#)).map(text).collect();
        assert_eq!(bolds, vec!["NRP lv"]);
    }

    #[test]
    fn spans_default_to_one() {
        let doc = parse(r#"<table><tr><td colspan="4" rowspan="0" bgcolor=" ">x</td></tr></table>"#);
        let td = first_td(&doc);
        assert_eq!(span(td, "colspan"), 4);
        assert_eq!(span(td, "rowspan"), 1);
        assert_eq!(span(td, "width"), 1);
        assert_eq!(attr(td, "bgcolor"), None);
    }
}
