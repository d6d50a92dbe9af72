//! Title extraction and heading removal for generated HTML.
//!
//! Generated posts arrive as untrusted markup with the post title in a
//! heading. The CMS renders its own title, so before submission the title text
//! is pulled out and every `<h1>` element is dropped from the body.
//!
//! The markup is parsed into a tree with `scraper` and the body is the
//! re-serialized tree. Serialized output parses back to the same tree, and it
//! never contains an `<h1>`, so [`split`] is idempotent.

use std::sync::LazyLock;

use scraper::{Html, Selector};

/// Title used when the markup has neither a heading nor a usable text run.
pub const FALLBACK_TITLE: &str = "추천 상품 리뷰";

/// Shortest text run that may stand in for a missing heading.
const SNIPPET_MIN_CHARS: usize = 10;
/// Snippet titles are cut to this many characters before the ellipsis.
const SNIPPET_MAX_CHARS: usize = 50;

static TITLE_HEADING: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("h1").ok());
static SUB_HEADINGS: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse("h2, h3, h4, h5, h6").ok());

/// A post split into its title and heading-free body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPost {
    pub title: String,
    pub body: String,
}

/// Splits generated HTML into a title and a body without the title heading.
///
/// Title: text of the first non-empty `<h1>`, else of the first non-empty
/// `<h2>`..`<h6>`; otherwise the first text run of at least ten characters,
/// cut to fifty and suffixed with `...`; otherwise [`FALLBACK_TITLE`].
/// Body: the input minus every `<h1>` element, with blank lines removed and
/// outer whitespace trimmed. Lower-level headings stay in the body.
pub fn split(html: &str) -> SplitPost {
    let mut fragment = Html::parse_fragment(html);

    let title = heading_title(&fragment)
        .or_else(|| first_text_run(&fragment).map(|run| snippet(&run)))
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    strip_title_headings(&mut fragment);

    SplitPost {
        title,
        body: normalize(&fragment.root_element().inner_html()),
    }
}

fn heading_title(fragment: &Html) -> Option<String> {
    [&*TITLE_HEADING, &*SUB_HEADINGS]
        .into_iter()
        .flatten()
        .find_map(|selector| {
            fragment
                .select(selector)
                .map(|heading| collapse_whitespace(&heading.text().collect::<String>()))
                .find(|text| !text.is_empty())
        })
}

/// First visible text node long enough to serve as a title.
fn first_text_run(fragment: &Html) -> Option<String> {
    fragment.tree.root().descendants().find_map(|node| {
        let text = node.value().as_text()?;
        let raw = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| e.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "template"));
        let trimmed = text.trim();
        (!raw && trimmed.chars().count() >= SNIPPET_MIN_CHARS).then(|| trimmed.to_string())
    })
}

fn strip_title_headings(fragment: &mut Html) {
    let Some(selector) = TITLE_HEADING.as_ref() else {
        return;
    };
    let ids: Vec<_> = fragment.select(selector).map(|heading| heading.id()).collect();
    for id in ids {
        if let Some(mut node) = fragment.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn snippet(run: &str) -> String {
    let cut: String = collapse_whitespace(run)
        .chars()
        .take(SNIPPET_MAX_CHARS)
        .collect();
    format!("{cut}...")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drops blank lines and trailing spaces, then trims the whole text.
fn normalize(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATED: &str = r#"<article>
  <h1 style="color:#222; font-weight:900;">마우스X 솔직 후기</h1>

  <h2 style="color:#346aff;">무선마우스 고른 이유</h2>
  <p>손목이 편한 무선마우스를 찾다가 골랐어요.</p>


</article>
<div class="disclosure">이 포스팅은 쿠팡 파트너스 활동의 일환으로, 이에 따른 일정액의 수수료를 제공받습니다.</div>"#;

    #[test]
    fn title_comes_from_the_first_heading() {
        let split = split("<h1>Foo</h1><p>bar</p>");
        assert_eq!(split.title, "Foo");
        assert_eq!(split.body, "<p>bar</p>");
    }

    #[test]
    fn heading_attributes_and_nested_markup_are_handled() {
        let split = split(GENERATED);
        assert_eq!(split.title, "마우스X 솔직 후기");
        assert!(!split.body.contains("<h1"));
        assert!(!split.body.contains("솔직 후기"));
        assert!(split.body.contains("<h2 style=\"color:#346aff;\">무선마우스 고른 이유</h2>"));
        assert!(!split.body.contains("\n\n"));
        assert!(split.body.starts_with("<article>"));
    }

    #[test]
    fn inline_markup_inside_the_heading_is_reduced_to_text() {
        let split = split("<H1 class=\"t\">Best <em>wireless</em>\n  mouse</H1>rest");
        assert_eq!(split.title, "Best wireless mouse");
        assert_eq!(split.body, "rest");
    }

    #[test]
    fn lower_level_heading_titles_a_post_without_h1() {
        let split = split("<h2>Foo</h2><p>bar</p>");
        assert_eq!(split.title, "Foo");
        assert_eq!(split.body, "<h2>Foo</h2><p>bar</p>");
    }

    #[test]
    fn h1_outranks_an_earlier_subheading() {
        let split = split("<h3>intro</h3><h1>Main</h1><p>x</p>");
        assert_eq!(split.title, "Main");
        assert_eq!(split.body, "<h3>intro</h3><p>x</p>");
    }

    #[test]
    fn twelve_character_run_becomes_an_ellipsis_title() {
        let split = split("<p>short</p><p>abcdefghijkl</p>");
        assert_eq!(split.title, "abcdefghijkl...");
        assert_eq!(split.body, "<p>short</p><p>abcdefghijkl</p>");
    }

    #[test]
    fn long_runs_are_cut_to_fifty_characters() {
        let text = "가".repeat(80);
        let split = split(&format!("<p>{text}</p>"));
        assert_eq!(split.title, format!("{}...", "가".repeat(50)));
    }

    #[test]
    fn empty_input_gets_the_fallback_title() {
        let split = split("");
        assert_eq!(split.title, FALLBACK_TITLE);
        assert_eq!(split.body, "");
    }

    #[test]
    fn empty_heading_falls_back_to_a_text_run_but_is_still_removed() {
        let split = split("<h1>  </h1><p>long enough text</p>");
        assert_eq!(split.title, "long enough text...");
        assert_eq!(split.body, "<p>long enough text</p>");
    }

    #[test]
    fn comments_and_scripts_never_supply_titles_or_headings() {
        let html = "<!-- <h1>hidden heading</h1> --><script>var s = '<h1>not a heading</h1>';</script><p>visible body text</p>";
        let split = split(html);
        assert_eq!(split.title, "visible body text...");
        assert!(split.body.contains("<!-- <h1>hidden heading</h1> -->"));
        assert!(split.body.contains("'<h1>not a heading</h1>'"));
    }

    #[test]
    fn lookalike_tags_stay() {
        let split = split("<header><h10>x</h10><h2>Sub</h2></header>");
        assert_eq!(split.title, "Sub");
        assert_eq!(split.body, "<header><h10>x</h10><h2>Sub</h2></header>");
    }

    #[test]
    fn unclosed_heading_swallows_the_rest() {
        let split = split("<p>keep</p><h1>Dangling title");
        assert_eq!(split.title, "Dangling title");
        assert_eq!(split.body, "<p>keep</p>");
    }

    #[test]
    fn stray_angle_brackets_are_escaped_text() {
        let split = split("<h1>a < b</h1>3 < 4 and 5 > 2 always");
        assert_eq!(split.title, "a < b");
        assert_eq!(split.body, "3 &lt; 4 and 5 &gt; 2 always");
    }

    #[test]
    fn text_around_a_removed_heading_never_forms_a_new_one() {
        let split = split("<<h1>x</h1>h1>Title</h1><p>body</p>");
        assert_eq!(split.title, "x");
        assert!(!split.body.contains("<h1"));
    }

    #[test]
    fn split_is_idempotent_on_its_own_body() {
        let inputs = [
            GENERATED,
            "<h1>Foo</h1><p>bar</p>",
            "<h1>one</h1>\n\n<h1>two</h1>\n<p>three</p>",
            "<p>no heading here at all</p>",
            "",
            "<p>keep</p><h1>Dangling",
            "<<h1>x</h1>h1>Title</h1><p>body</p>",
            "<h2>A</h2><h3>B</h3><p>c</p>",
            "<h1>a < b</h1>3 < 4 &amp; <b>bold",
        ];
        for html in inputs {
            let first = split(html);
            let second = split(&first.body);
            assert_eq!(second.body, first.body, "not idempotent for {html:?}");
        }
    }
}
