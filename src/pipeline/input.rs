use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Shortest run of non-bar characters between two bars.
static ABS_BARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|([^|]+)\|").expect("static absolute-value pattern"));

const UNICODE_MINUS: char = '\u{2212}';

/// Rewrite loosely typed input into parser syntax.
///
/// Unicode minus becomes `-`, `^` becomes `**` and `|e|` becomes `Abs(e)`. Bars are matched
/// pairwise left to right, so nested bars or an odd count leave stray `|` behind for the
/// parser to reject. Input with none of these features comes back borrowed.
pub fn normalize_input(raw: &str) -> Cow<'_, str> {
    let mut text = Cow::Borrowed(raw);
    if text.contains(UNICODE_MINUS) {
        text = Cow::Owned(text.replace(UNICODE_MINUS, "-"));
    }
    if text.contains('^') {
        text = Cow::Owned(text.replace('^', "**"));
    }
    if ABS_BARS.is_match(&text) {
        text = Cow::Owned(ABS_BARS.replace_all(&text, "Abs($1)").into_owned());
    }
    text
}
