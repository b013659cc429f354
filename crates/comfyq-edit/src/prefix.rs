//! Frame-count suffixes in output filename prefixes

use once_cell::sync::Lazy;
use regex::Regex;

// A suffix only counts when the `f` is not the start of a word ("-24fps" is not one).
static FRAME_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-([0-9]+)f").expect("frame suffix pattern is valid"));

/// Make `prefix` encode `frames` as a `-<frames>f` suffix
///
/// The last `-<digits>f` occurrence whose `f` is followed by the end of the
/// string or a non-letter has its digit run replaced; every other character is
/// kept. Without such an occurrence, `-<frames>f` is appended.
///
/// # Examples
/// ```
/// # use comfyq_edit::rewrite_prefix;
/// assert_eq!(rewrite_prefix("clip-89f", 145), "clip-145f");
/// assert_eq!(rewrite_prefix("clip", 145), "clip-145f");
/// assert_eq!(rewrite_prefix("v2-89f-final", 145), "v2-145f-final");
/// ```
#[must_use]
pub fn rewrite_prefix(prefix: &str, frames: u64) -> String {
    let digits = FRAME_SUFFIX
        .captures_iter(prefix)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let next = prefix[whole.end()..].chars().next();
            if next.map_or(true, |c| !c.is_alphabetic()) {
                caps.get(1)
            } else {
                None
            }
        })
        .last();

    match digits {
        Some(run) => format!("{}{}{}", &prefix[..run.start()], frames, &prefix[run.end()..]),
        None => format!("{prefix}-{frames}f"),
    }
}
