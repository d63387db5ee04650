//! Text cleanup for replies shown in the terminal

use regex::Regex;
use std::sync::LazyLock;

/// Escape sequences and control characters a reply must not carry into the
/// terminal. Newlines and tabs are kept.
static CONTROL_SEQUENCES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\x1b\[[0-9;?]*[A-Za-z]",       // CSI
        r"|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)", // OSC, BEL or ST terminated
        r"|\x1b[PX^_][^\x1b]*\x1b\\",    // DCS, SOS, PM, APC
        r"|\x1b.",
        r"|[\x00-\x08\x0b\x0c\x0e-\x1f\x7f]"
    ))
    .unwrap()
});

const TAB_WIDTH: usize = 4;

/// Strip terminal control sequences, normalise line endings and expand tabs
pub fn sanitize_reply(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = CONTROL_SEQUENCES.replace_all(&text, "");
    text.replace('\t', &" ".repeat(TAB_WIDTH)).trim_end().to_string()
}
