//! Line-oriented CSS scanner.
//!
//! The scanner does not parse CSS. It strips comments, counts braces and hands
//! back each complete top-level construct as the verbatim text it spans, which
//! is all the rule filter needs to make keep/drop decisions.

use std::borrow::Cow;

use crate::error::ExtractionError;

/// A complete construct recovered from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construct {
    /// A selector list with its declaration block, e.g. `.a, .b { color: red; }`.
    Rule { text: String, line: usize },
    /// A `@media` or `@keyframes` block including all nested rules.
    AtRule { text: String, line: usize },
}

/// Coarse view of the scanner state, mostly useful for tests and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Neutral,
    InComment,
    InRule,
    InAtRule,
}

#[derive(Debug)]
enum ScanState {
    /// Between constructs. `pending` holds selector lines seen before the `{`.
    Neutral { pending: String, pending_line: usize },
    InRule { text: String, depth: i64, line: usize },
    /// `opened` stays false while the header has not reached its `{` yet.
    InAtRule {
        text: String,
        depth: i64,
        opened: bool,
        line: usize,
    },
}

impl ScanState {
    fn neutral() -> Self {
        ScanState::Neutral {
            pending: String::new(),
            pending_line: 0,
        }
    }
}

/// Explicit state machine fed one line at a time.
#[derive(Debug)]
pub struct RuleScanner {
    state: ScanState,
    in_comment: bool,
    line_no: usize,
    /// Nested scanners work on the body of a media block: lines are trimmed,
    /// continuation lines are indented, and at-rules are not recognised.
    nested: bool,
}

impl Default for RuleScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleScanner {
    /// A scanner for a whole stylesheet.
    pub fn new() -> Self {
        RuleScanner {
            state: ScanState::neutral(),
            in_comment: false,
            line_no: 0,
            nested: false,
        }
    }

    /// A scanner for the rules inside a `@media` block.
    pub fn nested() -> Self {
        RuleScanner {
            nested: true,
            ..Self::new()
        }
    }

    pub fn phase(&self) -> ScanPhase {
        if self.in_comment {
            return ScanPhase::InComment;
        }
        match self.state {
            ScanState::Neutral { .. } => ScanPhase::Neutral,
            ScanState::InRule { .. } => ScanPhase::InRule,
            ScanState::InAtRule { .. } => ScanPhase::InAtRule,
        }
    }

    /// Scans every line of `css` and returns the constructs in document order.
    pub fn scan(mut self, css: &str) -> Result<Vec<Construct>, ExtractionError> {
        let mut constructs = Vec::new();
        for line in css.lines() {
            if let Some(construct) = self.feed_line(line)? {
                constructs.push(construct);
            }
        }
        self.finish();
        Ok(constructs)
    }

    /// Consumes one line. Returns a construct when this line completes one.
    pub fn feed_line(&mut self, line: &str) -> Result<Option<Construct>, ExtractionError> {
        self.line_no += 1;
        let code = self.strip_comments(line);
        if code.trim().is_empty() {
            return Ok(None);
        }
        let code: &str = if self.nested { code.trim() } else { &code };
        let delta = brace_delta(code);
        let line_no = self.line_no;
        let joiner = if self.nested { "\n    " } else { "\n" };

        match &mut self.state {
            ScanState::Neutral {
                pending,
                pending_line,
            } => {
                let trimmed = code.trim_start();
                if !self.nested && is_block_at_rule(trimmed) {
                    if !pending.is_empty() {
                        log::trace!("dropping dangling selector text before line {}", line_no);
                    }
                    let opened = code.contains('{');
                    self.state = ScanState::InAtRule {
                        text: code.to_string(),
                        depth: delta,
                        opened,
                        line: line_no,
                    };
                    return self.close_if_balanced();
                }

                if code.contains('{') {
                    let (text, line) = if pending.is_empty() {
                        (code.to_string(), line_no)
                    } else {
                        (format!("{}{}{}", pending, joiner, code), *pending_line)
                    };
                    self.state = ScanState::InRule {
                        text,
                        depth: delta,
                        line,
                    };
                    return self.close_if_balanced();
                }

                if code.contains('}') {
                    return Err(ExtractionError::UnbalancedBrace { line: line_no });
                }

                if trimmed.trim_end().ends_with(';') {
                    // `@import`, `@charset` and friends: not a selector, never kept.
                    log::trace!("skipping statement on line {}", line_no);
                    pending.clear();
                } else if pending.is_empty() {
                    pending.push_str(code);
                    *pending_line = line_no;
                } else {
                    pending.push_str(joiner);
                    pending.push_str(code);
                }
                Ok(None)
            }
            ScanState::InRule { text, depth, .. } | ScanState::InAtRule { text, depth, .. } => {
                text.push_str(joiner);
                text.push_str(code);
                *depth += delta;
                if let ScanState::InAtRule { opened, .. } = &mut self.state {
                    *opened |= code.contains('{');
                }
                self.close_if_balanced()
            }
        }
    }

    /// Ends the scan. Constructs still open at end of input are dropped.
    pub fn finish(self) {
        match self.state {
            ScanState::InRule { line, .. } => {
                log::warn!("dropping unterminated rule starting on line {}", line);
            }
            ScanState::InAtRule { line, .. } => {
                log::warn!("dropping unterminated at-rule starting on line {}", line);
            }
            ScanState::Neutral { pending, .. } if !pending.trim().is_empty() => {
                log::debug!("dropping trailing selector text without a block");
            }
            ScanState::Neutral { .. } => {}
        }
        if self.in_comment {
            log::debug!("input ends inside an unterminated comment");
        }
    }

    /// Emits the current construct once its braces balance out.
    fn close_if_balanced(&mut self) -> Result<Option<Construct>, ExtractionError> {
        let (depth, complete) = match &self.state {
            ScanState::Neutral { .. } => return Ok(None),
            ScanState::InRule { depth, .. } => (*depth, *depth == 0),
            ScanState::InAtRule { depth, opened, .. } => (*depth, *opened && *depth == 0),
        };
        if depth < 0 {
            return Err(ExtractionError::UnbalancedBrace { line: self.line_no });
        }
        if !complete {
            return Ok(None);
        }

        let construct = match std::mem::replace(&mut self.state, ScanState::neutral()) {
            ScanState::InRule { text, line, .. } => Construct::Rule { text, line },
            ScanState::InAtRule { text, line, .. } => Construct::AtRule { text, line },
            ScanState::Neutral { .. } => return Ok(None),
        };
        Ok(Some(construct))
    }

    /// Removes `/* ... */` spans from `line`, carrying an open comment over to the next line.
    fn strip_comments<'a>(&mut self, line: &'a str) -> Cow<'a, str> {
        if !self.in_comment && !line.contains("/*") {
            return Cow::Borrowed(line);
        }

        let mut out = String::new();
        let mut rest = line;
        loop {
            if self.in_comment {
                match rest.find("*/") {
                    Some(end) => {
                        rest = &rest[end + 2..];
                        self.in_comment = false;
                    }
                    None => break,
                }
            } else {
                match rest.find("/*") {
                    Some(start) => {
                        out.push_str(&rest[..start]);
                        rest = &rest[start + 2..];
                        self.in_comment = true;
                    }
                    None => {
                        out.push_str(rest);
                        break;
                    }
                }
            }
        }
        Cow::Owned(out.trim_end().to_string())
    }
}

/// Count of `{` minus count of `}` on one line.
pub fn brace_delta(line: &str) -> i64 {
    line.chars().fold(0, |acc, ch| match ch {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

/// True when a trimmed line opens a `@media` or (possibly vendor-prefixed) `@keyframes` block.
pub fn is_block_at_rule(trimmed: &str) -> bool {
    trimmed.starts_with("@media") || is_keyframes_header(trimmed)
}

pub fn is_keyframes_header(trimmed: &str) -> bool {
    let Some(rest) = trimmed.strip_prefix('@') else {
        return false;
    };
    let name = match rest.strip_prefix('-') {
        Some(prefixed) => prefixed.split_once('-').map_or("", |(_, name)| name),
        None => rest,
    };
    name.starts_with("keyframes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(text: &str, line: usize) -> Construct {
        Construct::Rule {
            text: text.to_string(),
            line,
        }
    }

    #[test]
    fn test_single_line_rule_completes_immediately() {
        let mut scanner = RuleScanner::new();
        let out = scanner.feed_line(".a { color: red; }").unwrap();
        assert_eq!(out, Some(rule(".a { color: red; }", 1)));
        assert_eq!(scanner.phase(), ScanPhase::Neutral);
    }

    #[test]
    fn test_multi_line_rule_phases() {
        let mut scanner = RuleScanner::new();
        assert_eq!(scanner.feed_line(".a {").unwrap(), None);
        assert_eq!(scanner.phase(), ScanPhase::InRule);
        assert_eq!(scanner.feed_line("  color: red;").unwrap(), None);
        let out = scanner.feed_line("}").unwrap();
        assert_eq!(out, Some(rule(".a {\n  color: red;\n}", 1)));
    }

    #[test]
    fn test_multi_line_selector_is_joined() {
        let constructs = RuleScanner::new()
            .scan(".a,\n.b\n{ margin: 0; }")
            .unwrap();
        assert_eq!(constructs, vec![rule(".a,\n.b\n{ margin: 0; }", 1)]);
    }

    #[test]
    fn test_comment_phase_spans_lines() {
        let mut scanner = RuleScanner::new();
        assert_eq!(scanner.feed_line("/* start").unwrap(), None);
        assert_eq!(scanner.phase(), ScanPhase::InComment);
        assert_eq!(scanner.feed_line(".hidden { x: y; }").unwrap(), None);
        assert_eq!(
            scanner.feed_line("end */ .b { x: y; }").unwrap(),
            Some(rule(" .b { x: y; }", 3))
        );
        assert_eq!(scanner.phase(), ScanPhase::Neutral);
    }

    #[test]
    fn test_inline_comments_are_removed() {
        let constructs = RuleScanner::new()
            .scan("/* header */\n.a { color: red; /* why */ }\n.b /* x */ { top: 0; }")
            .unwrap();
        assert_eq!(
            constructs,
            vec![rule(".a { color: red;  }", 2), rule(".b  { top: 0; }", 3)]
        );
    }

    #[test]
    fn test_comment_inside_rule_keeps_rule_open() {
        let constructs = RuleScanner::new()
            .scan(".a {\n/*\n} not a brace\n*/\n  color: red;\n}")
            .unwrap();
        assert_eq!(constructs, vec![rule(".a {\n  color: red;\n}", 1)]);
    }

    #[test]
    fn test_at_rule_block() {
        let css = "@media (max-width: 600px) {\n  .a { x: y; }\n}\n.b { x: y; }";
        let constructs = RuleScanner::new().scan(css).unwrap();
        assert_eq!(
            constructs,
            vec![
                Construct::AtRule {
                    text: "@media (max-width: 600px) {\n  .a { x: y; }\n}".to_string(),
                    line: 1,
                },
                rule(".b { x: y; }", 4),
            ]
        );
    }

    #[test]
    fn test_at_rule_header_with_brace_on_next_line() {
        let mut scanner = RuleScanner::new();
        assert_eq!(scanner.feed_line("@media print").unwrap(), None);
        assert_eq!(scanner.phase(), ScanPhase::InAtRule);
        assert_eq!(scanner.feed_line("{").unwrap(), None);
        assert_eq!(scanner.feed_line(".a { x: y; }").unwrap(), None);
        assert!(matches!(
            scanner.feed_line("}").unwrap(),
            Some(Construct::AtRule { line: 1, .. })
        ));
    }

    #[test]
    fn test_single_line_at_rule() {
        let constructs = RuleScanner::new()
            .scan("@media print { .a { x: y; } }")
            .unwrap();
        assert_eq!(constructs.len(), 1);
    }

    #[test]
    fn test_statements_are_skipped() {
        let constructs = RuleScanner::new()
            .scan("@import url(\"x.css\");\n@charset \"utf-8\";\n.a { x: y; }")
            .unwrap();
        assert_eq!(constructs, vec![rule(".a { x: y; }", 3)]);
    }

    #[test]
    fn test_stray_closing_brace_is_an_error() {
        let err = RuleScanner::new().scan(".a { x: y; }\n}").unwrap_err();
        assert_eq!(err, ExtractionError::UnbalancedBrace { line: 2 });

        let err = RuleScanner::new().scan(".a { x: y; }}").unwrap_err();
        assert_eq!(err, ExtractionError::UnbalancedBrace { line: 1 });
    }

    #[test]
    fn test_unterminated_rule_is_dropped() {
        let constructs = RuleScanner::new().scan(".a { x: y; }\n.b {\n  x: y;").unwrap();
        assert_eq!(constructs, vec![rule(".a { x: y; }", 1)]);
    }

    #[test]
    fn test_nested_scanner_trims_and_indents() {
        let constructs = RuleScanner::nested()
            .scan("  .a {\n      color: red;\n  }\n  .b { x: y; }")
            .unwrap();
        assert_eq!(
            constructs,
            vec![rule(".a {\n    color: red;\n    }", 1), rule(".b { x: y; }", 4)]
        );
    }

    #[test]
    fn test_keyframes_headers() {
        assert!(is_keyframes_header("@keyframes spin {"));
        assert!(is_keyframes_header("@-webkit-keyframes spin {"));
        assert!(!is_keyframes_header("@media screen {"));
        assert!(!is_keyframes_header("@font-face {"));
        assert!(!is_keyframes_header(".keyframes {"));
    }

    #[test]
    fn test_brace_delta() {
        assert_eq!(brace_delta("a { b { c"), 2);
        assert_eq!(brace_delta("} }"), -2);
        assert_eq!(brace_delta("{ }"), 0);
    }
}
