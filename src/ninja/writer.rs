//! Width-bounded `build.ninja` writer.
//!
//! The writer knows nothing about targets: it renders rules, build edges,
//! variables and comments into an in-memory buffer, wrapping long lines
//! with `$` continuations.

use crate::builder::errors::GenerationError;

use super::escape_path;

/// Default maximum line width.
pub const DEFAULT_WIDTH: usize = 144;

/// Optional attributes of a `rule` block.
///
/// Attributes left unset are not written at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOptions {
    pub description: Option<String>,
    pub depfile: Option<String>,
    pub generator: bool,
    pub pool: Option<String>,
    pub restat: bool,
    pub rspfile: Option<String>,
    pub rspfile_content: Option<String>,
    pub deps: Option<String>,
}

impl RuleOptions {
    pub fn new() -> Self {
        RuleOptions::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn depfile(mut self, depfile: impl Into<String>) -> Self {
        self.depfile = Some(depfile.into());
        self
    }

    pub fn generator(mut self, generator: bool) -> Self {
        self.generator = generator;
        self
    }

    pub fn pool(mut self, pool: impl Into<String>) -> Self {
        self.pool = Some(pool.into());
        self
    }

    pub fn restat(mut self, restat: bool) -> Self {
        self.restat = restat;
        self
    }

    pub fn rspfile(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.rspfile = Some(path.into());
        self.rspfile_content = Some(content.into());
        self
    }

    pub fn deps(mut self, deps: impl Into<String>) -> Self {
        self.deps = Some(deps.into());
        self
    }
}

/// One `build` statement.
///
/// Paths are given unescaped; the writer escapes them. Variable values are
/// written verbatim, so callers escape literal text with
/// [`escape`](super::escape) before adding it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEdge {
    /// Primary outputs
    pub outputs: Vec<String>,
    /// Rule name
    pub rule: String,
    /// Explicit inputs (`$in`)
    pub inputs: Vec<String>,
    /// Implicit inputs, after `|`: affect staleness but are not in `$in`
    pub implicit: Vec<String>,
    /// Order-only inputs, after `||`: ordering only, never trigger a rebuild
    pub order_only: Vec<String>,
    /// Per-edge variable overrides
    pub variables: Vec<(String, String)>,
    /// Implicit outputs, after `|` on the output side
    pub implicit_outputs: Vec<String>,
    /// Pool override
    pub pool: Option<String>,
}

impl BuildEdge {
    pub fn new(output: impl Into<String>, rule: impl Into<String>) -> Self {
        BuildEdge {
            outputs: vec![output.into()],
            rule: rule.into(),
            ..Default::default()
        }
    }

    pub fn inputs(mut self, inputs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.inputs.extend(inputs.into_iter().map(Into::into));
        self
    }

    pub fn implicit(mut self, implicit: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.implicit.extend(implicit.into_iter().map(Into::into));
        self
    }

    pub fn order_only(mut self, order_only: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.order_only.extend(order_only.into_iter().map(Into::into));
        self
    }

    pub fn implicit_outputs(
        mut self,
        outputs: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.implicit_outputs
            .extend(outputs.into_iter().map(Into::into));
        self
    }

    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.push((key.into(), value.into()));
        self
    }

    pub fn pool(mut self, pool: impl Into<String>) -> Self {
        self.pool = Some(pool.into());
        self
    }
}

/// Buffered `build.ninja` writer.
#[derive(Debug, Clone)]
pub struct Writer {
    out: String,
    width: usize,
}

impl Writer {
    /// Create a writer with the default width.
    pub fn new() -> Self {
        Writer::with_width(DEFAULT_WIDTH)
    }

    /// Create a writer that wraps lines longer than `width`.
    pub fn with_width(width: usize) -> Self {
        Writer {
            out: String::new(),
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Text written so far.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Consume the writer and return the buffer.
    pub fn finish(self) -> String {
        self.out
    }

    pub fn newline(&mut self) {
        self.out.push('\n');
    }

    /// Write a comment, word-wrapped to `width - 2` columns.
    ///
    /// Words are never split, not even at hyphens; a word longer than the
    /// budget gets a line of its own.
    pub fn comment(&mut self, text: &str) {
        let budget = self.width.saturating_sub(2);
        let mut line = String::new();
        for word in text.split_whitespace() {
            if !line.is_empty() && line.len() + 1 + word.len() > budget {
                self.push_comment_line(&line);
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        if !line.is_empty() {
            self.push_comment_line(&line);
        }
    }

    fn push_comment_line(&mut self, line: &str) {
        self.out.push_str("# ");
        self.out.push_str(line);
        self.out.push('\n');
    }

    /// Write `key = value`. Nothing is written when `value` is empty.
    pub fn variable(&mut self, key: &str, value: &str, indent: usize) {
        if value.is_empty() {
            return;
        }
        self.line(&format!("{} = {}", key, value), indent);
    }

    /// Write `key = v1 v2 ...`, skipping empty entries.
    pub fn variable_list<S: AsRef<str>>(&mut self, key: &str, values: &[S], indent: usize) {
        let joined = values
            .iter()
            .map(AsRef::as_ref)
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        self.variable(key, &joined, indent);
    }

    /// Write a `pool` declaration.
    pub fn pool(&mut self, name: &str, depth: usize) {
        self.line(&format!("pool {}", name), 0);
        self.variable("depth", &depth.to_string(), 1);
    }

    /// Write a `rule` block with only the attributes that are set.
    pub fn rule(&mut self, name: &str, command: &str, options: &RuleOptions) {
        self.line(&format!("rule {}", name), 0);
        self.variable("command", command, 1);
        if let Some(description) = &options.description {
            self.variable("description", description, 1);
        }
        if let Some(depfile) = &options.depfile {
            self.variable("depfile", depfile, 1);
        }
        if options.generator {
            self.variable("generator", "1", 1);
        }
        if let Some(pool) = &options.pool {
            self.variable("pool", pool, 1);
        }
        if options.restat {
            self.variable("restat", "1", 1);
        }
        if let Some(rspfile) = &options.rspfile {
            self.variable("rspfile", rspfile, 1);
        }
        if let Some(content) = &options.rspfile_content {
            self.variable("rspfile_content", content, 1);
        }
        if let Some(deps) = &options.deps {
            self.variable("deps", deps, 1);
        }
    }

    /// Write a `build` statement followed by its variable overrides.
    ///
    /// Returns the primary outputs, unescaped.
    pub fn build(&mut self, edge: &BuildEdge) -> Result<Vec<String>, GenerationError> {
        let mut outputs = escape_all(&edge.outputs)?;
        if !edge.implicit_outputs.is_empty() {
            outputs.push("|".to_string());
            outputs.extend(escape_all(&edge.implicit_outputs)?);
        }

        let mut inputs = vec![edge.rule.clone()];
        inputs.extend(escape_all(&edge.inputs)?);
        if !edge.implicit.is_empty() {
            inputs.push("|".to_string());
            inputs.extend(escape_all(&edge.implicit)?);
        }
        if !edge.order_only.is_empty() {
            inputs.push("||".to_string());
            inputs.extend(escape_all(&edge.order_only)?);
        }

        self.line(
            &format!("build {}: {}", outputs.join(" "), inputs.join(" ")),
            0,
        );
        if let Some(pool) = &edge.pool {
            self.variable("pool", pool, 1);
        }
        for (key, value) in &edge.variables {
            self.variable(key, value, 1);
        }

        Ok(edge.outputs.clone())
    }

    pub fn include(&mut self, path: &str) -> Result<(), GenerationError> {
        self.line(&format!("include {}", escape_path(path)?), 0);
        Ok(())
    }

    pub fn subninja(&mut self, path: &str) -> Result<(), GenerationError> {
        self.line(&format!("subninja {}", escape_path(path)?), 0);
        Ok(())
    }

    /// Write a `default` statement.
    pub fn default<S: AsRef<str>>(&mut self, paths: &[S]) -> Result<(), GenerationError> {
        if paths.is_empty() {
            return Ok(());
        }
        self.line(&format!("default {}", escape_all(paths)?.join(" ")), 0);
        Ok(())
    }

    /// Write `text` at `indent`, wrapped at `self.width`.
    ///
    /// Lines are only split at unescaped spaces. Continuation lines end in
    /// ` $` and are indented two levels deeper than the first line.
    fn line(&mut self, text: &str, indent: usize) {
        let mut leading = "  ".repeat(indent);
        let mut text = text;

        while leading.len() + text.len() > self.width {
            let budget = self.width.saturating_sub(leading.len() + " $".len());
            let Some(split) = find_split(text.as_bytes(), budget) else {
                break;
            };

            self.out.push_str(&leading);
            self.out.push_str(&text[..split]);
            self.out.push_str(" $\n");
            text = &text[split + 1..];

            leading = "  ".repeat(indent + 2);
        }

        self.out.push_str(&leading);
        self.out.push_str(text);
        self.out.push('\n');
    }
}

fn escape_all<S: AsRef<str>>(paths: &[S]) -> Result<Vec<String>, GenerationError> {
    paths.iter().map(|p| escape_path(p.as_ref())).collect()
}

/// Number of `$` immediately before `bytes[i]`.
fn dollars_before(bytes: &[u8], i: usize) -> usize {
    bytes[..i].iter().rev().take_while(|&&b| b == b'$').count()
}

fn is_unescaped_space(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b' ' && dollars_before(bytes, i) % 2 == 0
}

/// Pick the byte index of the space to break at.
///
/// Prefers the rightmost unescaped space before `budget`; otherwise the
/// first unescaped space at or after it.
fn find_split(bytes: &[u8], budget: usize) -> Option<usize> {
    let budget = budget.min(bytes.len());
    (0..budget)
        .rev()
        .find(|&i| is_unescaped_space(bytes, i))
        .or_else(|| (budget..bytes.len()).find(|&i| is_unescaped_space(bytes, i)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Undo line continuations the way Ninja's lexer does.
    fn join_continuations(text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        for raw in text.lines() {
            if let Some(stripped) = raw.strip_suffix(" $") {
                current.push_str(stripped.trim_start());
                current.push(' ');
            } else {
                current.push_str(raw.trim_start());
                lines.push(std::mem::take(&mut current));
            }
        }
        lines
    }

    #[test]
    fn test_variable_skips_empty() {
        let mut w = Writer::new();
        w.variable("cflags", "", 0);
        w.variable_list::<&str>("libs", &[], 0);
        w.variable_list("incs", &["", ""], 1);
        assert_eq!(w.as_str(), "");
    }

    #[test]
    fn test_variable_list_joins_non_empty() {
        let mut w = Writer::new();
        w.variable_list("flags", &["-g", "", "-O2"], 1);
        assert_eq!(w.as_str(), "  flags = -g -O2\n");
    }

    #[test]
    fn test_rule_only_writes_supplied_attributes() {
        let mut w = Writer::new();
        w.rule(
            "cc",
            "gcc -c $in -o $out",
            &RuleOptions::new().description("CC $out").deps("gcc"),
        );
        assert_eq!(
            w.as_str(),
            "rule cc\n  command = gcc -c $in -o $out\n  description = CC $out\n  deps = gcc\n"
        );
    }

    #[test]
    fn test_rule_all_attributes_in_order() {
        let mut w = Writer::new();
        w.rule(
            "gen",
            "regen",
            &RuleOptions::new()
                .description("GEN")
                .depfile("$out.d")
                .generator(true)
                .pool("console")
                .restat(true)
                .rspfile("$out.rsp", "$in")
                .deps("gcc"),
        );
        let keys: Vec<&str> = w
            .as_str()
            .lines()
            .skip(1)
            .map(|l| l.trim().split(" = ").next().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec![
                "command",
                "description",
                "depfile",
                "generator",
                "pool",
                "restat",
                "rspfile",
                "rspfile_content",
                "deps"
            ]
        );
    }

    #[test]
    fn test_build_edge_separators() {
        let mut w = Writer::new();
        let edge = BuildEdge::new("out/app", "link")
            .inputs(["a.o", "b.o"])
            .implicit(["libx.a"])
            .order_only(["gen.h"])
            .implicit_outputs(["out/app.map"])
            .variable("ldflags", "-rdynamic");
        let outputs = w.build(&edge).unwrap();

        assert_eq!(outputs, vec!["out/app"]);
        assert_eq!(
            w.as_str(),
            "build out/app | out/app.map: link a.o b.o | libx.a || gen.h\n  ldflags = -rdynamic\n"
        );
    }

    #[test]
    fn test_build_edge_escapes_paths() {
        let mut w = Writer::new();
        w.build(&BuildEdge::new("my dir/a.o", "cc").inputs(["c:/src/a b.c"]))
            .unwrap();
        assert_eq!(w.as_str(), "build my$ dir/a.o: cc c$:/src/a$ b.c\n");
    }

    #[test]
    fn test_build_edge_rejects_newline_path() {
        let mut w = Writer::new();
        let err = w
            .build(&BuildEdge::new("a\nb.o", "cc").inputs(["a.c"]))
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidText { .. }));
    }

    #[test]
    fn test_build_edge_pool_before_variables() {
        let mut w = Writer::new();
        w.build(&BuildEdge::new("x", "link").pool("heavy").variable("k", "v"))
            .unwrap();
        assert_eq!(w.as_str(), "build x: link\n  pool = heavy\n  k = v\n");
    }

    #[test]
    fn test_pool_include_subninja_default() {
        let mut w = Writer::new();
        w.pool("link_pool", 4);
        w.include("rules.ninja").unwrap();
        w.subninja("sub dir/build.ninja").unwrap();
        w.default(&["all"]).unwrap();
        w.default::<&str>(&[]).unwrap();
        assert_eq!(
            w.as_str(),
            "pool link_pool\n  depth = 4\ninclude rules.ninja\nsubninja sub$ dir/build.ninja\ndefault all\n"
        );
    }

    #[test]
    fn test_short_line_not_wrapped() {
        let mut w = Writer::with_width(20);
        w.variable("a", "b c d", 0);
        assert_eq!(w.as_str(), "a = b c d\n");
    }

    #[test]
    fn test_long_line_wrapped_at_space() {
        let mut w = Writer::with_width(8);
        w.variable("x", "aaaa bbbb", 0);
        assert_eq!(w.as_str(), "x = $\n    aaaa $\n    bbbb\n");
    }

    #[test]
    fn test_wrap_skips_escaped_space() {
        // `$ ` is an escaped space and must never become a break point.
        let mut w = Writer::with_width(10);
        w.line("aaa$ bbb ccc", 0);
        assert_eq!(w.as_str(), "aaa$ bbb $\n    ccc\n");
    }

    #[test]
    fn test_wrap_breaks_after_escaped_dollar() {
        // `$$ ` is a literal dollar followed by a real space.
        let mut w = Writer::with_width(6);
        w.line("a$$ bbbbb", 0);
        assert_eq!(w.as_str(), "a$$ $\n    bbbbb\n");
    }

    #[test]
    fn test_wrap_counts_dollar_at_line_start() {
        let mut w = Writer::with_width(4);
        w.line("$ aaaaa", 0);
        assert_eq!(w.as_str(), "$ aaaaa\n");
    }

    #[test]
    fn test_wrap_looks_past_budget() {
        let mut w = Writer::with_width(10);
        w.line("aaaaaaaaaaaa bb", 0);
        assert_eq!(w.as_str(), "aaaaaaaaaaaa $\n    bb\n");
    }

    #[test]
    fn test_unbreakable_line_emitted_whole() {
        let mut w = Writer::with_width(5);
        w.line("aaaaaaaaaa", 0);
        w.line("aaa$ bbbbbb", 0);
        assert_eq!(w.as_str(), "aaaaaaaaaa\naaa$ bbbbbb\n");
    }

    #[test]
    fn test_wrap_continuation_indent_for_nested_line() {
        let mut w = Writer::with_width(18);
        w.variable("flags", "-Wall -Wextra -Werror", 1);
        assert_eq!(w.as_str(), "  flags = -Wall $\n      -Wextra $\n      -Werror\n");
    }

    #[test]
    fn test_wrapped_lines_within_width_and_rejoinable() {
        let words: Vec<String> = (0..60).map(|i| format!("obj/file_{}$ x.o", i)).collect();
        let original = format!("build out: link {}", words.join(" "));

        let mut w = Writer::with_width(50);
        w.line(&original, 0);
        let text = w.finish();

        for line in text.lines() {
            assert!(line.len() <= 50, "line too long: {:?}", line);
        }
        assert_eq!(join_continuations(&text), vec![original]);
    }

    #[test]
    fn test_wrapping_only_at_even_dollar_runs() {
        let original = "a$$$ b$$ c$ d e$$$$ f ".repeat(10);
        let original = original.trim_end();
        let mut w = Writer::with_width(12);
        w.line(original, 0);
        let text = w.finish();

        for line in text.lines() {
            if let Some(head) = line.strip_suffix(" $") {
                let dollars = head.bytes().rev().take_while(|&b| b == b'$').count();
                assert_eq!(dollars % 2, 0, "split after odd `$` run: {:?}", line);
            }
        }
        assert_eq!(join_continuations(&text), vec![original.to_string()]);
    }

    #[test]
    fn test_comment_wraps_words() {
        let mut w = Writer::with_width(12);
        w.comment("one two three four");
        assert_eq!(w.as_str(), "# one two\n# three four\n");
    }

    #[test]
    fn test_comment_keeps_long_words_and_hyphens() {
        let mut w = Writer::with_width(10);
        w.comment("a very-long-hyphenated-word b");
        assert_eq!(w.as_str(), "# a\n# very-long-hyphenated-word\n# b\n");
    }

    #[test]
    fn test_comment_empty_writes_nothing() {
        let mut w = Writer::new();
        w.comment("   ");
        assert_eq!(w.as_str(), "");
    }
}
