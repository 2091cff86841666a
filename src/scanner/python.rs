//! Python docstring extraction on top of tree-sitter.
//!
//! Produces one unit for the module and one per `class`/`def` anywhere in the
//! file, nested definitions included. A unit's docstring is its first body
//! statement when that statement is a bare string literal.

use crate::error::{Error, Result};
use crate::model::{ParsedFile, SourceUnit, UnitKind};
use std::path::Path;
use tree_sitter::{Language, Node, Parser};

/// Parse Python source text into its documented units.
///
/// `path` is only used for naming the module and for error reporting.
pub fn parse_source(path: &Path, source: &str) -> Result<ParsedFile> {
    let parse_error = |line: usize, message: &str| Error::Parse {
        path: path.to_path_buf(),
        line,
        message: message.to_string(),
    };

    let language: Language = tree_sitter_python::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| parse_error(0, &e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| parse_error(0, "parser produced no tree"))?;
    let root = tree.root_node();

    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        return Err(parse_error(line, "invalid Python syntax"));
    }
    // The grammar still accepts some constructs Python 3 rejects
    if let Some((line, message)) = first_rejected_construct(root) {
        return Err(parse_error(line, message));
    }

    let module_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut units = vec![SourceUnit {
        kind: UnitKind::Module,
        name: module_name,
        file_path: path.to_path_buf(),
        line: 1,
        docstring: docstring_of(root, source),
    }];
    collect_definitions(root, source, path, &mut units);

    Ok(ParsedFile {
        path: path.to_path_buf(),
        units,
    })
}

/// Walk the tree in pre-order, recording every class and function.
fn collect_definitions(node: Node, source: &str, path: &Path, units: &mut Vec<SourceUnit>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        let kind = match child.kind() {
            "class_definition" => Some(UnitKind::Class),
            "function_definition" => Some(UnitKind::Function),
            _ => None,
        };

        if let Some(kind) = kind {
            let name = child
                .child_by_field_name("name")
                .map(|n| node_text(&n, source).to_string())
                .unwrap_or_default();
            let docstring = child
                .child_by_field_name("body")
                .and_then(|body| docstring_of(body, source));
            units.push(SourceUnit {
                kind,
                name,
                file_path: path.to_path_buf(),
                line: child.start_position().row + 1,
                docstring,
            });
        }

        collect_definitions(child, source, path, units);
    }
}

/// Docstring of a module or block: the leading string-literal statement.
fn docstring_of(body: Node, source: &str) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;

    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }

    let mut expr = first.named_child(0)?;
    while expr.kind() == "parenthesized_expression" && expr.named_child_count() == 1 {
        expr = expr.named_child(0)?;
    }
    let raw = match expr.kind() {
        "string" => string_value(expr, source)?,
        "concatenated_string" => {
            let mut cursor = expr.walk();
            let parts = expr
                .named_children(&mut cursor)
                .map(|part| string_value(part, source))
                .collect::<Option<Vec<_>>>()?;
            parts.concat()
        }
        _ => return None,
    };

    Some(clean_docstring(&raw))
}

/// Literal value of a `string` node. f-strings and bytes are not docstrings.
fn string_value(node: Node, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let start = node.child(0)?;
    let end = node.child(node.child_count().checked_sub(1)?)?;
    if start.kind() != "string_start" || end.kind() != "string_end" {
        return None;
    }

    let prefix = node_text(&start, source)
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }

    let body = &source[start.end_byte()..end.start_byte()];
    if prefix.contains('r') {
        Some(body.to_string())
    } else {
        Some(unescape(body))
    }
}

/// Decode Python string escape sequences.
///
/// Unknown escapes keep their backslash, as Python does. `\N{NAME}` is kept
/// verbatim: decoding it needs the Unicode name table.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut digits = String::from(next);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                push_code_point(&mut out, &digits, 8, next);
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let mut digits = String::new();
                while digits.len() < width {
                    match chars.peek() {
                        Some(d) if d.is_ascii_hexdigit() => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                if digits.len() == width {
                    push_code_point(&mut out, &digits, 16, next);
                } else {
                    out.push('\\');
                    out.push(next);
                    out.push_str(&digits);
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

fn push_code_point(out: &mut String, digits: &str, radix: u32, escape: char) {
    match u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
    {
        Some(c) => out.push(c),
        None => {
            out.push('\\');
            if radix == 16 {
                out.push(escape);
            }
            out.push_str(digits);
        }
    }
}

/// Normalize docstring indentation the way Python's `inspect.cleandoc` does.
///
/// Tabs expand to 8 columns; the first line loses its leading whitespace, the
/// rest lose their common indentation; leading and trailing blank lines go.
pub fn clean_docstring(raw: &str) -> String {
    let lines: Vec<String> = raw.lines().map(expand_tabs).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_width(l))
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<&str> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            cleaned.push(line.trim_start());
        } else {
            cleaned.push(skip_chars(line, margin));
        }
    }

    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    let leading = cleaned.iter().take_while(|l| l.trim().is_empty()).count();

    cleaned[leading..].join("\n")
}

fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = 8 - column % 8;
            out.push_str(&" ".repeat(pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Drop up to `n` leading whitespace characters.
fn skip_chars(line: &str, n: usize) -> &str {
    let mut rest = line;
    for _ in 0..n {
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if c.is_whitespace() => rest = chars.as_str(),
            _ => break,
        }
    }
    rest
}

fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error_line)
}

/// First node the grammar accepts but Python 3 does not: Python 2 `print` and
/// `exec` statements, or a parameter without a default after one with a default.
fn first_rejected_construct(node: Node) -> Option<(usize, &'static str)> {
    let line = node.start_position().row + 1;
    match node.kind() {
        "print_statement" => return Some((line, "Python 2 print statement")),
        "exec_statement" => return Some((line, "Python 2 exec statement")),
        "parameters" | "lambda_parameters" => {
            if let Some(param) = non_default_after_default(node) {
                return Some((
                    param.start_position().row + 1,
                    "parameter without a default follows a default parameter",
                ));
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    children.into_iter().find_map(first_rejected_construct)
}

fn non_default_after_default(params: Node) -> Option<Node> {
    let mut cursor = params.walk();
    let mut seen_default = false;
    for param in params.named_children(&mut cursor) {
        // `*args: T` is a typed_parameter wrapping the splat
        let kind = match param.kind() {
            "typed_parameter" => param.named_child(0).map_or("typed_parameter", |n| n.kind()),
            other => other,
        };
        match kind {
            "default_parameter" | "typed_default_parameter" => seen_default = true,
            "identifier" | "tuple_pattern" if seen_default => {
                return Some(param);
            }
            // Keyword-only parameters may omit defaults
            "list_splat_pattern" | "keyword_separator" | "dictionary_splat_pattern" => {
                return None;
            }
            _ => {}
        }
    }
    None
}

fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ParsedFile {
        parse_source(Path::new("pkg/store.py"), source).unwrap()
    }

    fn docstrings(file: &ParsedFile) -> Vec<(UnitKind, &str, Option<&str>)> {
        file.units
            .iter()
            .map(|u| (u.kind, u.name.as_str(), u.docstring.as_deref()))
            .collect()
    }

    #[test]
    fn module_class_and_function_docstrings() {
        let file = parse(indoc! {r#"
            """Module docs."""

            class Store:
                """
                Class docs.

                    Indented detail.
                """

                def get(self, key):
                    '''Fetch a key.'''
                    return key

            def helper():
                return 1
        "#});

        assert_eq!(
            docstrings(&file),
            vec![
                (UnitKind::Module, "store", Some("Module docs.")),
                (
                    UnitKind::Class,
                    "Store",
                    Some("Class docs.\n\n    Indented detail.")
                ),
                (UnitKind::Function, "get", Some("Fetch a key.")),
                (UnitKind::Function, "helper", None),
            ]
        );
        assert_eq!(file.units[1].line, 3);
        assert_eq!(file.path, Path::new("pkg/store.py"));
    }

    #[test]
    fn empty_file_has_only_the_module_unit() {
        let file = parse("");
        assert_eq!(file.units.len(), 1);
        assert_eq!(file.units[0].kind, UnitKind::Module);
        assert_eq!(file.units[0].docstring, None);
    }

    #[test]
    fn comment_before_docstring_is_ignored() {
        let file = parse("# coding: utf-8\n\"\"\"Docs.\"\"\"\n");
        assert_eq!(file.units[0].docstring.as_deref(), Some("Docs."));
    }

    #[test]
    fn string_after_other_statement_is_not_a_docstring() {
        let file = parse("import os\n\"\"\"Not docs.\"\"\"\n");
        assert_eq!(file.units[0].docstring, None);
    }

    #[test]
    fn fstring_and_bytes_are_not_docstrings() {
        let file = parse("def a():\n    f\"x{1}\"\n\ndef b():\n    b'x'\n");
        assert_eq!(file.units[1].docstring, None);
        assert_eq!(file.units[2].docstring, None);
    }

    #[test]
    fn escapes_are_decoded_unless_raw() {
        let file = parse("def a():\n    \"one\\ntwo\"\n\ndef b():\n    r\"one\\ntwo\"\n");
        assert_eq!(file.units[1].docstring.as_deref(), Some("one\ntwo"));
        assert_eq!(file.units[2].docstring.as_deref(), Some("one\\ntwo"));
    }

    #[test]
    fn concatenated_strings_form_one_docstring() {
        let file = parse("def a():\n    \"one \" 'two'\n");
        assert_eq!(file.units[1].docstring.as_deref(), Some("one two"));
    }

    #[test]
    fn decorated_and_async_definitions_are_found() {
        let file = parse(indoc! {r#"
            @dataclass
            class Config:
                """Config docs."""

            async def fetch():
                """Fetch docs."""
        "#});
        let names: Vec<_> = file.units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["store", "Config", "fetch"]);
        assert_eq!(file.units[2].docstring.as_deref(), Some("Fetch docs."));
    }

    #[test]
    fn syntax_error_reports_line() {
        let err = parse_source(Path::new("bad.py"), "x = 1\ndef broken(:\n    pass\n").unwrap_err();
        match err {
            Error::Parse { path, line, .. } => {
                assert_eq!(path, Path::new("bad.py"));
                assert!(line >= 1, "line {}", line);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn rejected_line(source: &str) -> usize {
        match parse_source(Path::new("old.py"), source) {
            Err(Error::Parse { line, .. }) => line,
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn python2_statements_are_rejected() {
        assert_eq!(rejected_line("x = 1\nprint \"hello\"\n"), 2);
        assert_eq!(rejected_line("exec \"x = 1\"\n"), 1);
    }

    #[test]
    fn print_and_exec_calls_are_accepted() {
        let file = parse("print(\"hello\")\nexec(\"x = 1\")\n");
        assert_eq!(file.units.len(), 1);
    }

    #[test]
    fn non_default_parameter_after_default_is_rejected() {
        assert_eq!(rejected_line("def f(a=1, b):\n    pass\n"), 1);
        assert_eq!(rejected_line("def f(a: int = 1, b: int):\n    pass\n"), 1);
        assert_eq!(rejected_line("g = lambda a=1, b: a\n"), 1);
    }

    #[test]
    fn keyword_only_parameters_may_omit_defaults() {
        let file = parse(indoc! {"
            def f(a, b=1, *args, c):
                pass

            def g(a=1, *, b):
                pass

            def h(a=1, *rest: int, b, **kw):
                pass
        "});
        assert_eq!(file.units.len(), 4);
    }

    #[test]
    fn parenthesized_string_is_a_docstring() {
        let file = parse("class A:\n    (\"\"\"doc\"\"\")\n\ndef f():\n    (\"one \" 'two')\n");
        assert_eq!(file.units[1].docstring.as_deref(), Some("doc"));
        assert_eq!(file.units[2].docstring.as_deref(), Some("one two"));
    }

    #[test]
    fn parenthesized_tuple_is_not_a_docstring() {
        let file = parse("def f():\n    (\"a\", \"b\")\n");
        assert_eq!(file.units[1].docstring, None);
    }

    #[test]
    fn crlf_line_continuation_is_dropped() {
        assert_eq!(unescape("one\\\r\ntwo"), "onetwo");
        let file = parse("def f():\r\n    \"\"\"one \\\r\ntwo\"\"\"\r\n");
        assert_eq!(file.units[1].docstring.as_deref(), Some("one two"));
    }

    #[test]
    fn cleandoc_strips_margin_and_blank_edges() {
        let raw = "\n    first\n      second\n\n    third\n    ";
        assert_eq!(clean_docstring(raw), "first\n  second\n\nthird");
    }

    #[test]
    fn cleandoc_expands_tabs() {
        assert_eq!(clean_docstring("a\n\tb\n\t\tc"), "a\nb\n        c");
    }

    #[test]
    fn unescape_handles_numeric_escapes() {
        assert_eq!(unescape(r"\x41\101é\N{DASH}"), "AAé\\N{DASH}");
        assert_eq!(unescape("line\\\ncontinued"), "linecontinued");
    }
}
