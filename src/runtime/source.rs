//! Source text retrieval for definitions

/// Full source lines covering the byte range `start..end`
pub fn source_lines(source: &str, start: usize, end: usize) -> Option<&str> {
    if start > end || end > source.len() {
        return None;
    }
    let line_start = source.get(..start)?.rfind('\n').map_or(0, |i| i + 1);
    let line_end = source
        .get(end..)?
        .find('\n')
        .map_or(source.len(), |i| end + i + 1);
    source.get(line_start..line_end)
}

/// Strips the first line's indentation from every line.
///
/// Lines indented less than the first line (continuation lines inside
/// brackets or strings) lose only the whitespace they have.
pub fn dedent(lines: &str) -> String {
    let indent = lines
        .lines()
        .next()
        .map_or(0, |first| first.len() - first.trim_start().len());

    lines
        .split_inclusive('\n')
        .map(|line| {
            let strip = line
                .char_indices()
                .take_while(|(i, c)| *i < indent && (*c == ' ' || *c == '\t'))
                .count();
            &line[strip..]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_lines_expands_to_whole_lines() {
        let source = "class A:\n    def f(self):\n        pass\nx = 1\n";
        let start = source.find("def").unwrap();
        let end = source.find("pass").unwrap() + "pass".len();
        assert_eq!(
            source_lines(source, start, end),
            Some("    def f(self):\n        pass\n")
        );
    }

    #[test]
    fn test_source_lines_rejects_bad_range() {
        assert_eq!(source_lines("abc", 2, 10), None);
    }

    #[test]
    fn test_dedent_method() {
        let method = "    def f(self):\n        self.x = 1\n";
        assert_eq!(dedent(method), "def f(self):\n    self.x = 1\n");
    }

    #[test]
    fn test_dedent_keeps_shallow_continuation_lines() {
        let method = "\tdef f(self):\n\t    self.text = '''\na'''\n";
        assert_eq!(dedent(method), "def f(self):\n    self.text = '''\na'''\n");
    }
}
