use smol_str::SmolStr;

/// A parsed `<* ... *>` documentation comment.
///
/// The free-text body comes first; `@tag` lines after it are contracts
/// (`@param`, `@require`, `@ensure`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocComment {
    body: String,
    contracts: Vec<(SmolStr, String)>,
}

impl DocComment {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            contracts: Vec::new(),
        }
    }

    /// Parse the raw comment text including the `<*`/`*>` delimiters.
    pub fn parse(raw: &str) -> Self {
        let inner = raw
            .trim()
            .trim_start_matches("<*")
            .trim_end_matches("*>")
            .trim();

        let mut body_lines: Vec<&str> = Vec::new();
        let mut contracts: Vec<(SmolStr, String)> = Vec::new();
        for line in inner.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix('@') {
                let (tag, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                contracts.push((SmolStr::new(format!("@{tag}")), text.trim().to_string()));
            } else if let Some((_, last)) = contracts.last_mut() {
                // continuation of the previous contract line
                if !line.is_empty() {
                    if !last.is_empty() {
                        last.push(' ');
                    }
                    last.push_str(line);
                }
            } else {
                body_lines.push(line);
            }
        }

        Self {
            body: body_lines.join("\n").trim().to_string(),
            contracts,
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn contracts(&self) -> &[(SmolStr, String)] {
        &self.contracts
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.contracts.is_empty()
    }

    /// Markdown rendering: body first, then one `**@tag** text` line per
    /// contract.
    pub fn display_body(&self) -> String {
        let mut out = String::new();
        if !self.body.is_empty() {
            out.push_str(&self.body);
        }
        for (tag, text) in &self.contracts {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(&format!("**{tag}**"));
            if !text.is_empty() {
                out.push(' ');
                out.push_str(text);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_body_and_contracts() {
        let doc = DocComment::parse(
            "<* Frees the memory.\n Call once.\n @param ptr \"the pointer\"\n @require ptr != null *>",
        );
        assert_eq!(doc.body(), "Frees the memory.\nCall once.");
        assert_eq!(doc.contracts().len(), 2);
        assert_eq!(doc.contracts()[0].0, "@param");
        assert_eq!(doc.contracts()[0].1, "ptr \"the pointer\"");
    }

    #[test]
    fn renders_contracts_as_markdown() {
        let doc = DocComment::parse("<* Adds numbers.\n @pure *>");
        assert_eq!(doc.display_body(), "Adds numbers.\n\n**@pure**");
    }

    #[test]
    fn empty_comment_renders_nothing() {
        let doc = DocComment::parse("<* *>");
        assert!(doc.is_empty());
        assert_eq!(doc.display_body(), "");
    }
}
