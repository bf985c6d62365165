use super::node::{Child, Node};

const INDENT: &str = "  ";

impl Node {
    /// Indented textual dump, one rule or token per line. A node whose only
    /// child is a token prints on one line as `rule<TAB>token`.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.write_pretty(0, &mut out);
        out
    }

    fn write_pretty(&self, level: usize, out: &mut String) {
        out.push_str(&INDENT.repeat(level));
        out.push_str(self.rule.name());
        if let Some(token) = self.leaf() {
            out.push('\t');
            out.push_str(&token.literal);
            out.push('\n');
            return;
        }
        out.push('\n');
        for child in &self.children {
            match child {
                Child::Node(node) => node.write_pretty(level + 1, out),
                Child::Token(token) => {
                    out.push_str(&INDENT.repeat(level + 1));
                    out.push_str(&token.literal);
                    out.push('\n');
                }
            }
        }
    }
}
