use crate::domain::Chunk;

pub const DEFAULT_PROMPT_TEMPLATE: &str = "\
You are an expert research assistant. Use the provided context to answer the query.
If unsure, state that you don't know. Be concise and factual (max 3 sentences).

Query: {user_query}
Context: {document_context}
Answer:
";

const QUERY_PLACEHOLDER: &str = "{user_query}";
const CONTEXT_PLACEHOLDER: &str = "{document_context}";

/// Instruction template with `{user_query}` and `{document_context}` slots.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Fills both slots in a single pass, so placeholder text inside the
    /// query or the document is never expanded a second time.
    pub fn render(&self, user_query: &str, document_context: &str) -> String {
        let mut rendered = String::with_capacity(
            self.template.len() + user_query.len() + document_context.len(),
        );
        let mut rest = self.template.as_str();

        loop {
            let next_query = rest.find(QUERY_PLACEHOLDER);
            let next_context = rest.find(CONTEXT_PLACEHOLDER);

            let (index, placeholder, value) = match (next_query, next_context) {
                (Some(q), Some(c)) if q < c => (q, QUERY_PLACEHOLDER, user_query),
                (_, Some(c)) => (c, CONTEXT_PLACEHOLDER, document_context),
                (Some(q), None) => (q, QUERY_PLACEHOLDER, user_query),
                (None, None) => break,
            };

            rendered.push_str(&rest[..index]);
            rendered.push_str(value);
            rest = &rest[index + placeholder.len()..];
        }

        rendered.push_str(rest);
        rendered
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT_TEMPLATE)
    }
}

/// Joins chunk texts with a blank line, in the order given.
pub fn build_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
