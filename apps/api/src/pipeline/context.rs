//! Append-only log of step outputs, rendered into later prompts.

#[derive(Debug, Clone)]
pub struct ContextEntry {
    pub title: &'static str,
    pub output: String,
}

impl ContextEntry {
    pub fn render(&self) -> String {
        format!("**{}**:\n{}\n\n", self.title, self.output)
    }
}

/// Scoped to one pipeline run. Entries are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    entries: Vec<ContextEntry>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, title: &'static str, output: String) {
        self.entries.push(ContextEntry { title, output });
    }

    pub fn block_count(&self) -> usize {
        self.entries.len()
    }

    /// All blocks concatenated in insertion order, untruncated.
    pub fn render(&self) -> String {
        self.entries.iter().map(ContextEntry::render).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context_renders_nothing() {
        let context = PipelineContext::new();
        assert_eq!(context.block_count(), 0);
        assert_eq!(context.render(), "");
    }

    #[test]
    fn test_render_keeps_insertion_order() {
        let mut context = PipelineContext::new();
        context.push("Stammdaten extrahieren", "Häftling X, Beamter Y".to_string());
        context.push("Ereignisse chronologisch ordnen", "Um 14:00 schlug X.".to_string());

        assert_eq!(context.block_count(), 2);
        assert_eq!(
            context.render(),
            "**Stammdaten extrahieren**:\nHäftling X, Beamter Y\n\n\
             **Ereignisse chronologisch ordnen**:\nUm 14:00 schlug X.\n\n"
        );
    }
}
