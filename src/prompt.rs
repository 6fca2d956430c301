use crate::model::types::{Content, GenerationConfig};
use crate::web::models::{ChatRequest, Role};

/// Persona sent ahead of every conversation.
pub const SYSTEM_INSTRUCTION: &str = include_str!("../prompts/system_instruction.txt");

/// Fixed prompt policy, built once at startup.
#[derive(Debug, Clone)]
pub struct PromptSettings {
    pub system_instruction: String,
    pub generation: GenerationConfig,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            system_instruction: SYSTEM_INSTRUCTION.trim_end().to_string(),
            generation: GenerationConfig::relay_default(),
        }
    }
}

/// Assembles the full upstream context: instruction, history in order, then
/// the new message. Nothing is dropped or merged regardless of length.
pub fn build_context(system_instruction: &str, request: &ChatRequest) -> Vec<Content> {
    let mut contents = Vec::with_capacity(request.history.len() + 2);
    contents.push(Content::user(system_instruction));
    contents.extend(
        request
            .history
            .iter()
            .map(|turn| Content::new(turn.role, turn.text.as_str())),
    );
    contents.push(Content::new(Role::User, request.message.as_str()));
    contents
}
