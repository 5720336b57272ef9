use crate::models::{ChatRequest, Mode};
use crate::providers::ProviderId;

// how much of the user's message the simulation echoes back
const ECHO_CHARS: usize = 20;

pub const SIMULATION_NOTICE: &str = "\n\n[Simulation mode: no provider API keys are configured, so this answer was generated locally. Set a key such as GROQ_API_KEY to get real responses.]";

// Canned system prompt for a mode. `provider` is the provider the user
// asked for, which is not always the one that ends up answering.
pub fn system_prompt(mode: Mode, provider: ProviderId) -> String {
    let profile = provider.profile();
    let intro = format!(
        "You are a helpful AI assistant provided by {} (provider id: {}).",
        profile.display_name, profile.id
    );

    let task = match mode {
        Mode::Default => {
            "Answer the user's questions clearly and concisely. Use markdown and fenced code blocks where they help."
        }
        Mode::Rag => {
            "Answer using the retrieved context supplied in the conversation. Cite the passages you rely on and say so when the context does not contain the answer."
        }
        Mode::Document => {
            "Analyze the document content the user provides. Summarize its structure and key points and answer questions about it precisely."
        }
        Mode::Image => {
            "The user is working with images. Describe visual content in detail, or write a precise prompt for generating the requested image."
        }
        Mode::Audio => {
            "The user is working with audio. Treat the text as a transcript, summarize what was said and answer questions about it."
        }
    };

    format!("{} {}", intro, task)
}

fn mode_phrase(mode: Mode) -> &'static str {
    match mode {
        Mode::Default => "In a live session the selected model would answer this directly.",
        Mode::Rag => "In RAG mode the answer would be grounded in passages retrieved from your documents.",
        Mode::Document => "In document mode the uploaded document would be analyzed and summarized.",
        Mode::Image => "In image mode the model would describe or generate an image for this prompt.",
        Mode::Audio => "In audio mode the model would work from the transcribed audio.",
    }
}

// Deterministic stand-in answer used when no credentials exist. No I/O.
pub fn simulation_text(request: &ChatRequest) -> String {
    let echo: String = request.last_user_content().chars().take(ECHO_CHARS).collect();
    format!(
        "Here's a response to your query about \"{}...\". {}{}",
        echo,
        mode_phrase(request.mode),
        SIMULATION_NOTICE
    )
}
