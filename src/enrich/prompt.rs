use crate::contact::Contact;
use serde::Serialize;

const INSTRUCTIONS: &[&str] = &[
    "Return only valid JSON shaped as {\"contacts\":[{\"index\":num,\"valid\":bool,\"description\":str,\"reason\":str}]}, with exactly one entry per input contact.",
    "Do not add extra text or ``` blocks.",
    "description must be a short title (at most 25 characters) naming the contact's role.",
    "description must not repeat the literal value (email/phone). Use phrases like 'Press email', 'Support phone', 'Newsroom email'.",
    "If the role cannot be inferred, use 'General contact'. Leave description empty when the contact is not valid.",
    "reason must be empty when the value is valid; otherwise explain why in at most 40 characters.",
];

const STRICT_INSTRUCTION: &str = "Reply with exactly one valid JSON object and nothing else. Do not include additional text, comments or ``` blocks.";

#[derive(Serialize)]
struct PromptPayload<'a> {
    instructions: String,
    contacts: Vec<PromptContact<'a>>,
}

#[derive(Serialize)]
struct PromptContact<'a> {
    index: usize,
    kind: &'a str,
    value: &'a str,
    description: &'a str,
    page: &'a str,
}

/// Builds the enrichment prompt for a batch
///
/// The prompt is a JSON document holding the instructions and the batch, each
/// contact numbered from 1. The strict variant adds a demand for one bare
/// JSON object.
pub fn build_prompt(contacts: &[Contact], strict: bool) -> String {
    let mut instructions: Vec<&str> = INSTRUCTIONS.to_vec();
    if strict {
        instructions.push(STRICT_INSTRUCTION);
    }

    let payload = PromptPayload {
        instructions: instructions.join(" "),
        contacts: contacts
            .iter()
            .enumerate()
            .map(|(i, c)| PromptContact {
                index: i + 1,
                kind: c.kind.label(),
                value: &c.value,
                description: &c.description,
                page: &c.source_url,
            })
            .collect(),
    };

    serde_json::to_string(&payload).unwrap_or_default()
}
