//! Chat prompts for the three LLM call sites.

use crate::llm::ChatMessage;
use crate::models::RetrievedChunk;

const CLASSIFY_SYSTEM: &str = "You are a helpful assistant that classifies the user input as \
either a 'document' or a 'question'.\n\
You will return only the classification result and nothing more.";

/// Worked examples shown before the real input, as (user, assistant) turns.
pub const CLASSIFY_EXAMPLES: [(&str, &str); 2] = [
    (
        "Please, add this document to your database: The 2025–2026 concert tour will feature performances by Taylor Swift.",
        "document",
    ),
    (
        "Where is Lady Gaga planning to give concerts during autumn 2025?",
        "question",
    ),
];

const SUMMARIZE_SYSTEM: &str = "You are a helpful assistant that summarizes documents related \
to concert tours.\n\
Your task is to extract key information from the document passed by the user and present it \
in a structured format with the following fields:\n\
- Date(s): Extract any specific dates or years mentioned in the document. If only a year is provided, include it.\n\
- Performer(s): Identify the name(s) of the artist(s) or band(s) mentioned in the document.\n\
- Location(s): List all cities or countries mentioned in the document where events will take place.\n\
- Venue(s): Extract the names of venues mentioned in the document.\n\
- Logistical notes: Summarize any logistical details, such as collaborations, merchandise, or special arrangements.";

pub fn classify(input: &str) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(CLASSIFY_SYSTEM)];
    for (user, assistant) in CLASSIFY_EXAMPLES {
        messages.push(ChatMessage::user(format!("\"{}\"", user)));
        messages.push(ChatMessage::assistant(assistant));
    }
    messages.push(ChatMessage::user(input));
    messages
}

pub fn summarize(document: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SUMMARIZE_SYSTEM),
        ChatMessage::user(document),
    ]
}

/// Every chunk goes into the system turn verbatim, in retrieval order.
pub fn answer(docs: &[RetrievedChunk], question: &str) -> Vec<ChatMessage> {
    let context = docs
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let system = format!(
        "You are a helpful assistant that answers the questions passed by the user using the given context.\n\
         You will generate a precise and informative answer and nothing more.\n\
         Do not include any other sentences or explanations than the plain answer.\n\
         Here is the context:\n\
         {}\n\n\
         Use the context and do not tell the user that you have some context provided.",
        context
    );

    vec![ChatMessage::system(system), ChatMessage::user(question)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_has_two_shots_then_input() {
        let messages = classify("Who headlines Wembley?");
        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(
            roles,
            vec!["system", "user", "assistant", "user", "assistant", "user"]
        );
        assert_eq!(messages[2].content, "document");
        assert_eq!(messages[4].content, "question");
        assert_eq!(messages[5].content, "Who headlines Wembley?");
    }

    #[test]
    fn test_summarize_lists_fields() {
        let system = &summarize("doc")[0].content;
        for field in [
            "Date(s)",
            "Performer(s)",
            "Location(s)",
            "Venue(s)",
            "Logistical notes",
        ] {
            assert!(system.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_answer_embeds_chunks_verbatim() {
        let chunk = |text: &str| RetrievedChunk {
            id: "id".to_string(),
            text: text.to_string(),
            source: "user_input".to_string(),
            score: 1.0,
        };
        let messages = answer(&[chunk("Wembley, June 21"), chunk("London")], "Where?");
        assert!(messages[0].content.contains("Wembley, June 21\n\nLondon"));
        assert_eq!(messages[1].content, "Where?");
    }
}
