use indoc::indoc;
use std::fmt::Write;

use crate::{message::Message, pinecone::Match};

pub const SYSTEM_PROMPT: &str = indoc! {"
    You are an AI assistant designed to help students find the best professors according to their specific queries. Your goal is to provide students with up to the top 3 professors that match their criteria, ranked by relevance. If fewer than 3 professors match the query, you should return only the matching professors. If no professors match the description, inform the user politely.

    When responding, consider factors such as teaching style, difficulty, student feedback, and overall ratings. Always aim to give concise, helpful, and accurate information based on the student's request.

    Example queries include:
    - \"Who are the best Computer Science professors at UC Berkeley?\"
    - \"Can you recommend a professor who is known for being approachable and supportive in the Psychology department?\"
    - \"I need a professor who has great ratings for Math 101 and isn't too difficult.\"

    In these cases:
    1. If there are 3 or more professors that match the criteria, list the top 3 with brief explanations.
    2. If there are 1-2 professors, provide only those with the relevant explanations.
    3. If no professors match, explain that there are no exact matches but offer advice or suggest trying different criteria.

    Always be polite, informative, and focused on helping students make informed decisions.
"};

const RESULTS_HEADER: &str = "Returned Result from vector db (done automatically):";

/// Renders the retrieved reviews as a plain-text block, one entry per match.
#[must_use]
pub fn format_matches(matches: &[Match]) -> String {
    let mut block = String::from(RESULTS_HEADER);

    for matched in matches {
        let _ = write!(
            block,
            "\nProfessor: {}\nReview: {}\nSubject: {}\nStar: {}\n\n",
            matched.id, matched.metadata.review, matched.metadata.subject, matched.metadata.star
        );
    }

    block
}

#[must_use]
pub fn augment(query: &str, matches: &[Match]) -> String {
    format!("{query}{}", format_matches(matches))
}

/// Builds the message list sent to the model: the system prompt, the earlier turns untouched,
/// and the augmented question in place of the last message.
#[must_use]
pub fn compose(history: &[Message], augmented: String) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);

    messages.push(Message::system(SYSTEM_PROMPT));
    messages.extend_from_slice(history);
    messages.push(Message::user(augmented));

    messages
}
