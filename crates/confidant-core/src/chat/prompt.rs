//! Prompt assembly for the completion call.
//!
//! Layout sent to the model:
//! ```text
//! system:    {persona}
//! {role}:    {history[0].content}
//! ...
//! {role}:    {history[n-1].content}
//! user:      {prompt}
//! ```

use confidant_types::llm::{Message, MessageRole};
use confidant_types::turn::Turn;

/// The built-in counselor persona prepended to every prompt.
pub const DEFAULT_PERSONA: &str = "あなたは親身な心理カウンセラーです。ユーザーの悩みに対して適切なアドバイスを早急かつ簡潔に教えてください。";

/// Assemble the ordered message list for one completion.
///
/// `history` must already be in chronological order. The output always has
/// `history.len() + 2` entries: the persona first, the new prompt last.
pub fn build_messages(persona: &str, history: &[Turn], prompt: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);

    messages.push(Message::new(MessageRole::System, persona));
    messages.extend(history.iter().map(Turn::to_message));
    messages.push(Message::new(MessageRole::User, prompt));

    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(id: i64, role: MessageRole, content: &str) -> Turn {
        Turn {
            id,
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_empty_history_yields_system_and_user() {
        let messages = build_messages(DEFAULT_PERSONA, &[], "Hello");

        assert_eq!(
            messages,
            vec![
                Message::new(MessageRole::System, DEFAULT_PERSONA),
                Message::new(MessageRole::User, "Hello"),
            ]
        );
    }

    #[test]
    fn test_history_is_kept_in_order_between_persona_and_prompt() {
        let history = vec![
            turn(1, MessageRole::User, "眠れません"),
            turn(2, MessageRole::Assistant, "寝る前にスマホを控えてみましょう"),
            turn(3, MessageRole::User, "試してみます"),
            turn(4, MessageRole::Assistant, "応援しています"),
        ];

        let messages = build_messages("persona", &history, "また眠れませんでした");

        assert_eq!(messages.len(), history.len() + 2);
        assert_eq!(messages[0], Message::new(MessageRole::System, "persona"));
        for (msg, turn) in messages[1..=history.len()].iter().zip(&history) {
            assert_eq!(msg.role, turn.role);
            assert_eq!(msg.content, turn.content);
        }
        assert_eq!(
            messages.last(),
            Some(&Message::new(MessageRole::User, "また眠れませんでした"))
        );
    }

    #[test]
    fn test_stored_system_turns_pass_through() {
        let history = vec![turn(1, MessageRole::System, "earlier instruction")];

        let messages = build_messages("persona", &history, "hi");

        assert_eq!(messages[1].role, MessageRole::System);
        assert_eq!(messages[0].content, "persona");
    }
}
