//! The Guruji persona: instruction preamble, fallback apologies and the
//! emoji bar.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::gemini_client::PromptRequest;

pub(crate) const INSTRUCTIONS: &str = r#"Keep the responses extremely straightforward and natural. Always provide exact answers without any metaphors or vague statements. For example, if asked, "Will my ex come back?" respond directly with, "Yes, she will return in 2 months; she needs time." If asked about marriage, say something like, "You will get married on November 22nd next year."

Use simple, easy-to-understand language, and maintain a conversational natural tone. After every 3rd or 4th response, ask a personal question to create an engaging conversation, like, "Are you taking care of yourself?" or "How have you been feeling lately?"

Include Indian cultural references and occasional Hindi phrases, such as "Dhyaan rakhna" (take care) or "Aashirwad" (blessings). Ensure all responses are positive and uplifting, offering clear guidance. Remember, you are a friendly person providing advice, not a bot or AI. Don't use special characters. If you're unsure about a response, ask yourself, Would a wise Indian astrologer say this?. Don't be Shakespeare. Keep it casual."#;

const INPUT_SEPARATOR: &str = "\n\n                    input: ";

/// Shown in place of a reply whenever the API call fails for any reason.
pub const FALLBACK_MESSAGES: [&str; 7] = [
    "Mujhe samajh nahi aaya. Kya aap thoda aur spasht kar sakte hain?",
    "Ye thoda sa samajh mein nahi aaya. Kripya mujhe aur detail mein batayein.",
    "Mujhe ye samajhne mein thodi dikkat ho rahi hai. Kya aap dobara bata sakte hain?",
    "Kya aap isko thoda aur samjha sakte hain? Main madad karna chahta hoon.",
    "Mujhe aapka sawaal samajh nahi aaya. Kya aap isse kuch aur badal sakte hain?",
    "Mujhe yeh samajhne mein thoda waqt lagega. Kya aap kuch aur share kar sakte hain?",
    "Yeh kuch samajh nahi aaya. Kya aap mujhe aur information de sakte hain?",
];

pub const EMOJIS: [&str; 8] = ["😊", "😂", "🙏", "❤️", "🙌", "✨", "🌟", "🎉"];

/// Wrap raw user input in the persona instructions. No history is included.
pub fn build_prompt(input: &str) -> PromptRequest {
    let mut text = String::with_capacity(INSTRUCTIONS.len() + INPUT_SEPARATOR.len() + input.len());
    text.push_str(INSTRUCTIONS);
    text.push_str(INPUT_SEPARATOR);
    text.push_str(input);
    PromptRequest::new(text)
}

pub fn pick_fallback<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    // FALLBACK_MESSAGES is a non-empty const array
    FALLBACK_MESSAGES.choose(rng).copied().unwrap_or(FALLBACK_MESSAGES[0])
}

/// 1-based lookup, as shown in the emoji bar.
pub fn emoji(index: usize) -> Option<&'static str> {
    index.checked_sub(1).and_then(|i| EMOJIS.get(i)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini_client::GENERATION_CONFIG;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn prompt_ends_with_raw_input() {
        let request = build_prompt("  Will my ex come back?");
        assert!(request.text.starts_with(INSTRUCTIONS));
        assert_eq!(
            &request.text[INSTRUCTIONS.len()..],
            "\n\n                    input:   Will my ex come back?"
        );
        assert_eq!(request.generation_config, GENERATION_CONFIG);
    }

    #[test]
    fn prompt_is_independent_of_previous_calls() {
        let first = build_prompt("a");
        let second = build_prompt("b");
        assert!(!second.text.contains("input: a"));
        assert_eq!(first.text.len(), second.text.len());
    }

    #[test]
    fn fallback_messages_are_distinct_and_non_empty() {
        let unique: HashSet<_> = FALLBACK_MESSAGES.iter().collect();
        assert_eq!(unique.len(), FALLBACK_MESSAGES.len());
        assert!(FALLBACK_MESSAGES.len() >= 7);
        assert!(FALLBACK_MESSAGES.iter().all(|m| !m.trim().is_empty()));
    }

    #[test]
    fn fallback_picks_cover_the_whole_set() {
        let mut rng = StdRng::seed_from_u64(7);
        let seen: HashSet<_> = (0..500).map(|_| pick_fallback(&mut rng)).collect();
        assert_eq!(seen.len(), FALLBACK_MESSAGES.len());
    }

    #[test]
    fn emoji_lookup_is_one_based() {
        assert_eq!(emoji(1), Some("😊"));
        assert_eq!(emoji(8), Some("🎉"));
        assert_eq!(emoji(0), None);
        assert_eq!(emoji(9), None);
    }
}
