//! Dialogue animator: progressive text reveal and the question → choice flow
//!
//! The animators are plain state records advanced one firing at a time by the
//! registry's dialogue timer. Each firing yields a [`Frame`] to put on the
//! target's transient display.

use crate::effects::Effect;

/// Marker appended to story text cut down for the choice prompt
pub const ELLIPSIS: &str = "...";

/// One firing's output
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub text: String,
    pub cue: Option<Effect>,
}

/// Reveals a text one character per step
#[derive(Debug, Clone)]
pub struct Typewriter {
    chars: Vec<char>,
    revealed: usize,
}

impl Typewriter {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            revealed: 0,
        }
    }

    /// Reveal one more character. Returns `true` once everything is shown.
    pub fn step(&mut self) -> bool {
        self.revealed = (self.revealed + 1).min(self.chars.len());
        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.revealed >= self.chars.len()
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The visible prefix
    pub fn shown(&self) -> String {
        self.chars[..self.revealed].iter().collect()
    }

    pub fn full(&self) -> String {
        self.chars.iter().collect()
    }

    /// Typing sound on every third character
    fn cue(&self) -> Option<Effect> {
        (self.revealed > 0 && self.revealed % 3 == 0).then_some(Effect::TypingTick)
    }
}

/// Stage of the question pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStage {
    QuestionTyping,
    QuestionHold,
    ChoiceShown,
}

/// Types the archetype's story, holds it, then shows the accept/reject prompt
#[derive(Debug, Clone)]
pub struct QuestionAnimator {
    speaker: String,
    typewriter: Typewriter,
    stage: QuestionStage,
    hold_firings: u32,
    held: u32,
    choice_text_budget: usize,
    prompt: String,
}

impl QuestionAnimator {
    pub fn new(
        speaker: &str,
        story: &str,
        hold_firings: u32,
        choice_text_budget: usize,
        prompt: &str,
    ) -> Self {
        Self {
            speaker: speaker.to_string(),
            typewriter: Typewriter::new(story),
            stage: QuestionStage::QuestionTyping,
            hold_firings,
            held: 0,
            choice_text_budget,
            prompt: prompt.to_string(),
        }
    }

    pub fn stage(&self) -> QuestionStage {
        self.stage
    }

    /// Characters of the story currently visible
    pub fn revealed(&self) -> usize {
        self.typewriter.revealed()
    }

    /// Firings spent in the hold stage
    pub fn held(&self) -> u32 {
        self.held
    }

    /// Advance one firing
    pub fn fire(&mut self) -> Frame {
        match self.stage {
            QuestionStage::QuestionTyping => {
                if self.typewriter.step() {
                    self.stage = QuestionStage::QuestionHold;
                }
                Frame {
                    text: format!("{}: {}", self.speaker, self.typewriter.shown()),
                    cue: self.typewriter.cue(),
                }
            }
            QuestionStage::QuestionHold => {
                self.held += 1;
                let mut cue = None;
                if self.held >= self.hold_firings {
                    self.stage = QuestionStage::ChoiceShown;
                    cue = Some(Effect::ChoicePing);
                }
                Frame {
                    text: format!("{}: {}", self.speaker, self.typewriter.full()),
                    cue,
                }
            }
            QuestionStage::ChoiceShown => Frame {
                text: format!(
                    "{}: {} {}",
                    self.speaker,
                    truncate_story(&self.typewriter.full(), self.choice_text_budget),
                    self.prompt
                ),
                cue: None,
            },
        }
    }
}

/// Cut `story` to `budget` characters plus an ellipsis if it is longer
pub fn truncate_story(story: &str, budget: usize) -> String {
    if story.chars().count() > budget {
        let mut cut: String = story.chars().take(budget).collect();
        cut.push_str(ELLIPSIS);
        cut
    } else {
        story.to_string()
    }
}

/// Types the acceptance narrative after the target accepts
#[derive(Debug, Clone)]
pub struct NarrativeAnimator {
    speaker: String,
    typewriter: Typewriter,
}

impl NarrativeAnimator {
    pub fn new(speaker: &str, narrative: &str) -> Self {
        Self {
            speaker: speaker.to_string(),
            typewriter: Typewriter::new(narrative),
        }
    }

    pub fn fire(&mut self) -> Frame {
        self.typewriter.step();
        Frame {
            text: format!("{}: {}", self.speaker, self.typewriter.shown()),
            cue: self.typewriter.cue(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.typewriter.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(story: &str) -> QuestionAnimator {
        QuestionAnimator::new("Seer", story, 100, 40, "/accept or /reject")
    }

    #[test]
    fn test_typing_reveals_one_char_per_firing() {
        let story = "Will you help?";
        let mut animator = question(story);
        for n in 1..=story.len() {
            let frame = animator.fire();
            assert_eq!(animator.revealed(), n.min(story.len()));
            assert_eq!(frame.text, format!("Seer: {}", &story[..n]));
        }
        assert_eq!(animator.stage(), QuestionStage::QuestionHold);
    }

    #[test]
    fn test_hold_lasts_exactly_the_dwell() {
        let story = "Hi";
        let mut animator = question(story);
        animator.fire();
        animator.fire();
        assert_eq!(animator.stage(), QuestionStage::QuestionHold);

        for _ in 0..99 {
            let frame = animator.fire();
            assert_eq!(frame.text, "Seer: Hi");
            assert_eq!(animator.stage(), QuestionStage::QuestionHold);
        }
        let frame = animator.fire();
        assert_eq!(animator.held(), 100);
        assert_eq!(animator.stage(), QuestionStage::ChoiceShown);
        assert_eq!(frame.cue, Some(Effect::ChoicePing));
    }

    #[test]
    fn test_choice_truncates_long_story() {
        let story = "a".repeat(50);
        let mut animator = QuestionAnimator::new("Seer", &story, 1, 40, "/accept or /reject");
        for _ in 0..51 {
            animator.fire();
        }
        assert_eq!(animator.stage(), QuestionStage::ChoiceShown);
        let frame = animator.fire();
        assert_eq!(
            frame.text,
            format!("Seer: {}... /accept or /reject", "a".repeat(40))
        );
        // Repeats until resolved
        assert_eq!(animator.fire(), frame);
    }

    #[test]
    fn test_choice_keeps_short_story_whole() {
        assert_eq!(truncate_story("short", 40), "short");
        assert_eq!(truncate_story(&"b".repeat(40), 40), "b".repeat(40));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let story = "é".repeat(45);
        let cut = truncate_story(&story, 40);
        assert_eq!(cut.chars().count(), 43);
    }

    #[test]
    fn test_empty_story_goes_straight_to_hold() {
        let mut animator = question("");
        animator.fire();
        assert_eq!(animator.stage(), QuestionStage::QuestionHold);
    }

    #[test]
    fn test_typing_cue_every_third_char() {
        let mut animator = question("abcdef");
        let cues: Vec<_> = (0..6).map(|_| animator.fire().cue).collect();
        assert_eq!(cues[2], Some(Effect::TypingTick));
        assert_eq!(cues[5], Some(Effect::TypingTick));
        assert_eq!(cues.iter().filter(|c| c.is_some()).count(), 2);
    }

    #[test]
    fn test_narrative_completes() {
        let mut animator = NarrativeAnimator::new("Seer", "Go.");
        animator.fire();
        animator.fire();
        assert!(!animator.is_complete());
        let frame = animator.fire();
        assert!(animator.is_complete());
        assert_eq!(frame.text, "Seer: Go.");
    }
}
