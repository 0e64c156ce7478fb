// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Built-in mission templates, the last tier of content resolution.
//!
//! Each goal has a fixed set of tasks with one motivational line per tone.
//! This table never fails and needs no I/O.

use crate::models::{Goal, MissionContent, Tone};
use rand::seq::SliceRandom;
use rand::Rng;

/// One static mission with a line for every tone.
#[derive(Debug)]
pub struct FallbackTemplate {
    pub task: &'static str,
    sassy: &'static str,
    kind: &'static str,
    drill_sergeant: &'static str,
    zen: &'static str,
    pub reflection_prompt: &'static str,
}

impl FallbackTemplate {
    pub fn line(&self, tone: Tone) -> &'static str {
        match tone {
            Tone::Sassy => self.sassy,
            Tone::Kind => self.kind,
            Tone::DrillSergeant => self.drill_sergeant,
            Tone::Zen => self.zen,
        }
    }

    pub fn content(&self, tone: Tone) -> MissionContent {
        MissionContent {
            task: self.task.to_string(),
            motivational_line: self.line(tone).to_string(),
            reflection_prompt: self.reflection_prompt.to_string(),
        }
    }
}

macro_rules! template {
    ($task:expr, [$sassy:expr, $kind:expr, $drill:expr, $zen:expr], $prompt:expr) => {
        FallbackTemplate {
            task: $task,
            sassy: $sassy,
            kind: $kind,
            drill_sergeant: $drill,
            zen: $zen,
            reflection_prompt: $prompt,
        }
    };
}

const FITNESS: &[FallbackTemplate] = &[
    template!(
        "Do 20 push-ups before lunch",
        [
            "Scrolling is not a workout, no matter how fast your thumb moves.",
            "Your body will thank you for this one!",
            "Twenty push-ups. No breaks. Move!",
            "Feel the strength gather in your arms."
        ],
        "How did your body feel afterwards?"
    ),
    template!(
        "Take a 20-minute walk outside",
        [
            "Your couch called. It needs some space.",
            "Fresh air does wonders. Enjoy every step!",
            "Boots on the pavement, soldier!",
            "Let each step bring you back to yourself."
        ],
        "What did you notice on your walk?"
    ),
    template!(
        "Stretch for 10 minutes before bed",
        [
            "Your hamstrings are tighter than your schedule.",
            "A gentle stretch is a gift to yourself.",
            "Limber up! Flexibility is strength!",
            "Release what your body has been holding."
        ],
        "Which area felt the tightest?"
    ),
    template!(
        "Drink 8 glasses of water today",
        [
            "Coffee does not count. Neither does wine.",
            "Hydration is self-care in its simplest form.",
            "Eight glasses. I will be counting.",
            "Water is life. Honor your body with it."
        ],
        "Did you notice a difference in your energy?"
    ),
    template!(
        "Do a 7-minute bodyweight workout",
        [
            "Seven minutes. You spend longer picking a show.",
            "Just seven minutes can change your whole day!",
            "Seven minutes of pure discipline. Begin!",
            "A short practice is still a practice."
        ],
        "Which exercise was the hardest?"
    ),
];

const PRODUCTIVITY: &[FallbackTemplate] = &[
    template!(
        "Write down your top 3 priorities for today",
        [
            "A to-do list that lives in your head is a wish list.",
            "Clarity is the first step to progress!",
            "Three priorities. Paper. Now.",
            "Intention comes before action."
        ],
        "Did you get all three done?"
    ),
    template!(
        "Work through one focused 25-minute session",
        [
            "Twenty-five minutes without your phone. Radical, I know.",
            "One focused burst can move mountains!",
            "Twenty-five minutes. Zero distractions!",
            "Give yourself fully to the task in front of you."
        ],
        "What did you accomplish in that session?"
    ),
    template!(
        "Finish one task you have been putting off",
        [
            "That thing you keep dodging? Today it loses.",
            "Facing the hard stuff first feels so freeing!",
            "No more excuses. Attack that task!",
            "What we resist persists. Let it go by doing it."
        ],
        "Why were you putting it off?"
    ),
    template!(
        "Turn off all notifications for 2 hours",
        [
            "The group chat will survive without you. Probably.",
            "Give yourself the gift of uninterrupted focus.",
            "Notifications off. Focus on.",
            "In silence the mind finds its sharpest edge."
        ],
        "What did you get done during that time?"
    ),
    template!(
        "Read for 20 minutes instead of scrolling",
        [
            "Short videos are not personal development.",
            "Twenty minutes of reading feeds your mind.",
            "Read. Learn. Grow. Twenty minutes.",
            "Let the words on the page widen your world."
        ],
        "What are you reading right now?"
    ),
];

const LANGUAGE: &[FallbackTemplate] = &[
    template!(
        "Learn 5 new words in your target language",
        [
            "Five words. That is shorter than your coffee order.",
            "Five words a day adds up to thousands a year!",
            "Five new words. Memorize them!",
            "Each word is a door to new understanding."
        ],
        "Which word was the most interesting?"
    ),
    template!(
        "Listen to a podcast in your target language for 10 minutes",
        [
            "You will not catch all of it. That is the point.",
            "Even passive listening trains your ear. Keep going!",
            "Ten minutes of immersion. No subtitles!",
            "Let the sounds wash over you like a stream."
        ],
        "How much did you understand?"
    ),
    template!(
        "Write 3 sentences about your day in your target language",
        [
            "Grammar mistakes are free today. Go wild.",
            "Writing cements what you have learned. Great practice!",
            "Three sentences. Correct grammar. Go.",
            "Express your day in a new tongue."
        ],
        "What was the hardest part to express?"
    ),
    template!(
        "Read a paragraph aloud to practice pronunciation",
        [
            "Yes, out loud. Your cat will not judge.",
            "Speaking out loud builds confidence. You sound great!",
            "Loud and clear, recruit!",
            "Let the words shape themselves on your lips."
        ],
        "Which sounds were the trickiest?"
    ),
    template!(
        "Think only in your target language for 5 minutes",
        [
            "Your brain will resist. Do it anyway.",
            "Thinking in another language rewires your brain!",
            "Five minutes. Internal monologue. Target language only.",
            "Watch your thoughts change as the language shifts."
        ],
        "What did you find yourself thinking about?"
    ),
];

const JOB_SEARCH: &[FallbackTemplate] = &[
    template!(
        "Update one section of your resume",
        [
            "That resume from five years ago is not doing you favors.",
            "Small updates add up to a polished resume!",
            "One section. Updated. Polished. Done.",
            "Present your journey with clarity and truth."
        ],
        "Which section did you improve?"
    ),
    template!(
        "Apply to one job that genuinely excites you",
        [
            "One application. Bookmarking does not count.",
            "You deserve work that lights you up!",
            "One application. Submitted. Today.",
            "Take one step toward the work that calls to you."
        ],
        "What about the role excited you?"
    ),
    template!(
        "Reach out to one person in your field with a real message",
        [
            "A generic connection request does not count.",
            "Genuine connections open unexpected doors!",
            "One contact. Personal message. Send it.",
            "Every meaningful connection begins with a single reach."
        ],
        "Who did you reach out to and why?"
    ),
    template!(
        "Practice answering 'Tell me about yourself' out loud",
        [
            "If you cannot explain you, who can?",
            "Practice makes this feel so much more natural!",
            "Sixty seconds. Clear. Confident. Go.",
            "Know yourself deeply so you may share freely."
        ],
        "How confident did you feel?"
    ),
    template!(
        "Research one company you would love to work for",
        [
            "Reading their careers page counts as research. Barely.",
            "Knowing a company shows genuine interest!",
            "Full intel on the target. Move.",
            "Understanding others begins with curiosity."
        ],
        "What did you learn about them?"
    ),
];

const CUSTOM: &[FallbackTemplate] = &[
    template!(
        "Spend 15 minutes working on your personal goal",
        [
            "Fifteen minutes. You spend longer choosing lunch.",
            "Even small steps create big progress!",
            "Fifteen minutes of pure focus. Execute!",
            "A few mindful minutes can move mountains."
        ],
        "What progress did you make?"
    ),
    template!(
        "Write down why your goal matters to you",
        [
            "If you cannot explain it, do you even want it?",
            "Connecting with your why fuels motivation!",
            "Write it down. Know your mission.",
            "Purpose gives direction to effort."
        ],
        "What did you realize about your motivation?"
    ),
    template!(
        "Remove one distraction from your environment",
        [
            "The phone on your desk? Yes, that one.",
            "Making space for focus is an act of self-care.",
            "Identify the distraction. Eliminate it.",
            "Clear the outer clutter to calm the inner mind."
        ],
        "What did you remove?"
    ),
    template!(
        "Do one small uncomfortable thing related to your goal",
        [
            "Growth lives outside your comfort zone. Go visit.",
            "Discomfort means you are growing. That is beautiful!",
            "Comfort is the enemy. Push through.",
            "The lotus grows through mud to reach the light."
        ],
        "What did you do and how did it feel?"
    ),
    template!(
        "Celebrate one small win from this week",
        [
            "You did something right. Shocking. Celebrate it.",
            "Every win deserves recognition. You are doing great!",
            "Acknowledge progress. Then keep pushing.",
            "Gratitude for small victories nourishes the spirit."
        ],
        "What win are you celebrating?"
    ),
];

/// All static templates for a goal.
pub fn templates_for(goal: Goal) -> &'static [FallbackTemplate] {
    match goal {
        Goal::Fitness => FITNESS,
        Goal::Productivity => PRODUCTIVITY,
        Goal::Language => LANGUAGE,
        Goal::JobSearch => JOB_SEARCH,
        Goal::Custom => CUSTOM,
    }
}

/// Pick a template for `goal`, avoiding `recent_tasks` when possible.
///
/// If every template for the goal appears in `recent_tasks`, the full table
/// is used instead.
pub fn pick_template<R: Rng + ?Sized>(
    goal: Goal,
    recent_tasks: &[String],
    rng: &mut R,
) -> &'static FallbackTemplate {
    let all = templates_for(goal);
    let fresh: Vec<&'static FallbackTemplate> = all
        .iter()
        .filter(|t| !recent_tasks.iter().any(|r| r == t.task))
        .collect();

    if let Some(template) = fresh.choose(rng).copied() {
        return template;
    }

    all.choose(rng).unwrap_or(&all[0])
}
