//! Speech-bubble lines shown by the pet

use rand::Rng;

use super::mood::Mood;
use super::stats::{ActionKind, StatVector};

/// Message pools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Feed,
    Sleep,
    Play,
    Clean,
    Medicine,
    Hungry,
    Tired,
    Sad,
    Happy,
}

/// Chance that a stat change shows a message at all
pub const STAT_MESSAGE_CHANCE: f64 = 0.1;
/// Additional chance gate for the happy pool
pub const HAPPY_MESSAGE_CHANCE: f64 = 0.3;

impl MessageKind {
    pub fn for_action(action: ActionKind) -> Self {
        match action {
            ActionKind::Feed => MessageKind::Feed,
            ActionKind::Sleep => MessageKind::Sleep,
            ActionKind::Play => MessageKind::Play,
            ActionKind::Clean => MessageKind::Clean,
            ActionKind::Medicine => MessageKind::Medicine,
        }
    }

    pub fn lines(&self) -> &'static [&'static str] {
        match self {
            MessageKind::Feed => &[
                "Yummy!",
                "Delicious!",
                "Thank you!",
                "Mmm...",
                "What a feast!",
                "So tasty!",
                "Nom nom!",
                "Thanks for the food!",
                "My favourite!",
                "Looks so good!",
                "Wonderful!",
                "I love it!",
            ],
            MessageKind::Sleep => &[
                "Good night...",
                "Zzz...",
                "Sleepy...",
                "Want to sleep...",
                "So tired...",
                "Time to rest...",
                "Sweet dreams...",
                "*yawns*",
                "Eyes closing...",
            ],
            MessageKind::Play => &[
                "Hooray!",
                "Fun!",
                "Wheee!",
                "How great!",
                "This is fun!",
                "Again!",
                "Cool!",
                "I love playing!",
                "Wow!",
                "Amazing!",
                "Super!",
            ],
            MessageKind::Clean => &[
                "Fresh!",
                "Clean!",
                "Ahh...",
                "So nice!",
                "Thank you!",
                "Much better!",
                "Squeaky clean!",
                "Sparkling!",
                "Smells nice!",
                "Great!",
            ],
            MessageKind::Medicine => &["Feeling better!", "Bitter... but it helps", "Thanks, doc!"],
            MessageKind::Hungry => &[
                "I'm hungry!",
                "Feed me!",
                "Hungry...",
                "Want food!",
                "Tummy rumbling...",
                "Very hungry!",
                "Need food!",
                "Feed me, please!",
                "Hungry as a wolf!",
            ],
            MessageKind::Tired => &[
                "I'm tired!",
                "Need sleep...",
                "Sleepy...",
                "Running out of energy...",
                "Want to sleep!",
                "No strength...",
                "Eyes are heavy...",
                "Need rest...",
                "Bedtime...",
            ],
            MessageKind::Sad => &[
                "I'm sad...",
                "Help me...",
                "Not feeling well...",
                "Gloomy...",
                "Bad mood...",
                "Need attention...",
                "Not fun...",
            ],
            MessageKind::Happy => &[
                "Happy!",
                "Excellent!",
                "Wonderful!",
                "Lovely!",
                "All good!",
                "Life is great!",
                "Feeling great!",
                "In a great mood!",
                "Joyful!",
            ],
        }
    }

    /// Pick one line from this pool
    pub fn pick<R: Rng>(&self, rng: &mut R) -> &'static str {
        let lines = self.lines();
        lines[rng.random_range(0..lines.len())]
    }
}

/// Decide whether the current stats warrant an unprompted message.
///
/// Only fires occasionally so the pet does not chatter on every decay tick.
pub fn stat_message<R: Rng>(stats: &StatVector, mood: Mood, rng: &mut R) -> Option<MessageKind> {
    if !rng.random_bool(STAT_MESSAGE_CHANCE) {
        return None;
    }
    if stats.hunger < 20.0 {
        Some(MessageKind::Hungry)
    } else if stats.energy < 20.0 {
        Some(MessageKind::Tired)
    } else if stats.happiness < 20.0 {
        Some(MessageKind::Sad)
    } else if mood == Mood::Happy && rng.random_bool(HAPPY_MESSAGE_CHANCE) {
        Some(MessageKind::Happy)
    } else {
        None
    }
}
