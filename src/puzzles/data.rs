// Puzzle content.

pub struct TriviaQuestion {
    pub prompt: &'static str,
    pub options: [&'static str; 4],
    pub correct: usize,
}

pub const TRIVIA_QUESTIONS: [TriviaQuestion; 3] = [
    TriviaQuestion {
        prompt: "When is our anniversary?",
        options: ["February 14", "December 15", "January 1", "November 25"],
        correct: 1,
    },
    TriviaQuestion {
        prompt: "Where did Luigi and Alix meet?",
        options: ["A coffee shop", "Online", "University", "Through friends"],
        correct: 2,
    },
    TriviaQuestion {
        prompt: "What is Alix's favorite food?",
        options: ["Pizza", "Sushi", "Fried potatoes with bacon", "Pasta"],
        correct: 2,
    },
];

/// Face labels for the memory pairs.
pub const MEMORY_CARDS: [&str; 6] = [
    "Fried Potatoes",
    "Friends",
    "Ophelia",
    "Dec 15",
    "Luigi + Alix",
    "Our apartment",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Angry,
    Sleeping,
}

pub struct Scenario {
    pub text: &'static str,
    pub answer: Mood,
}

pub const SORTING_SCENARIOS: [Scenario; 10] = [
    Scenario { text: "It's Monday morning", answer: Mood::Sleeping },
    Scenario { text: "Someone ate the last fried potato", answer: Mood::Angry },
    Scenario { text: "Netflix is still asking 'Are you still watching?'", answer: Mood::Sleeping },
    Scenario { text: "Luigi forgot to reply to a text", answer: Mood::Angry },
    Scenario { text: "After a big lunch", answer: Mood::Sleeping },
    Scenario { text: "Someone spoiled the Friends finale", answer: Mood::Angry },
    Scenario { text: "Sunday afternoon on the couch", answer: Mood::Sleeping },
    Scenario { text: "The car in front is driving too slow", answer: Mood::Angry },
    Scenario { text: "Rainy day, warm blanket", answer: Mood::Sleeping },
    Scenario { text: "Luigi said 'we need to talk'", answer: Mood::Angry },
];
