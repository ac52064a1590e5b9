//! Conversation engine
//!
//! Explicit per-user state machine for the profile dialogue and the one-shot
//! food grams follow-up. The engine is pure bookkeeping: it validates
//! answers, advances steps and reports what happened. Side effects (goal
//! lookups, ledger writes, replies) belong to the caller.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::models::{
    ActivityLevel, ConversationState, ProfileAttributes, ProfileDraft, ProfileStep, Sex, UserId,
};
use crate::services::goals;
use crate::validation::{self, Field, ValidationError, ValidationResult};

/// Something the user sent while a dialogue may be in progress
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Text(String),
    Sex(Sex),
    Activity(ActivityLevel),
}

/// What a transition did
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Moved to a new step; ask its question
    Advanced(ProfileStep),
    /// Activity chosen, energy norm known; now asking for the calorie goal
    ActivitySelected { tdee: f64 },
    /// Answer rejected; the same step is asked again
    Rejected {
        step: ProfileStep,
        error: ValidationError,
    },
    /// Profile dialogue finished and cleared
    Completed(ProfileAttributes),
    /// Input kind does not fit the current step; nothing changed
    Unexpected(ProfileStep),
    /// Grams entered for a pending food lookup; the follow-up is cleared
    /// whether or not the amount was valid
    GramWeight {
        food: String,
        calories_per_gram: f64,
        grams: ValidationResult<i64>,
    },
    /// Button pressed while waiting for grams; still waiting
    AwaitingGrams { food: String },
    /// No dialogue in progress
    Idle,
}

/// Per-user dialogue state machine
#[derive(Debug, Default)]
pub struct ConversationEngine {
    states: DashMap<UserId, ConversationState>,
}

impl ConversationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin the profile dialogue, discarding any dialogue in progress
    pub fn start_profile(&self, user_id: UserId) -> ProfileStep {
        self.states.insert(user_id, ConversationState::new_profile());
        ProfileStep::AwaitingWeight
    }

    /// Wait for grams after a successful nutrition lookup
    pub fn begin_gram_entry(&self, user_id: UserId, food: &str, calories_per_gram: f64) {
        self.states.insert(
            user_id,
            ConversationState::AwaitingGramWeight {
                food: food.to_string(),
                calories_per_gram,
            },
        );
    }

    /// Feed input into the user's dialogue
    pub fn apply(&self, user_id: UserId, input: Input) -> StepOutcome {
        match self.states.entry(user_id) {
            Entry::Vacant(_) => StepOutcome::Idle,
            Entry::Occupied(mut entry) => {
                let (next, outcome) = transition(entry.get().clone(), input);
                match next {
                    Some(state) => {
                        entry.insert(state);
                    }
                    None => {
                        entry.remove();
                    }
                }
                outcome
            }
        }
    }

    /// Drop any dialogue in progress, returns whether one existed
    pub fn cancel(&self, user_id: UserId) -> bool {
        self.states.remove(&user_id).is_some()
    }

    pub fn state(&self, user_id: UserId) -> Option<ConversationState> {
        self.states.get(&user_id).map(|s| s.value().clone())
    }

    /// Number of dialogues in progress
    pub fn active(&self) -> usize {
        self.states.len()
    }
}

/// Single transition function, one arm per state
fn transition(state: ConversationState, input: Input) -> (Option<ConversationState>, StepOutcome) {
    match state {
        ConversationState::Profile { step, draft } => profile_transition(step, draft, input),
        ConversationState::AwaitingGramWeight {
            food,
            calories_per_gram,
        } => match input {
            Input::Text(text) => {
                let grams = validation::parse_int(Field::Grams, &text);
                (
                    None,
                    StepOutcome::GramWeight {
                        food,
                        calories_per_gram,
                        grams,
                    },
                )
            }
            Input::Sex(_) | Input::Activity(_) => {
                let outcome = StepOutcome::AwaitingGrams { food: food.clone() };
                (
                    Some(ConversationState::AwaitingGramWeight {
                        food,
                        calories_per_gram,
                    }),
                    outcome,
                )
            }
        },
    }
}

fn profile_transition(
    step: ProfileStep,
    mut draft: ProfileDraft,
    input: Input,
) -> (Option<ConversationState>, StepOutcome) {
    let stay = |draft: ProfileDraft, outcome: StepOutcome| {
        (Some(ConversationState::Profile { step, draft }), outcome)
    };
    let advance = |draft: ProfileDraft, next: ProfileStep| {
        (
            Some(ConversationState::Profile { step: next, draft }),
            StepOutcome::Advanced(next),
        )
    };
    let reject = |draft: ProfileDraft, error: ValidationError| {
        stay(draft, StepOutcome::Rejected { step, error })
    };

    match (step, input) {
        (ProfileStep::AwaitingWeight, Input::Text(text)) => {
            match validation::parse_float(Field::Weight, &text) {
                Ok(weight) => {
                    draft.weight = Some(weight);
                    advance(draft, ProfileStep::AwaitingHeight)
                }
                Err(error) => reject(draft, error),
            }
        }
        (ProfileStep::AwaitingHeight, Input::Text(text)) => {
            match validation::parse_int(Field::Height, &text) {
                Ok(height) => {
                    draft.height = Some(height);
                    advance(draft, ProfileStep::AwaitingAge)
                }
                Err(error) => reject(draft, error),
            }
        }
        (ProfileStep::AwaitingAge, Input::Text(text)) => {
            match validation::parse_int(Field::Age, &text) {
                Ok(age) => {
                    draft.age = Some(age);
                    advance(draft, ProfileStep::AwaitingCity)
                }
                Err(error) => reject(draft, error),
            }
        }
        (ProfileStep::AwaitingCity, Input::Text(text)) => {
            match validation::parse_text(Field::City, &text) {
                Ok(city) => {
                    draft.city = Some(city);
                    advance(draft, ProfileStep::AwaitingSex)
                }
                Err(error) => reject(draft, error),
            }
        }
        (ProfileStep::AwaitingSex, Input::Sex(sex)) => {
            draft.sex = Some(sex);
            advance(draft, ProfileStep::AwaitingActivity)
        }
        (ProfileStep::AwaitingActivity, Input::Activity(activity)) => {
            draft.activity = Some(activity);
            match (draft.weight, draft.height, draft.age, draft.sex) {
                (Some(weight), Some(height), Some(age), Some(sex)) => {
                    let tdee = goals::tdee(goals::bmr(weight, height, age, sex), activity.factor());
                    (
                        Some(ConversationState::Profile {
                            step: ProfileStep::AwaitingCalorieGoal,
                            draft,
                        }),
                        StepOutcome::ActivitySelected { tdee },
                    )
                }
                // Unreachable through the linear step order; start over
                _ => restart(),
            }
        }
        (ProfileStep::AwaitingCalorieGoal, Input::Text(text)) => {
            match validation::parse_int(Field::CalorieGoal, &text) {
                Ok(calorie_goal) => match draft.finish(calorie_goal) {
                    Some(profile) => (None, StepOutcome::Completed(profile)),
                    None => restart(),
                },
                Err(error) => reject(draft, error),
            }
        }
        (
            ProfileStep::AwaitingWeight
            | ProfileStep::AwaitingHeight
            | ProfileStep::AwaitingAge
            | ProfileStep::AwaitingCity
            | ProfileStep::AwaitingSex
            | ProfileStep::AwaitingActivity
            | ProfileStep::AwaitingCalorieGoal,
            _,
        ) => stay(draft, StepOutcome::Unexpected(step)),
    }
}

fn restart() -> (Option<ConversationState>, StepOutcome) {
    (
        Some(ConversationState::new_profile()),
        StepOutcome::Advanced(ProfileStep::AwaitingWeight),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Input {
        Input::Text(s.to_string())
    }

    fn complete_profile(engine: &ConversationEngine, user_id: UserId) -> StepOutcome {
        engine.start_profile(user_id);
        engine.apply(user_id, text("70"));
        engine.apply(user_id, text("175"));
        engine.apply(user_id, text("30"));
        engine.apply(user_id, text("Moscow"));
        engine.apply(user_id, Input::Sex(Sex::Male));
        engine.apply(user_id, Input::Activity(ActivityLevel::Moderate));
        engine.apply(user_id, text("2000"))
    }

    #[test]
    fn test_idle_user() {
        let engine = ConversationEngine::new();
        assert_eq!(engine.apply(1, text("hello")), StepOutcome::Idle);
        assert!(engine.state(1).is_none());
    }

    #[test]
    fn test_linear_profile_flow() {
        let engine = ConversationEngine::new();
        assert_eq!(engine.start_profile(1), ProfileStep::AwaitingWeight);
        assert_eq!(
            engine.apply(1, text("70")),
            StepOutcome::Advanced(ProfileStep::AwaitingHeight)
        );
        assert_eq!(
            engine.apply(1, text("175")),
            StepOutcome::Advanced(ProfileStep::AwaitingAge)
        );
        assert_eq!(
            engine.apply(1, text("30")),
            StepOutcome::Advanced(ProfileStep::AwaitingCity)
        );
        assert_eq!(
            engine.apply(1, text("Moscow")),
            StepOutcome::Advanced(ProfileStep::AwaitingSex)
        );
        assert_eq!(
            engine.apply(1, Input::Sex(Sex::Male)),
            StepOutcome::Advanced(ProfileStep::AwaitingActivity)
        );
        match engine.apply(1, Input::Activity(ActivityLevel::Moderate)) {
            StepOutcome::ActivitySelected { tdee } => assert!((tdee - 2627.25).abs() < 1e-9),
            other => panic!("unexpected outcome: {:?}", other),
        }

        match engine.apply(1, text("2000")) {
            StepOutcome::Completed(profile) => {
                assert_eq!(profile.weight, 70.0);
                assert_eq!(profile.height, 175);
                assert_eq!(profile.age, 30);
                assert_eq!(profile.city, "Moscow");
                assert_eq!(profile.sex, Sex::Male);
                assert_eq!(profile.activity, ActivityLevel::Moderate);
                assert_eq!(profile.calorie_goal, 2000);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(engine.state(1).is_none());
        assert_eq!(engine.active(), 0);
    }

    #[test]
    fn test_invalid_answer_reprompts_without_limit() {
        let engine = ConversationEngine::new();
        engine.start_profile(1);
        for _ in 0..5 {
            match engine.apply(1, text("20")) {
                StepOutcome::Rejected { step, error } => {
                    assert_eq!(step, ProfileStep::AwaitingWeight);
                    assert_eq!(error.field(), Field::Weight);
                }
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
        assert_eq!(
            engine.apply(1, text("50")),
            StepOutcome::Advanced(ProfileStep::AwaitingHeight)
        );
    }

    #[test]
    fn test_choice_steps_ignore_text_and_wrong_buttons() {
        let engine = ConversationEngine::new();
        engine.start_profile(1);
        engine.apply(1, text("70"));
        engine.apply(1, text("175"));
        engine.apply(1, text("30"));
        engine.apply(1, text("Moscow"));

        assert_eq!(
            engine.apply(1, text("male")),
            StepOutcome::Unexpected(ProfileStep::AwaitingSex)
        );
        assert_eq!(
            engine.apply(1, Input::Activity(ActivityLevel::Light)),
            StepOutcome::Unexpected(ProfileStep::AwaitingSex)
        );
        assert_eq!(
            engine.apply(1, Input::Sex(Sex::Female)),
            StepOutcome::Advanced(ProfileStep::AwaitingActivity)
        );
    }

    #[test]
    fn test_button_on_text_step_is_unexpected() {
        let engine = ConversationEngine::new();
        engine.start_profile(1);
        assert_eq!(
            engine.apply(1, Input::Sex(Sex::Male)),
            StepOutcome::Unexpected(ProfileStep::AwaitingWeight)
        );
    }

    #[test]
    fn test_calorie_goal_rejection_keeps_draft() {
        let engine = ConversationEngine::new();
        engine.start_profile(1);
        engine.apply(1, text("70"));
        engine.apply(1, text("175"));
        engine.apply(1, text("30"));
        engine.apply(1, text("Moscow"));
        engine.apply(1, Input::Sex(Sex::Female));
        engine.apply(1, Input::Activity(ActivityLevel::Sedentary));

        assert!(matches!(
            engine.apply(1, text("100")),
            StepOutcome::Rejected {
                step: ProfileStep::AwaitingCalorieGoal,
                ..
            }
        ));
        assert!(matches!(engine.apply(1, text("1800")), StepOutcome::Completed(_)));
    }

    #[test]
    fn test_set_profile_restarts_from_weight() {
        let engine = ConversationEngine::new();
        engine.start_profile(1);
        engine.apply(1, text("70"));
        engine.apply(1, text("175"));

        engine.start_profile(1);
        assert_eq!(engine.state(1), Some(ConversationState::new_profile()));
    }

    #[test]
    fn test_gram_entry_resolves_once() {
        let engine = ConversationEngine::new();
        engine.begin_gram_entry(1, "banana", 0.89);

        match engine.apply(1, text("120")) {
            StepOutcome::GramWeight {
                food,
                calories_per_gram,
                grams,
            } => {
                assert_eq!(food, "banana");
                assert_eq!(calories_per_gram, 0.89);
                assert_eq!(grams, Ok(120));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(engine.apply(1, text("120")), StepOutcome::Idle);
    }

    #[test]
    fn test_invalid_grams_clear_state() {
        let engine = ConversationEngine::new();
        engine.begin_gram_entry(1, "banana", 0.89);

        match engine.apply(1, text("a lot")) {
            StepOutcome::GramWeight { grams, .. } => {
                assert_eq!(grams.unwrap_err().field(), Field::Grams)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(engine.state(1).is_none());
    }

    #[test]
    fn test_food_follow_up_replaces_profile_dialogue() {
        let engine = ConversationEngine::new();
        engine.start_profile(1);
        engine.apply(1, text("70"));
        engine.begin_gram_entry(1, "apple", 0.52);
        assert!(matches!(
            engine.state(1),
            Some(ConversationState::AwaitingGramWeight { .. })
        ));
    }

    #[test]
    fn test_users_are_independent() {
        let engine = ConversationEngine::new();
        engine.start_profile(1);
        engine.start_profile(2);
        engine.apply(1, text("70"));
        assert_eq!(engine.state(2), Some(ConversationState::new_profile()));
        assert!(matches!(complete_profile(&engine, 3), StepOutcome::Completed(_)));
        assert_eq!(engine.active(), 2);
    }

    #[test]
    fn test_cancel() {
        let engine = ConversationEngine::new();
        assert!(!engine.cancel(1));
        engine.begin_gram_entry(1, "rice", 1.3);
        assert!(engine.cancel(1));
        assert_eq!(engine.apply(1, text("100")), StepOutcome::Idle);
    }
}
