//! Dialogue state
//!
//! Transient answers held while a user walks through a multi-step flow.
//! Discarded on completion, on error reset and on `/cancel`.

use serde::{Deserialize, Serialize};

use crate::models::profile::{ActivityLevel, ProfileAttributes, Sex};

/// Profile dialogue steps, in the order they are asked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStep {
    AwaitingWeight,
    AwaitingHeight,
    AwaitingAge,
    AwaitingCity,
    AwaitingSex,
    AwaitingActivity,
    AwaitingCalorieGoal,
}

impl ProfileStep {
    /// Whether the step is answered with a button instead of free text
    pub fn is_choice(&self) -> bool {
        matches!(self, ProfileStep::AwaitingSex | ProfileStep::AwaitingActivity)
    }
}

/// Answers collected so far
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub weight: Option<f64>,
    pub height: Option<i64>,
    pub age: Option<i64>,
    pub city: Option<String>,
    pub sex: Option<Sex>,
    pub activity: Option<ActivityLevel>,
}

impl ProfileDraft {
    /// Combine the draft with the final answer
    ///
    /// Returns `None` if an earlier answer is missing, which the linear step
    /// order rules out.
    pub fn finish(self, calorie_goal: i64) -> Option<ProfileAttributes> {
        Some(ProfileAttributes {
            weight: self.weight?,
            height: self.height?,
            age: self.age?,
            sex: self.sex?,
            activity: self.activity?,
            city: self.city?,
            calorie_goal,
        })
    }
}

/// One in-progress dialogue per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum ConversationState {
    /// Guided profile creation
    Profile {
        step: ProfileStep,
        draft: ProfileDraft,
    },
    /// Waiting for the grams eaten after a successful nutrition lookup
    AwaitingGramWeight {
        food: String,
        calories_per_gram: f64,
    },
}

impl ConversationState {
    pub fn new_profile() -> Self {
        ConversationState::Profile {
            step: ProfileStep::AwaitingWeight,
            draft: ProfileDraft::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_finish_requires_every_answer() {
        let mut draft = ProfileDraft {
            weight: Some(70.0),
            height: Some(175),
            age: Some(30),
            city: Some("Moscow".into()),
            sex: Some(Sex::Male),
            activity: None,
        };
        assert!(draft.clone().finish(2000).is_none());

        draft.activity = Some(ActivityLevel::Moderate);
        let profile = draft.finish(2000).unwrap();
        assert_eq!(profile.calorie_goal, 2000);
        assert_eq!(profile.city, "Moscow");
    }

    #[test]
    fn test_new_profile_starts_at_weight() {
        match ConversationState::new_profile() {
            ConversationState::Profile { step, draft } => {
                assert_eq!(step, ProfileStep::AwaitingWeight);
                assert_eq!(draft, ProfileDraft::default());
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }
}
