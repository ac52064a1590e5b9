//! Assistant service
//!
//! Routes chat messages and button presses to the conversation engine and
//! the daily ledger, consults the external providers and turns every outcome
//! into a reply. No command error escapes as an `Err`: each handler
//! translates its own failures into one user-facing message.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::models::{
    ActivityLevel, BotReply, ChartSeries, ProfileAttributes, ProfileStep, ReplyButton, Sex,
    UserId, UserRecord,
};
use crate::observability::AppMetrics;
use crate::providers::Providers;
use crate::services::command::Command;
use crate::services::conversation::{ConversationEngine, Input, StepOutcome};
use crate::services::goals;
use crate::services::ledger::{DailyLedger, Progress, round2};
use crate::services::profile_store::ProfileStore;
use crate::services::user_locks::UserLocks;
use crate::validation::{self, Field};

pub const NO_PROFILE: &str =
    "No information, please fill in your profile with /set_profile and try again";
pub const PROVIDER_UNAVAILABLE: &str =
    "The service is temporarily unavailable, please try again later.";
pub const FOOD_NOT_FOUND: &str = "Sorry, this food is not in our database yet.";
pub const WORKOUT_NOT_FOUND: &str = "Sorry, this workout is not in our database.";
pub const CITY_NOT_FOUND: &str =
    "Sorry, I could not find the weather for your city. Update it with /set_profile.";

const WELCOME: &str = "Welcome! I help you keep track of the water you drink and the calories \
you eat over a day.\nType /help for the list of commands.";
const HELP: &str = "Available commands:\n\
/set_profile - Create your profile\n\
/new_day - Reset today's water and calories\n\
/log_water - Record the water you drank\n\
/log_food - Record the food you ate\n\
/log_workout - Record a workout\n\
/check_progress - Show today's progress\n\
/plot_water - Water intake chart\n\
/plot_calories - Calorie intake chart\n\
/cancel - Abandon the current dialogue";
const LOG_WATER_USAGE: &str =
    "Please enter the amount of water in ml after the command. For example: /log_water 100";
const LOG_FOOD_USAGE: &str = "Please name the food. For example: /log_food banana";
const LOG_WORKOUT_USAGE: &str = "Please give the workout name and its duration in minutes.\n\
For example: /log_workout running 30";
const IDLE_HINT: &str = "I did not understand that. Type /help for the list of commands.";
const NO_CHOICE_EXPECTED: &str =
    "This choice is not expected now. Use /set_profile to create a profile.";
const UNKNOWN_OPTION: &str = "Unknown option.";
const WRONG_INPUT: &str = "Please answer the current question.";
const INTERNAL_FAILURE: &str = "Something went wrong, please try again.";

#[derive(Debug, Clone, Copy)]
enum Chart {
    Water,
    Calories,
}

/// Conversational front door for every user-visible operation
pub struct AssistantService {
    store: Arc<dyn ProfileStore>,
    ledger: DailyLedger,
    engine: ConversationEngine,
    providers: Providers,
    locks: UserLocks,
    metrics: Arc<AppMetrics>,
    provider_timeout: Duration,
}

impl AssistantService {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        providers: Providers,
        metrics: Arc<AppMetrics>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            ledger: DailyLedger::new(store.clone()),
            store,
            engine: ConversationEngine::new(),
            providers,
            locks: UserLocks::new(),
            metrics,
            provider_timeout,
        }
    }

    /// Dialogues currently in progress
    pub fn active_dialogues(&self) -> usize {
        self.engine.active()
    }

    // ===== Dispatchers =====

    /// Handle one chat message, command or free text
    pub async fn handle_message(&self, user_id: UserId, text: &str) -> BotReply {
        info!(user_id, text, "incoming message");
        self.metrics.record_message();

        let _guard = self.locks.acquire(user_id).await;
        match Command::parse(text) {
            Some(command) => self.dispatch(user_id, command).await,
            None => self.on_text(user_id, text).await,
        }
    }

    /// Handle one button press
    pub async fn handle_callback(&self, user_id: UserId, data: &str) -> BotReply {
        info!(user_id, data, "incoming callback");
        self.metrics.record_callback();

        let _guard = self.locks.acquire(user_id).await;
        if let Some(sex) = Sex::from_callback(data) {
            self.on_choice(user_id, Input::Sex(sex)).await
        } else if let Some(activity) = ActivityLevel::from_callback(data) {
            self.on_choice(user_id, Input::Activity(activity)).await
        } else {
            BotReply::text(UNKNOWN_OPTION)
        }
    }

    async fn dispatch(&self, user_id: UserId, command: Command<'_>) -> BotReply {
        debug!(user_id, ?command, "dispatching command");
        let result = match command {
            Command::Start => Ok(self.start()),
            Command::Help => Ok(self.help()),
            Command::SetProfile => Ok(self.on_start_profile(user_id)),
            Command::Cancel => Ok(self.on_cancel(user_id)),
            Command::NewDay => self.on_new_day(user_id).await,
            Command::LogWater(args) => self.on_log_water(user_id, args),
            Command::LogFood(args) => self.on_log_food(user_id, args).await,
            Command::LogWorkout(args) => self.on_log_workout(user_id, args).await,
            Command::CheckProgress => self.on_check_progress(user_id),
            Command::PlotWater => self.on_plot(user_id, Chart::Water),
            Command::PlotCalories => self.on_plot(user_id, Chart::Calories),
            Command::Unknown(name) => Ok(BotReply::text(format!(
                "Unknown command /{}. Type /help for the list of commands.",
                name
            ))),
        };
        result.unwrap_or_else(|err| self.failure(user_id, err))
    }

    // ===== Operations =====

    pub fn start(&self) -> BotReply {
        BotReply::text(WELCOME)
    }

    pub fn help(&self) -> BotReply {
        BotReply::text(HELP)
    }

    /// Abandon whichever dialogue is in progress
    pub async fn cancel(&self, user_id: UserId) -> BotReply {
        let _guard = self.locks.acquire(user_id).await;
        self.on_cancel(user_id)
    }

    /// Restart the profile dialogue from the first question
    pub async fn start_profile(&self, user_id: UserId) -> BotReply {
        let _guard = self.locks.acquire(user_id).await;
        self.on_start_profile(user_id)
    }

    /// Free-text answer: a profile step or the grams of a pending food
    pub async fn submit_text(&self, user_id: UserId, text: &str) -> BotReply {
        let _guard = self.locks.acquire(user_id).await;
        self.on_text(user_id, text).await
    }

    pub async fn select_sex(&self, user_id: UserId, sex: Sex) -> BotReply {
        let _guard = self.locks.acquire(user_id).await;
        self.on_choice(user_id, Input::Sex(sex)).await
    }

    pub async fn select_activity(&self, user_id: UserId, activity: ActivityLevel) -> BotReply {
        let _guard = self.locks.acquire(user_id).await;
        self.on_choice(user_id, Input::Activity(activity)).await
    }

    pub async fn new_day(&self, user_id: UserId) -> BotReply {
        let _guard = self.locks.acquire(user_id).await;
        self.on_new_day(user_id)
            .await
            .unwrap_or_else(|err| self.failure(user_id, err))
    }

    pub async fn log_water(&self, user_id: UserId, amount_text: &str) -> BotReply {
        let _guard = self.locks.acquire(user_id).await;
        self.on_log_water(user_id, amount_text.trim())
            .unwrap_or_else(|err| self.failure(user_id, err))
    }

    /// Look the food up, then wait for the grams eaten
    pub async fn log_food(&self, user_id: UserId, food_text: &str) -> BotReply {
        let _guard = self.locks.acquire(user_id).await;
        self.on_log_food(user_id, food_text.trim())
            .await
            .unwrap_or_else(|err| self.failure(user_id, err))
    }

    /// `args_text` is "name minutes"
    pub async fn log_workout(&self, user_id: UserId, args_text: &str) -> BotReply {
        let _guard = self.locks.acquire(user_id).await;
        self.on_log_workout(user_id, args_text)
            .await
            .unwrap_or_else(|err| self.failure(user_id, err))
    }

    pub async fn check_progress(&self, user_id: UserId) -> BotReply {
        let _guard = self.locks.acquire(user_id).await;
        self.on_check_progress(user_id)
            .unwrap_or_else(|err| self.failure(user_id, err))
    }

    pub async fn plot_water(&self, user_id: UserId) -> BotReply {
        let _guard = self.locks.acquire(user_id).await;
        self.on_plot(user_id, Chart::Water)
            .unwrap_or_else(|err| self.failure(user_id, err))
    }

    pub async fn plot_calories(&self, user_id: UserId) -> BotReply {
        let _guard = self.locks.acquire(user_id).await;
        self.on_plot(user_id, Chart::Calories)
            .unwrap_or_else(|err| self.failure(user_id, err))
    }

    /// Structured summary for API consumers
    pub async fn progress(&self, user_id: UserId) -> Result<Progress> {
        let _guard = self.locks.acquire(user_id).await;
        self.ledger.progress(user_id)
    }

    // ===== Handlers, called with the user lock held =====

    fn on_start_profile(&self, user_id: UserId) -> BotReply {
        let step = self.engine.start_profile(user_id);
        debug!(user_id, "profile dialogue started");
        step_prompt(step)
    }

    fn on_cancel(&self, user_id: UserId) -> BotReply {
        if self.engine.cancel(user_id) {
            BotReply::text("Cancelled. Nothing from the abandoned dialogue was saved.")
        } else {
            BotReply::text("There is nothing to cancel.")
        }
    }

    async fn on_text(&self, user_id: UserId, text: &str) -> BotReply {
        let outcome = self.engine.apply(user_id, Input::Text(text.to_string()));
        self.reply_to(user_id, outcome).await
    }

    async fn on_choice(&self, user_id: UserId, input: Input) -> BotReply {
        match self.engine.apply(user_id, input) {
            StepOutcome::Idle => BotReply::text(NO_CHOICE_EXPECTED),
            outcome => self.reply_to(user_id, outcome).await,
        }
    }

    async fn reply_to(&self, user_id: UserId, outcome: StepOutcome) -> BotReply {
        match outcome {
            StepOutcome::Idle => BotReply::text(IDLE_HINT),
            StepOutcome::Advanced(step) => step_prompt(step),
            StepOutcome::ActivitySelected { tdee } => BotReply::text(tdee_message(tdee)),
            StepOutcome::Rejected { error, .. } => self.failure(user_id, error.into()),
            StepOutcome::Unexpected(step) => {
                let prompt = step_prompt(step);
                BotReply {
                    text: format!("{}\n{}", WRONG_INPUT, prompt.text),
                    ..prompt
                }
            }
            StepOutcome::Completed(profile) => self.complete_profile(user_id, profile).await,
            StepOutcome::GramWeight {
                food,
                calories_per_gram,
                grams,
            } => grams
                .map_err(AppError::from)
                .and_then(|grams| {
                    let calories = self
                        .ledger
                        .log_food_calories(user_id, calories_per_gram, grams)?;
                    info!(user_id, food = %food, grams, calories, "food logged");
                    Ok(BotReply::text(format!("Recorded: {} kcal.", calories)))
                })
                .unwrap_or_else(|err| self.failure(user_id, err)),
            StepOutcome::AwaitingGrams { food } => BotReply::text(format!(
                "Please enter how many grams of {} you ate.",
                food
            )),
        }
    }

    /// Build and store the record, replacing any previous one
    ///
    /// A weather failure does not lose the dialogue: the goal is computed
    /// without the temperature bonus and the user is told so.
    async fn complete_profile(&self, user_id: UserId, profile: ProfileAttributes) -> BotReply {
        let mut text = String::from("Thank you! Your profile has been created.");

        let temperature = match self.temperature_for(&profile.city).await {
            Ok(temperature) => temperature,
            Err(err) => {
                debug!(user_id, error = %err, "creating profile without weather");
                text.push_str(&format!(
                    "\nCould not get the current weather for {}, today's water goal has no \
                     hot weather bonus. Use /new_day later to recompute it.",
                    profile.city
                ));
                0.0
            }
        };

        let water_goal = goals::water_goal_for(&profile, temperature);
        let calorie_goal = profile.calorie_goal;
        self.store.put(user_id, UserRecord::new(profile, water_goal));
        self.metrics.record_profile_created();
        info!(user_id, water_goal, calorie_goal, "profile created");

        text.push_str(&daily_goals(water_goal, calorie_goal));
        BotReply::text(text)
    }

    async fn on_new_day(&self, user_id: UserId) -> Result<BotReply> {
        let city = self.store.get(user_id)?.profile.city;
        let temperature = match self.temperature_for(&city).await {
            Ok(temperature) => temperature,
            Err(AppError::NoMatch(_)) => return Ok(BotReply::text(CITY_NOT_FOUND)),
            Err(err) => return Err(err),
        };
        let record = self.ledger.new_day(user_id, temperature)?;
        info!(user_id, temperature, water_goal = record.water_goal, "new day started");

        Ok(BotReply::text(format!(
            "A new day has begun and I am ready to record your results!{}",
            daily_goals(record.water_goal, record.profile.calorie_goal)
        )))
    }

    fn on_log_water(&self, user_id: UserId, args: &str) -> Result<BotReply> {
        if args.is_empty() {
            return Ok(BotReply::text(LOG_WATER_USAGE));
        }
        let amount = validation::parse_int(Field::Water, args)?;
        let logged = self.ledger.log_water(user_id, amount)?;
        Ok(BotReply::text(format!(
            "Recorded: {} ml, left to drink today: {} ml.",
            logged.amount_ml, logged.remaining_ml
        )))
    }

    async fn on_log_food(&self, user_id: UserId, food: &str) -> Result<BotReply> {
        if food.is_empty() {
            return Ok(BotReply::text(LOG_FOOD_USAGE));
        }
        if !self.store.contains(user_id) {
            return Err(AppError::ProfileNotFound(user_id));
        }

        let query = self
            .consult("translator", self.providers.translator.to_english(food))
            .await?;
        let lookup = self
            .consult("nutrition", self.providers.nutrition.calories_per_gram(&query))
            .await;

        match lookup {
            Ok(calories_per_gram) => {
                self.engine.begin_gram_entry(user_id, food, calories_per_gram);
                Ok(BotReply::text(format!(
                    "{}: {} kcal per 100 g. How many grams did you eat?",
                    food,
                    round2(calories_per_gram * 100.0)
                )))
            }
            Err(AppError::NoMatch(_)) => Ok(BotReply::text(FOOD_NOT_FOUND)),
            Err(err) => Err(err),
        }
    }

    async fn on_log_workout(&self, user_id: UserId, args: &str) -> Result<BotReply> {
        let mut parts = args.split_whitespace();
        let (Some(name), Some(minutes), None) = (parts.next(), parts.next(), parts.next()) else {
            return Ok(BotReply::text(LOG_WORKOUT_USAGE));
        };
        let name = validation::parse_text(Field::WorkoutName, name)?;
        let minutes = validation::parse_int(Field::WorkoutMinutes, minutes)?;
        if !self.store.contains(user_id) {
            return Err(AppError::ProfileNotFound(user_id));
        }

        let english = self
            .consult("translator", self.providers.translator.to_english(&name))
            .await?;
        let query = format!("{} {} min", english, minutes);
        let burned = match self
            .consult("nutrition", self.providers.nutrition.workout_calories(&query))
            .await
        {
            Ok(burned) => burned,
            Err(AppError::NoMatch(_)) => return Ok(BotReply::text(WORKOUT_NOT_FOUND)),
            Err(err) => return Err(err),
        };

        let logged = self.ledger.log_workout(user_id, minutes, burned)?;
        Ok(BotReply::text(format!(
            "{} {} minutes: {} kcal. Extra: drink {} ml of water.",
            name,
            minutes,
            round2(burned),
            logged.water_ml
        )))
    }

    fn on_check_progress(&self, user_id: UserId) -> Result<BotReply> {
        let p = self.ledger.progress(user_id)?;
        Ok(BotReply::text(format!(
            "Progress\n\
             Water:\n\
             - Drunk: {} ml of {} ml.\n\
             - Left: {} ml.\n\n\
             Calories:\n\
             - Consumed: {} kcal of {} kcal.\n\
             - Burned: {} kcal.\n\
             - Balance: {} kcal.",
            p.water_consumed,
            p.water_goal,
            p.water_remaining,
            round2(p.calories_consumed),
            p.calorie_goal,
            round2(p.calories_burned),
            round2(p.balance)
        )))
    }

    fn on_plot(&self, user_id: UserId, chart: Chart) -> Result<BotReply> {
        let (title, y_label, points) = match chart {
            Chart::Water => ("Cumulative water intake", "ml", self.ledger.water_series(user_id)?),
            Chart::Calories => (
                "Cumulative calorie intake",
                "kcal",
                self.ledger.calorie_series(user_id)?,
            ),
        };
        Ok(BotReply::text(title).with_chart(ChartSeries {
            title: title.to_string(),
            x_label: "Intake".to_string(),
            y_label: y_label.to_string(),
            points,
        }))
    }

    // ===== Providers =====

    /// Current temperature for a city as the user typed it
    async fn temperature_for(&self, city: &str) -> Result<f64> {
        let english = self
            .consult("translator", self.providers.translator.to_english(city))
            .await?;
        self.consult("weather", self.providers.weather.temperature(&english))
            .await
    }

    /// Await a provider call within the configured timeout
    async fn consult<T>(
        &self,
        provider: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.provider_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(format!(
                "{} did not answer within {:?}",
                provider, self.provider_timeout
            ))),
        };

        let latency_ms = start.elapsed().as_millis() as u64;

        match &result {
            Err(AppError::NoMatch(query)) => {
                debug!(provider, query = %query, "no match");
                self.metrics.record_provider_success(provider, latency_ms);
            }
            Err(err) => {
                self.metrics
                    .record_provider_error(provider, latency_ms, err.to_string());
                warn!(provider, error = %err, "provider call failed");
            }
            Ok(_) => self.metrics.record_provider_success(provider, latency_ms),
        }
        result
    }

    fn failure(&self, user_id: UserId, err: AppError) -> BotReply {
        self.metrics.record_error();
        debug!(user_id, error = %err, "command failed");
        let text = match &err {
            AppError::Validation(validation) => validation.to_string(),
            AppError::ProfileNotFound(_) => NO_PROFILE.to_string(),
            e if e.is_provider_failure() => PROVIDER_UNAVAILABLE.to_string(),
            _ => {
                warn!(user_id, error = %err, "unexpected failure");
                INTERNAL_FAILURE.to_string()
            }
        };
        BotReply::text(text)
    }
}

fn step_prompt(step: ProfileStep) -> BotReply {
    match step {
        ProfileStep::AwaitingWeight => BotReply::text("Enter your weight (kg)"),
        ProfileStep::AwaitingHeight => BotReply::text("Enter your height (cm)"),
        ProfileStep::AwaitingAge => BotReply::text("Enter your age"),
        ProfileStep::AwaitingCity => BotReply::text("Which city are you in?"),
        ProfileStep::AwaitingSex => BotReply::text("What is your sex?").with_buttons(
            Sex::ALL
                .iter()
                .map(|sex| ReplyButton::new(sex.label(), sex.callback_data()))
                .collect(),
        ),
        ProfileStep::AwaitingActivity => BotReply::text("What is your activity level?")
            .with_buttons(
                ActivityLevel::ALL
                    .iter()
                    .map(|level| ReplyButton::new(level.label(), level.callback_data()))
                    .collect(),
            ),
        ProfileStep::AwaitingCalorieGoal => BotReply::text("What is your calorie goal?"),
    }
}

fn tdee_message(tdee: f64) -> String {
    format!(
        "Your calorie norm is {} kcal.\n\
         To lose weight, a deficit of 500-1000 kcal a day is usually recommended, \
         which takes off about 0.5-1 kg a week.\n\n\
         To gain weight, eat 250-500 kcal a day more.\n\
         What is your calorie goal?",
        round2(tdee)
    )
}

fn daily_goals(water_goal: i64, calorie_goal: i64) -> String {
    format!(
        "\nToday you need to:\n- drink {} ml of water.\n- eat {} kcal.",
        water_goal, calorie_goal
    )
}
