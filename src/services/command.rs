//! Slash command parsing

/// A recognised chat command and its raw argument text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Start,
    Help,
    SetProfile,
    Cancel,
    NewDay,
    LogWater(&'a str),
    LogFood(&'a str),
    LogWorkout(&'a str),
    CheckProgress,
    PlotWater,
    PlotCalories,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Parse a message starting with `/`
    ///
    /// Returns `None` for plain text. A `@botname` suffix on the command word
    /// is ignored, arguments are trimmed.
    pub fn parse(text: &'a str) -> Option<Self> {
        let text = text.trim();
        let body = text.strip_prefix('/')?;
        let (word, args) = match body.split_once(char::is_whitespace) {
            Some((word, args)) => (word, args.trim()),
            None => (body, ""),
        };
        let name = word.split_once('@').map_or(word, |(name, _)| name);

        let command = match name {
            "start" => Command::Start,
            "help" => Command::Help,
            "set_profile" => Command::SetProfile,
            "cancel" => Command::Cancel,
            "new_day" => Command::NewDay,
            "log_water" => Command::LogWater(args),
            "log_food" => Command::LogFood(args),
            "log_workout" => Command::LogWorkout(args),
            "check_progress" => Command::CheckProgress,
            "plot_water" => Command::PlotWater,
            "plot_calories" => Command::PlotCalories,
            _ => Command::Unknown(name),
        };
        Some(command)
    }
}
