//! Headless runner - plays a round with the placement engine and streams events
//!
//! Configuration comes from the environment first and is then overridden by command
//! line arguments:
//!
//! | Variable | Argument | Default |
//! |----------|----------|---------|
//! | `BLOCKFALL_MODE` | `--mode` | `classic` |
//! | `BLOCKFALL_SEED` | `--seed` | `1` |
//! | `BLOCKFALL_MAX_TICKS` | `--max-ticks` | `100000` |
//! | | `--quiet` | events on |
//! | | `--snapshot` | off |
//!
//! Mode names: `classic[:normal|:hard]`, `sprint:24|48|96`,
//! `challenge:petrify|demolition|gauntlet`, `practice[:easy|normal|hard[:goal[:level]]]`.

use std::io::Write;

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::core::{
    ChallengeVariant, ClassicVariant, GameSession, ModeKey, PracticeDifficulty, SessionConfig,
    SessionStatus, SprintLength,
};
use crate::engine::{intents_for, plan_session, PlaceError};
use crate::types::{EndReason, Intent, TICK_MS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub mode: ModeKey,
    pub seed: u64,
    pub max_ticks: u64,
    /// Print every event as a JSON line
    pub emit_events: bool,
    /// Print the final snapshot as a JSON line
    pub emit_snapshot: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            mode: ModeKey::default(),
            seed: 1,
            max_ticks: 100_000,
            emit_events: true,
            emit_snapshot: false,
        }
    }
}

impl RunnerConfig {
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let mode = env::var("BLOCKFALL_MODE")
            .ok()
            .and_then(|s| parse_mode(s.trim()).ok())
            .unwrap_or(defaults.mode);
        let seed = env::var("BLOCKFALL_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.seed);
        let max_ticks = env::var("BLOCKFALL_MAX_TICKS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_ticks);

        Self {
            mode,
            seed,
            max_ticks,
            ..defaults
        }
    }

    /// Override fields from command line arguments (program name excluded).
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        let mut i = 0usize;
        while i < args.len() {
            match args[i].as_str() {
                "--mode" => {
                    i += 1;
                    let v = args
                        .get(i)
                        .ok_or_else(|| anyhow!("runner: missing value for --mode"))?;
                    self.mode = parse_mode(v)?;
                }
                "--seed" => {
                    i += 1;
                    let v = args
                        .get(i)
                        .ok_or_else(|| anyhow!("runner: missing value for --seed"))?;
                    self.seed = v
                        .parse::<u64>()
                        .map_err(|_| anyhow!("runner: invalid --seed value: {}", v))?;
                }
                "--max-ticks" => {
                    i += 1;
                    let v = args
                        .get(i)
                        .ok_or_else(|| anyhow!("runner: missing value for --max-ticks"))?;
                    self.max_ticks = v
                        .parse::<u64>()
                        .map_err(|_| anyhow!("runner: invalid --max-ticks value: {}", v))?;
                }
                "--quiet" => self.emit_events = false,
                "--snapshot" => self.emit_snapshot = true,
                other => {
                    return Err(anyhow!("runner: unknown argument: {}", other));
                }
            }
            i += 1;
        }
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            mode: self.mode,
            seed: self.seed,
        }
    }
}

/// Parse a mode name such as `sprint:48` or `practice:hard:20:3`.
pub fn parse_mode(s: &str) -> Result<ModeKey> {
    let mut parts = s.split(':');
    let mode = parts.next().unwrap_or_default().to_lowercase();
    let variant = parts.next();

    let key = match mode.as_str() {
        "classic" => match variant {
            None | Some("normal") => ModeKey::Classic(ClassicVariant::Normal),
            Some("hard") => ModeKey::Classic(ClassicVariant::Hard),
            Some(v) => return Err(anyhow!("runner: unknown classic variant: {}", v)),
        },
        "sprint" => {
            let lines = variant
                .unwrap_or("24")
                .parse::<u32>()
                .map_err(|_| anyhow!("runner: invalid sprint length in {}", s))?;
            let length = SprintLength::from_lines(lines)
                .ok_or_else(|| anyhow!("runner: sprint length must be 24, 48 or 96"))?;
            ModeKey::Sprint(length)
        }
        "challenge" => {
            let name = variant.ok_or_else(|| anyhow!("runner: challenge needs a variant"))?;
            let challenge = ChallengeVariant::from_str(name)
                .ok_or_else(|| anyhow!("runner: unknown challenge: {}", name))?;
            ModeKey::Challenge(challenge)
        }
        "practice" => {
            let difficulty = match variant {
                None => PracticeDifficulty::Normal,
                Some(v) => PracticeDifficulty::from_str(v)
                    .ok_or_else(|| anyhow!("runner: unknown practice difficulty: {}", v))?,
            };
            let line_goal = match parts.next() {
                None | Some("none") | Some("0") => None,
                Some(v) => Some(
                    v.parse::<u32>()
                        .map_err(|_| anyhow!("runner: invalid practice goal: {}", v))?,
                ),
            };
            let start_level = match parts.next() {
                None => 0,
                Some(v) => v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("runner: invalid practice level: {}", v))?,
            };
            ModeKey::Practice {
                difficulty,
                line_goal,
                start_level,
            }
        }
        other => return Err(anyhow!("runner: unknown mode: {}", other)),
    };

    if parts.next().is_some() {
        return Err(anyhow!("runner: too many parts in mode: {}", s));
    }
    Ok(key)
}

/// Canonical name of a mode key, accepted back by [`parse_mode`].
pub fn mode_name(key: ModeKey) -> String {
    match key {
        ModeKey::Classic(ClassicVariant::Normal) => "classic:normal".to_string(),
        ModeKey::Classic(ClassicVariant::Hard) => "classic:hard".to_string(),
        ModeKey::Sprint(length) => format!("sprint:{}", length.lines()),
        ModeKey::Challenge(variant) => format!("challenge:{}", variant.as_str()),
        ModeKey::Practice {
            difficulty,
            line_goal,
            start_level,
        } => {
            let difficulty = match difficulty {
                PracticeDifficulty::Easy => "easy",
                PracticeDifficulty::Normal => "normal",
                PracticeDifficulty::Hard => "hard",
            };
            format!(
                "practice:{}:{}:{}",
                difficulty,
                line_goal.unwrap_or(0),
                start_level
            )
        }
    }
}

/// End-of-run numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// `None` when the tick budget ran out first
    pub reason: Option<EndReason>,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub ticks: u64,
    pub pieces: u32,
}

/// Play one round to its end or to the tick budget, writing JSON lines to `out`.
pub fn run<W: Write>(config: &RunnerConfig, out: &mut W) -> Result<RunSummary> {
    let mut session = GameSession::from_config(config.session_config())
        .map_err(|e| anyhow!("runner: cannot start session: {}", e))?;

    let mut planned_for = 0u32;
    let mut events = Vec::new();
    while session.ticks() < config.max_ticks && !session.is_over() {
        if session.pieces_spawned() != planned_for {
            planned_for = session.pieces_spawned();
            queue_next_placement(&mut session);
        }

        session.tick(TICK_MS);

        session.drain_events_into(&mut events);
        if config.emit_events {
            for event in &events {
                serde_json::to_writer(&mut *out, event)?;
                out.write_all(b"\n")?;
            }
        }
        events.clear();
    }

    if config.emit_snapshot {
        serde_json::to_writer(&mut *out, &session.snapshot())?;
        out.write_all(b"\n")?;
    }

    Ok(RunSummary {
        reason: match session.status() {
            SessionStatus::Ended(reason) => Some(reason),
            SessionStatus::Active => None,
        },
        score: session.score(),
        lines: session.lines(),
        level: session.level(),
        ticks: session.ticks(),
        pieces: session.pieces_spawned(),
    })
}

/// Queue the intents for the engine's chosen landing, or a plain drop when it has none.
fn queue_next_placement(session: &mut GameSession) {
    match plan_session(session) {
        Ok(placement) => {
            for intent in intents_for(&placement) {
                session.push_intent(intent);
            }
        }
        Err(PlaceError::NoPlacement) => session.push_intent(Intent::HardDrop),
        Err(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_mode_names() {
        assert_eq!(
            parse_mode("classic").unwrap(),
            ModeKey::Classic(ClassicVariant::Normal)
        );
        assert_eq!(
            parse_mode("sprint:96").unwrap(),
            ModeKey::Sprint(SprintLength::Lines96)
        );
        assert_eq!(
            parse_mode("challenge:gauntlet").unwrap(),
            ModeKey::Challenge(ChallengeVariant::Gauntlet)
        );
        assert_eq!(
            parse_mode("practice:hard:20:3").unwrap(),
            ModeKey::Practice {
                difficulty: PracticeDifficulty::Hard,
                line_goal: Some(20),
                start_level: 3,
            }
        );
        assert!(parse_mode("sprint:30").is_err());
        assert!(parse_mode("arcade").is_err());
        assert!(parse_mode("classic:hard:extra").is_err());
    }

    #[test]
    fn test_mode_name_parses_back() {
        for name in [
            "classic:hard",
            "sprint:48",
            "challenge:demolition",
            "practice:easy:0:2",
        ] {
            let key = parse_mode(name).unwrap();
            assert_eq!(parse_mode(&mode_name(key)).unwrap(), key);
        }
    }

    #[test]
    fn test_args_override_defaults() {
        let mut config = RunnerConfig::default();
        config
            .apply_args(&args(&["--mode", "sprint:24", "--seed", "9", "--quiet"]))
            .unwrap();
        assert_eq!(config.mode, ModeKey::Sprint(SprintLength::Lines24));
        assert_eq!(config.seed, 9);
        assert!(!config.emit_events);
    }

    #[test]
    fn test_args_errors() {
        let mut config = RunnerConfig::default();
        assert!(config.apply_args(&args(&["--seed"])).is_err());
        assert!(config.apply_args(&args(&["--seed", "x"])).is_err());
        assert!(config.apply_args(&args(&["--bogus"])).is_err());
    }

    #[test]
    fn test_from_env_does_not_panic() {
        let _config = RunnerConfig::from_env();
    }

    #[test]
    fn test_run_streams_json_lines() {
        let config = RunnerConfig {
            max_ticks: 200,
            ..RunnerConfig::default()
        };
        let mut out = Vec::new();
        let summary = run(&config, &mut out).unwrap();
        assert!(summary.ticks <= 200);
        assert!(summary.pieces > 1);
        let text = String::from_utf8(out).unwrap();
        let first = text.lines().next().unwrap();
        let value: serde_json::Value = serde_json::from_str(first).unwrap();
        assert_eq!(value["type"], "pieceLocked");
    }

    #[test]
    fn test_run_is_deterministic() {
        let config = RunnerConfig {
            max_ticks: 500,
            emit_snapshot: true,
            ..RunnerConfig::default()
        };
        let mut a = Vec::new();
        let mut b = Vec::new();
        assert_eq!(run(&config, &mut a).unwrap(), run(&config, &mut b).unwrap());
        assert_eq!(a, b);
    }
}
