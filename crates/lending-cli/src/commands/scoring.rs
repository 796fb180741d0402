use clap::Args;
use serde_json::{json, Value};

use lending_core::scoring::{score_for_value, ScorePolicy};

/// Overrides for the score rule; unset flags keep the book's (or default) policy.
#[derive(Args, Default)]
pub struct PolicyArgs {
    /// Points added per registered payment
    #[arg(long)]
    pub score_increment: Option<u32>,

    /// Maximum attainable score
    #[arg(long)]
    pub score_ceiling: Option<u32>,
}

impl PolicyArgs {
    pub fn apply(&self, base: ScorePolicy) -> ScorePolicy {
        ScorePolicy {
            increment: self.score_increment.unwrap_or(base.increment),
            ceiling: self.score_ceiling.unwrap_or(base.ceiling),
        }
    }
}

/// Arguments for band lookup
#[derive(Args)]
pub struct ScoreBandArgs {
    /// Credit score
    #[arg(long)]
    pub score: u32,
}

/// Arguments for the post-payment score
#[derive(Args)]
pub struct NextScoreArgs {
    /// Current credit score
    #[arg(long)]
    pub score: u32,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

pub fn run_score_band(args: ScoreBandArgs) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(json!({
        "score": args.score,
        "band": score_for_value(args.score),
    }))
}

pub fn run_next_score(args: NextScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let policy = args.policy.apply(ScorePolicy::default());
    let transition = policy.transition(args.score);
    Ok(json!({
        "policy": policy,
        "transition": transition,
        "current_score": transition.current_score,
    }))
}
