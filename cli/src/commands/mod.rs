mod helpers;
mod weight;

pub(crate) use helpers::prompt_weight;
pub(crate) use weight::{cmd_history, cmd_run, cmd_trend};
