mod args;
mod helpers;

pub use args::{Cli, Commands, LinkArgs};
pub use helpers::{
    check_rules, render_bases, render_matchers, render_resolution, render_rules, render_rules_json,
    view_link_from_args,
};
