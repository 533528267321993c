use std::path::Path;

use chrono::{Local, NaiveDateTime};

use crate::env::{home_dir, user_name};

pub const RED: &str = "\x1b[1;31m";
pub const GREEN: &str = "\x1b[1;32m";
pub const YELLOW: &str = "\x1b[1;33m";
pub const BLUE: &str = "\x1b[1;34m";
pub const WHITE: &str = "\x1b[1;37m";
pub const NC: &str = "\x1b[0m";

/// The current time on its own line, then `user:dir$ ` in the usual Ubuntu
/// colours.
pub fn render_prompt() -> String {
    let dir = match std::env::current_dir() {
        Ok(cwd) => display_dir(&cwd, home_dir().as_deref()),
        Err(_) => String::from("?"),
    };
    format!(
        "{YELLOW}{}\n{GREEN}{}{WHITE}:{BLUE}{}{NC}$ ",
        timestamp(&Local::now().naive_local()),
        user_name(),
        dir
    )
}

/// `ctime(3)` layout: `Tue Mar  5 09:07:02 2024`.
pub fn timestamp(at: &NaiveDateTime) -> String {
    at.format("%a %b %e %H:%M:%S %Y").to_string()
}

/// Shows `home` as `~`, but only on a whole path component.
pub fn display_dir(cwd: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home
        && let Ok(rest) = cwd.strip_prefix(home)
    {
        if rest.as_os_str().is_empty() {
            return String::from("~");
        }
        return format!("~/{}", rest.display());
    }
    cwd.display().to_string()
}

pub fn greeting() -> String {
    format!("{GREEN}Welcome to pipesh{NC}. Type `{WHITE}exit{NC}` to leave.")
}

pub fn farewell() -> String {
    format!("{RED}Now exiting shell...\nGoodbye{NC}")
}
