use std::{
    fs,
    io::{self, Write},
};

use pipesh::{
    completion::ShellCompleter, config::ShellConfig, env, execution::process, prompt,
    result::CycleOutcome, shell::Shell,
};
use rustyline::{Editor, error::ReadlineError, history::FileHistory};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &ShellConfig) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn save_history(rl: &mut Editor<ShellCompleter, FileHistory>, config: &ShellConfig) {
    let Some(path) = &config.history_file else {
        return;
    };
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!(path = %parent.display(), error = %e, "cannot create history directory");
        return;
    }
    if let Err(e) = rl.save_history(path) {
        warn!(path = %path.display(), error = %e, "cannot save history");
    }
}

fn main() -> anyhow::Result<()> {
    let config = ShellConfig::from_env();
    init_tracing(&config);
    process::ignore_terminal_signals();

    let mut shell = Shell::new(config.clone())?;
    let mut rl: Editor<ShellCompleter, FileHistory> =
        Editor::with_config(rustyline::Config::default())?;
    rl.set_helper(Some(ShellCompleter::new(env::get_path_env())));
    if let Some(path) = &config.history_file {
        // no history file yet on first start
        let _ = rl.load_history(path);
    }

    println!("{}", prompt::greeting());
    let status = loop {
        let readline = rl.readline(&prompt::render_prompt());
        let ret = match readline {
            Ok(line) => {
                if !line.trim().is_empty() {
                    rl.add_history_entry(line.as_str())?;
                }
                let ret = pipesh::get_input_and_run(&line, &mut shell);
                io::stdout().flush()?;
                ret
            }
            // Ctrl-C drops the line, like bash and zsh
            Err(ReadlineError::Interrupted) => CycleOutcome::Continue,
            // Ctrl-D leaves like `exit`
            Err(ReadlineError::Eof) => CycleOutcome::Exit,
            Err(e) => {
                save_history(&mut rl, &config);
                return Err(anyhow::anyhow!(e));
            }
        };

        match ret {
            CycleOutcome::Continue => {}
            CycleOutcome::Exit => {
                println!("{}", prompt::farewell());
                break 0;
            }
            CycleOutcome::Terminate(status) => break status,
        }
    };

    save_history(&mut rl, &config);
    if status != 0 {
        std::process::exit(status);
    }
    Ok(())
}
