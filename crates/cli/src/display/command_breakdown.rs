use efrun_core::SimCommand;
use std::fmt::Write;

pub fn print_command_breakdown(command: &SimCommand) {
    print!("{}", format_command_breakdown(command));
}

pub fn format_command_breakdown(command: &SimCommand) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "   🔧 Command breakdown:");
    let _ = writeln!(out, "      • program: {}", command.program);

    // Everything before the trailing config path came from the template
    let template_args: Vec<_> = command
        .args
        .iter()
        .take(command.args.len().saturating_sub(1))
        .map(|a| a.to_string_lossy())
        .collect();
    if !template_args.is_empty() {
        let _ = writeln!(out, "      • args: {:?}", template_args);
    }

    if let Some(config_path) = command.config_path() {
        let _ = writeln!(out, "      • config: {}", config_path.display());
    }

    if let Some(ref dir) = command.working_dir {
        let _ = writeln!(out, "      • workdir: {}", dir.display());
    }

    if !command.env.is_empty() {
        let _ = writeln!(out, "      • extraEnv:");
        for (key, value) in &command.env {
            let _ = writeln!(out, "         - {}={}", key, value);
        }
    }

    let _ = writeln!(out, "   🚀 Final command: {}", command.to_shell_command());
    out
}
