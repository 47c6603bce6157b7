use std::{path::PathBuf, str::FromStr};

use arldb_backend::analysis::GAS_SCALE;
use arldb_frontend::{
    event::{self, EventReceiver, SessionEvent},
    input::{collect_env, Prompt},
    variables::VariableCategory,
    Breakpoint, DebugContext, DebugFrontend,
};
use clap::Parser;
use eyre::Result;
use strum::IntoEnumIterator;
use yansi::Paint;

use super::{gas::render_gas, steps::render_step};
use crate::{
    opts::{CacheOpts, EnvOpts, ToolOpts},
    utils::{self, prompt::StdinPrompt, read_file},
};

const HELP: &str = "\
n, next            step forward (also an empty line)
p, prev            step backward
c, continue        run to the next breakpoint
rc                 run back to the previous breakpoint
b, break <LINE>..  replace the breakpoints
v, vars [SCOPE]    show variables (storage, inputs, locals, constants)
e, eval <NAME>     show the current value of a variable
f, frame           show the current position
s, step            show the current step
g, gas             show the gas spent per line
r, restart         run the call again
q, quit            exit";

/// CLI arguments for `arldb debug`.
#[derive(Clone, Debug, Parser)]
pub struct DebugArgs {
    /// The Archetype contract.
    pub source: PathBuf,

    /// The entrypoint to call. Asked for when the contract has several.
    #[arg(long, short)]
    pub entrypoint: Option<String>,

    /// Lines to break on. Without breakpoints the session stops before the first step.
    #[arg(long, short, value_delimiter = ',', value_name = "LINE")]
    pub breakpoints: Vec<u32>,

    #[command(flatten)]
    pub env: EnvOpts,

    #[command(flatten)]
    pub tools: ToolOpts,

    #[command(flatten)]
    pub cache: CacheOpts,
}

impl DebugArgs {
    pub async fn run(self) -> Result<()> {
        let backend = utils::backend(&self.tools, &self.cache)?;
        let mut env = self.env.env(&backend.toolchain().config().caller)?;
        let mut prompt = StdinPrompt::default();

        if self.env.ask_env && collect_env(&mut prompt, &mut env).await.is_none() {
            return Ok(());
        }
        let entrypoint = self.entrypoint.as_deref();
        let Some(request) =
            DebugFrontend::prompt_request(&backend, &mut prompt, &self.source, entrypoint, env).await?
        else {
            return Ok(());
        };

        let view = View { lines: read_file(&self.source).await?.lines().map(String::from).collect() };
        let (tx, mut rx) = event::channel();
        let mut frontend = DebugFrontend::new(&backend, request, tx);

        let context = frontend.launch(true).await?;
        if !self.breakpoints.is_empty() {
            view.breakpoints(&context.set_breakpoints(&self.breakpoints));
            context.continue_(false);
        }
        view.report(&mut rx, context);

        while let Some(line) = prompt.ask("(arldb)").await {
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    eprintln!("{}", e.red());
                    continue;
                }
            };

            let context = match command {
                Command::Quit => break,
                Command::Restart => frontend.launch(true).await?,
                command => match frontend.context_mut() {
                    Some(context) => {
                        view.apply(command, context);
                        context
                    }
                    None => continue,
                },
            };
            view.report(&mut rx, context);
        }

        Ok(())
    }
}

/// A command typed at the debugger prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Command {
    Next,
    Prev,
    Continue,
    ReverseContinue,
    Break(Vec<u32>),
    Variables(Option<VariableCategory>),
    Eval(String),
    Frame,
    Step,
    Gas,
    Restart,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = match words.next().unwrap_or("n") {
            "n" | "next" => Self::Next,
            "p" | "prev" => Self::Prev,
            "c" | "continue" => Self::Continue,
            "rc" => Self::ReverseContinue,
            "b" | "break" => Self::Break(
                words
                    .by_ref()
                    .map(|w| w.parse().map_err(|_| format!("invalid line number {w:?}")))
                    .collect::<Result<_, _>>()?,
            ),
            "v" | "vars" => Self::Variables(
                words
                    .next()
                    .map(|w| w.parse().map_err(|_| format!("unknown scope {w:?}")))
                    .transpose()?,
            ),
            "e" | "eval" => Self::Eval(words.next().ok_or("missing variable name")?.to_string()),
            "f" | "frame" => Self::Frame,
            "s" | "step" => Self::Step,
            "g" | "gas" => Self::Gas,
            "r" | "restart" => Self::Restart,
            "h" | "help" => Self::Help,
            "q" | "quit" => Self::Quit,
            other => return Err(format!("unknown command {other:?}, type `h` for help")),
        };
        match words.next() {
            Some(extra) => Err(format!("unexpected argument {extra:?}")),
            None => Ok(command),
        }
    }
}

/// Prints the session for a terminal.
struct View {
    /// The source, one entry per line.
    lines: Vec<String>,
}

impl View {
    fn apply(&self, command: Command, context: &mut DebugContext) {
        match command {
            Command::Next => context.step(false),
            Command::Prev => context.step(true),
            Command::Continue => context.continue_(false),
            Command::ReverseContinue => context.continue_(true),
            Command::Break(lines) => self.breakpoints(&context.set_breakpoints(&lines)),
            Command::Variables(Some(category)) => self.variables(context, category),
            Command::Variables(None) => {
                VariableCategory::iter().for_each(|category| self.variables(context, category))
            }
            Command::Eval(name) => match context.evaluate(&name) {
                Some(value) => println!("{name} = {value}"),
                None => println!("{}", format!("{name} is not bound here").yellow()),
            },
            Command::Frame => self.frame(context),
            Command::Step => match context.current_step() {
                Some(step) => println!("{}", render_step(context.instruction() as usize, step)),
                None => println!("not started"),
            },
            Command::Gas => match context.gas_decorations() {
                Some(gas) => print!("{}", render_gas(gas)),
                None => println!("{}", "no gas information once the run is over".yellow()),
            },
            Command::Help => println!("{HELP}"),
            Command::Restart | Command::Quit => {}
        }
    }

    /// Prints what happened since the last command.
    fn report(&self, events: &mut EventReceiver, context: &DebugContext) {
        for event in event::drain(events) {
            match event {
                SessionEvent::Entry => println!("{}", "stopped at entry".dim()),
                SessionEvent::Step => self.frame(context),
                SessionEvent::Breakpoint => {
                    println!("{}", "breakpoint".magenta());
                    self.frame(context);
                }
                SessionEvent::Exception(fail) => println!("{} {fail}", "failed with".red().bold()),
                SessionEvent::Output(text) => println!("{}", text.dim()),
                SessionEvent::End => println!("{}", "end of run".green()),
            }
        }
    }

    fn frame(&self, context: &DebugContext) {
        let Some(frame) = context.stack_frame() else {
            println!("not started");
            return;
        };
        let gas = context.current_step().map_or(0.0, |step| step.gas / GAS_SCALE);
        println!(
            "{} {}:{} {}",
            frame.name.cyan(),
            frame.line,
            frame.column,
            format!("(step {}/{}, gas {gas})", context.instruction() + 1, context.len()).dim()
        );
        if let Some(text) = frame.line.checked_sub(1).and_then(|i| self.lines.get(i as usize)) {
            println!("  {}", text.trim_end().bold());
        }
    }

    fn variables(&self, context: &DebugContext, category: VariableCategory) {
        println!("{}", category.underline());
        for variable in context.variables(category) {
            println!("  {variable}");
        }
    }

    fn breakpoints(&self, breakpoints: &[Breakpoint]) {
        for bp in breakpoints {
            if bp.verified {
                println!("breakpoint {} at line {}", bp.id, bp.line);
            } else {
                println!("{}", format!("breakpoint {} at line {} is never reached", bp.id, bp.line).yellow());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("".parse::<Command>(), Ok(Command::Next));
        assert_eq!("  n ".parse::<Command>(), Ok(Command::Next));
        assert_eq!("rc".parse::<Command>(), Ok(Command::ReverseContinue));
        assert_eq!("b 7 12".parse::<Command>(), Ok(Command::Break(vec![7, 12])));
        assert_eq!("break".parse::<Command>(), Ok(Command::Break(vec![])));
        assert_eq!("v".parse::<Command>(), Ok(Command::Variables(None)));
        assert_eq!("vars storage".parse::<Command>(), Ok(Command::Variables(Some(VariableCategory::Storage))));
        assert_eq!("e a".parse::<Command>(), Ok(Command::Eval("a".to_string())));
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!("b seven".parse::<Command>().unwrap_err().contains("invalid line number"));
        assert!("v globals".parse::<Command>().unwrap_err().contains("unknown scope"));
        assert_eq!("e".parse::<Command>(), Err("missing variable name".to_string()));
        assert!("n 2".parse::<Command>().unwrap_err().contains("unexpected argument"));
        assert!("jump".parse::<Command>().unwrap_err().contains("unknown command"));
    }
}
