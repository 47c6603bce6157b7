use std::sync::Arc;

use arldb_backend::{
    analysis::GasMap,
    artifact::{ArchetypeTrace, Step},
    entry::{ConstParam, ContractEnv},
    DebugArtifact,
};
use rustc_hash::FxHashSet;

use crate::{
    event::{EventSender, SessionEvent},
    variables::{Variable, VariableCategory},
};

/// A requested breakpoint. Only lines some step ends on can be hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Breakpoint {
    pub id: usize,
    pub line: u32,
    pub verified: bool,
}

/// Where the session stands in the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackFrame {
    /// The entrypoint being executed.
    pub name: String,
    pub file: Option<String>,
    pub line: u32,
    pub column: u32,
}

/// State of a debug session over one reconstructed run.
#[derive(Debug)]
pub struct DebugContext {
    execution: Arc<ArchetypeTrace>,
    /// Index of the current step, -1 before the first one.
    instruction: isize,
    contract: String,
    storage_names: FxHashSet<String>,
    input_names: FxHashSet<String>,
    constants: Vec<Variable>,
    gas: GasMap,
    show_gas: bool,
    breakpoints: Vec<Breakpoint>,
    breakpoint_lines: FxHashSet<u32>,
    next_breakpoint_id: usize,
    events: EventSender,
}

impl DebugContext {
    pub fn new(
        artifact: &DebugArtifact,
        entrypoint: &str,
        env: &ContractEnv,
        const_params: &[ConstParam],
        events: EventSender,
    ) -> Self {
        let constants = env
            .constants()
            .into_iter()
            .map(|(name, value)| Variable::new(name, value))
            .chain(const_params.iter().map(|p| Variable::new(&p.name, &p.value)))
            .collect();

        Self {
            execution: artifact.execution.clone(),
            instruction: -1,
            contract: artifact.debug.name.clone(),
            storage_names: artifact.debug.storage_names().into_iter().map(String::from).collect(),
            input_names: artifact.debug.input_names(entrypoint).into_iter().map(String::from).collect(),
            constants,
            gas: artifact.gas.clone(),
            show_gas: false,
            breakpoints: vec![],
            breakpoint_lines: FxHashSet::default(),
            next_breakpoint_id: 1,
            events,
        }
    }

    /// Swaps in the execution of a new run, keeping the breakpoints.
    pub fn reload(&mut self, artifact: &DebugArtifact) {
        self.execution = artifact.execution.clone();
        self.gas = artifact.gas.clone();
        self.instruction = -1;
        let lines: Vec<_> = self.breakpoints.iter().map(|b| b.line).collect();
        self.set_breakpoints(&lines);
    }

    pub fn execution(&self) -> &Arc<ArchetypeTrace> {
        &self.execution
    }

    pub fn instruction(&self) -> isize {
        self.instruction
    }

    pub fn len(&self) -> usize {
        self.execution.len()
    }

    pub fn is_empty(&self) -> bool {
        self.execution.is_empty()
    }

    pub fn current_step(&self) -> Option<&Step> {
        usize::try_from(self.instruction).ok().and_then(|i| self.execution.steps.get(i))
    }

    /// The value the run failed with.
    pub fn fail(&self) -> Option<&str> {
        self.execution.fail.as_deref()
    }

    /// Gas per line, while the session is running.
    pub fn gas_decorations(&self) -> Option<&GasMap> {
        self.show_gas.then_some(&self.gas)
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Starts over from the beginning.
    pub fn start(&mut self, stop_on_entry: bool) {
        self.instruction = -1;
        self.show_gas = true;
        if stop_on_entry {
            self.emit(SessionEvent::Entry);
        } else {
            self.continue_(false);
        }
    }

    pub fn step(&mut self, reverse: bool) {
        self.advance(reverse);
        if self.at_end() {
            self.finish();
        } else {
            self.emit(SessionEvent::Step);
        }
    }

    /// Steps until a breakpoint is hit or an end of the run is reached.
    pub fn continue_(&mut self, reverse: bool) {
        loop {
            let moved = self.advance(reverse);
            if !reverse && self.at_end() {
                self.finish();
                return;
            }
            if reverse && !moved {
                self.emit(SessionEvent::Entry);
                return;
            }
            if self.on_breakpoint() {
                self.emit(SessionEvent::Breakpoint);
                return;
            }
        }
    }

    /// Replaces the breakpoints with one per line.
    pub fn set_breakpoints(&mut self, lines: &[u32]) -> Vec<Breakpoint> {
        let reachable: FxHashSet<u32> = self.execution.steps.iter().filter_map(Step::line).collect();

        self.breakpoints = lines
            .iter()
            .map(|&line| {
                let id = self.next_breakpoint_id;
                self.next_breakpoint_id += 1;
                Breakpoint { id, line, verified: reachable.contains(&line) }
            })
            .collect();
        self.breakpoint_lines = self.breakpoints.iter().filter(|b| b.verified).map(|b| b.line).collect();
        trace!("breakpoints: {:?}", self.breakpoints);

        self.breakpoints.clone()
    }

    pub fn variables(&self, category: VariableCategory) -> Vec<Variable> {
        let bindings = self.current_step().map(|s| s.stack.as_slice()).unwrap_or_default();
        let is_storage = |name: &str| self.storage_names.contains(name);
        let is_input = |name: &str| self.input_names.contains(name);

        match category {
            VariableCategory::Storage => {
                bindings.iter().filter(|item| is_storage(&item.name)).map(Variable::from).collect()
            }
            VariableCategory::Inputs => {
                bindings.iter().filter(|item| is_input(&item.name)).map(Variable::from).collect()
            }
            VariableCategory::Locals => bindings
                .iter()
                .filter(|item| !is_storage(&item.name) && !is_input(&item.name))
                .map(Variable::from)
                .collect(),
            VariableCategory::Constants => self.constants.clone(),
        }
    }

    /// The current entrypoint and source position, once started.
    pub fn stack_frame(&self) -> Option<StackFrame> {
        let current = usize::try_from(self.instruction).ok()?;
        let visited = self.execution.steps.get(..=current)?;

        let name = visited
            .iter()
            .rev()
            .find_map(Step::entered_decl)
            .unwrap_or(self.contract.as_str())
            .to_string();

        let frame = match visited.iter().rev().find_map(|s| s.range.as_ref()) {
            Some(range) => StackFrame {
                name,
                file: Some(range.name.clone()),
                line: range.begin.line,
                column: range.begin.col,
            },
            None => StackFrame { name, file: None, line: 0, column: 0 },
        };
        Some(frame)
    }

    /// Looks `name` up in the current bindings.
    pub fn evaluate(&self, name: &str) -> Option<&str> {
        self.current_step()?.value_of(name.trim())
    }

    /// Moves the cursor by one step within [-1, len - 1]. Returns whether it moved.
    fn advance(&mut self, reverse: bool) -> bool {
        let last = self.len() as isize - 1;
        let next = if reverse { (self.instruction - 1).max(-1) } else { (self.instruction + 1).min(last) };
        let moved = next != self.instruction;
        self.instruction = next;
        moved
    }

    fn at_end(&self) -> bool {
        self.is_empty() || self.instruction == self.len() as isize - 1
    }

    fn on_breakpoint(&self) -> bool {
        self.current_step().and_then(Step::line).is_some_and(|line| self.breakpoint_lines.contains(&line))
    }

    fn finish(&mut self) {
        if let Some(fail) = self.execution.fail.clone() {
            self.emit(SessionEvent::Exception(fail));
        }
        self.emit(SessionEvent::End);
        self.show_gas = false;
    }

    fn emit(&self, event: SessionEvent) {
        debug!("session event {:?} at step {}", event, self.instruction);
        if self.events.send(event).is_err() {
            warn!("session event dropped: no receiver");
        }
    }
}

#[cfg(test)]
mod tests {
    use arldb_backend::{artifact::DebugData, reconstruct};

    use super::*;
    use crate::event::{channel, drain, EventReceiver};

    fn artifact(input: &str) -> DebugArtifact {
        let debug = std::fs::read_to_string(crate::testdata("debug.json")).unwrap();
        let raw = std::fs::read_to_string(crate::testdata(input)).unwrap();
        reconstruct(DebugData::from_json(&debug).unwrap(), raw).unwrap()
    }

    fn session(input: &str) -> (DebugContext, EventReceiver) {
        let (tx, rx) = channel();
        let mut env = ContractEnv::new("tz1Lc2qBKEWCBeDU8npG6zCeCqpmaegRi6Jg");
        env.set_now("2024-01-15 10:30:00").unwrap();
        let params = [ConstParam::new("init", "0")];
        (DebugContext::new(&artifact(input), "exec", &env, &params, tx), rx)
    }

    fn names(vars: &[Variable]) -> Vec<(&str, &str)> {
        vars.iter().map(|v| (v.name.as_str(), v.value.as_str())).collect()
    }

    #[test]
    fn test_step_through() {
        let (mut ctx, mut rx) = session("debug.input");
        ctx.start(true);
        assert_eq!(drain(&mut rx), vec![SessionEvent::Entry]);
        assert_eq!(ctx.instruction(), -1);
        assert!(ctx.gas_decorations().is_some());

        for expected in 0..3 {
            ctx.step(false);
            assert_eq!(ctx.instruction(), expected);
            assert_eq!(drain(&mut rx), vec![SessionEvent::Step]);
        }

        ctx.step(false);
        assert_eq!(ctx.instruction(), 3);
        assert_eq!(drain(&mut rx), vec![SessionEvent::End]);
        assert!(ctx.gas_decorations().is_none());

        // clamped at the last step
        ctx.step(false);
        assert_eq!(ctx.instruction(), 3);
        assert_eq!(drain(&mut rx), vec![SessionEvent::End]);

        ctx.step(true);
        assert_eq!(ctx.instruction(), 2);
        assert_eq!(drain(&mut rx), vec![SessionEvent::Step]);
    }

    #[test]
    fn test_backward_is_clamped_at_entry() {
        let (mut ctx, mut rx) = session("debug.input");
        ctx.start(true);
        ctx.step(false);
        ctx.step(true);
        ctx.step(true);
        assert_eq!(ctx.instruction(), -1);
        assert!(ctx.current_step().is_none());
        assert_eq!(drain(&mut rx), vec![SessionEvent::Entry, SessionEvent::Step, SessionEvent::Step, SessionEvent::Step]);
    }

    #[test]
    fn test_breakpoints() {
        let (mut ctx, mut rx) = session("debug.input");
        let bps = ctx.set_breakpoints(&[7, 9]);
        assert_eq!(
            bps,
            vec![Breakpoint { id: 1, line: 7, verified: true }, Breakpoint { id: 2, line: 9, verified: false }]
        );

        ctx.start(false);
        assert_eq!(ctx.instruction(), 2);
        assert_eq!(drain(&mut rx), vec![SessionEvent::Breakpoint]);

        ctx.continue_(false);
        assert_eq!(ctx.instruction(), 3);
        assert_eq!(drain(&mut rx), vec![SessionEvent::End]);

        ctx.continue_(true);
        assert_eq!(ctx.instruction(), 2);
        assert_eq!(drain(&mut rx), vec![SessionEvent::Breakpoint]);

        ctx.continue_(true);
        assert_eq!(ctx.instruction(), -1);
        assert_eq!(drain(&mut rx), vec![SessionEvent::Entry]);

        // ids keep growing
        assert_eq!(ctx.set_breakpoints(&[6])[0], Breakpoint { id: 3, line: 6, verified: true });
    }

    #[test]
    fn test_variables() {
        let (mut ctx, _rx) = session("debug.input");
        assert!(ctx.variables(VariableCategory::Storage).is_empty());

        ctx.start(true);
        ctx.step(false);
        ctx.step(false);
        assert_eq!(names(&ctx.variables(VariableCategory::Storage)), vec![("a", "0")]);
        assert_eq!(names(&ctx.variables(VariableCategory::Inputs)), vec![("v", "2")]);
        assert!(ctx.variables(VariableCategory::Locals).is_empty());

        let constants = ctx.variables(VariableCategory::Constants);
        assert_eq!(constants.len(), 7);
        assert_eq!(constants[0], Variable::new("now", "2024-01-15 10:30:00"));
        assert_eq!(constants[6], Variable::new("init", "0"));

        ctx.step(false);
        assert_eq!(ctx.evaluate("a"), Some("2"));
        assert_eq!(ctx.evaluate(" v "), Some("2"));
        assert_eq!(ctx.evaluate("missing"), None);
    }

    #[test]
    fn test_stack_frame() {
        let (mut ctx, _rx) = session("debug.input");
        assert_eq!(ctx.stack_frame(), None);

        ctx.start(true);
        ctx.step(false);
        assert_eq!(ctx.stack_frame(), Some(StackFrame { name: "exec".to_string(), file: None, line: 0, column: 0 }));

        ctx.step(false);
        ctx.step(false);
        let frame = ctx.stack_frame().unwrap();
        assert_eq!(frame.file.as_deref(), Some("./tests/resources/debug.arl"));
        assert_eq!((frame.line, frame.column), (7, 1));

        // the closing bound keeps the last known position
        ctx.step(false);
        assert_eq!(ctx.stack_frame().unwrap().line, 7);
    }

    #[test]
    fn test_failed_run() {
        let (mut ctx, mut rx) = session("debug_fail.input");
        assert_eq!(ctx.fail(), Some("(Pair \"mystr\" 2)"));

        ctx.start(false);
        assert_eq!(
            drain(&mut rx),
            vec![SessionEvent::Exception("(Pair \"mystr\" 2)".to_string()), SessionEvent::End]
        );
        assert_eq!(ctx.instruction(), 1);
    }

    #[test]
    fn test_reload_keeps_breakpoints() {
        let (mut ctx, _rx) = session("debug.input");
        ctx.set_breakpoints(&[7]);
        ctx.start(false);

        ctx.reload(&artifact("debug_fail.input"));
        assert_eq!(ctx.instruction(), -1);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.breakpoints()[0].line, 7);
        assert!(!ctx.breakpoints()[0].verified);
    }

    #[test]
    fn test_empty_execution() {
        let (tx, mut rx) = channel();
        let mut artifact = artifact("debug.input");
        artifact.execution = Arc::new(ArchetypeTrace::default());
        let mut ctx = DebugContext::new(&artifact, "exec", &ContractEnv::new("tz1caller"), &[], tx);

        ctx.step(false);
        assert_eq!(ctx.instruction(), -1);
        ctx.continue_(false);
        assert_eq!(drain(&mut rx), vec![SessionEvent::End, SessionEvent::End]);
    }
}
